//! Dashboard UI operations: title, notifications, navigation, header buttons.
//!
//! Header buttons are the one persistent flow. The widget registers its
//! buttons once; the host answers the same call every time a button is
//! clicked, with `data.id` naming the button. Replacing the buttons releases
//! the previous registration.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::channel::HostChannel;
use crate::error::Result;
use crate::protocol::{CallId, MethodCall};
use crate::sender::{Arg, Kind, Sender};

/// Prefix and namespace of dashboard calls.
pub const PREFIX: &str = "dashboard";

/// Click handler of a header button.
pub type ButtonAction = Box<dyn FnMut()>;

type ButtonTable = Rc<RefCell<HashMap<String, Rc<RefCell<ButtonAction>>>>>;

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A button in the dashboard header.
#[derive(Default)]
pub struct HeaderButton {
    label: Option<String>,
    icon: Option<String>,
    action: Option<ButtonAction>,
}

impl HeaderButton {
    /// Button running `action` when clicked.
    pub fn new<F>(action: F) -> Self
    where
        F: FnMut() + 'static,
    {
        Self {
            action: Some(Box::new(action)),
            ..Self::default()
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Wire form of a header button.
#[derive(Serialize)]
struct ButtonDescriptor {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<String>,
}

/// `dashboard.*` methods.
pub struct DashboardApi {
    sender: Sender,
    buttons: RefCell<ButtonTable>,
    header_call: Cell<Option<CallId>>,
    next_button_id: Cell<u64>,
}

impl DashboardApi {
    pub fn new(sender: Sender) -> Self {
        Self {
            sender,
            buttons: RefCell::new(Rc::new(RefCell::new(HashMap::new()))),
            header_call: Cell::new(None),
            next_button_id: Cell::new(1),
        }
    }

    /// Dashboard API with its own transport on `channel`.
    pub fn connect(channel: Rc<dyn HostChannel>) -> Result<Self> {
        Ok(Self::new(Sender::connect(PREFIX, channel)?))
    }

    /// Set the widget's title in the dashboard.
    pub fn set_title(&self, title: Value) -> Result<CallId> {
        self.sender
            .validate(&title, Kind::String, "setTitle: title must be a string")?;
        self.sender
            .method(MethodCall::new("setTitle").params(title).transient())
    }

    /// Show a toast notification on the host page.
    pub fn show_notification(&self, message: Value, level: NotificationLevel) -> Result<CallId> {
        self.sender.validate(
            &message,
            Kind::String,
            "showNotification: message must be a string",
        )?;
        let params = json!({ "message": message, "level": level });
        self.sender
            .method(MethodCall::new("showNotification").params(params).transient())
    }

    /// Navigate the host page to a dashboard route.
    pub fn navigate(&self, path: Value) -> Result<CallId> {
        self.sender
            .validate(&path, Kind::String, "navigate: path must be a string")?;
        self.sender
            .method(MethodCall::new("navigate").params(path).transient())
    }

    /// Replace the header buttons.
    ///
    /// Each button is stored under a generated id (`header-button-<n>`) and
    /// the host is asked to render them with one persistent call. Every
    /// click response carrying a known `data.id` runs that button's action.
    /// The call registered by a previous invocation is released, so clicks
    /// answered on it are ignored.
    pub fn set_header_buttons(&self, buttons: Vec<HeaderButton>) -> Result<CallId> {
        for button in &buttons {
            let action = if button.action.is_some() {
                Arg::Function
            } else {
                Arg::Missing
            };
            self.sender.validate(
                action,
                Kind::Function,
                "setHeaderButtons: every button needs an action",
            )?;
        }

        let mut descriptors = Vec::with_capacity(buttons.len());
        let mut table = HashMap::with_capacity(buttons.len());
        for button in buttons {
            let id = format!("header-button-{}", self.next_button_id.get());
            self.next_button_id.set(self.next_button_id.get() + 1);

            if let Some(action) = button.action {
                table.insert(id.clone(), Rc::new(RefCell::new(action)));
            }
            descriptors.push(ButtonDescriptor {
                id,
                label: button.label,
                icon: button.icon,
            });
        }
        let params = serde_json::to_value(&descriptors)?;

        let table: ButtonTable = Rc::new(RefCell::new(table));
        let buttons = table.clone();
        let call = MethodCall::new("setHeaderButtons")
            .params(params)
            .persistent()
            .on_success(move |data| click(&buttons, &data));
        let call_id = self.sender.method(call)?;

        if let Some(previous) = self.header_call.replace(Some(call_id)) {
            self.sender.transport().release(previous);
        }
        *self.buttons.borrow_mut() = table;
        Ok(call_id)
    }

    /// Ids of the current header buttons.
    pub fn header_button_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.buttons.borrow().borrow().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn sender(&self) -> &Sender {
        &self.sender
    }

    pub fn cleanup(&self) {
        self.sender.cleanup();
    }
}

/// Run the action of the clicked button, if it is still registered.
fn click(buttons: &ButtonTable, data: &Value) {
    let Some(id) = data.get("id").and_then(Value::as_str) else {
        tracing::debug!("Header button click without an id: {}", data);
        return;
    };

    // Actions may replace the buttons, so the table is not borrowed while one runs.
    let action = buttons.borrow().get(id).cloned();
    match action {
        Some(action) => match action.try_borrow_mut() {
            Ok(mut action) => (*action)(),
            Err(_) => tracing::warn!("Header button {} clicked while its action is running", id),
        },
        None => tracing::debug!("Click for unknown header button {}", id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::MemoryChannel;
    use crate::error::PostwireError;
    use crate::protocol::ResponseEnvelope;

    fn setup() -> (Rc<MemoryChannel>, DashboardApi) {
        let channel = Rc::new(MemoryChannel::new());
        let api = DashboardApi::connect(channel.clone()).unwrap();
        (channel, api)
    }

    fn counter() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, move || c.set(c.get() + 1))
    }

    #[test]
    fn test_set_title_is_transient() {
        let (channel, api) = setup();
        let id = api.set_title(json!("Inbox")).unwrap();

        let call = channel.last_call().unwrap();
        assert_eq!(call.name, "dashboard.setTitle");
        assert_eq!(call.params, Some(json!("Inbox")));
        assert!(call.transient);
        assert!(!api.sender().transport().is_pending(id));
    }

    #[test]
    fn test_set_title_validates() {
        let (channel, api) = setup();
        assert!(api.set_title(json!(null)).is_err());
        assert!(api.set_title(json!(["x"])).is_err());
        assert!(channel.posted().is_empty());
    }

    #[test]
    fn test_show_notification_payload() {
        let (channel, api) = setup();
        api.show_notification(json!("Saved"), NotificationLevel::Success)
            .unwrap();
        assert_eq!(
            channel.last_call().unwrap().params,
            Some(json!({ "message": "Saved", "level": "success" }))
        );
    }

    #[test]
    fn test_navigate() {
        let (channel, api) = setup();
        api.navigate(json!("/reports")).unwrap();
        assert_eq!(channel.last_call().unwrap().name, "dashboard.navigate");
        assert!(api.navigate(json!(3)).is_err());
    }

    #[test]
    fn test_header_button_click_runs_action() {
        let (channel, api) = setup();
        let (clicks, action) = counter();

        let id = api
            .set_header_buttons(vec![HeaderButton::new(action).label("Refresh")])
            .unwrap();

        let call = channel.last_call().unwrap();
        assert_eq!(call.name, "dashboard.setHeaderButtons");
        assert!(call.persistent);
        assert_eq!(
            call.params,
            Some(json!([{ "id": "header-button-1", "label": "Refresh" }]))
        );

        for _ in 0..2 {
            channel
                .respond(&ResponseEnvelope::success(
                    id,
                    PREFIX,
                    json!({ "id": "header-button-1" }),
                ))
                .unwrap();
        }
        assert_eq!(clicks.get(), 2);
        assert!(api.sender().transport().is_pending(id));
    }

    #[test]
    fn test_unknown_button_id_ignored() {
        let (channel, api) = setup();
        let (clicks, action) = counter();
        let id = api.set_header_buttons(vec![HeaderButton::new(action)]).unwrap();

        for data in [json!({ "id": "header-button-9" }), json!({}), json!("header-button-1")] {
            channel
                .respond(&ResponseEnvelope::success(id, PREFIX, data))
                .unwrap();
        }
        assert_eq!(clicks.get(), 0);
    }

    #[test]
    fn test_replacing_buttons_drops_old_ids() {
        let (channel, api) = setup();
        let (old_clicks, old_action) = counter();
        let (new_clicks, new_action) = counter();

        let first = api.set_header_buttons(vec![HeaderButton::new(old_action)]).unwrap();
        let second = api
            .set_header_buttons(vec![HeaderButton::new(new_action).icon("star")])
            .unwrap();
        assert_eq!(api.header_button_ids(), vec!["header-button-2".to_string()]);

        channel
            .respond(&ResponseEnvelope::success(first, PREFIX, json!({ "id": "header-button-1" })))
            .unwrap();
        channel
            .respond(&ResponseEnvelope::success(second, PREFIX, json!({ "id": "header-button-2" })))
            .unwrap();

        assert_eq!(old_clicks.get(), 0);
        assert_eq!(new_clicks.get(), 1);
        assert!(!api.sender().transport().is_pending(first));
    }

    #[test]
    fn test_replaced_registration_cannot_reach_new_buttons() {
        let (channel, api) = setup();
        let first = api.set_header_buttons(vec![HeaderButton::new(|| {})]).unwrap();

        for _ in 0..11 {
            api.set_header_buttons(vec![HeaderButton::new(|| {})]).unwrap();
        }
        let (latest_clicks, action) = counter();
        let latest = api.set_header_buttons(vec![HeaderButton::new(action)]).unwrap();
        assert_eq!(api.sender().transport().pending_count(), 1);
        assert!(api.sender().transport().is_pending(latest));

        let newest = api.header_button_ids().remove(0);
        channel
            .respond(&ResponseEnvelope::success(first, PREFIX, json!({ "id": newest })))
            .unwrap();
        assert_eq!(latest_clicks.get(), 0);

        channel
            .respond(&ResponseEnvelope::success(latest, PREFIX, json!({ "id": newest })))
            .unwrap();
        assert_eq!(latest_clicks.get(), 1);
    }

    #[test]
    fn test_button_without_action_rejected_unless_novalidate() {
        let (channel, api) = setup();
        assert!(matches!(
            api.set_header_buttons(vec![HeaderButton::default().label("Noop")]),
            Err(PostwireError::Validation(_))
        ));
        assert!(channel.posted().is_empty());

        api.sender().set_novalidate(true);
        api.set_header_buttons(vec![HeaderButton::default().label("Noop")])
            .unwrap();
        assert_eq!(api.header_button_ids(), Vec::<String>::new());
    }
}
