//! Wiring of all namespace APIs over one host channel.

use std::rc::Rc;

use super::{account, dashboard, social, AccountApi, DashboardApi, SocialApi};
use crate::channel::{HostChannel, ANY_ORIGIN};
use crate::error::Result;
use crate::sender::Sender;
use crate::transport::Transport;

/// Builder for a [`Bridge`].
#[derive(Debug, Clone)]
pub struct BridgeBuilder {
    target_origin: String,
    novalidate: bool,
}

impl BridgeBuilder {
    pub fn new() -> Self {
        Self {
            target_origin: ANY_ORIGIN.to_string(),
            novalidate: false,
        }
    }

    /// Origin of the host page.
    ///
    /// Default: `"*"`
    pub fn target_origin(mut self, origin: impl Into<String>) -> Self {
        self.target_origin = origin.into();
        self
    }

    /// Skip argument validation in every API.
    ///
    /// Default: false
    pub fn novalidate(mut self, novalidate: bool) -> Self {
        self.novalidate = novalidate;
        self
    }

    /// Create one transport per namespace on `channel`.
    pub fn build(self, channel: Rc<dyn HostChannel>) -> Result<Bridge> {
        Ok(Bridge {
            account: AccountApi::new(self.sender(account::PREFIX, &channel)?),
            dashboard: DashboardApi::new(self.sender(dashboard::PREFIX, &channel)?),
            social: SocialApi::new(self.sender(social::PREFIX, &channel)?),
        })
    }

    fn sender(&self, prefix: &str, channel: &Rc<dyn HostChannel>) -> Result<Sender> {
        let transport = Transport::builder(prefix)
            .target_origin(self.target_origin.clone())
            .build(channel.clone())?;
        let sender = Sender::new(prefix, transport)?;
        sender.set_novalidate(self.novalidate);
        Ok(sender)
    }
}

impl Default for BridgeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The widget's view of its host page.
pub struct Bridge {
    account: AccountApi,
    dashboard: DashboardApi,
    social: SocialApi,
}

impl Bridge {
    pub fn builder() -> BridgeBuilder {
        BridgeBuilder::new()
    }

    pub fn account(&self) -> &AccountApi {
        &self.account
    }

    pub fn dashboard(&self) -> &DashboardApi {
        &self.dashboard
    }

    pub fn social(&self) -> &SocialApi {
        &self.social
    }

    /// Stop listening in every namespace.
    pub fn cleanup(&self) {
        self.account.cleanup();
        self.dashboard.cleanup();
        self.social.cleanup();
    }
}
