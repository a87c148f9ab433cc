//! Api module - namespace APIs of the host page.
//!
//! Each API holds a [`Sender`](crate::Sender) whose prefix is its namespace
//! and builds its methods from `validate` + `method`:
//! - [`AccountApi`] - `account.*`
//! - [`DashboardApi`] - `dashboard.*`, including header buttons
//! - [`SocialApi`] - `social.*`
//!
//! [`Bridge`] wires all three over one channel.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use postwire_client::api::Bridge;
//! use postwire_client::channel::MemoryChannel;
//! use postwire_client::protocol::Handlers;
//!
//! let channel = Rc::new(MemoryChannel::new());
//! let bridge = Bridge::builder().build(channel.clone()).unwrap();
//!
//! bridge.account().get_account(Handlers::new()).unwrap();
//! assert_eq!(channel.last_call().unwrap().name, "account.getAccount");
//! ```

pub mod account;
pub mod dashboard;
pub mod social;

mod bridge;

pub use account::AccountApi;
pub use bridge::{Bridge, BridgeBuilder};
pub use dashboard::{DashboardApi, HeaderButton, NotificationLevel};
pub use social::SocialApi;
