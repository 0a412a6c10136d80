//! Campaign persistence and simulated dispatch.
//!
//! A submitted campaign becomes an immutable record; "sending" is a timer
//! simulation over the in-memory store, never real delivery.

pub mod dispatch;
pub mod store;
pub mod types;

pub use dispatch::{CampaignDispatcher, DispatchStats};
pub use store::CampaignStore;
pub use types::{Campaign, CampaignStatus, DispatchProgress};
