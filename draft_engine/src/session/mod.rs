//! Session lifecycle: storage, serialized mutation and notification.
//!
//! This module provides:
//! - A per-session store with bounded exclusive access and lock-free reads
//! - Post-commit broadcast of draft actions to subscribers
//! - The draft manager tying sessions to analysis and suggestions

pub mod broadcast;
pub mod config;
pub mod manager;
pub mod store;

pub use broadcast::{DraftBroadcaster, DraftEvent, SubscriberHub};
pub use config::StoreConfig;
pub use manager::{DraftManager, ManagerConfig};
pub use store::{Committed, SessionStore};
