//! WebSocket interfaces
//!
//! - `notifications`: real-time tour request events for agent dashboards

pub mod notifications;

pub use notifications::{ws_notifications_handler, EventFilter, NotificationState};
