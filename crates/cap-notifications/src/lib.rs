//! Notification sink for Capstone RS
//!
//! Delivery itself is an external concern; the core only hands
//! `{recipient, kind, message}` records to a sink. Deliveries are
//! fire-and-forget: failures are logged and never block an operation.

pub mod notification;
pub mod sink;

pub use notification::{Notification, NotificationKind};
pub use sink::{deliver_best_effort, MemorySink, NotificationSink, SinkError, TracingSink};
