//! Dashboard telemetry boundary
//!
//! The socket transport itself is external. This module fixes the message
//! shapes, the channel interface a transport must provide, and the consumer
//! that keeps the latest CPU and system-log snapshots.

mod channel;
mod feed;
pub mod messages;

pub use channel::{EventChannel, Handler, LocalChannel, Responder, SubscriptionToken, TelemetryError};
pub use feed::{TelemetryFeed, DEFAULT_CHECK_INTERVAL};
pub use messages::{CpuInfo, SystemLog};
