//! Game server side of the bridge.

pub mod codec;
pub mod gateway;
pub mod link;

pub use gateway::{HostBroadcast, HostGateway};
pub use link::HostLink;
