//! Message flow between the host and Discord.
//!
//! - `relay`: decides what each inbound event turns into
//! - `dispatch`: ordered per-stream queues feeding the relay
//! - `orchestrator`: owns and runs every long-lived piece (`Bridge`)
//! - `mention`, `filter`, `formatter`: text helpers used by the relay

pub mod dispatch;
pub mod filter;
pub mod formatter;
pub mod mention;
pub mod orchestrator;
pub mod relay;

pub use dispatch::{Dispatcher, EventSender, Stream};
pub use orchestrator::Bridge;
pub use relay::{Relay, RelaySettings};
