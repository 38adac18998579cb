//! Common utilities and types shared across the application.

pub mod error;
pub mod messages;
pub mod types;

pub use error::{AppError, ConfigError, DiscordError, HostError};
pub use messages::{
    ChatMessage, CommandOrigin, DispatchKind, InboundEvent, LifecycleKind, PresenceKind,
    RelayOutcome, RemoteMessage, SkipReason, SlashCommand,
};
pub use types::{MessageStyle, Participant, RelayTarget};
