//! Error types for the application.

use thiserror::Error;

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Discord error: {0}")]
    Discord(#[from] DiscordError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {message}")]
    IoError { path: String, message: String },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Discord-related errors.
#[derive(Debug, Error)]
pub enum DiscordError {
    #[error("Failed to login to Discord with the provided token")]
    Authentication,

    #[error("Timed out waiting for the Discord gateway to become ready")]
    StartupTimeout,

    #[error("Discord connection closed before becoming ready")]
    ConnectionClosed,

    #[error("Webhook is not available")]
    WebhookUnavailable,

    #[error("Target {0} is not a Discord channel")]
    UnsupportedTarget(String),

    #[error("Serenity error: {0}")]
    Serenity(#[from] serenity::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl DiscordError {
    /// Classify a serenity error raised while connecting.
    ///
    /// Invalid tokens surface either as a gateway close code or as a 401 from
    /// the gateway bot endpoint; both map to [`DiscordError::Authentication`].
    pub fn from_startup(error: serenity::Error) -> Self {
        use serenity::gateway::GatewayError;

        match &error {
            serenity::Error::Gateway(GatewayError::InvalidAuthentication) => Self::Authentication,
            serenity::Error::Http(http)
                if http.status_code().map(|status| status.as_u16()) == Some(401) =>
            {
                Self::Authentication
            }
            _ => Self::Serenity(error),
        }
    }
}

/// Errors raised by the host link.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Host is not connected")]
    Unavailable,

    #[error("Malformed host frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),

    #[error("Host frame exceeds {max} bytes")]
    FrameTooLong { max: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Discord operations.
pub type DiscordResult<T> = std::result::Result<T, DiscordError>;

/// Result type alias for host operations.
pub type HostResult<T> = std::result::Result<T, HostError>;
