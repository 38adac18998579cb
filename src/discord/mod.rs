//! Discord bot integration.
//!
//! The relay only sees [`platform::RemotePlatform`] and [`session::Session`];
//! everything serenity-specific stays in this module.

pub mod client;
pub mod commands;
pub mod embed;
pub mod handler;
pub mod platform;
pub mod resolver;
pub mod session;

pub use client::DiscordConnector;
pub use platform::{DiscordPlatform, Persona, RemotePlatform};
pub use session::{Connector, Session};
