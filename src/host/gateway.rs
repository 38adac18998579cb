//! What the relay needs from the game server.

use serde::Serialize;
use serenity::async_trait;

use crate::common::error::HostResult;
use crate::common::types::Participant;

/// A Discord message on its way to every player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostBroadcast {
    pub author: String,
    pub message: String,
    /// `message` rendered with the configured Discord -> host format.
    pub formatted: String,
}

/// Host-side collaborator: live roster plus broadcast.
#[async_trait]
pub trait HostGateway: Send + Sync {
    /// Current roster, read at call time.
    ///
    /// Fails with [`crate::common::HostError::Unavailable`] while the host is
    /// not connected.
    fn roster(&self) -> HostResult<Vec<Participant>>;

    /// Show a message to all players.
    async fn broadcast(&self, broadcast: HostBroadcast) -> HostResult<()>;
}
