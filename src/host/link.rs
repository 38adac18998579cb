//! TCP link to the game server shim.
//!
//! The shim connects to us, streams [`HostFrame`]s and receives
//! [`HostReply`] broadcasts. The roster it reports is mirrored here so that
//! the relay can read it at any time without a round trip.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use futures::{SinkExt, StreamExt};
use serenity::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use crate::bridge::dispatch::{wait_for_shutdown, EventSender, Stream};
use crate::common::error::{HostError, HostResult};
use crate::common::messages::{ChatMessage, InboundEvent, LifecycleKind, PresenceKind};
use crate::common::types::Participant;
use crate::host::codec::{HostCodec, HostFrame, HostReply, LifecycleState};
use crate::host::gateway::{HostBroadcast, HostGateway};

/// Outbound queue of the active connection, tagged with its id.
type ActiveConnection = (u64, mpsc::UnboundedSender<HostReply>);

/// Mirror of the connected host.
pub struct HostLink {
    events: EventSender,
    /// `None` while no shim is connected.
    roster: watch::Sender<Option<Vec<Participant>>>,
    active: Mutex<Option<ActiveConnection>>,
    next_connection: AtomicU64,
}

impl HostLink {
    pub fn new(events: EventSender) -> Self {
        Self {
            events,
            roster: watch::Sender::new(None),
            active: Mutex::new(None),
            next_connection: AtomicU64::new(1),
        }
    }

    /// Whether a shim is currently connected.
    pub fn is_connected(&self) -> bool {
        self.roster.borrow().is_some()
    }

    /// Accept shim connections until shutdown.
    pub async fn serve(
        &self,
        listen: &str,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> HostResult<()> {
        let listener = (|| async move { TcpListener::bind(listen).await })
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_millis(500))
                    .with_max_delay(Duration::from_secs(10))
                    .with_max_times(10),
            )
            .notify(|e: &std::io::Error, delay: Duration| {
                warn!(
                    "Failed to listen on {}: {}. Retrying in {:.1}s...",
                    listen,
                    e,
                    delay.as_secs_f64()
                );
            })
            .await?;

        info!("Waiting for the host on {}", listen);

        // Connections run inside this future so that they end with it.
        let mut connections = futures::stream::FuturesUnordered::new();
        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        info!("Host connected from {}", peer);
                        if let Err(e) = stream.set_nodelay(true) {
                            debug!("Failed to set TCP_NODELAY: {}", e);
                        }
                        connections.push(self.handle_connection(stream, shutdown_rx.clone()));
                    }
                    Err(e) => warn!("Failed to accept host connection: {}", e),
                },
                Some(()) = connections.next(), if !connections.is_empty() => {}
                _ = wait_for_shutdown(&mut shutdown_rx) => break,
            }
        }

        // Let connections observe the shutdown signal and clean up.
        while connections.next().await.is_some() {}
        info!("Host listener stopped");
        Ok(())
    }

    /// Drive one shim connection. A newer connection replaces this one.
    pub async fn handle_connection<S>(&self, stream: S, mut shutdown_rx: watch::Receiver<bool>)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let id = self.next_connection.fetch_add(1, Ordering::Relaxed);
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.activate(id, tx);

        let mut framed = Framed::new(stream, HostCodec::new());
        loop {
            tokio::select! {
                frame = framed.next() => match frame {
                    Some(Ok(frame)) => self.handle_frame(frame),
                    Some(Err(e)) => {
                        warn!("Host connection error: {}", e);
                        break;
                    }
                    None => {
                        info!("Host disconnected");
                        break;
                    }
                },
                reply = rx.recv() => match reply {
                    Some(reply) => {
                        if let Err(e) = framed.send(reply).await {
                            warn!("Failed to write to host: {}", e);
                            break;
                        }
                    }
                    None => {
                        info!("Host connection replaced by a newer one");
                        break;
                    }
                },
                _ = wait_for_shutdown(&mut shutdown_rx) => break,
            }
        }

        self.deactivate(id);
    }

    fn activate(&self, id: u64, tx: mpsc::UnboundedSender<HostReply>) {
        if let Ok(mut active) = self.active.lock() {
            if active.replace((id, tx)).is_some() {
                info!("Replacing previous host connection");
            }
        }
        // Filled by the shim's first roster frame.
        self.roster.send_replace(Some(Vec::new()));
    }

    fn deactivate(&self, id: u64) {
        if let Ok(mut active) = self.active.lock() {
            if active.as_ref().map(|(current, _)| *current) == Some(id) {
                *active = None;
                self.roster.send_replace(None);
            }
        }
    }

    fn handle_frame(&self, frame: HostFrame) {
        let event = match frame {
            HostFrame::Lifecycle { state } => InboundEvent::Lifecycle(match state {
                LifecycleState::Started => LifecycleKind::Start,
                LifecycleState::Stopping => LifecycleKind::Stop,
            }),
            HostFrame::Chat {
                player,
                message,
                text,
            } => InboundEvent::ChatMessage(ChatMessage {
                author: player,
                text: text.unwrap_or_else(|| message.clone()),
                raw_text: message,
            }),
            HostFrame::Join { player } => {
                self.update_roster(|roster| {
                    roster.retain(|p| !p.is_same(&player));
                    roster.push(player.clone());
                });
                InboundEvent::Presence {
                    participant: player,
                    kind: PresenceKind::Joined,
                }
            }
            HostFrame::Leave { player } => {
                self.update_roster(|roster| roster.retain(|p| !p.is_same(&player)));
                InboundEvent::Presence {
                    participant: player,
                    kind: PresenceKind::Left,
                }
            }
            HostFrame::Roster { players } => {
                debug!("Host roster: {} players", players.len());
                self.update_roster(|roster| *roster = players);
                return;
            }
        };

        self.events.submit(Stream::Host, event);
    }

    fn update_roster(&self, update: impl FnOnce(&mut Vec<Participant>)) {
        self.roster.send_modify(|roster| {
            if let Some(roster) = roster.as_mut() {
                update(roster);
            }
        });
    }
}

#[async_trait]
impl HostGateway for HostLink {
    fn roster(&self) -> HostResult<Vec<Participant>> {
        self.roster.borrow().clone().ok_or(HostError::Unavailable)
    }

    async fn broadcast(&self, broadcast: HostBroadcast) -> HostResult<()> {
        let active = self.active.lock().map_err(|_| HostError::Unavailable)?;
        let (_, tx) = active.as_ref().ok_or(HostError::Unavailable)?;
        tx.send(HostReply::Broadcast(broadcast))
            .map_err(|_| HostError::Unavailable)
    }
}
