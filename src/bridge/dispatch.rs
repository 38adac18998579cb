//! Ordered, non-blocking hand-off from callbacks to the relay.
//!
//! Each event stream gets its own queue and worker, so events from one side
//! are relayed in the order they were submitted while the two sides proceed
//! independently.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::bridge::relay::Relay;
use crate::common::messages::{InboundEvent, RelayOutcome};

/// How long in-flight relay work may run after shutdown is signalled.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Where an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Host,
    Remote,
}

/// Cloneable submission handle.
#[derive(Debug, Clone)]
pub struct EventSender {
    host_tx: mpsc::UnboundedSender<InboundEvent>,
    remote_tx: mpsc::UnboundedSender<InboundEvent>,
}

impl EventSender {
    /// Queue an event. Never blocks; returns `false` once the dispatcher is gone.
    pub fn submit(&self, stream: Stream, event: InboundEvent) -> bool {
        let tx = match stream {
            Stream::Host => &self.host_tx,
            Stream::Remote => &self.remote_tx,
        };
        let kind = event.kind_name();
        if tx.send(event).is_err() {
            warn!("Dispatcher is shut down - dropping {} event", kind);
            return false;
        }
        true
    }

    /// A sender whose queues are handed straight to the caller.
    #[cfg(test)]
    pub(crate) fn detached() -> (
        Self,
        mpsc::UnboundedReceiver<InboundEvent>,
        mpsc::UnboundedReceiver<InboundEvent>,
    ) {
        let (host_tx, host_rx) = mpsc::unbounded_channel();
        let (remote_tx, remote_rx) = mpsc::unbounded_channel();
        (Self { host_tx, remote_tx }, host_rx, remote_rx)
    }
}

/// Owns the queues until [`Dispatcher::run`] hands them to the workers.
pub struct Dispatcher {
    host_rx: mpsc::UnboundedReceiver<InboundEvent>,
    remote_rx: mpsc::UnboundedReceiver<InboundEvent>,
}

impl Dispatcher {
    pub fn new() -> (Self, EventSender) {
        let (host_tx, host_rx) = mpsc::unbounded_channel();
        let (remote_tx, remote_rx) = mpsc::unbounded_channel();
        (
            Self { host_rx, remote_rx },
            EventSender { host_tx, remote_tx },
        )
    }

    /// Run both workers until every sender is dropped or shutdown is signalled.
    pub async fn run(self, relay: Arc<Relay>, shutdown_rx: watch::Receiver<bool>) {
        let mut workers = JoinSet::new();
        workers.spawn(worker(
            Stream::Host,
            relay.clone(),
            self.host_rx,
            shutdown_rx.clone(),
        ));
        workers.spawn(worker(
            Stream::Remote,
            relay,
            self.remote_rx,
            shutdown_rx.clone(),
        ));

        let mut shutdown = shutdown_rx;
        tokio::select! {
            _ = drain(&mut workers) => {
                debug!("All event streams closed");
                return;
            }
            _ = wait_for_shutdown(&mut shutdown) => {}
        }

        info!("Stopping dispatcher...");
        if tokio::time::timeout(SHUTDOWN_GRACE, drain(&mut workers))
            .await
            .is_err()
        {
            warn!(
                "Relay work still running after {:?} - aborting",
                SHUTDOWN_GRACE
            );
            workers.abort_all();
        }
    }
}

async fn drain(workers: &mut JoinSet<()>) {
    while let Some(result) = workers.join_next().await {
        if let Err(e) = result {
            if e.is_panic() {
                error!("Event worker panicked: {}", e);
            }
        }
    }
}

/// Resolves once the shutdown flag is set.
pub(crate) async fn wait_for_shutdown(shutdown_rx: &mut watch::Receiver<bool>) {
    while !*shutdown_rx.borrow_and_update() {
        if shutdown_rx.changed().await.is_err() {
            // Sender gone without a signal: nothing will ever stop us.
            std::future::pending::<()>().await;
        }
    }
}

async fn worker(
    stream: Stream,
    relay: Arc<Relay>,
    mut rx: mpsc::UnboundedReceiver<InboundEvent>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        let event = tokio::select! {
            biased;
            _ = wait_for_shutdown(&mut shutdown_rx) => break,
            event = rx.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        let kind = event.kind_name();
        match relay.relay_inbound(event).await {
            RelayOutcome::Dispatched(dispatch, target) => {
                debug!("{:?} {} event -> {:?} to {}", stream, kind, dispatch, target);
            }
            RelayOutcome::Skipped(reason) => {
                debug!("{:?} {} event skipped: {:?}", stream, kind, reason);
            }
            RelayOutcome::Failed(error) => {
                debug!("{:?} {} event failed: {}", stream, kind, error);
            }
        }
    }
    debug!("{:?} event worker stopped", stream);
}
