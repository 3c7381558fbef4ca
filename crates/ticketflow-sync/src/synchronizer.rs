// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The client synchronizer: one task that owns the connection lifecycle.
//!
//! While connected it ingests server events into the mirror and sends
//! heartbeats. On disconnect it schedules reconnection with exponential
//! backoff, bounded by an attempt budget; once the budget is exhausted it
//! drops into explicit offline mode and waits for a manual retry. Exactly
//! one reconnection attempt is in flight at a time, and a pending backoff
//! timer is always cancelled before a manual retry connects.
//!
//! User intent survives disconnection: ticket creation while not connected
//! is captured in the offline queue and materialized as a local-only mirror
//! ticket, then replayed in capture order after reconnection.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use ticketflow_core::{ClientEvent, ServerEvent, TicketflowError};

use crate::backoff::{ReconnectPolicy, ReconnectState};
use crate::mirror::TicketMirror;
use crate::queue::OfflineQueue;
use crate::transport::{SyncConnection, SyncTransport};

/// Synchronizer tuning knobs.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub backoff: ReconnectPolicy,
    pub heartbeat_interval: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            backoff: ReconnectPolicy {
                base: Duration::from_millis(1000),
                cap: Duration::from_millis(30_000),
                max_attempts: 10,
            },
            heartbeat_interval: Duration::from_secs(20),
        }
    }
}

/// Connection lifecycle as observed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    /// Waiting out the backoff delay before the given attempt.
    Reconnecting { attempt: u32 },
    /// Attempt budget exhausted; only a manual retry resumes.
    Offline,
    Stopped,
}

/// Heartbeat diagnostics. Never used to force a disconnect; only
/// transport-level disconnect events do that.
#[derive(Debug, Default, Clone)]
pub struct HeartbeatStats {
    pub pings_sent: u64,
    pub pongs_received: u64,
}

enum Command {
    CreateTicket { subject: String },
    Reconnect,
}

enum DriveEnd {
    Disconnected,
    Cancelled,
}

struct Shared {
    mirror: Mutex<TicketMirror>,
    queue: Mutex<OfflineQueue>,
    heartbeat: Mutex<HeartbeatStats>,
}

/// Handle to a running synchronizer task.
pub struct Synchronizer {
    shared: Arc<Shared>,
    cmd_tx: mpsc::UnboundedSender<Command>,
    state_rx: watch::Receiver<ConnectionState>,
}

impl Synchronizer {
    /// Spawns the synchronizer task. The task runs until `cancel` fires.
    pub fn spawn(
        transport: Arc<dyn SyncTransport>,
        options: SyncOptions,
        cancel: CancellationToken,
    ) -> Self {
        let shared = Arc::new(Shared {
            mirror: Mutex::new(TicketMirror::new()),
            queue: Mutex::new(OfflineQueue::new()),
            heartbeat: Mutex::new(HeartbeatStats::default()),
        });
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);

        let worker = Worker {
            shared: Arc::clone(&shared),
            transport,
            options,
            state_tx,
            cancel,
        };
        tokio::spawn(worker.run(cmd_rx));

        Self {
            shared,
            cmd_tx,
            state_rx,
        }
    }

    /// Requests ticket creation. Sent immediately when connected, queued
    /// (and mirrored locally) otherwise.
    pub fn create_ticket(&self, subject: &str) {
        let _ = self.cmd_tx.send(Command::CreateTicket {
            subject: subject.to_string(),
        });
    }

    /// Manual retry: cancels any pending backoff timer, resets the attempt
    /// counter, and connects immediately. Also leaves offline mode.
    pub fn reconnect_now(&self) {
        let _ = self.cmd_tx.send(Command::Reconnect);
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state_rx.borrow().clone()
    }

    /// Watch receiver for state transitions.
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Locks the local ticket mirror for inspection.
    pub fn mirror(&self) -> MutexGuard<'_, TicketMirror> {
        self.shared.mirror.lock().expect("mirror mutex poisoned")
    }

    /// Number of actions waiting for replay.
    pub fn queued_actions(&self) -> usize {
        self.shared.queue.lock().expect("queue mutex poisoned").len()
    }

    /// Heartbeat counters.
    pub fn heartbeat_stats(&self) -> HeartbeatStats {
        self.shared
            .heartbeat
            .lock()
            .expect("heartbeat mutex poisoned")
            .clone()
    }
}

struct Worker {
    shared: Arc<Shared>,
    transport: Arc<dyn SyncTransport>,
    options: SyncOptions,
    state_tx: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
}

impl Worker {
    async fn run(self, mut cmd_rx: mpsc::UnboundedReceiver<Command>) {
        let mut reconnect = ReconnectState::new(self.options.backoff.clone());

        loop {
            self.state_tx.send_replace(ConnectionState::Connecting);
            let connected = tokio::select! {
                _ = self.cancel.cancelled() => break,
                result = self.transport.connect() => result,
            };

            match connected {
                Ok(mut conn) => {
                    reconnect.reset();
                    info!("connected to event stream");
                    self.state_tx.send_replace(ConnectionState::Connected);

                    if self.replay_queue(conn.as_mut()).await.is_ok() {
                        match self.drive(conn, &mut cmd_rx).await {
                            DriveEnd::Cancelled => break,
                            DriveEnd::Disconnected => {}
                        }
                    }
                }
                Err(err) => {
                    warn!(error = %err, "connection attempt failed");
                    self.record_transport_error(&err);
                }
            }

            // Disconnected: schedule the next attempt, or go offline.
            match reconnect.next_delay() {
                Some(delay) => {
                    let attempt = reconnect.attempts();
                    debug!(attempt, ?delay, "reconnection scheduled");
                    self.state_tx
                        .send_replace(ConnectionState::Reconnecting { attempt });
                    if !self.wait_backoff(delay, &mut cmd_rx, &mut reconnect).await {
                        break;
                    }
                }
                None => {
                    warn!("reconnection budget exhausted, entering offline mode");
                    self.state_tx.send_replace(ConnectionState::Offline);
                    if !self.wait_offline(&mut cmd_rx, &mut reconnect).await {
                        break;
                    }
                }
            }
        }

        self.state_tx.send_replace(ConnectionState::Stopped);
    }

    /// Replays queued actions in capture order. An error mid-replay pushes
    /// the remaining actions back for the next connection.
    async fn replay_queue(&self, conn: &mut dyn SyncConnection) -> Result<(), TicketflowError> {
        let queued = self
            .shared
            .queue
            .lock()
            .expect("queue mutex poisoned")
            .drain();
        if queued.is_empty() {
            return Ok(());
        }
        info!(count = queued.len(), "replaying offline queue");
        let mut pending = queued.into_iter();
        while let Some(action) = pending.next() {
            if let Err(err) = conn.send(&action).await {
                warn!(error = %err, "replay interrupted, requeueing remaining actions");
                let mut queue = self.shared.queue.lock().expect("queue mutex poisoned");
                queue.push(action);
                for rest in pending {
                    queue.push(rest);
                }
                self.record_transport_error(&err);
                return Err(err);
            }
        }
        Ok(())
    }

    /// Runs one live connection until disconnect or cancellation.
    async fn drive(
        &self,
        mut conn: Box<dyn SyncConnection>,
        cmd_rx: &mut mpsc::UnboundedReceiver<Command>,
    ) -> DriveEnd {
        let mut heartbeat = tokio::time::interval(self.options.heartbeat_interval);
        heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick fires immediately; the connection is fresh, so
        // skip it.
        heartbeat.tick().await;

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return DriveEnd::Cancelled,

                _ = heartbeat.tick() => {
                    let ping = ClientEvent::Ping {
                        timestamp: chrono::Utc::now().to_rfc3339(),
                    };
                    if let Err(err) = conn.send(&ping).await {
                        warn!(error = %err, "heartbeat send failed");
                        self.record_transport_error(&err);
                        return DriveEnd::Disconnected;
                    }
                    self.shared
                        .heartbeat
                        .lock()
                        .expect("heartbeat mutex poisoned")
                        .pings_sent += 1;
                }

                cmd = cmd_rx.recv() => match cmd {
                    Some(Command::CreateTicket { subject }) => {
                        let action = ClientEvent::CreateTicket {
                            subject: subject.clone(),
                            timestamp: chrono::Utc::now().to_rfc3339(),
                        };
                        if let Err(err) = conn.send(&action).await {
                            // Do not lose the intent: capture for replay.
                            warn!(error = %err, "send failed, queueing action");
                            self.queue_locally(&subject);
                            self.record_transport_error(&err);
                            return DriveEnd::Disconnected;
                        }
                    }
                    // Already connected; nothing to retry.
                    Some(Command::Reconnect) => {}
                    None => return DriveEnd::Cancelled,
                },

                received = conn.recv() => match received {
                    Ok(Some(ServerEvent::Pong { .. })) => {
                        self.shared
                            .heartbeat
                            .lock()
                            .expect("heartbeat mutex poisoned")
                            .pongs_received += 1;
                    }
                    Ok(Some(event)) => {
                        self.shared
                            .mirror
                            .lock()
                            .expect("mirror mutex poisoned")
                            .apply(&event);
                    }
                    Ok(None) => {
                        info!("server closed the connection");
                        return DriveEnd::Disconnected;
                    }
                    Err(err) => {
                        warn!(error = %err, "event stream failed");
                        self.record_transport_error(&err);
                        return DriveEnd::Disconnected;
                    }
                },
            }
        }
    }

    /// Waits out the backoff delay. A manual retry cancels the pending
    /// timer and connects immediately with a fresh attempt budget.
    /// Returns `false` on cancellation.
    async fn wait_backoff(
        &self,
        delay: Duration,
        cmd_rx: &mut mpsc::UnboundedReceiver<Command>,
        reconnect: &mut ReconnectState,
    ) -> bool {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return false,
                _ = &mut sleep => return true,
                cmd = cmd_rx.recv() => match cmd {
                    Some(Command::CreateTicket { subject }) => self.queue_locally(&subject),
                    Some(Command::Reconnect) => {
                        debug!("manual retry cancelled the pending backoff timer");
                        reconnect.reset();
                        return true;
                    }
                    None => return false,
                },
            }
        }
    }

    /// Offline mode: no timers, only a manual retry resumes. Returns
    /// `false` on cancellation.
    async fn wait_offline(
        &self,
        cmd_rx: &mut mpsc::UnboundedReceiver<Command>,
        reconnect: &mut ReconnectState,
    ) -> bool {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return false,
                cmd = cmd_rx.recv() => match cmd {
                    Some(Command::CreateTicket { subject }) => self.queue_locally(&subject),
                    Some(Command::Reconnect) => {
                        info!("manual retry, leaving offline mode");
                        reconnect.reset();
                        return true;
                    }
                    None => return false,
                },
            }
        }
    }

    /// Captures a creation request issued while not connected: queued for
    /// replay and materialized as a local-only ticket for immediate
    /// feedback.
    fn queue_locally(&self, subject: &str) {
        self.shared
            .queue
            .lock()
            .expect("queue mutex poisoned")
            .push(ClientEvent::CreateTicket {
                subject: subject.to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
            });
        self.shared
            .mirror
            .lock()
            .expect("mirror mutex poisoned")
            .materialize_local(subject);
        debug!(subject, "action queued while disconnected");
    }

    /// Reason-classified connection error, surfaced as a notification.
    fn record_transport_error(&self, err: &TicketflowError) {
        self.shared
            .mirror
            .lock()
            .expect("mirror mutex poisoned")
            .apply(&ServerEvent::SystemError {
                error: err.code().to_string(),
                message: err.to_string(),
                component: "transport".to_string(),
            });
    }
}
