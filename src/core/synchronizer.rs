//! Fixed-interval progress polling.
//!
//! Each session is a spawned task that fetches `GET /progress` once per
//! interval and forwards snapshots over a channel. The task never touches
//! UI state; the [`JobController`](super::JobController) drains the channel
//! and applies events on its own task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::models::ProgressSnapshot;
use super::session::{PollingSession, SessionId};
use crate::api::JobApi;
use crate::logging::LogThrottle;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
/// Shortest period the loop will tick at; tokio rejects a zero period.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

const EVENT_BUFFER: usize = 32;
const SNAPSHOT_LOG_INTERVAL: Duration = Duration::from_secs(5);

/// Polling cadence and optional safety bounds.
///
/// Both bounds default to `None`: a session runs until the server reports a
/// terminal status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub max_ticks: Option<u64>,
    pub max_duration: Option<Duration>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_ticks: None,
            max_duration: None,
        }
    }
}

impl PollOptions {
    /// The interval actually used by the loop.
    pub fn effective_interval(&self) -> Duration {
        self.interval.max(MIN_POLL_INTERVAL)
    }

    fn limit_reached(&self, ticks: u64, elapsed: Duration) -> bool {
        self.max_ticks.is_some_and(|max| ticks >= max)
            || self.max_duration.is_some_and(|max| elapsed >= max)
    }
}

/// Message from a polling loop to the controller.
#[derive(Debug, Clone)]
pub struct SyncEvent {
    pub session: SessionId,
    pub kind: SyncEventKind,
}

#[derive(Debug, Clone)]
pub enum SyncEventKind {
    Snapshot(ProgressSnapshot),
    /// A configured safety bound was hit before a terminal status.
    LimitReached { ticks: u64, elapsed: Duration },
}

/// Starts and stops polling sessions.
pub struct ProgressSynchronizer {
    api: Arc<dyn JobApi>,
    options: PollOptions,
    events: mpsc::Sender<SyncEvent>,
    next_id: u64,
}

impl ProgressSynchronizer {
    /// Create a synchronizer and the receiving end of its event channel.
    pub fn new(api: Arc<dyn JobApi>, options: PollOptions) -> (Self, mpsc::Receiver<SyncEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let synchronizer = Self {
            api,
            options,
            events: tx,
            next_id: 0,
        };
        (synchronizer, rx)
    }

    pub fn options(&self) -> &PollOptions {
        &self.options
    }

    /// Spawn a new polling loop. The first poll happens one interval from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> PollingSession {
        self.next_id += 1;
        let id = SessionId(self.next_id);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(poll_loop(
            Arc::clone(&self.api),
            self.options.clone(),
            id,
            cancel.clone(),
            self.events.clone(),
        ));

        tracing::info!(
            session = %id,
            interval_ms = self.options.effective_interval().as_millis() as u64,
            "Polling started"
        );
        PollingSession::new(id, cancel, task)
    }

    /// Stop a session. Stopping an already stopped session is a no-op.
    pub fn stop(&self, session: &mut PollingSession) {
        if session.stop() {
            tracing::info!(session = %session.id(), "Polling stopped");
        }
    }
}

async fn poll_loop(
    api: Arc<dyn JobApi>,
    options: PollOptions,
    id: SessionId,
    cancel: CancellationToken,
    events: mpsc::Sender<SyncEvent>,
) {
    let started = Instant::now();
    let period = options.effective_interval();
    let mut ticker = time::interval_at(started + period, period);
    // A slow poll pushes the next tick back instead of triggering a burst.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let throttle = LogThrottle::new(SNAPSHOT_LOG_INTERVAL);
    let mut ticks: u64 = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        if options.limit_reached(ticks, started.elapsed()) {
            tracing::warn!(session = %id, ticks, "Polling limit reached without a terminal status");
            let kind = SyncEventKind::LimitReached {
                ticks,
                elapsed: started.elapsed(),
            };
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {}
                _ = events.send(SyncEvent { session: id, kind }) => {}
            }
            break;
        }

        ticks += 1;

        // The request is awaited before the next tick is considered, so
        // polls of one session never overlap.
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = api.fetch_progress() => result,
        };

        match result {
            Ok(snapshot) => {
                let terminal = snapshot.status.is_terminal();
                if throttle.should_log() || terminal {
                    tracing::debug!(
                        session = %id,
                        tick = ticks,
                        status = %snapshot.status,
                        progress = snapshot.progress,
                        total = snapshot.total,
                        "Progress snapshot"
                    );
                }

                let event = SyncEvent {
                    session: id,
                    kind: SyncEventKind::Snapshot(snapshot),
                };
                let delivered = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    sent = events.send(event) => sent.is_ok(),
                };
                if !delivered || terminal {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(session = %id, tick = ticks, error = %e, "Progress poll failed");
            }
        }
    }

    tracing::debug!(session = %id, ticks, "Polling loop exited");
}
