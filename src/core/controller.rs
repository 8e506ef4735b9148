//! Job submission and progress reconciliation.
//!
//! [`JobController`] owns the view, the current [`PollingSession`], and the
//! receiving end of the synchronizer's event channel. Everything that
//! changes view state goes through it, on the task that owns it.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::mpsc;

use super::models::{FileRecord, JobRequest, JobStatus};
use super::reconcile::{ProgressDisplay, reconcile};
use super::results::render_results;
use super::session::{PollingSession, SessionId};
use super::synchronizer::{PollOptions, ProgressSynchronizer, SyncEvent, SyncEventKind};
use super::view::JobView;
use crate::api::{ClientError, JobApi};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("a job is already being tracked")]
    SessionActive,
    #[error("{0}")]
    Rejected(String),
}

/// How a tracked job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed { files: Vec<FileRecord> },
    Failed { message: String },
    /// A configured polling bound ran out first.
    GaveUp { ticks: u64, elapsed: Duration },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Completed { .. })
    }
}

pub struct JobController<V> {
    api: Arc<dyn JobApi>,
    synchronizer: ProgressSynchronizer,
    events: mpsc::Receiver<SyncEvent>,
    session: Option<PollingSession>,
    /// A `POST /start` is in flight.
    starting: bool,
    last_display: ProgressDisplay,
    view: V,
}

/// The in-flight `POST /start` returned by [`JobController::begin_submit`].
#[must_use = "pass the result to `JobController::finish_submit`"]
pub struct PendingStart {
    future: BoxFuture<'static, Result<(), ClientError>>,
}

impl Future for PendingStart {
    type Output = Result<(), ClientError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.future.as_mut().poll(cx)
    }
}

impl<V: JobView> JobController<V> {
    pub fn new(api: Arc<dyn JobApi>, options: PollOptions, view: V) -> Self {
        let (synchronizer, events) = ProgressSynchronizer::new(Arc::clone(&api), options);
        Self {
            api,
            synchronizer,
            events,
            session: None,
            starting: false,
            last_display: ProgressDisplay::pending(),
            view,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Stop tracking and hand back the view.
    pub fn into_view(mut self) -> V {
        self.stop_polling();
        self.view
    }

    /// Whether a polling session is currently running.
    pub fn is_polling(&self) -> bool {
        self.session.as_ref().is_some_and(PollingSession::is_active)
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(PollingSession::id)
    }

    /// Submit a job and start tracking it.
    ///
    /// A rejection has already been shown to the user through
    /// [`JobView::notify_error`] when this returns `Err(Rejected)`.
    pub async fn submit(&mut self, request: JobRequest) -> Result<SessionId, SubmitError> {
        let pending = self.begin_submit(request)?;
        let result = pending.await;
        self.finish_submit(result)
    }

    /// First half of [`submit`](Self::submit): put the view into its busy
    /// state and return the in-flight `POST /start`.
    ///
    /// The returned future owns everything it needs, so a front end can
    /// keep drawing and reading input while it is pending. Its result must
    /// be passed to [`finish_submit`](Self::finish_submit). Dropping it
    /// abandons the request and leaves the view busy until the next
    /// [`stop_polling`](Self::stop_polling).
    pub fn begin_submit(&mut self, request: JobRequest) -> Result<PendingStart, SubmitError> {
        if self.is_polling() || self.starting {
            return Err(SubmitError::SessionActive);
        }
        self.session = None;
        self.starting = true;

        self.view.set_busy(true);
        self.view.clear_results();
        self.last_display = ProgressDisplay::pending();
        self.view.show_progress(&self.last_display);

        tracing::info!(sender = %request.sender_filter, "Submitting job");
        let api = Arc::clone(&self.api);
        Ok(PendingStart {
            future: async move { api.start_job(&request).await }.boxed(),
        })
    }

    /// Second half of [`submit`](Self::submit): start polling on success,
    /// or notify and return to idle on rejection.
    pub fn finish_submit(&mut self, result: Result<(), ClientError>) -> Result<SessionId, SubmitError> {
        self.starting = false;

        if let Err(e) = result {
            let message = e.to_string();
            tracing::warn!(error = %message, "Job submission rejected");
            self.view.notify_error(&message);
            self.view.set_busy(false);
            return Err(SubmitError::Rejected(message));
        }

        let session = self.synchronizer.start();
        let id = session.id();
        self.session = Some(session);
        tracing::info!(session = %id, "Job submitted");
        Ok(id)
    }

    /// Whether a `POST /start` from [`begin_submit`](Self::begin_submit)
    /// has not been finished yet.
    pub fn is_starting(&self) -> bool {
        self.starting
    }

    /// Wait for the next event from the polling loop.
    ///
    /// Pending forever while nothing is being polled, which makes it safe
    /// to use as a `tokio::select!` branch.
    pub async fn next_event(&mut self) -> Option<SyncEvent> {
        self.events.recv().await
    }

    /// Apply one event. Returns the outcome when it ends the session.
    pub fn handle(&mut self, event: SyncEvent) -> Option<JobOutcome> {
        let current = self.session.as_ref().filter(|s| s.is_active()).map(PollingSession::id);
        if current != Some(event.session) {
            tracing::debug!(session = %event.session, "Discarding event from stale session");
            return None;
        }

        match event.kind {
            SyncEventKind::Snapshot(snapshot) => {
                self.last_display = reconcile(&snapshot);
                self.view.show_progress(&self.last_display);

                if !snapshot.status.is_terminal() {
                    return None;
                }

                self.stop_polling();

                if snapshot.status == JobStatus::Error {
                    tracing::warn!(message = %snapshot.message, "Job failed on the server");
                    return Some(JobOutcome::Failed {
                        message: snapshot.message,
                    });
                }

                tracing::info!(files = snapshot.files.len(), "Job completed");
                if !snapshot.files.is_empty() {
                    self.view.render_results(&render_results(&snapshot.files));
                }
                Some(JobOutcome::Completed {
                    files: snapshot.files,
                })
            }
            SyncEventKind::LimitReached { ticks, elapsed } => {
                self.stop_polling();
                self.last_display.message = format!(
                    "Stopped waiting after {} polls ({}s) without a final status",
                    ticks,
                    elapsed.as_secs()
                );
                self.view.show_progress(&self.last_display);
                Some(JobOutcome::GaveUp { ticks, elapsed })
            }
        }
    }

    /// Drain events until the current session ends.
    ///
    /// Returns `None` when nothing is being polled.
    pub async fn wait_for_outcome(&mut self) -> Option<JobOutcome> {
        while self.is_polling() {
            let event = self.next_event().await?;
            if let Some(outcome) = self.handle(event) {
                return Some(outcome);
            }
        }
        None
    }

    /// Stop the current session, if any, and return the view to idle.
    /// Safe to call repeatedly.
    pub fn stop_polling(&mut self) {
        self.starting = false;
        if let Some(session) = self.session.as_mut() {
            self.synchronizer.stop(session);
        }
        self.view.set_busy(false);
    }
}
