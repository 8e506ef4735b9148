//! Handle for one running polling loop.

use std::fmt;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Identifies a polling session. Events carry it so late arrivals from a
/// stopped session can be told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub(crate) u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A running (or stopped) polling loop.
///
/// Created by [`ProgressSynchronizer::start`](super::ProgressSynchronizer::start).
/// Dropping the session cancels its loop.
#[derive(Debug)]
pub struct PollingSession {
    id: SessionId,
    active: bool,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollingSession {
    pub(crate) fn new(id: SessionId, cancel: CancellationToken, task: JoinHandle<()>) -> Self {
        Self {
            id,
            active: true,
            cancel,
            task,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Stop the loop. Returns `false` if it was already stopped.
    pub(crate) fn stop(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.cancel.cancel();
        true
    }

    /// Whether the spawned loop has exited. A cancelled loop exits at its
    /// next await point, so this can lag behind [`is_active`](Self::is_active).
    pub fn loop_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollingSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
