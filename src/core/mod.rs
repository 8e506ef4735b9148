pub mod controller;
pub mod dates;
pub mod models;
pub mod reconcile;
pub mod results;
pub mod session;
pub mod synchronizer;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{JobController, JobOutcome, PendingStart, SubmitError};
pub use models::{FileRecord, JobRequest, JobStatus, ProgressSnapshot, StoredFile};
pub use reconcile::{ProgressDisplay, StatusStyle, reconcile};
pub use results::{ResultItem, ResultsView, download_path, render_results};
pub use session::{PollingSession, SessionId};
pub use synchronizer::{PollOptions, ProgressSynchronizer, SyncEvent, SyncEventKind};
pub use view::JobView;
