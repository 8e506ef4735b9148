use super::reconcile::ProgressDisplay;
use super::results::ResultsView;

/// The surface a [`JobController`](super::JobController) drives.
///
/// Implemented by the terminal UI, the headless console runner, and test
/// recorders. Calls arrive on the controller's task, one at a time.
pub trait JobView {
    /// Enter or leave the "submission in flight" state. While busy the
    /// front end must not offer another submission.
    fn set_busy(&mut self, busy: bool);

    /// Hide and empty the results container.
    fn clear_results(&mut self);

    /// Show the progress card with the given state.
    fn show_progress(&mut self, display: &ProgressDisplay);

    /// Blocking notification for a failed submission.
    fn notify_error(&mut self, message: &str);

    /// Reveal the results container with this content. Called at most once
    /// per job.
    fn render_results(&mut self, results: &ResultsView);
}
