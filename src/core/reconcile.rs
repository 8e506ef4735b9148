//! Mapping from a server snapshot to what the progress card displays.

use super::models::{JobStatus, ProgressSnapshot};

/// Placeholder shown until the server has counted the matching emails.
pub const PROCESSING_PLACEHOLDER: &str = "Processing...";

/// Visual treatment of the status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusStyle {
    Connecting,
    Completed,
    Error,
    #[default]
    Neutral,
}

/// Display state for the progress card.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressDisplay {
    pub message: String,
    pub style: StatusStyle,
    pub progress_text: String,
    pub download_text: String,
    /// Bar fill in percent. Not clamped: a server reporting
    /// `progress > total` yields a value above 100.
    pub bar_percent: f64,
}

impl ProgressDisplay {
    /// Empty state shown right after a submission, before any snapshot.
    pub fn pending() -> Self {
        Self::default()
    }
}

pub fn status_style(status: &JobStatus) -> StatusStyle {
    match status {
        JobStatus::Connecting => StatusStyle::Connecting,
        JobStatus::Completed => StatusStyle::Completed,
        JobStatus::Error => StatusStyle::Error,
        // Running gets no dedicated look; it reads the same as any status
        // the client does not recognise.
        JobStatus::Running | JobStatus::Unknown(_) => StatusStyle::Neutral,
    }
}

/// Reconcile a snapshot into display state.
pub fn reconcile(snapshot: &ProgressSnapshot) -> ProgressDisplay {
    let style = status_style(&snapshot.status);

    if snapshot.total > 0 {
        let noun = if snapshot.downloads == 1 { "PDF" } else { "PDFs" };
        ProgressDisplay {
            message: snapshot.message.clone(),
            style,
            progress_text: format!("{} / {} emails", snapshot.progress, snapshot.total),
            download_text: format!("{} {} downloaded", snapshot.downloads, noun),
            bar_percent: snapshot.progress as f64 / snapshot.total as f64 * 100.0,
        }
    } else {
        ProgressDisplay {
            message: snapshot.message.clone(),
            style,
            progress_text: PROCESSING_PLACEHOLDER.to_string(),
            download_text: String::new(),
            bar_percent: 0.0,
        }
    }
}
