//! Headless front end: line-oriented progress on stdout.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::context::AppContext;
use crate::core::{
    JobController, JobOutcome, JobRequest, JobView, ProgressDisplay, ResultsView, StatusStyle,
    SubmitError,
};
use crate::core::results::NO_FILES_PLACEHOLDER;

const BAR_WIDTH: usize = 25;

/// [`JobView`] that prints one line per visible change.
///
/// The first write error is kept and every later write is skipped; the
/// runner checks [`take_error`](Self::take_error) after each event.
pub struct ConsoleView<W: Write> {
    out: W,
    last_line: Option<String>,
    error: Option<io::Error>,
}

impl<W: Write> ConsoleView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_line: None,
            error: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    fn emit(&mut self, write: impl FnOnce(&mut W) -> io::Result<()>) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = write(&mut self.out).and_then(|()| self.out.flush()) {
            self.error = Some(e);
        }
    }
}

impl<W: Write> JobView for ConsoleView<W> {
    fn set_busy(&mut self, busy: bool) {
        if busy {
            self.emit(|out| writeln!(out, "Submitting job..."));
        }
    }

    fn clear_results(&mut self) {
        self.last_line = None;
    }

    fn show_progress(&mut self, display: &ProgressDisplay) {
        // The empty state before the first snapshot has nothing to say.
        if *display == ProgressDisplay::pending() {
            return;
        }
        let line = progress_line(display);
        if self.last_line.as_deref() != Some(line.as_str()) {
            self.emit(|out| writeln!(out, "{line}"));
            self.last_line = Some(line);
        }
    }

    fn notify_error(&mut self, message: &str) {
        self.emit(|out| writeln!(out, "Error: {message}"));
    }

    fn render_results(&mut self, results: &ResultsView) {
        self.emit(|out| {
            writeln!(out)?;
            writeln!(out, "Downloaded files:")?;
            match results {
                ResultsView::Empty => writeln!(out, "  {NO_FILES_PLACEHOLDER}")?,
                ResultsView::Items(items) => {
                    for item in items {
                        writeln!(out, "  {}", item.name)?;
                        writeln!(out, "    From:    {}", item.from)?;
                        writeln!(out, "    Subject: {}", item.subject)?;
                        writeln!(out, "    Date:    {}", item.date)?;
                        writeln!(out, "    Link:    {}", item.download_url)?;
                    }
                }
            }
            Ok(())
        });
    }
}

/// Single-line rendering of the progress card.
pub fn progress_line(display: &ProgressDisplay) -> String {
    let marker = match display.style {
        StatusStyle::Connecting => "…",
        StatusStyle::Completed => "✓",
        StatusStyle::Error => "✗",
        StatusStyle::Neutral => "▶",
    };

    let mut line = format!(
        "{} {}  {} {}",
        marker,
        display.message,
        progress_bar(display.bar_percent, BAR_WIDTH),
        display.progress_text
    );
    if !display.download_text.is_empty() {
        line.push_str("  ");
        line.push_str(&display.download_text);
    }
    line
}

/// Text bar. Out-of-range percentages are clamped for drawing only.
fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let empty = width - filled;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Submit `request` and print progress until the job ends.
///
/// Returns whether the job completed successfully.
pub async fn run_job(ctx: &AppContext, request: JobRequest) -> Result<bool> {
    let mut controller = JobController::new(
        Arc::new(ctx.client.clone()),
        ctx.config.poll_options(),
        ConsoleView::new(std::io::stdout()),
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let submitted = tokio::select! {
        result = controller.submit(request) => result,
        _ = &mut ctrl_c => {
            tracing::info!("Interrupted before the server accepted the job");
            return Ok(false);
        }
    };
    check_output(&mut controller)?;
    match submitted {
        Ok(_) => {}
        Err(SubmitError::Rejected(_)) => return Ok(false),
        Err(e) => return Err(e.into()),
    }

    let outcome = tokio::select! {
        outcome = track(&mut controller) => outcome?,
        _ = &mut ctrl_c => {
            tracing::info!("Interrupted, no longer tracking the job");
            controller.stop_polling();
            None
        }
    };

    if let Some(JobOutcome::Completed { files }) = &outcome {
        controller.view_mut().emit(|out| writeln!(out, "Done: {} file(s).", files.len()));
        check_output(&mut controller)?;
    }
    Ok(outcome.is_some_and(|o| o.is_success()))
}

/// Apply events until the session ends, stopping early if output fails.
async fn track<W: Write>(
    controller: &mut JobController<ConsoleView<W>>,
) -> Result<Option<JobOutcome>> {
    while controller.is_polling() {
        let Some(event) = controller.next_event().await else {
            break;
        };
        let outcome = controller.handle(event);
        check_output(controller)?;
        if outcome.is_some() {
            return Ok(outcome);
        }
    }
    Ok(None)
}

fn check_output<W: Write>(controller: &mut JobController<ConsoleView<W>>) -> Result<()> {
    match controller.view_mut().take_error() {
        Some(e) => {
            controller.stop_polling();
            Err(e).context("Failed to write progress")
        }
        None => Ok(()),
    }
}
