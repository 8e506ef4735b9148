//! Interactive TUI.
//!
//! A job form, a live progress card, and the downloaded-files list, driven
//! by a single event loop that multiplexes terminal input with events from
//! the polling session.

mod app;
mod input;
mod ui;

use std::io::{self, stdout};

use anyhow::{Context, Result};
use crossterm::{
    event::EventStream,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::api::ClientError;
use crate::context::AppContext;
use crate::core::{JobRequest, PendingStart};

use app::{JobForm, TuiApp};

/// Run the TUI against the configured server, with the form prefilled.
pub async fn run(ctx: AppContext, prefill: JobRequest) -> Result<()> {
    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = TuiApp::new(&ctx, JobForm::new(prefill));
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut TuiApp,
) -> Result<()> {
    let mut terminal_events = EventStream::new();

    while app.running {
        terminal.draw(|frame| ui::render(frame, app))?;

        tokio::select! {
            event = terminal_events.next() => match event {
                Some(Ok(event)) => {
                    if let Some(action) = input::handle_event(event) {
                        app.handle_action(action);
                    }
                }
                Some(Err(e)) => return Err(e).context("Failed to read terminal input"),
                None => break,
            },
            result = start_response(&mut app.pending_start) => app.handle_start(result),
            Some(sync) = app.controller.next_event() => app.handle_sync(sync),
        }
    }

    // Leaving the TUI ends tracking; the job itself keeps running server-side.
    app.controller.stop_polling();
    Ok(())
}

/// Resolves with the in-flight `POST /start`, or never when there is none.
async fn start_response(pending: &mut Option<PendingStart>) -> Result<(), ClientError> {
    match pending {
        Some(start) => start.await,
        None => std::future::pending().await,
    }
}
