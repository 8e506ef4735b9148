//! TUI application state and logic.

use std::sync::Arc;

use crate::api::{ClientError, JobApi};
use crate::context::AppContext;
use crate::core::{
    JobController, JobRequest, JobView, PendingStart, PollOptions, ProgressDisplay, ResultsView,
    SyncEvent,
};

/// Fields of the job form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    Password,
    Sender,
    StartDate,
    EndDate,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Email,
        Field::Password,
        Field::Sender,
        Field::StartDate,
        Field::EndDate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Email => "Email address",
            Field::Password => "App password",
            Field::Sender => "Sender",
            Field::StartDate => "Start date",
            Field::EndDate => "End date",
        }
    }

    pub fn masked(self) -> bool {
        self == Field::Password
    }

    fn index(self) -> usize {
        self as usize
    }

    fn next(self) -> Self {
        Field::ALL[(self.index() + 1) % Field::ALL.len()]
    }

    fn prev(self) -> Self {
        Field::ALL[(self.index() + Field::ALL.len() - 1) % Field::ALL.len()]
    }
}

/// Editable job parameters.
#[derive(Debug, Clone)]
pub struct JobForm {
    values: [String; 5],
    pub focus: Field,
}

impl JobForm {
    pub fn new(request: JobRequest) -> Self {
        Self {
            values: [
                request.account_email,
                request.credential,
                request.sender_filter,
                request.start_date,
                request.end_date,
            ],
            focus: Field::Email,
        }
    }

    pub fn value(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    fn input(&mut self, c: char) {
        self.values[self.focus.index()].push(c);
    }

    fn backspace(&mut self) {
        self.values[self.focus.index()].pop();
    }

    pub fn to_request(&self) -> JobRequest {
        JobRequest {
            account_email: self.value(Field::Email).to_string(),
            credential: self.value(Field::Password).to_string(),
            sender_filter: self.value(Field::Sender).to_string(),
            start_date: self.value(Field::StartDate).to_string(),
            end_date: self.value(Field::EndDate).to_string(),
        }
    }
}

/// What the page currently shows. This is the controller's view.
#[derive(Debug, Default)]
pub struct PageState {
    pub busy: bool,
    /// `None` while the progress card is hidden.
    pub progress: Option<ProgressDisplay>,
    /// `None` while the results card is hidden.
    pub results: Option<ResultsView>,
    /// Modal message; swallows input until dismissed.
    pub notification: Option<String>,
    pub results_scroll: u16,
}

impl JobView for PageState {
    fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    fn clear_results(&mut self) {
        self.results = None;
        self.results_scroll = 0;
    }

    fn show_progress(&mut self, display: &ProgressDisplay) {
        self.progress = Some(display.clone());
    }

    fn notify_error(&mut self, message: &str) {
        self.notification = Some(format!("Error: {message}"));
    }

    fn render_results(&mut self, results: &ResultsView) {
        self.results = Some(results.clone());
    }
}

/// Actions that can be triggered by user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Back,
    NextField,
    PrevField,
    Input(char),
    Backspace,
    Submit,
    ScrollUp,
    ScrollDown,
}

/// Main TUI application state.
pub struct TuiApp {
    pub controller: JobController<PageState>,
    pub form: JobForm,
    /// `POST /start` in flight; the event loop polls it next to input.
    pub pending_start: Option<PendingStart>,
    pub running: bool,
}

impl TuiApp {
    pub fn new(ctx: &AppContext, form: JobForm) -> Self {
        Self::with_api(
            Arc::new(ctx.client.clone()),
            ctx.config.poll_options(),
            form,
        )
    }

    pub fn with_api(api: Arc<dyn JobApi>, options: PollOptions, form: JobForm) -> Self {
        Self {
            controller: JobController::new(api, options, PageState::default()),
            form,
            pending_start: None,
            running: true,
        }
    }

    pub fn page(&self) -> &PageState {
        self.controller.view()
    }

    /// Handle an action and update state accordingly.
    pub fn handle_action(&mut self, action: Action) {
        if self.page().notification.is_some() {
            match action {
                Action::Quit => self.running = false,
                Action::Submit | Action::Back => self.controller.view_mut().notification = None,
                _ => {}
            }
            return;
        }

        match action {
            Action::Quit | Action::Back => self.running = false,
            Action::NextField => self.form.focus = self.form.focus.next(),
            Action::PrevField => self.form.focus = self.form.focus.prev(),
            Action::Input(c) => self.form.input(c),
            Action::Backspace => self.form.backspace(),
            Action::Submit => self.submit(),
            Action::ScrollUp => {
                let page = self.controller.view_mut();
                page.results_scroll = page.results_scroll.saturating_sub(1);
            }
            Action::ScrollDown => {
                let page = self.controller.view_mut();
                let max = page.results.as_ref().map_or(0, |r| r.len().saturating_sub(1));
                if (page.results_scroll as usize) < max {
                    page.results_scroll += 1;
                }
            }
        }
    }

    fn submit(&mut self) {
        // The submit control is disabled while a job is tracked.
        if self.page().busy || self.pending_start.is_some() {
            return;
        }

        match self.controller.begin_submit(self.form.to_request()) {
            Ok(pending) => self.pending_start = Some(pending),
            Err(e) => tracing::debug!(error = %e, "Ignoring submit while a job is tracked"),
        }
    }

    /// Apply the response to the submitted `POST /start`.
    pub fn handle_start(&mut self, result: Result<(), ClientError>) {
        self.pending_start = None;
        // A rejection is already on screen as a notification.
        if let Ok(session) = self.controller.finish_submit(result) {
            tracing::debug!(session = %session, "Tracking job");
        }
    }

    /// Apply an event from the polling loop.
    pub fn handle_sync(&mut self, event: SyncEvent) {
        if let Some(outcome) = self.controller.handle(event) {
            tracing::info!(success = outcome.is_success(), "Job finished");
        }
    }
}
