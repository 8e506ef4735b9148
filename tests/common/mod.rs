//! In-process fake job server and a recording view.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};

use mailgrab::api::JobClient;
use mailgrab::core::{JobRequest, JobView, ProgressDisplay, ResultsView};

/// Queue entry that makes `/progress` answer with a body that is not JSON.
pub const GARBAGE: Value = Value::Null;

#[derive(Default)]
pub struct FakeServer {
    start_response: Mutex<Option<(StatusCode, String)>>,
    progress: Mutex<VecDeque<Value>>,
    files: Mutex<Value>,
    started: Mutex<Vec<Value>>,
    polls: Mutex<usize>,
}

impl FakeServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer `/start` with this status and raw body.
    pub fn reject_start(&self, status: StatusCode, body: &str) {
        *self.start_response.lock().unwrap() = Some((status, body.to_string()));
    }

    /// Queue `/progress` answers. The last one repeats once the queue drains.
    pub fn push_progress(&self, values: impl IntoIterator<Item = Value>) {
        self.progress.lock().unwrap().extend(values);
    }

    pub fn set_files(&self, files: Value) {
        *self.files.lock().unwrap() = files;
    }

    pub fn started(&self) -> Vec<Value> {
        self.started.lock().unwrap().clone()
    }

    pub fn polls(&self) -> usize {
        *self.polls.lock().unwrap()
    }
}

async fn start(State(server): State<Arc<FakeServer>>, Json(body): Json<Value>) -> Response {
    server.started.lock().unwrap().push(body);
    match server.start_response.lock().unwrap().clone() {
        Some((status, body)) => (status, body).into_response(),
        None => Json(json!({ "message": "Processing started" })).into_response(),
    }
}

async fn progress(State(server): State<Arc<FakeServer>>) -> Response {
    *server.polls.lock().unwrap() += 1;

    let value = {
        let mut queue = server.progress.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    };

    match value {
        Some(Value::Null) => (StatusCode::OK, "<html>not json</html>").into_response(),
        Some(value) => Json(value).into_response(),
        None => Json(progress_json("idle", "", 0, 0, 0)).into_response(),
    }
}

async fn files(State(server): State<Arc<FakeServer>>) -> Response {
    let files = server.files.lock().unwrap().clone();
    if files.is_null() {
        return Json(json!({ "files": [] })).into_response();
    }
    Json(json!({ "files": files })).into_response()
}

async fn download(Path(name): Path<String>) -> Response {
    if name == "missing.pdf" {
        return StatusCode::NOT_FOUND.into_response();
    }
    format!("%PDF {name}").into_response()
}

/// Serve `server` on an ephemeral port and return its base URL.
pub async fn spawn(server: Arc<FakeServer>) -> String {
    let app = Router::new()
        .route("/start", post(start))
        .route("/progress", get(progress))
        .route("/files", get(files))
        .route("/downloads/{name}", get(download))
        .with_state(server);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

pub fn client(base_url: &str) -> JobClient {
    JobClient::new(base_url, Duration::from_secs(5)).unwrap()
}

pub fn progress_json(status: &str, message: &str, progress: u64, total: u64, downloads: u64) -> Value {
    json!({
        "status": status,
        "message": message,
        "progress": progress,
        "total": total,
        "downloads": downloads,
        "files": [],
    })
}

pub fn request() -> JobRequest {
    JobRequest {
        account_email: "me@example.com".to_string(),
        credential: "secret".to_string(),
        sender_filter: "billing@example.com".to_string(),
        start_date: "2024-01-01".to_string(),
        end_date: "2024-01-31".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Busy(bool),
    ClearResults,
    Progress(ProgressDisplay),
    Notify(String),
    Render(ResultsView),
}

#[derive(Default)]
pub struct Recorder {
    pub calls: Vec<Call>,
}

impl Recorder {
    pub fn progress(&self) -> Vec<&ProgressDisplay> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Progress(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn renders(&self) -> Vec<&ResultsView> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Render(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn notifications(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Notify(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn busy(&self) -> Option<bool> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::Busy(b) => Some(*b),
            _ => None,
        })
    }
}

impl JobView for Recorder {
    fn set_busy(&mut self, busy: bool) {
        self.calls.push(Call::Busy(busy));
    }
    fn clear_results(&mut self) {
        self.calls.push(Call::ClearResults);
    }
    fn show_progress(&mut self, display: &ProgressDisplay) {
        self.calls.push(Call::Progress(display.clone()));
    }
    fn notify_error(&mut self, message: &str) {
        self.calls.push(Call::Notify(message.to_string()));
    }
    fn render_results(&mut self, results: &ResultsView) {
        self.calls.push(Call::Render(results.clone()));
    }
}
