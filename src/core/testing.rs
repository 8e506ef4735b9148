//! In-memory job server for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::models::{FileRecord, JobRequest, JobStatus, ProgressSnapshot};
use crate::api::{ClientError, JobApi};

pub(crate) fn snapshot(status: JobStatus, progress: u64, total: u64, downloads: u64) -> ProgressSnapshot {
    ProgressSnapshot {
        message: format!("{status} {progress}/{total}"),
        status,
        progress,
        total,
        downloads,
        files: Vec::new(),
    }
}

pub(crate) fn completed_with(files: Vec<FileRecord>) -> ProgressSnapshot {
    ProgressSnapshot {
        files,
        ..snapshot(JobStatus::Completed, 1, 1, 1)
    }
}

pub(crate) fn file(name: &str) -> FileRecord {
    FileRecord {
        name: name.to_string(),
        from: "x@y.com".to_string(),
        subject: None,
        date: "2024-01-01".to_string(),
    }
}

pub(crate) fn request() -> JobRequest {
    JobRequest {
        account_email: "me@example.com".to_string(),
        credential: "secret".to_string(),
        sender_filter: "billing@example.com".to_string(),
        start_date: "2024-01-01".to_string(),
        end_date: "2024-01-31".to_string(),
    }
}

#[derive(Default)]
struct Script {
    start: Mutex<VecDeque<Result<(), ClientError>>>,
    progress: Mutex<VecDeque<Result<ProgressSnapshot, ClientError>>>,
    repeating: Mutex<Option<ProgressSnapshot>>,
    started: Mutex<Vec<JobRequest>>,
    poll_times: Mutex<Vec<Instant>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Replays scripted responses. Once the progress script runs out it returns
/// the repeating snapshot if one is set, or a transport error otherwise.
#[derive(Clone, Default)]
pub(crate) struct ScriptedApi {
    script: Arc<Script>,
    latency: Duration,
    start_latency: Duration,
}

impl ScriptedApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub(crate) fn with_start_latency(mut self, latency: Duration) -> Self {
        self.start_latency = latency;
        self
    }

    pub(crate) fn with_start(self, result: Result<(), ClientError>) -> Self {
        self.script.start.lock().unwrap().push_back(result);
        self
    }

    pub(crate) fn with_progress(
        self,
        results: impl IntoIterator<Item = Result<ProgressSnapshot, ClientError>>,
    ) -> Self {
        self.script.progress.lock().unwrap().extend(results);
        self
    }

    pub(crate) fn with_repeating(self, snapshot: ProgressSnapshot) -> Self {
        *self.script.repeating.lock().unwrap() = Some(snapshot);
        self
    }

    pub(crate) fn transport_error() -> ClientError {
        ClientError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ))
    }

    pub(crate) fn rejected(message: &str) -> ClientError {
        ClientError::Rejected {
            status: 400,
            message: message.to_string(),
        }
    }

    pub(crate) fn poll_times(&self) -> Vec<Instant> {
        self.script.poll_times.lock().unwrap().clone()
    }

    pub(crate) fn started_requests(&self) -> Vec<JobRequest> {
        self.script.started.lock().unwrap().clone()
    }

    pub(crate) fn max_concurrent_polls(&self) -> usize {
        self.script.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobApi for ScriptedApi {
    async fn start_job(&self, request: &JobRequest) -> Result<(), ClientError> {
        self.script.started.lock().unwrap().push(request.clone());
        if !self.start_latency.is_zero() {
            tokio::time::sleep(self.start_latency).await;
        }
        self.script.start.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    async fn fetch_progress(&self) -> Result<ProgressSnapshot, ClientError> {
        self.script.poll_times.lock().unwrap().push(Instant::now());
        let now = self.script.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.script.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.script.in_flight.fetch_sub(1, Ordering::SeqCst);

        let next = self.script.progress.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => match self.script.repeating.lock().unwrap().clone() {
                Some(snapshot) => Ok(snapshot),
                None => Err(Self::transport_error()),
            },
        }
    }
}
