//! HTTP access to the job server.
//!
//! - `client`: `reqwest` implementation of the endpoints
//! - `error`: error type shared by every call
//!
//! The polling core only needs the two job endpoints, so it talks to the
//! server through the [`JobApi`] trait. The extra endpoints used by the CLI
//! (`/files`, `/downloads/{name}`) live on [`JobClient`] directly.

mod client;
mod error;

use async_trait::async_trait;

use crate::core::models::{JobRequest, ProgressSnapshot};

pub use client::JobClient;
pub use error::{ClientError, GENERIC_START_FAILURE};

/// The two endpoints that drive a job.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// `POST /start`. Returns `ClientError::Rejected` on a non-success status.
    async fn start_job(&self, request: &JobRequest) -> Result<(), ClientError>;

    /// `GET /progress`.
    async fn fetch_progress(&self) -> Result<ProgressSnapshot, ClientError>;
}
