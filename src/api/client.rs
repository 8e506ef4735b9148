//! `reqwest` client for the job server.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::JobApi;
use super::error::{ClientError, GENERIC_START_FAILURE};
use crate::core::models::{JobRequest, ProgressSnapshot, StoredFile};
use crate::core::results::download_path;

/// Body of a failed request.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileListing {
    #[serde(default)]
    files: Vec<StoredFile>,
}

/// Client for one job server.
#[derive(Debug, Clone)]
pub struct JobClient {
    base: Url,
    http: reqwest::Client,
}

impl JobClient {
    /// Create a client for the server at `base_url`.
    ///
    /// A path prefix in `base_url` is kept, so `http://host/app` routes
    /// `/start` to `http://host/app/start`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, route: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(route.trim_start_matches('/'))?)
    }

    /// Absolute URL for a file's download route.
    pub fn download_url(&self, name: &str) -> Result<Url, ClientError> {
        self.endpoint(&download_path(name))
    }

    /// `GET /files`: everything currently in the server's download directory.
    pub async fn list_files(&self) -> Result<Vec<StoredFile>, ClientError> {
        let response = self.http.get(self.endpoint("files")?).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(rejection(status.as_u16(), &body));
        }

        let listing: FileListing = serde_json::from_str(&body)?;
        Ok(listing.files)
    }

    /// Fetch `/downloads/{name}` into `dir`, returning the written path.
    ///
    /// Only the last path component of `name` is used locally.
    pub async fn download(&self, name: &str, dir: &Path) -> Result<PathBuf, ClientError> {
        let local_name = Path::new(name)
            .file_name()
            .ok_or_else(|| ClientError::Io(std::io::Error::other(format!(
                "'{name}' has no file name component"
            ))))?;

        let response = self
            .http
            .get(self.download_url(name)?)
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(local_name);
        tokio::fs::write(&path, &bytes).await?;

        tracing::debug!(file = %path.display(), bytes = bytes.len(), "Saved download");
        Ok(path)
    }
}

#[async_trait]
impl JobApi for JobClient {
    async fn start_job(&self, request: &JobRequest) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.endpoint("start")?)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(rejection(status.as_u16(), &body))
    }

    async fn fetch_progress(&self) -> Result<ProgressSnapshot, ClientError> {
        let response = self
            .http
            .get(self.endpoint("progress")?)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn rejection(status: u16, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| GENERIC_START_FAILURE.to_string());

    ClientError::Rejected { status, message }
}
