use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::JobClient;
use crate::config::AppConfig;

/// Shared state handed to every command.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub client: JobClient,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = JobClient::new(&config.server_url, config.request_timeout())
            .with_context(|| format!("Invalid server URL '{}'", config.server_url))?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }
}
