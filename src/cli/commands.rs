//! One-shot commands that talk to the server without tracking a job.

use std::path::Path;

use anyhow::{Context, Result};

use super::console::progress_line;
use crate::api::JobApi;
use crate::context::AppContext;
use crate::core::{StoredFile, reconcile};

/// Print the server's current progress once.
pub async fn status(ctx: &AppContext) -> Result<()> {
    let snapshot = ctx
        .client
        .fetch_progress()
        .await
        .context("Failed to fetch progress")?;

    println!("Status: {}", snapshot.status);
    println!("{}", progress_line(&reconcile(&snapshot)));
    if !snapshot.files.is_empty() {
        println!("{} file(s) in the last job", snapshot.files.len());
    }
    Ok(())
}

/// List the files sitting in the server's download directory.
pub async fn files(ctx: &AppContext) -> Result<()> {
    let files = ctx
        .client
        .list_files()
        .await
        .context("Failed to list files")?;

    if files.is_empty() {
        println!("No files downloaded");
        return Ok(());
    }

    for line in file_table(&files) {
        println!("{line}");
    }
    Ok(())
}

/// Fetch one file from the server's download route.
pub async fn download(ctx: &AppContext, name: &str, output: Option<&Path>) -> Result<()> {
    let dir = output.unwrap_or(&ctx.config.download_dir);
    let path = ctx
        .client
        .download(name, dir)
        .await
        .with_context(|| format!("Failed to download '{name}'"))?;

    println!("Saved {}", path.display());
    Ok(())
}

fn file_table(files: &[StoredFile]) -> Vec<String> {
    let width = files.iter().map(|f| f.name.chars().count()).max().unwrap_or(0);
    files
        .iter()
        .map(|f| {
            format!(
                "{:<width$}  {:>9}  {}",
                f.name,
                format_bytes(f.size),
                f.modified,
                width = width
            )
        })
        .collect()
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
