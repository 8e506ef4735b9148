use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mailgrab::cli::{commands, console, tui};
use mailgrab::core::{JobRequest, dates};
use mailgrab::{config, context, logging};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "mailgrab")]
#[command(about = "Fetch PDF attachments through a mailgrab job server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive form with live progress
    Tui(TuiArgs),
    /// Submit a job and print progress until it finishes
    Run(RunArgs),
    /// Show the server's current progress once
    Status,
    /// List files in the server's download directory
    Files,
    /// Download one file from the server
    Download {
        name: String,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print the effective configuration
    Config,
}

/// Flags that override configuration values.
#[derive(Args, Serialize)]
struct GlobalArgs {
    #[serde(skip_serializing_if = "Option::is_none", rename = "server_url")]
    #[arg(long = "server", global = true)]
    server: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    poll_interval_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "max_poll_ticks")]
    #[arg(long = "max-polls", global = true)]
    max_polls: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "max_poll_secs")]
    #[arg(long = "max-wait-secs", global = true)]
    max_wait_secs: Option<u64>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    #[arg(long, global = true)]
    verbose: bool,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Args)]
struct JobArgs {
    /// Mail account to search
    #[arg(long)]
    email: Option<String>,

    /// App password for the mail account
    #[arg(long, env = "MAILGRAB_APP_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Only process mail from this sender
    #[arg(long)]
    sender: Option<String>,

    /// First day to search, YYYY-MM-DD (default: 30 days ago)
    #[arg(long)]
    start_date: Option<String>,

    /// Last day to search, YYYY-MM-DD (default: today)
    #[arg(long)]
    end_date: Option<String>,
}

impl JobArgs {
    fn into_request(self) -> JobRequest {
        let (default_start, default_end) = dates::default_range_today();
        JobRequest {
            account_email: self.email.unwrap_or_default(),
            credential: self.password.unwrap_or_default(),
            sender_filter: self.sender.unwrap_or_default(),
            start_date: self.start_date.unwrap_or(default_start),
            end_date: self.end_date.unwrap_or(default_end),
        }
    }
}

#[derive(Args)]
struct TuiArgs {
    #[command(flatten)]
    job: JobArgs,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    job: JobArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<bool> {
    let cli = Cli::parse();
    let config = config::AppConfig::new(Some(&cli.global))?;

    let is_tui = matches!(cli.command, Commands::Tui(_));
    logging::init(logging::LogConfig {
        json: config.json_logs,
        verbose: config.verbose,
        file: match (&config.log_file, is_tui) {
            (Some(path), _) => Some(path.clone()),
            (None, true) => Some(PathBuf::from("mailgrab.log")),
            (None, false) => None,
        },
    })?;

    if let Commands::Config = cli.command {
        print!("{}", config.to_toml()?);
        return Ok(true);
    }

    let ctx = context::AppContext::new(config)?;
    tracing::debug!(server = %ctx.client.base_url(), "Using job server");

    match cli.command {
        Commands::Tui(args) => tui::run(ctx, args.job.into_request())
            .await
            .context("TUI failed")
            .map(|_| true),
        Commands::Run(args) => {
            let request = args.job.into_request();
            require_fields(&request)?;
            console::run_job(&ctx, request).await
        }
        Commands::Status => commands::status(&ctx).await.map(|_| true),
        Commands::Files => commands::files(&ctx).await.map(|_| true),
        Commands::Download { name, output } => commands::download(&ctx, &name, output.as_deref())
            .await
            .map(|_| true),
        Commands::Config => Ok(true),
    }
}

/// The headless runner has no form to fill in later, so the credentials
/// must be present up front.
fn require_fields(request: &JobRequest) -> Result<()> {
    let missing: Vec<&str> = [
        ("--email", &request.account_email),
        ("--password", &request.credential),
        ("--sender", &request.sender_filter),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_empty())
    .map(|(flag, _)| flag)
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("missing required flags: {}", missing.join(", "))
    }
}
