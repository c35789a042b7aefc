//! Command-line front end: argument definitions and the send lifecycle.

use crate::core::config::{load_config_file, Config, ConfigBuilder, TlsPolicy};
use crate::core::error::Result;
use crate::core::models::{
    parse_attachment_list, BodySource, Job, MessageTemplate, OverallStatus, RecipientOutcome,
};
use crate::dispatch::{DispatchEngine, MailTransport};
use crate::recipients;
use crate::store::{validate_job_id, JobLogStore};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "mailcast",
    version,
    about = "Send an email to one or more recipients and keep a JSON delivery log.",
    after_help = "Examples:\n  mailcast --to user@example.com --subject 'Hello' --body 'Text'\n  mailcast --to-file recipients.json --subject 'Hello' --body-file body.html --html\n  mailcast --api :8080"
)]
pub struct Cli {
    /// TOML configuration file (defaults to ./mailcast.toml when present).
    #[arg(long, env = "MAILCAST_CONFIG")]
    pub config: Option<PathBuf>,

    /// SMTP host.
    #[arg(long, env = "MAILCAST_SMTP_HOST")]
    pub host: Option<String>,

    /// SMTP port.
    #[arg(long, env = "MAILCAST_SMTP_PORT")]
    pub port: Option<u16>,

    /// SMTP username, also the default sender.
    #[arg(long = "user", env = "MAILCAST_SMTP_USER")]
    pub username: Option<String>,

    /// SMTP password.
    #[arg(long = "pass", env = "MAILCAST_SMTP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// From address, if it differs from the username.
    #[arg(long)]
    pub sender: Option<String>,

    /// TLS policy: none, opportunistic, required or wrapper.
    #[arg(long, value_parser = parse_tls)]
    pub tls: Option<TlsPolicy>,

    /// Directory for per-job JSON logs.
    #[arg(long, env = "MAILCAST_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Run the REST API on this address (e.g. :8080) instead of sending.
    #[arg(long, value_name = "ADDR")]
    pub api: Option<String>,

    /// Recipients, comma-separated.
    #[arg(long)]
    pub to: Option<String>,

    /// JSON file with recipients: {"emails": [...]}.
    #[arg(long = "to-file")]
    pub to_file: Option<PathBuf>,

    #[arg(long, default_value = "Test email")]
    pub subject: String,

    /// Message body.
    #[arg(long, conflicts_with = "body_file")]
    pub body: Option<String>,

    /// File holding the message body.
    #[arg(long = "body-file")]
    pub body_file: Option<PathBuf>,

    /// Send the body as HTML.
    #[arg(long)]
    pub html: bool,

    /// Files to attach, comma-separated.
    #[arg(long)]
    pub attach: Option<String>,

    /// Job id (generated when omitted).
    #[arg(long)]
    pub id: Option<String>,

    /// Debug logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON.
    #[arg(long)]
    pub json_logs: bool,
}

fn parse_tls(raw: &str) -> std::result::Result<TlsPolicy, String> {
    raw.parse().map_err(|e: crate::core::error::AppError| e.to_string())
}

impl Cli {
    /// Merges the config file, environment and flags.
    pub fn load_config(&self) -> Result<Config> {
        let mut builder = ConfigBuilder::new();
        if let Some((file, path)) = load_config_file(self.config.as_deref())? {
            builder = builder.apply_file(&file, &path)?;
        }
        builder
            .host(self.host.clone())
            .port(self.port)
            .username(self.username.clone())
            .password(self.password.clone())
            .sender(self.sender.clone())
            .tls(self.tls)
            .log_dir(self.log_dir.clone())
            .api_bind(self.api.clone())
            .build()
    }
}

/// What a finished command-line run produced.
#[derive(Debug)]
pub struct SendReport {
    pub job: Job,
    /// `None` when the log could not be written.
    pub log_path: Option<PathBuf>,
}

impl SendReport {
    pub fn status(&self) -> OverallStatus {
        self.job.overall_status()
    }
}

/// Resolves recipients, dispatches, aggregates and persists one job.
///
/// Setup problems are returned as errors before anything is sent. A failure
/// to write the log is reported but does not discard the delivery result.
pub async fn run_send(
    cli: &Cli,
    config: &Config,
    transport: Arc<dyn MailTransport>,
) -> Result<SendReport> {
    let recipients = recipients::resolve(cli.to.as_deref(), cli.to_file.as_deref())?;
    let body = BodySource::from_parts(cli.body.clone(), cli.body_file.clone())?;
    let attachments = cli
        .attach
        .as_deref()
        .map(parse_attachment_list)
        .unwrap_or_default();

    let sender = config.smtp.sender().to_string();
    let mut job = Job::new(cli.id.clone(), sender.clone(), cli.subject.clone());
    validate_job_id(&job.id)?;

    let store = JobLogStore::new(config.log_dir.clone());
    store.ensure_dir().await?;

    println!("Sending message {}", job.id);
    println!("   Server: {}:{}", config.smtp.host, config.smtp.port);
    println!("   From: {}", sender);
    println!("   Subject: {}", job.subject);
    println!("   Recipients: {}", recipients.join(", "));

    let template = MessageTemplate {
        sender,
        subject: cli.subject.clone(),
        body,
        html: cli.html,
        attachments,
    };

    let progress = progress_bar(recipients.len() as u64);
    let hook_bar = progress.clone();
    let engine = DispatchEngine::new(transport).with_outcome_hook(Arc::new(move |outcome: &RecipientOutcome| {
        hook_bar.suspend(|| {
            if outcome.is_success() {
                println!("   OK    {}", outcome.email);
            } else {
                println!("   FAIL  {} - {}", outcome.email, outcome.detail());
            }
        });
        hook_bar.inc(1);
    }));

    let status = engine.dispatch(&mut job, &template, &recipients).await?;
    progress.finish_and_clear();

    let log_path = match store.persist(&job).await {
        Ok(path) => Some(path),
        Err(e) => {
            tracing::error!("Failed to save log for job {}: {}", job.id, e);
            eprintln!("Failed to save log: {}", e);
            None
        }
    };

    println!("Done. Status: {}", status);
    if let Some(path) = &log_path {
        println!("Log saved: {}", path.display());
    }

    Ok(SendReport { job, log_path })
}

fn progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} sent") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}
