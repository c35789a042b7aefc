use anyhow::Context;
use clap::Parser;
use mailcast_core::cli::{run_send, Cli};
use mailcast_core::{api, AppError, SmtpMailer};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.load_config().context("loading configuration")?;
    let transport = Arc::new(
        SmtpMailer::new(&config.smtp).context("building SMTP transport")?,
    );

    if config.api_bind.is_some() {
        return api::serve(&config, transport)
            .await
            .context("running API server");
    }

    run_send(&cli, &config, transport)
        .await
        .context("sending message")?;
    Ok(())
}

/// True when the failure was a missing recipient source, which warrants the usage lines.
fn wants_usage(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<AppError>(), Some(AppError::NoRecipients(_)))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            if wants_usage(&e) {
                eprintln!("Usage:");
                eprintln!("  mailcast --to user@example.com --subject 'Subject' --body 'Text'");
                eprintln!("  mailcast --to-file recipients.json --subject 'Subject' --body 'Text'");
            }
            ExitCode::FAILURE
        }
    }
}
