//! Homecare Submissions - Draft Checker Binary
//!
//! Reads a form template and a draft, runs the draft through progress and
//! gate checks, submits it to an in-memory payer and prints a JSON report.
//!
//! # Usage
//!
//! ```bash
//! submission-check --template claim-template.json --draft draft.json
//!
//! # Confirm past license and documentation warnings, queue offline
//! submission-check -t claim-template.json -d draft.json --confirm-license --confirm-documentation --offline
//! ```
//!
//! # Environment Variables
//!
//! * `SUBMISSION_LOG_LEVEL` - Log level when `RUST_LOG` is unset (default: info)
//! * `SUBMISSION_LOG_JSON` - Emit logs as JSON lines (default: false)
//! * `SUBMISSION_FACILITY_TIMEZONE` - IANA timezone for license dates (default: Asia/Dubai)
//! * `SUBMISSION_OFFLINE` - Queue submissions instead of sending them (default: false)
//! * `SUBMISSION_REVIEWER` - User recorded as initiating the submission
//!
//! Exit status is 0 when the draft was submitted or queued, 2 when it was
//! incomplete or rejected by the gate.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_submission::GateOverrides;
use interface_cli::{run_check, CheckOptions, CliConfig};

#[derive(Parser, Debug)]
#[command(
    name = "submission-check",
    about = "Check a homecare claim or prior-authorization draft and submit it to a mock payer",
    version
)]
struct Cli {
    /// Form template JSON (documents, required fields, defaults)
    #[arg(short, long)]
    template: PathBuf,
    /// Draft JSON (uploads, fields, service lines, licenses, visit notes)
    #[arg(short, long)]
    draft: PathBuf,
    /// Queue the submission locally instead of sending it
    #[arg(long)]
    offline: bool,
    /// Confirm past provider license problems
    #[arg(long)]
    confirm_license: bool,
    /// Confirm past missing daily documentation
    #[arg(long)]
    confirm_documentation: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = CliConfig::from_env().context("invalid SUBMISSION_* configuration")?;

    init_tracing(&config);

    let template = std::fs::read_to_string(&cli.template)
        .with_context(|| format!("reading template {}", cli.template.display()))?;
    let draft = std::fs::read_to_string(&cli.draft)
        .with_context(|| format!("reading draft {}", cli.draft.display()))?;

    let options = CheckOptions {
        offline: cli.offline,
        overrides: GateOverrides {
            license: cli.confirm_license,
            documentation: cli.confirm_documentation,
        },
    };

    let report = run_check(&template, &draft, &config, options).await?;

    tracing::info!(
        kind = ?report.kind,
        percent = report.progress_percent,
        submitted = report.outcome.is_submitted(),
        "draft checked"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(if report.outcome.is_submitted() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

/// Installs the tracing subscriber, writing to stderr so stdout stays JSON
fn init_tracing(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
