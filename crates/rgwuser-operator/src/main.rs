use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rgwuser_admin::HttpAdminClientFactory;
use rgwuser_memory::{InMemoryInventory, InMemorySecretStore, InMemoryStatusStore};
use rgwuser_operator::cli::{self, Cli, Commands, OutcomeReport, PassArgs};
use rgwuser_operator::config::loader::load_config;
use rgwuser_operator::locator::{ACCESS_KEY_FIELD, SECRET_KEY_FIELD};
use rgwuser_operator::observability::{apply_logging_level, init_tracing_with_level};
use rgwuser_operator::{Collaborators, OperatorConfig, Reconciler};

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv()
        && !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
    {
        eprintln!("Warning: Failed to load .env file: {e}");
    }

    init_tracing_with_level("info");

    match run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(2);
        }
    }
}

/// Returns the process exit code: 0 when converged, 1 when the pass must be retried or failed.
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config_path = cli.config.as_ref().map(|p| p.to_string_lossy().to_string());
    let cfg = load_config(config_path.as_deref())
        .map_err(anyhow::Error::msg)
        .context("Configuration error")?;
    apply_logging_level(&cfg.logging.level);
    tracing::debug!(config = ?config_path, "configuration loaded");

    match &cli.command {
        Commands::Reconcile(args) => {
            let (reconciler, user) = setup(&cfg, args)?;
            let outcome = reconciler.reconcile(&user).await;
            print_report(&OutcomeReport::from(&outcome))?;
            Ok(if outcome.is_ready() { 0 } else { 1 })
        }
        Commands::Finalize(args) => {
            let (reconciler, user) = setup(&cfg, args)?;
            let outcome = reconciler.finalize(&user).await;
            print_report(&OutcomeReport::from(&outcome))?;
            Ok(match outcome {
                rgwuser_operator::FinalizeOutcome::Done => 0,
                _ => 1,
            })
        }
    }
}

fn setup(cfg: &OperatorConfig, args: &PassArgs) -> Result<(Reconciler, rgwuser_core::ObjectUser)> {
    let snapshot = cli::read_inventory(&args.inventory)?;
    let user = cli::read_user(&args.user)?;

    let secrets = InMemorySecretStore::new().with_secret(
        &user.namespace,
        &cfg.admin.credentials_secret,
        [
            (ACCESS_KEY_FIELD, args.admin_access_key.as_str()),
            (SECRET_KEY_FIELD, args.admin_secret_key.as_str()),
        ],
    );
    let collaborators = Collaborators {
        inventory: Arc::new(InMemoryInventory::from_snapshot(snapshot)),
        secrets: Arc::new(secrets),
        statuses: Arc::new(InMemoryStatusStore::new()),
        admin_factory: Arc::new(HttpAdminClientFactory::new(cfg.admin.client_settings())),
    };
    Ok((Reconciler::new(cfg, collaborators), user))
}

fn print_report(report: &OutcomeReport) -> Result<()> {
    let rendered = serde_json::to_string_pretty(report).context("Failed to render outcome")?;
    println!("{rendered}");
    Ok(())
}
