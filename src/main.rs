use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use teeclaim::cli;
use teeclaim::config::Config;
use teeclaim::orchestrator::{self, BookingRequest};
use teeclaim::redact;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::parse_args();

    if args.help {
        cli::print_help();
        return Ok(());
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("teeclaim=info".parse()?),
        )
        .init();

    info!("TeeClaim booking bot v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded");
    info!("  Booking site: {}", config.login_url);
    info!("  Club id: {}", config.club_id);
    info!(
        "  Release: {:02}:{:02} {} ({} days ahead)",
        config.release_hour, config.release_minute, config.time_zone, config.lead_days
    );
    info!("  Slot grid: every {} minutes", config.slot_step_minutes);

    // Handle --validate mode
    if args.validate {
        info!("Validating configuration...");
        match config.validate() {
            Ok(()) => {
                info!("Configuration is valid");
                return Ok(());
            }
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        }
    }
    config.validate()?;

    let requests = match &args.requests {
        Some(path) => BookingRequest::load_file(path)?,
        None => vec![BookingRequest::from_env()?],
    };
    if requests.is_empty() {
        anyhow::bail!("requests file contains no booking requests");
    }
    info!("{} booking request(s) loaded", requests.len());

    // Handle --dry-run mode: plan each attempt, touch nothing remote
    if args.dry_run {
        for request in &requests {
            let target = orchestrator::prepare(&config, request)?;
            info!(
                "{}: day {} (sentinel {}), release {}, candidates: {}",
                redact::username(&request.username),
                target.day.day_number,
                target.day.sentinel_day_number,
                target.release_instant,
                target
                    .candidates
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            );
        }
        return Ok(());
    }

    // Ctrl-C cancels every in-flight attempt at its next sleep boundary
    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling booking attempts");
            ctrl_c_cancel.cancel();
        }
    });

    // One task per request, each with its own browser session
    let mut handles = Vec::new();
    for request in requests {
        let config = config.clone();
        let cancel = cancel.clone();
        let skip_wait = args.skip_wait;
        handles.push(tokio::spawn(async move {
            let who = redact::username(&request.username);
            let outcome = orchestrator::run_attempt(&config, &request, skip_wait, &cancel).await;
            (who, outcome)
        }));
    }

    let mut booked = 0usize;
    let mut failed = 0usize;
    for handle in handles {
        match handle.await {
            Ok((who, Ok(outcome))) => {
                info!("{}: {}", who, outcome);
                if matches!(outcome, orchestrator::BookingOutcome::Booked { .. }) {
                    booked += 1;
                }
            }
            Ok((who, Err(e))) => {
                error!("{}: attempt failed: {:#}", who, e);
                failed += 1;
            }
            Err(e) => {
                error!("booking task panicked: {}", e);
                failed += 1;
            }
        }
    }

    info!("done: {} booked, {} failed", booked, failed);
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
