use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use twitch_notify::cli::Args;
use twitch_notify::config::AppConfig;
use twitch_notify::logging::{self, LoggingOptions};
use twitch_notify::monitor::{StartupPolicy, StreamDetector, StreamMonitor};
use twitch_notify::notification::{ActionLauncher, NotificationService};
use twitch_notify::notification::events::UNKNOWN_GAME;
use twitch_notify::streamer::StreamRegistry;

#[tokio::main]
async fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version are reported as errors too
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    if let Err(e) = run(args).await {
        error!("Application error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply_to(&mut config);
    if args.detached && config.log_dir.is_none() {
        config.log_dir = AppConfig::default_log_dir();
    }
    config.validate()?;

    let _log_guard = logging::init_logging(&LoggingOptions {
        verbose: args.verbose,
        quiet: args.quiet,
        filter: config.log_filter.clone(),
        log_dir: config.log_dir.clone(),
        console: !args.detached,
    })?;

    let streams = StreamRegistry::from_names(&args.streams)?;
    println!(
        "Starting Twitch Notify for {}...",
        streams.identifiers().join(", ")
    );

    // The background copy seeds again and owns any startup announcement.
    let mut monitor_config = config.monitor_config();
    if !args.runs_in_foreground() {
        monitor_config.startup_policy = StartupPolicy::Silent;
    }

    let detector = Arc::new(StreamDetector::from_config(&config)?);
    let launcher = Arc::new(ActionLauncher::from_config(&config));
    let notifier = Arc::new(NotificationService::from_config(
        &config,
        config.actions.clone(),
        launcher,
    ));
    let mut monitor = StreamMonitor::new(monitor_config, detector, notifier, streams)?;

    println!("Getting initial status...");
    let reports = monitor.seed().await?;
    for report in reports.iter().filter(|r| r.status.is_online()) {
        let game = if report.game.is_empty() {
            UNKNOWN_GAME
        } else {
            report.game.as_str()
        };
        println!("{} is online playing {}!", report.identifier, game);
    }

    if !args.runs_in_foreground() {
        println!("Forking to background...");
        let exe = std::env::current_exe().context("failed to locate the running executable")?;
        let detached_args = args
            .detached_args()
            .context("failed to resolve paths for the background process")?;
        let pid = process_utils::spawn_detached(&exe, detached_args)
            .context("failed to start the background process")?;
        info!(pid, "Monitor detached");
        return Ok(());
    }

    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone())?;

    if let Some(dir) = &config.log_dir {
        logging::start_retention_cleanup(dir.clone(), cancel.clone());
    }

    let mut events = monitor.subscribe_events();
    let printer_cancel = cancel.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = printer_cancel.cancelled() => break,
                event = events.recv() => match event {
                    Ok(event) if event.is_user_visible() => println!("{}", event.description()),
                    Ok(event) => debug!("{}", event.description()),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        debug!(skipped = n, "Event printer lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    });

    let result = monitor.run(cancel.clone()).await;
    cancel.cancel();

    let stats = monitor.notifier().stats();
    info!(sent = stats.sent, failed = stats.failed, "Shutting down");
    result?;
    Ok(())
}

/// Cancel `cancel` on ctrl-c or SIGTERM.
fn spawn_signal_handler(cancel: CancellationToken) -> Result<()> {
    #[cfg(unix)]
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .context("failed to register SIGTERM handler")?;

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            tokio::select! {
                _ = ctrl_c => info!("Received ctrl-c, shutting down"),
                _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
            }
        }

        #[cfg(not(unix))]
        {
            ctrl_c.await.ok();
            info!("Received ctrl-c, shutting down");
        }

        cancel.cancel();
    });

    Ok(())
}
