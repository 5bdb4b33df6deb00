// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trough Daemon (troughd)
//!
//! Headless process that runs the feeding scheduler against the
//! dashboard backend: periodic consumption ticks, tank gauges, the
//! daily counter reset, and the snapshot refresh.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod config;

use std::path::PathBuf;
use std::time::Duration;

use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};
use trough_adapters::{HttpBackend, LogNotifier, TracedBackend};
use trough_core::{ResourceType, SystemClock};
use trough_engine::FeedingService;

use crate::config::Config;

/// How often the loop polls the timer heap
const HEARTBEAT: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let config_path = args
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("trough.toml"));

    let config = Config::load(&config_path)?;

    // Set up logging
    let _log_guard = setup_logging(&config)?;

    info!("Starting troughd against {}", config.backend_url);

    let backend = TracedBackend::new(HttpBackend::new(&config.backend_url));
    let (mut service, mut outcomes) = FeedingService::new(
        backend,
        LogNotifier,
        SystemClock,
        config.service_config(),
    );

    // A failed first fetch is tolerated: the registry starts empty and
    // the periodic refresh keeps retrying
    if let Err(e) = service.refresh().await {
        error!("Initial refresh failed: {}", e);
    }

    service.arm_daily_reset().await;
    service.arm_snapshot_refresh(config.refresh_interval);

    if config.feed.autostart {
        service.start(ResourceType::Feed).await;
    }
    if config.water.autostart {
        service.start(ResourceType::Water).await;
    }

    // Set up signal handlers
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!("Daemon ready");

    // Main event loop
    loop {
        tokio::select! {
            // Apply tick outcomes as the remote calls complete
            Some(outcome) = outcomes.recv() => {
                service.apply_outcome(outcome).await;
            }

            // Heartbeat: fire due timers
            _ = tokio::time::sleep(HEARTBEAT) => {
                service.poll_timers().await;
            }

            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
                break;
            }

            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down");
                break;
            }
        }
    }

    service.stop(ResourceType::Feed).await;
    service.stop(ResourceType::Water).await;
    info!("Daemon stopped");

    Ok(())
}

fn setup_logging(
    config: &Config,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>, std::io::Error> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = tracing_appender::rolling::never(dir, "troughd.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(non_blocking))
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
            Ok(None)
        }
    }
}
