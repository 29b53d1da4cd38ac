// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use tokio::signal::unix;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Listens for shutdown signals, and notifies the [`CancellationToken`] if one is
/// received.
pub async fn listen_for_shutdown_signals(shutdown_sender: CancellationToken) {
    let signals = unix::signal(unix::SignalKind::interrupt())
        .and_then(|sigint| Ok((sigint, unix::signal(unix::SignalKind::terminate())?)));
    let (mut sigint, mut sigterm) = match signals {
        Ok(signals) => signals,
        Err(error) => {
            error!("Failed to set up the shutdown signal handlers: {error}");
            return;
        }
    };

    tokio::select! {
        _ = sigint.recv() => (),
        _ = sigterm.recv() => (),
    }

    info!("Shutting down");
    shutdown_sender.cancel();
}

/// Parses a duration given in milliseconds.
pub fn parse_millis(s: &str) -> Result<Duration, std::num::ParseIntError> {
    Ok(Duration::from_millis(s.parse()?))
}

/// Parses a duration given in seconds.
pub fn parse_secs(s: &str) -> Result<Duration, std::num::ParseIntError> {
    Ok(Duration::from_secs(s.parse()?))
}
