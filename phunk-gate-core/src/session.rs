// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Tracking the connected wallet and discarding checks that finish for a stale one.

#[cfg(test)]
#[path = "unit_tests/session_tests.rs"]
mod unit_tests;

use std::sync::Arc;

use phunk_gate_ethereum::{client::EthereumQueries, common::EthereumServiceError};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::gate::{GateChecker, GateReport};

#[cfg(with_metrics)]
mod metrics {
    use std::sync::LazyLock;

    use phunk_gate_metrics::prometheus_util::register_int_counter;
    use prometheus::IntCounter;

    /// Checks whose result arrived after the wallet changed.
    pub static DISCARDED_CHECKS: LazyLock<IntCounter> = LazyLock::new(|| {
        register_int_counter(
            "discarded_checks",
            "Gate checks discarded because the wallet changed",
        )
    });
}

/// A check started for one wallet connection.
#[derive(Clone, Debug)]
pub struct CheckTicket {
    address: String,
    cancelled: CancellationToken,
}

impl CheckTicket {
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns `true` once the wallet this ticket was issued for is gone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.is_cancelled()
    }
}

/// What happened to a finished check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionUpdate {
    /// The report is now the session's current one.
    Applied(GateReport),
    /// The wallet changed while the check was running.
    Discarded,
}

#[derive(Default)]
struct SessionState {
    address: Option<String>,
    cancelled: CancellationToken,
    report: Option<GateReport>,
}

/// The gate state of a single connected wallet.
///
/// Connecting a wallet cancels the ticket of the previous one. In-flight requests keep
/// running, but their results are dropped when they complete.
pub struct WalletSession<Q> {
    checker: Arc<GateChecker<Q>>,
    state: Mutex<SessionState>,
}

impl<Q> WalletSession<Q>
where
    Q: EthereumQueries<Error = EthereumServiceError> + Send + Sync,
{
    pub fn new(checker: Arc<GateChecker<Q>>) -> Self {
        WalletSession {
            checker,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Connects `address`, replacing any previous wallet, and returns the ticket of its check.
    pub async fn connect(&self, address: &str) -> CheckTicket {
        let mut state = self.state.lock().await;
        state.cancelled.cancel();
        state.cancelled = CancellationToken::new();
        state.address = Some(address.to_string());
        state.report = None;
        info!(%address, "Wallet connected");
        CheckTicket {
            address: address.to_string(),
            cancelled: state.cancelled.clone(),
        }
    }

    /// Disconnects the current wallet and forgets its report.
    pub async fn disconnect(&self) {
        let mut state = self.state.lock().await;
        state.cancelled.cancel();
        state.cancelled = CancellationToken::new();
        state.address = None;
        state.report = None;
        info!("Wallet disconnected");
    }

    /// The connected wallet, if any.
    pub async fn address(&self) -> Option<String> {
        self.state.lock().await.address.clone()
    }

    /// The report of the connected wallet, once its check has been applied.
    pub async fn report(&self) -> Option<GateReport> {
        self.state.lock().await.report.clone()
    }

    /// Runs the check of `ticket` and applies its report unless the ticket went stale.
    pub async fn run_check(&self, ticket: CheckTicket) -> SessionUpdate {
        let report = self.checker.check(&ticket.address).await;
        self.apply(&ticket, report).await
    }

    /// Connects `address` and runs its check.
    pub async fn connect_and_check(&self, address: &str) -> SessionUpdate {
        let ticket = self.connect(address).await;
        self.run_check(ticket).await
    }

    async fn apply(&self, ticket: &CheckTicket, report: GateReport) -> SessionUpdate {
        let mut state = self.state.lock().await;
        let is_current = !ticket.is_cancelled()
            && state
                .address
                .as_deref()
                .is_some_and(|address| address.eq_ignore_ascii_case(&ticket.address));
        if !is_current {
            debug!(address = %ticket.address, "Discarding the check of a stale wallet");
            #[cfg(with_metrics)]
            metrics::DISCARDED_CHECKS.inc();
            return SessionUpdate::Discarded;
        }
        state.report = Some(report.clone());
        SessionUpdate::Applied(report)
    }
}
