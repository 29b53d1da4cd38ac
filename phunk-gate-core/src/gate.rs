// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The four ownership checks of the gate, run together for one wallet.

#[cfg(test)]
#[path = "unit_tests/gate_tests.rs"]
mod unit_tests;

use std::sync::Arc;

use phunk_gate_ethereum::{
    client::EthereumQueries, common::EthereumServiceError, erc721::Erc721BalanceChecker,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    ethscriptions::{fetch_owned_assets, EthscriptionsApi, FetchedAssets, DEFAULT_MAX_PAGES},
    reconciler::{reconcile, ReconciliationResult},
    reference::ReferenceSets,
};

/// The label of the ERC-721 check.
pub const V2_PHUNK_LABEL: &str = "V2 Phunk";

#[cfg(with_metrics)]
mod metrics {
    use std::sync::LazyLock;

    use phunk_gate_metrics::prometheus_util::{
        exponential_bucket_latencies, register_histogram_vec, register_int_counter_vec,
    };
    use prometheus::{HistogramVec, IntCounterVec};

    /// Completed gate checks, by outcome.
    pub static GATE_CHECKS: LazyLock<IntCounterVec> = LazyLock::new(|| {
        register_int_counter_vec("gate_checks", "Completed gate checks", &["outcome"])
    });

    /// The duration of gate checks, in milliseconds.
    pub static GATE_CHECK_LATENCY: LazyLock<HistogramVec> = LazyLock::new(|| {
        register_histogram_vec(
            "gate_check_latency",
            "Gate check latency (ms)",
            &["outcome"],
            exponential_bucket_latencies(60_000.0),
        )
    });
}

/// The outcome of one of the four checks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub label: String,
    pub passed: bool,
}

/// Everything the gate decided for one wallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateReport {
    pub address: String,
    /// The V2 Phunk check followed by one check per collection, in display order.
    pub checks: Vec<CheckOutcome>,
    pub collections: Vec<ReconciliationResult>,
    pub fetched_assets: usize,
    pub fetched_pages: usize,
    pub fetch_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<String>,
    pub all_passed: bool,
}

impl GateReport {
    pub fn new(
        address: &str,
        owns_erc721: bool,
        fetched: &FetchedAssets,
        collections: Vec<ReconciliationResult>,
    ) -> Self {
        let checks = std::iter::once(CheckOutcome {
            label: V2_PHUNK_LABEL.to_string(),
            passed: owns_erc721,
        })
        .chain(collections.iter().map(|result| CheckOutcome {
            label: result.label.clone(),
            passed: result.owned,
        }))
        .collect::<Vec<_>>();
        let all_passed = checks.iter().all(|check| check.passed);
        GateReport {
            address: address.to_string(),
            checks,
            collections,
            fetched_assets: fetched.assets.len(),
            fetched_pages: fetched.pages,
            fetch_complete: fetched.is_complete(),
            fetch_error: fetched.error.as_ref().map(ToString::to_string),
            all_passed,
        }
    }

    /// Returns `true` if `address` is the wallet of this report.
    pub fn is_for(&self, address: &str) -> bool {
        self.address.eq_ignore_ascii_case(address)
    }
}

/// Runs the gate's checks against shared reference data.
pub struct GateChecker<Q> {
    references: Arc<ReferenceSets>,
    ethscriptions: Arc<dyn EthscriptionsApi>,
    balance_checker: Erc721BalanceChecker<Q>,
    max_pages: usize,
}

impl<Q> GateChecker<Q>
where
    Q: EthereumQueries<Error = EthereumServiceError> + Send + Sync,
{
    pub fn new(
        references: Arc<ReferenceSets>,
        ethscriptions: Arc<dyn EthscriptionsApi>,
        balance_checker: Erc721BalanceChecker<Q>,
    ) -> Self {
        GateChecker {
            references,
            ethscriptions,
            balance_checker,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Limits the number of pages fetched per wallet.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn references(&self) -> &ReferenceSets {
        &self.references
    }

    pub fn balance_checker(&self) -> &Erc721BalanceChecker<Q> {
        &self.balance_checker
    }

    /// Runs all checks for `address`.
    pub async fn check(&self, address: &str) -> GateReport {
        self.check_detailed(address).await.0
    }

    /// Runs all checks for `address` and also returns the fetched ethscriptions.
    ///
    /// The balance check and the fetch run concurrently; matching starts once both are done.
    #[instrument(skip(self))]
    pub async fn check_detailed(&self, address: &str) -> (GateReport, FetchedAssets) {
        #[cfg(with_metrics)]
        let start = std::time::Instant::now();
        let (owns_erc721, fetched) = futures::join!(
            self.balance_checker.check(address),
            fetch_owned_assets(self.ethscriptions.as_ref(), address, self.max_pages),
        );
        let collections = reconcile(address, &fetched.assets, &self.references);
        let report = GateReport::new(address, owns_erc721, &fetched, collections);

        #[cfg(with_metrics)]
        {
            let outcome = if report.all_passed { "open" } else { "closed" };
            metrics::GATE_CHECKS.with_label_values(&[outcome]).inc();
            metrics::GATE_CHECK_LATENCY
                .with_label_values(&[outcome])
                .observe(start.elapsed().as_secs_f64() * 1000.0);
        }
        info!(
            all_passed = report.all_passed,
            fetched_assets = report.fetched_assets,
            "Gate check finished"
        );
        (report, fetched)
    }
}
