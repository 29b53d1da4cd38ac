// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use phunk_gate_ethereum::{erc721::Erc721BalanceChecker, test_utils::FakeEthereumQueries};
use test_case::test_case;

use super::{GateChecker, V2_PHUNK_LABEL};
use crate::{
    ethscriptions::OwnedAsset,
    test_utils::{owned_asset, reference_sets, FakeEthscriptionsApi},
};

const WALLET: &str = "0x78d3aaf8e3cd4b350635c79b7021bd76144c582c";
const ETHER_PHUNK: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";
const MISSING_PHUNK: &str = "0x2222222222222222222222222222222222222222222222222222222222222222";
const DYSTO_PHUNK: &str = "0x3333333333333333333333333333333333333333333333333333333333333333";

fn checker(balance: u64, api: FakeEthscriptionsApi) -> GateChecker<FakeEthereumQueries> {
    GateChecker::new(
        Arc::new(reference_sets(ETHER_PHUNK, MISSING_PHUNK, DYSTO_PHUNK)),
        Arc::new(api),
        Erc721BalanceChecker::v2_phunks(Some(FakeEthereumQueries::with_balance(balance))),
    )
}

fn full_wallet() -> Vec<OwnedAsset> {
    vec![
        owned_asset(ETHER_PHUNK, WALLET),
        owned_asset(MISSING_PHUNK, WALLET),
        owned_asset(DYSTO_PHUNK, WALLET),
    ]
}

#[test_log::test(tokio::test)]
async fn test_gate_opens_when_everything_is_owned() {
    let report = checker(1, FakeEthscriptionsApi::single_page(full_wallet()))
        .check(WALLET)
        .await;
    assert!(report.all_passed);
    assert!(report.fetch_complete);
    assert_eq!(report.fetched_assets, 3);
    assert_eq!(report.fetched_pages, 1);
    let labels = report
        .checks
        .iter()
        .map(|check| check.label.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        labels,
        [V2_PHUNK_LABEL, "EtherPhunk", "Missing Phunk", "DystoPhunk"]
    );
}

#[tokio::test]
async fn test_zero_balance_fails_the_v2_check() {
    let report = checker(0, FakeEthscriptionsApi::single_page(full_wallet()))
        .check(WALLET)
        .await;
    assert!(!report.all_passed);
    let passed = report.checks.iter().map(|check| check.passed).collect::<Vec<_>>();
    assert_eq!(passed, [false, true, true, true]);
}

#[test_case(0; "without EtherPhunk")]
#[test_case(1; "without Missing Phunk")]
#[test_case(2; "without DystoPhunk")]
#[tokio::test]
async fn test_each_collection_is_required(missing: usize) {
    let mut assets = full_wallet();
    assets.remove(missing);
    let report = checker(1, FakeEthscriptionsApi::single_page(assets))
        .check(WALLET)
        .await;
    assert!(!report.all_passed);
    assert!(!report.checks[missing + 1].passed);
    assert_eq!(
        report.checks.iter().filter(|check| check.passed).count(),
        3
    );
}

#[tokio::test]
async fn test_failed_fetch_still_reports_the_partial_list() {
    let api = FakeEthscriptionsApi::paginated(vec![
        vec![owned_asset(ETHER_PHUNK, WALLET)],
        vec![owned_asset(MISSING_PHUNK, WALLET)],
    ])
    .failing_at(1);
    let (report, fetched) = checker(1, api).check_detailed(WALLET).await;
    assert!(!report.fetch_complete);
    assert!(report.fetch_error.is_some());
    assert_eq!(fetched.assets.len(), 1);
    let passed = report.checks.iter().map(|check| check.passed).collect::<Vec<_>>();
    assert_eq!(passed, [true, true, false, false]);
}

#[tokio::test]
async fn test_missing_node_fails_only_the_v2_check() {
    let checker = GateChecker::new(
        Arc::new(reference_sets(ETHER_PHUNK, MISSING_PHUNK, DYSTO_PHUNK)),
        Arc::new(FakeEthscriptionsApi::single_page(full_wallet())),
        Erc721BalanceChecker::<FakeEthereumQueries>::v2_phunks(None),
    );
    let report = checker.check(WALLET).await;
    assert!(!report.checks[0].passed);
    assert!(report.checks[1..].iter().all(|check| check.passed));
}

#[tokio::test]
async fn test_page_limit_is_applied() {
    let pages = (0..4).map(|_| Vec::new()).collect();
    let api = Arc::new(FakeEthscriptionsApi::paginated(pages));
    let checker = GateChecker::new(
        Arc::new(reference_sets(ETHER_PHUNK, MISSING_PHUNK, DYSTO_PHUNK)),
        api.clone(),
        Erc721BalanceChecker::v2_phunks(Some(FakeEthereumQueries::with_balance(1))),
    )
    .with_max_pages(2);
    let report = checker.check(WALLET).await;
    assert_eq!(report.fetched_pages, 2);
    assert!(!report.fetch_complete);
    assert_eq!(api.requests().len(), 2);
}

#[test]
fn test_report_serialization() {
    let report = super::GateReport::new(WALLET, true, &Default::default(), Vec::new());
    assert!(report.all_passed);
    assert!(report.is_for(&WALLET.to_uppercase()));
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["checks"][0]["label"], V2_PHUNK_LABEL);
    assert!(json.get("fetch_error").is_none());
}
