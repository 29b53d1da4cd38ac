// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{sync::Arc, time::Duration};

use alloy_primitives::Address;
use phunk_gate_core::{
    ethscriptions::OwnedAsset,
    gate::GateChecker,
    presentation::{CHECK_PROMPT, GATED_CONTENT, SPLASH_MESSAGE},
    test_utils::{owned_asset, reference_sets, FakeEthscriptionsApi},
};
use phunk_gate_ethereum::{erc721::Erc721BalanceChecker, test_utils::FakeEthereumQueries};
use phunk_gate_service::{
    options::CheckOptions,
    terminal::{check_wallet, GATE_CLOSED},
};

const WALLET: &str = "0x78d3aaf8e3cd4b350635c79b7021bd76144c582c";
const ETHER_PHUNK: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";
const MISSING_PHUNK: &str = "0x2222222222222222222222222222222222222222222222222222222222222222";
const DYSTO_PHUNK: &str = "0x3333333333333333333333333333333333333333333333333333333333333333";

fn checker(balance: u64, assets: Vec<OwnedAsset>) -> GateChecker<FakeEthereumQueries> {
    GateChecker::new(
        Arc::new(reference_sets(ETHER_PHUNK, MISSING_PHUNK, DYSTO_PHUNK)),
        Arc::new(FakeEthscriptionsApi::single_page(assets)),
        Erc721BalanceChecker::v2_phunks(Some(FakeEthereumQueries::with_balance(balance))),
    )
}

fn full_wallet() -> Vec<OwnedAsset> {
    let mut image = owned_asset(DYSTO_PHUNK, WALLET);
    image.content_uri = Some("data:image/png;base64,AAAA".to_string());
    image.mimetype = Some("image/png".to_string());
    image.transaction_hash = Some("0xfeed".to_string());
    vec![
        owned_asset(ETHER_PHUNK, WALLET),
        owned_asset(MISSING_PHUNK, WALLET),
        image,
    ]
}

fn options(enter: bool, debug: bool) -> CheckOptions {
    CheckOptions {
        address: WALLET.parse::<Address>().unwrap(),
        no_animation: true,
        debug,
        enter,
        tick: Duration::from_millis(80),
    }
}

#[test_log::test(tokio::test)]
async fn test_plain_output() -> anyhow::Result<()> {
    let mut out = Vec::new();
    let opened = check_wallet(&checker(1, full_wallet()), &options(false, false), &mut out, false)
        .await?;
    assert!(opened);
    let output = String::from_utf8(out)?;
    let lines = output.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], CHECK_PROMPT);
    assert!(lines[1..].iter().all(|line| line.ends_with('✔')));
    assert!(!output.contains('\x1b'));
    Ok(())
}

#[tokio::test]
async fn test_enter_opens_the_gate() -> anyhow::Result<()> {
    let mut out = Vec::new();
    check_wallet(&checker(1, full_wallet()), &options(true, false), &mut out, false).await?;
    let output = String::from_utf8(out)?;
    assert_eq!(output.lines().last(), Some(GATED_CONTENT));
    Ok(())
}

#[tokio::test]
async fn test_enter_with_a_failed_check() -> anyhow::Result<()> {
    let mut out = Vec::new();
    let opened =
        check_wallet(&checker(0, full_wallet()), &options(true, false), &mut out, false).await?;
    assert!(!opened);
    let output = String::from_utf8(out)?;
    assert!(output.lines().nth(1).is_some_and(|line| line.ends_with('✗')));
    assert_eq!(output.lines().last(), Some(GATE_CLOSED));
    Ok(())
}

#[tokio::test]
async fn test_debug_output() -> anyhow::Result<()> {
    let mut out = Vec::new();
    check_wallet(&checker(1, full_wallet()), &options(false, true), &mut out, false).await?;
    let output = String::from_utf8(out)?;
    assert!(output.contains("Fetched 3 ethscriptions in 1 page(s)"));
    assert!(output.contains("Missing Phunk: 1 matched"));
    assert!(output.contains("Phunk images: 1"));
    assert!(output.contains("0xfeed (image/png)"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_animated_output() -> anyhow::Result<()> {
    let mut out = Vec::new();
    let opened =
        check_wallet(&checker(1, full_wallet()), &options(false, false), &mut out, true).await?;
    assert!(opened);
    let output = String::from_utf8(out)?;
    assert!(output.contains(&format!("{SPLASH_MESSAGE}|")));
    // Frames are redrawn in place.
    assert!(output.contains("\x1b[1F\x1b[J"));
    assert!(output.trim_end().ends_with('✔'));
    Ok(())
}
