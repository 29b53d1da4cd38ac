// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use assert_matches::assert_matches;

use super::{fetch_owned_assets, EthscriptionsError, EthscriptionsPage, OwnedAsset};
use crate::test_utils::{owned_asset, FakeEthscriptionsApi};

const WALLET: &str = "0x78D3aAF8E3cd4B350635c79b7021bD76144C582C";

fn page_of(shas: &[&str]) -> Vec<OwnedAsset> {
    shas.iter()
        .map(|sha| owned_asset(sha, &WALLET.to_lowercase()))
        .collect()
}

#[test]
fn test_parse_bare_array() {
    let page = EthscriptionsPage::parse(br#"[{"content_sha": "0xab"}, {}]"#).unwrap();
    assert_eq!(page.assets.len(), 2);
    assert_eq!(page.assets[0].content_sha.as_deref(), Some("0xab"));
    assert_eq!(page.assets[1].content_sha, None);
    assert_eq!(page.next_page_key(), None);
}

#[test]
fn test_parse_paginated_object() {
    let body = br#"{
        "result": [{"content_sha": "0xab", "current_owner": "0x01", "mimetype": "image/png"}],
        "pagination": {"has_more": true, "page_key": "next"}
    }"#;
    let page = EthscriptionsPage::parse(body).unwrap();
    assert_eq!(page.assets.len(), 1);
    assert_eq!(page.assets[0].media_type(), Some("image/png"));
    assert_eq!(page.next_page_key(), Some("next"));
}

#[test]
fn test_parse_treats_missing_fields_as_the_last_page() {
    let page = EthscriptionsPage::parse(br#"{"result": []}"#).unwrap();
    assert!(page.assets.is_empty());
    assert_eq!(page.next_page_key(), None);

    let body = br#"{"result": [], "pagination": {"has_more": true, "page_key": ""}}"#;
    assert_eq!(EthscriptionsPage::parse(body).unwrap().next_page_key(), None);

    let body = br#"{"result": [], "pagination": {"has_more": false, "page_key": "k"}}"#;
    assert_eq!(EthscriptionsPage::parse(body).unwrap().next_page_key(), None);
}

#[test]
fn test_parse_rejects_other_shapes() {
    assert_matches!(
        EthscriptionsPage::parse(b"\"oops\""),
        Err(EthscriptionsError::Json(_))
    );
}

#[test_log::test(tokio::test)]
async fn test_fetch_follows_every_page_in_order() {
    let api = FakeEthscriptionsApi::paginated(vec![
        page_of(&["a", "b"]),
        page_of(&["c"]),
        page_of(&["a"]),
    ]);
    let fetched = fetch_owned_assets(&api, WALLET, 10).await;

    assert!(fetched.is_complete());
    assert_eq!(fetched.pages, 3);
    let shas = fetched
        .assets
        .iter()
        .filter_map(|asset| asset.content_sha.as_deref())
        .collect::<Vec<_>>();
    // Pages are concatenated without deduplication.
    assert_eq!(shas, ["a", "b", "c", "a"]);

    let owner = WALLET.to_lowercase();
    assert_eq!(
        api.requests(),
        [
            (owner.clone(), None),
            (owner.clone(), Some("page-1".to_string())),
            (owner, Some("page-2".to_string())),
        ]
    );
}

#[tokio::test]
async fn test_fetch_with_no_assets() {
    let api = FakeEthscriptionsApi::single_page(Vec::new());
    let fetched = fetch_owned_assets(&api, WALLET, 10).await;
    assert!(fetched.is_complete());
    assert_eq!(fetched.pages, 1);
    assert!(fetched.assets.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_fetch_failure_keeps_earlier_pages() {
    let api =
        FakeEthscriptionsApi::paginated(vec![page_of(&["a"]), page_of(&["b"]), page_of(&["c"])])
            .failing_at(1);
    let fetched = fetch_owned_assets(&api, WALLET, 10).await;

    assert!(!fetched.is_complete());
    assert_matches!(fetched.error, Some(EthscriptionsError::Json(_)));
    assert_eq!(fetched.pages, 1);
    assert_eq!(fetched.assets, page_of(&["a"]));
    assert_eq!(api.requests().len(), 2);
}

#[tokio::test]
async fn test_fetch_failure_on_the_first_page() {
    let api = FakeEthscriptionsApi::single_page(page_of(&["a"])).failing_at(0);
    let fetched = fetch_owned_assets(&api, WALLET, 10).await;
    assert!(fetched.assets.is_empty());
    assert_eq!(fetched.pages, 0);
    assert!(fetched.error.is_some());
}

#[test_log::test(tokio::test)]
async fn test_fetch_stops_at_the_page_limit() {
    let pages = (0..5).map(|_| page_of(&["a"])).collect();
    let api = FakeEthscriptionsApi::paginated(pages);
    let fetched = fetch_owned_assets(&api, WALLET, 2).await;

    assert_matches!(fetched.error, Some(EthscriptionsError::TooManyPages(2)));
    assert_eq!(fetched.pages, 2);
    assert_eq!(fetched.assets.len(), 2);
    assert_eq!(api.requests().len(), 2);
}

#[test]
fn test_owned_asset_helpers() {
    let mut asset = owned_asset("0xAB", "0xOwner");
    assert_eq!(asset.normalized_hash().unwrap().as_str(), "ab");
    assert!(asset.is_owned_by("0xowner"));
    assert!(!asset.is_owned_by("0xsomeone"));
    assert!(!asset.is_image());

    asset.current_owner = None;
    assert!(asset.is_owned_by("0xsomeone"));
    asset.content_uri = Some("data:image/png;base64,AAAA".to_string());
    assert!(asset.is_image());
    asset.content_sha = Some(String::new());
    assert_eq!(asset.normalized_hash(), None);
}
