// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
use phunk_gate_core::{
    gate::{GateChecker, GateReport},
    test_utils::{owned_asset, reference_sets, FakeEthscriptionsApi},
};
use phunk_gate_ethereum::{erc721::Erc721BalanceChecker, test_utils::FakeEthereumQueries};
use phunk_gate_service::{GateService, GateServiceConfig};
use serde_json::{json, Value};
use test_case::test_case;

const WALLET: &str = "0x78d3aaf8e3cd4b350635c79b7021bd76144c582c";
const HASH: &str = "5555555555555555555555555555555555555555555555555555555555555555";

/// Answers like the legacy API, failing for one specific owner.
async fn legacy_api(Query(query): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    match query.get("owner").map(String::as_str) {
        Some("0xbroken") => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "message": "down" })),
        ),
        Some(owner) => (
            StatusCode::OK,
            Json(json!([{ "content_sha": format!("0x{HASH}"), "current_owner": owner }])),
        ),
        None => (StatusCode::BAD_REQUEST, Json(json!({}))),
    }
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{address}")
}

async fn spawn_service(legacy_ethscriptions_url: String) -> String {
    let checker = GateChecker::new(
        Arc::new(reference_sets(HASH, HASH, HASH)),
        Arc::new(FakeEthscriptionsApi::single_page(vec![owned_asset(HASH, WALLET)])),
        Erc721BalanceChecker::v2_phunks(Some(FakeEthereumQueries::with_balance(1))),
    );
    let config = GateServiceConfig {
        port: 0,
        #[cfg(with_metrics)]
        metrics_port: 0,
        legacy_ethscriptions_url,
    };
    let service = GateService::new(config, Arc::new(checker), reqwest::Client::new());
    spawn(service.router()).await
}

#[test_log::test(tokio::test)]
async fn test_ready() -> anyhow::Result<()> {
    let url = spawn_service("http://127.0.0.1:9".to_string()).await;
    let answer = reqwest::get(format!("{url}/ready")).await?;
    assert_eq!(answer.status(), StatusCode::OK);
    assert_eq!(answer.text().await?, "ready!");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_gate_endpoint() -> anyhow::Result<()> {
    let url = spawn_service("http://127.0.0.1:9".to_string()).await;
    let answer = reqwest::get(format!("{url}/api/gate?owner={WALLET}")).await?;
    assert_eq!(answer.status(), StatusCode::OK);
    let report = answer.json::<GateReport>().await?;
    assert!(report.is_for(WALLET));
    assert!(report.all_passed);
    assert_eq!(report.checks.len(), 4);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_ethscriptions_proxy() -> anyhow::Result<()> {
    let legacy = spawn(Router::new().route("/api/ethscriptions", get(legacy_api))).await;
    let url = spawn_service(format!("{legacy}/api/")).await;

    let answer = reqwest::get(format!("{url}/api/ethscriptions?owner={WALLET}")).await?;
    assert_eq!(answer.status(), StatusCode::OK);
    let body = answer.json::<Value>().await?;
    assert_eq!(body[0]["current_owner"], WALLET);

    let answer = reqwest::get(format!("{url}/api/ethscriptions?owner=0xbroken")).await?;
    assert_eq!(answer.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        answer.json::<Value>().await?,
        json!({ "error": "Failed to fetch ethscriptions" })
    );
    Ok(())
}

#[tokio::test]
async fn test_proxy_with_unreachable_upstream() -> anyhow::Result<()> {
    let url = spawn_service("http://127.0.0.1:9".to_string()).await;
    let answer = reqwest::get(format!("{url}/api/ethscriptions?owner={WALLET}")).await?;
    assert_eq!(answer.status(), StatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}

#[test_case("/api/ethscriptions"; "proxy")]
#[test_case("/api/ethscriptions?owner="; "proxy with empty owner")]
#[test_case("/api/gate"; "gate")]
#[tokio::test]
async fn test_owner_is_required(path: &str) -> anyhow::Result<()> {
    let url = spawn_service("http://127.0.0.1:9".to_string()).await;
    let answer = reqwest::get(format!("{url}{path}")).await?;
    assert_eq!(answer.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        answer.json::<Value>().await?,
        json!({ "error": "Owner parameter is required" })
    );
    Ok(())
}

#[tokio::test]
async fn test_cors_is_permissive() -> anyhow::Result<()> {
    let url = spawn_service("http://127.0.0.1:9".to_string()).await;
    let answer = reqwest::Client::new()
        .get(format!("{url}/ready"))
        .header("Origin", "https://example.com")
        .send()
        .await?;
    assert_eq!(
        answer
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
    Ok(())
}
