// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The HTTP service: the gate for any wallet and a proxy to the legacy ethscriptions API.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use phunk_gate_core::gate::{GateChecker, GateReport};
use phunk_gate_ethereum::{client::EthereumQueries, common::EthereumServiceError};
#[cfg(with_metrics)]
use phunk_gate_metrics::monitoring_server;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// The configuration of the HTTP service.
#[derive(Clone, Debug)]
pub struct GateServiceConfig {
    pub port: u16,
    #[cfg(with_metrics)]
    pub metrics_port: u16,
    /// The base URL of the legacy API, queried with `?owner=`.
    pub legacy_ethscriptions_url: String,
}

/// Serves the gate over HTTP.
pub struct GateService<Q> {
    checker: Arc<GateChecker<Q>>,
    client: reqwest::Client,
    config: Arc<GateServiceConfig>,
}

impl<Q> Clone for GateService<Q> {
    fn clone(&self) -> Self {
        Self {
            checker: self.checker.clone(),
            client: self.client.clone(),
            config: self.config.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwnerQuery {
    #[serde(default)]
    owner: Option<String>,
}

impl OwnerQuery {
    fn owner(self) -> Result<String, ApiError> {
        self.owner
            .filter(|owner| !owner.is_empty())
            .ok_or(ApiError::MissingOwner)
    }
}

/// The failures reported to HTTP clients.
#[derive(Debug)]
enum ApiError {
    MissingOwner,
    Upstream,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingOwner => (StatusCode::BAD_REQUEST, "Owner parameter is required"),
            ApiError::Upstream => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch ethscriptions",
            ),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl<Q> GateService<Q>
where
    Q: EthereumQueries<Error = EthereumServiceError> + Send + Sync + 'static,
{
    pub fn new(
        config: GateServiceConfig,
        checker: Arc<GateChecker<Q>>,
        client: reqwest::Client,
    ) -> Self {
        let legacy_ethscriptions_url = config
            .legacy_ethscriptions_url
            .trim_end_matches('/')
            .to_string();
        let config = GateServiceConfig {
            legacy_ethscriptions_url,
            ..config
        };
        Self {
            checker,
            client,
            config: Arc::new(config),
        }
    }

    #[cfg(with_metrics)]
    fn metrics_address(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.config.metrics_port))
    }

    /// The routes of the service.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/ethscriptions", get(Self::ethscriptions_handler))
            .route("/api/gate", get(Self::gate_handler))
            .route("/ready", get(|| async { "ready!" }))
            .with_state(self.clone())
            .layer(CorsLayer::permissive())
    }

    /// Runs the service until `cancellation_token` is cancelled.
    #[tracing::instrument(name = "GateService::run", skip_all, fields(port = self.config.port))]
    pub async fn run(self, cancellation_token: CancellationToken) -> anyhow::Result<()> {
        let port = self.config.port;

        #[cfg(with_metrics)]
        monitoring_server::start_metrics(self.metrics_address(), cancellation_token.clone());

        let app = self.router();
        let tcp_listener =
            tokio::net::TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await?;
        info!("Phunk gate listening on http://localhost:{}", port);
        axum::serve(tcp_listener, app)
            .with_graceful_shutdown(cancellation_token.cancelled_owned())
            .await?;
        Ok(())
    }

    /// Runs the gate for `?owner=`.
    async fn gate_handler(
        State(service): State<Self>,
        Query(query): Query<OwnerQuery>,
    ) -> Result<Json<GateReport>, ApiError> {
        let owner = query.owner()?;
        Ok(Json(service.checker.check(&owner).await))
    }

    /// Relays the legacy API's answer for `?owner=`.
    async fn ethscriptions_handler(
        State(service): State<Self>,
        Query(query): Query<OwnerQuery>,
    ) -> Result<Json<Value>, ApiError> {
        let owner = query.owner()?;
        let value = service.fetch_legacy(&owner).await.map_err(|error| {
            warn!(%owner, "Failed to fetch ethscriptions: {error}");
            ApiError::Upstream
        })?;
        Ok(Json(value))
    }

    async fn fetch_legacy(&self, owner: &str) -> Result<Value, reqwest::Error> {
        let url = format!("{}/ethscriptions", self.config.legacy_ethscriptions_url);
        self.client
            .get(&url)
            .query(&[("owner", owner)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}
