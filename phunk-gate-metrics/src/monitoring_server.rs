// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Debug;

use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use tokio::net::ToSocketAddrs;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// The router answering Prometheus scrapes on `/metrics`.
pub fn metrics_router() -> Router {
    Router::new().route("/metrics", get(serve_metrics))
}

/// Serves `/metrics` on `address` in a background task until `shutdown_signal` fires.
pub fn start_metrics(
    address: impl ToSocketAddrs + Debug + Send + Sync + 'static,
    shutdown_signal: CancellationToken,
) {
    let app = metrics_router();

    tokio::spawn(async move {
        let listener = match tokio::net::TcpListener::bind(&address).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Failed to bind the metrics server to {:?}: {}", address, e);
                return;
            }
        };
        if let Ok(address) = listener.local_addr() {
            info!("Starting to serve metrics on {:?}", address);
        }
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal.cancelled_owned())
            .await
        {
            error!("Error serving metrics: {}", e);
        }
    });
}

async fn serve_metrics() -> Result<String, AxumError> {
    let metric_families = prometheus::gather();
    Ok(prometheus::TextEncoder::new()
        .encode_to_string(&metric_families)
        .map_err(anyhow::Error::from)?)
}

struct AxumError(anyhow::Error);

impl IntoResponse for AxumError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Something went wrong: {}", self.0),
        )
            .into_response()
    }
}

impl<E> From<E> for AxumError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
