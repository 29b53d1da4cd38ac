// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Fetching the ethscriptions owned by a wallet from the paginated indexing API.

#[cfg(test)]
#[path = "unit_tests/ethscriptions_tests.rs"]
mod unit_tests;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::hash::NormalizedHash;

/// The public ethscriptions indexer.
pub const DEFAULT_ETHSCRIPTIONS_URL: &str = "https://api.ethscriptions.com/v2";
/// The previous generation of the indexer, queried by `owner`.
pub const DEFAULT_LEGACY_ETHSCRIPTIONS_URL: &str = "https://api.ethscriptions.com/api";
/// The largest number of pages fetched for a single wallet.
pub const DEFAULT_MAX_PAGES: usize = 1_000;
/// The timeout of a single page request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const OWNER_QUERY_PARAMETER: &str = "current_owner";
const PAGE_KEY_QUERY_PARAMETER: &str = "page_key";
const IMAGE_URI_PREFIX: &str = "data:image";

#[cfg(with_metrics)]
mod metrics {
    use std::sync::LazyLock;

    use phunk_gate_metrics::prometheus_util::{register_int_counter, register_int_counter_vec};
    use prometheus::{IntCounter, IntCounterVec};

    /// Pages received from the indexing API.
    pub static ETHSCRIPTIONS_PAGES: LazyLock<IntCounter> = LazyLock::new(|| {
        register_int_counter(
            "ethscriptions_pages",
            "Pages fetched from the ethscriptions API",
        )
    });

    /// Page requests that failed.
    pub static ETHSCRIPTIONS_FAILURES: LazyLock<IntCounterVec> = LazyLock::new(|| {
        register_int_counter_vec(
            "ethscriptions_failures",
            "Failed requests to the ethscriptions API",
            &["reason"],
        )
    });
}

/// An ethscription as reported by the indexing API.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedAsset {
    #[serde(default)]
    pub content_sha: Option<String>,
    #[serde(default)]
    pub current_owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}

impl OwnedAsset {
    /// The normalized content hash, if the API reported a non-empty one.
    pub fn normalized_hash(&self) -> Option<NormalizedHash> {
        self.content_sha
            .as_deref()
            .filter(|sha| !sha.is_empty())
            .map(NormalizedHash::from_content_sha)
    }

    /// Returns `true` unless the asset names an owner other than `address`.
    pub fn is_owned_by(&self, address: &str) -> bool {
        self.current_owner
            .as_deref()
            .map_or(true, |owner| owner.eq_ignore_ascii_case(address))
    }

    /// Returns `true` if the content is an inline image.
    pub fn is_image(&self) -> bool {
        self.content_uri
            .as_deref()
            .is_some_and(|uri| uri.starts_with(IMAGE_URI_PREFIX))
    }

    /// The media type, whichever field the API filled in.
    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref().or(self.mimetype.as_deref())
    }
}

/// The pagination metadata of a page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
struct Pagination {
    #[serde(default)]
    has_more: Option<bool>,
    #[serde(default)]
    page_key: Option<String>,
}

/// The two shapes an API answer can take.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPage {
    Bare(Vec<OwnedAsset>),
    Paginated {
        #[serde(default)]
        result: Option<Vec<OwnedAsset>>,
        #[serde(default)]
        pagination: Option<Pagination>,
    },
}

/// One page of a wallet's ethscriptions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EthscriptionsPage {
    pub assets: Vec<OwnedAsset>,
    pub has_more: bool,
    pub page_key: Option<String>,
}

impl EthscriptionsPage {
    /// Parses an API answer: either a bare array or a `{ result, pagination }` object.
    pub fn parse(body: &[u8]) -> Result<Self, EthscriptionsError> {
        let page = match serde_json::from_slice::<RawPage>(body)? {
            RawPage::Bare(assets) => EthscriptionsPage {
                assets,
                has_more: false,
                page_key: None,
            },
            RawPage::Paginated { result, pagination } => {
                let pagination = pagination.unwrap_or_default();
                EthscriptionsPage {
                    assets: result.unwrap_or_default(),
                    has_more: pagination.has_more.unwrap_or(false),
                    page_key: pagination.page_key,
                }
            }
        };
        Ok(page)
    }

    /// The token of the next page, if the API announced one.
    pub fn next_page_key(&self) -> Option<&str> {
        if self.has_more {
            self.page_key.as_deref().filter(|key| !key.is_empty())
        } else {
            None
        }
    }
}

#[derive(Debug, Error)]
pub enum EthscriptionsError {
    #[error("request to the ethscriptions API failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid answer from the ethscriptions API: {0}")]
    Json(#[from] serde_json::Error),

    #[error("gave up after {0} pages")]
    TooManyPages(usize),
}

impl EthscriptionsError {
    #[cfg(with_metrics)]
    fn reason(&self) -> &'static str {
        match self {
            EthscriptionsError::Request(_) => "request",
            EthscriptionsError::Json(_) => "json",
            EthscriptionsError::TooManyPages(_) => "too_many_pages",
        }
    }
}

/// A source of ethscription pages.
#[async_trait]
pub trait EthscriptionsApi: Send + Sync {
    /// Fetches the page of `owner`'s ethscriptions following `page_key`, or the first page.
    async fn fetch_page(
        &self,
        owner: &str,
        page_key: Option<&str>,
    ) -> Result<EthscriptionsPage, EthscriptionsError>;
}

/// The indexing API over HTTP.
#[derive(Clone, Debug)]
pub struct HttpEthscriptionsApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpEthscriptionsApi {
    /// Creates a client for the API at `base_url`, e.g. [`DEFAULT_ETHSCRIPTIONS_URL`].
    pub fn new(base_url: impl Into<String>) -> Result<Self, EthscriptionsError> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl EthscriptionsApi for HttpEthscriptionsApi {
    async fn fetch_page(
        &self,
        owner: &str,
        page_key: Option<&str>,
    ) -> Result<EthscriptionsPage, EthscriptionsError> {
        let url = format!("{}/ethscriptions", self.base_url);
        let mut query = vec![(OWNER_QUERY_PARAMETER, owner)];
        if let Some(page_key) = page_key {
            query.push((PAGE_KEY_QUERY_PARAMETER, page_key));
        }
        debug!(%url, ?page_key, "Fetching ethscriptions page");
        let body = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        EthscriptionsPage::parse(&body)
    }
}

/// Everything fetched for one wallet.
#[derive(Debug, Default)]
pub struct FetchedAssets {
    /// The concatenated pages, in the order they were received.
    pub assets: Vec<OwnedAsset>,
    /// The number of pages received.
    pub pages: usize,
    /// The failure that ended the fetch early, if any.
    pub error: Option<EthscriptionsError>,
}

impl FetchedAssets {
    /// Returns `true` if the last page was reached.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Fetches every page of `address`'s ethscriptions.
///
/// Pages are concatenated without deduplication. A failure ends the loop and the pages
/// received so far are kept, so callers see a partial list instead of an error.
#[instrument(level = "debug", skip(api))]
pub async fn fetch_owned_assets<A>(api: &A, address: &str, max_pages: usize) -> FetchedAssets
where
    A: EthscriptionsApi + ?Sized,
{
    let owner = address.to_lowercase();
    let mut fetched = FetchedAssets::default();
    let mut page_key: Option<String> = None;
    loop {
        let page = match api.fetch_page(&owner, page_key.as_deref()).await {
            Ok(page) => page,
            Err(error) => {
                warn!(pages = fetched.pages, "Fetching ethscriptions failed: {error}");
                #[cfg(with_metrics)]
                metrics::ETHSCRIPTIONS_FAILURES
                    .with_label_values(&[error.reason()])
                    .inc();
                fetched.error = Some(error);
                return fetched;
            }
        };
        fetched.pages += 1;
        #[cfg(with_metrics)]
        metrics::ETHSCRIPTIONS_PAGES.inc();

        let next_page_key = page.next_page_key().map(str::to_string);
        fetched.assets.extend(page.assets);
        match next_page_key {
            None => break,
            Some(_) if fetched.pages >= max_pages => {
                warn!(max_pages, "The ethscriptions API keeps announcing more pages");
                let error = EthscriptionsError::TooManyPages(max_pages);
                #[cfg(with_metrics)]
                metrics::ETHSCRIPTIONS_FAILURES
                    .with_label_values(&[error.reason()])
                    .inc();
                fetched.error = Some(error);
                break;
            }
            Some(key) => page_key = Some(key),
        }
    }
    debug!(
        pages = fetched.pages,
        assets = fetched.assets.len(),
        "Fetched ethscriptions"
    );
    fetched
}
