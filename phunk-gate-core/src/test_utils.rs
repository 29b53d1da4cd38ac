// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::{
    ethscriptions::{EthscriptionsApi, EthscriptionsError, EthscriptionsPage, OwnedAsset},
    reference::{ReferenceAsset, ReferenceSet, ReferenceSets},
};

/// An in-memory indexing API serving scripted pages, looked up by their page key.
pub struct FakeEthscriptionsApi {
    pages: Vec<EthscriptionsPage>,
    fail_at: Option<usize>,
    requests: Mutex<Vec<(String, Option<String>)>>,
    gate: Option<Arc<Semaphore>>,
}

impl FakeEthscriptionsApi {
    /// Serves `pages` in order, each announcing the next one by the key `page-<n>`.
    pub fn paginated(pages: Vec<Vec<OwnedAsset>>) -> Self {
        let count = pages.len();
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(index, assets)| {
                let has_more = index + 1 < count;
                EthscriptionsPage {
                    assets,
                    has_more,
                    page_key: has_more.then(|| format!("page-{}", index + 1)),
                }
            })
            .collect();
        Self {
            pages,
            fail_at: None,
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Serves a single page holding `assets`.
    pub fn single_page(assets: Vec<OwnedAsset>) -> Self {
        Self::paginated(vec![assets])
    }

    /// Makes the request with the given zero-based index fail.
    pub fn failing_at(mut self, request: usize) -> Self {
        self.fail_at = Some(request);
        self
    }

    /// Holds every request until [`Self::resume`] is called.
    pub fn paused(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Releases the requests held by [`Self::paused`].
    pub fn resume(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    /// The owner and page key of every request received so far.
    pub fn requests(&self) -> Vec<(String, Option<String>)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl EthscriptionsApi for FakeEthscriptionsApi {
    async fn fetch_page(
        &self,
        owner: &str,
        page_key: Option<&str>,
    ) -> Result<EthscriptionsPage, EthscriptionsError> {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push((owner.to_string(), page_key.map(str::to_string)));
            requests.len() - 1
        };
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.unwrap();
        }
        if self.fail_at == Some(index) {
            let error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
            return Err(EthscriptionsError::Json(error));
        }
        let page = match page_key {
            None => 0,
            Some(key) => key
                .strip_prefix("page-")
                .and_then(|number| number.parse().ok())
                .unwrap_or(usize::MAX),
        };
        Ok(self.pages.get(page).cloned().unwrap_or_default())
    }
}

/// An ethscription with the given content hash and owner.
pub fn owned_asset(content_sha: &str, owner: &str) -> OwnedAsset {
    OwnedAsset {
        content_sha: Some(content_sha.to_string()),
        current_owner: Some(owner.to_string()),
        ..OwnedAsset::default()
    }
}

/// A reference set holding the given raw hashes.
pub fn reference_set(hashes: &[&str]) -> ReferenceSet {
    let assets = hashes
        .iter()
        .map(|sha| ReferenceAsset {
            id: None,
            sha: sha.to_string(),
        })
        .collect::<Vec<_>>();
    ReferenceSet::from_assets(&assets)
}

/// Reference sets with one given hash per collection.
pub fn reference_sets(ether_phunk: &str, missing_phunk: &str, dysto_phunk: &str) -> ReferenceSets {
    ReferenceSets {
        ether_phunks: reference_set(&[ether_phunk]),
        missing_phunks: reference_set(&[missing_phunk]),
        dysto_phunks: reference_set(&[dysto_phunk]),
    }
}
