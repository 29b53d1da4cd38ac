// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Matching a wallet's ethscriptions against the reference collections.

#[cfg(test)]
#[path = "unit_tests/reconciler_tests.rs"]
mod unit_tests;

use serde::{Deserialize, Serialize};

use crate::{
    ethscriptions::OwnedAsset,
    reference::{Collection, ReferenceSets},
};

/// Whether a wallet holds an item of one collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub collection: Collection,
    pub label: String,
    pub owned: bool,
    /// The wallet's assets belonging to the collection, in feed order.
    pub matched_assets: Vec<OwnedAsset>,
}

/// Computes, for every collection, the assets of `owned` that belong to it.
///
/// An asset counts when its normalized hash is in the collection's set and its owner, if
/// reported, is `address`. Each asset costs one hash lookup per collection.
pub fn reconcile(
    address: &str,
    owned: &[OwnedAsset],
    references: &ReferenceSets,
) -> Vec<ReconciliationResult> {
    let candidates = owned
        .iter()
        .filter(|asset| asset.is_owned_by(address))
        .filter_map(|asset| Some((asset.normalized_hash()?, asset)))
        .collect::<Vec<_>>();

    references
        .iter()
        .map(|(collection, set)| {
            let matched_assets = candidates
                .iter()
                .filter(|(hash, _)| set.contains(hash))
                .map(|(_, asset)| (*asset).clone())
                .collect::<Vec<_>>();
            ReconciliationResult {
                collection,
                label: collection.label().to_string(),
                owned: !matched_assets.is_empty(),
                matched_assets,
            }
        })
        .collect()
}

/// The wallet's inline images that belong to any reference collection.
pub fn phunk_images<'a>(
    owned: &'a [OwnedAsset],
    references: &ReferenceSets,
) -> Vec<&'a OwnedAsset> {
    owned
        .iter()
        .filter(|asset| asset.is_image())
        .filter(|asset| {
            asset
                .normalized_hash()
                .is_some_and(|hash| references.contains_any(&hash))
        })
        .collect()
}
