// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The bundled reference collections, loaded once into membership sets.

#[cfg(test)]
#[path = "unit_tests/reference_tests.rs"]
mod unit_tests;

use std::{
    collections::HashSet,
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::hash::NormalizedHash;

/// The name of the list field in the bundled collection files.
pub const COLLECTION_ITEMS_FIELD: &str = "collection_items";

/// The ethscription collections a wallet must hold an item of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Collection {
    EtherPhunks,
    MissingPhunks,
    DystoPhunks,
}

impl Collection {
    /// All collections, in the order the gate displays them.
    pub const ALL: [Collection; 3] = [
        Collection::EtherPhunks,
        Collection::MissingPhunks,
        Collection::DystoPhunks,
    ];

    /// The label shown for the collection's check.
    pub fn label(&self) -> &'static str {
        match self {
            Collection::EtherPhunks => "EtherPhunk",
            Collection::MissingPhunks => "Missing Phunk",
            Collection::DystoPhunks => "DystoPhunk",
        }
    }

    /// The file name of the collection inside the data directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Collection::EtherPhunks => "ether-phunks.json",
            Collection::MissingPhunks => "missing-phunks.json",
            Collection::DystoPhunks => "dysto-phunks.json",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The fields holding the content hash of an entry, by order of preference.
const HASH_FIELDS: [&str; 3] = ["sha", "content_sha", "contentHash"];

/// One entry of a bundled collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceAsset {
    /// Numeric in some files and textual in others. Never used for matching.
    pub id: Option<Value>,
    pub sha: String,
}

impl ReferenceAsset {
    /// Reads an entry. Only the hash is required; every other field is ignored.
    pub fn from_json_value(item: &Value) -> Option<Self> {
        let sha = HASH_FIELDS.iter().find_map(|field| {
            item.get(field)
                .and_then(Value::as_str)
                .filter(|sha| !sha.is_empty())
        })?;
        Some(ReferenceAsset {
            id: item.get("id").cloned(),
            sha: sha.to_string(),
        })
    }
}

/// The reasons a collection file yields no entries.
#[derive(Debug, Error)]
pub enum ReferenceDataError {
    #[error("failed to read the collection file: {0}")]
    Io(#[from] std::io::Error),

    #[error("the collection file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("the collection has no `{COLLECTION_ITEMS_FIELD}` list")]
    MissingItems,
}

/// The normalized hashes of one reference collection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferenceSet {
    hashes: HashSet<NormalizedHash>,
}

impl ReferenceSet {
    /// Builds the set from the reference assets.
    pub fn from_assets<'a>(assets: impl IntoIterator<Item = &'a ReferenceAsset>) -> Self {
        let hashes = assets
            .into_iter()
            .filter(|asset| !asset.sha.is_empty())
            .map(|asset| NormalizedHash::from_reference(&asset.sha))
            .collect();
        ReferenceSet { hashes }
    }

    /// Parses the `collection_items` of a collection document.
    ///
    /// Entries without a usable hash are skipped.
    pub fn try_from_json_value(value: &Value) -> Result<Self, ReferenceDataError> {
        let items = value
            .get(COLLECTION_ITEMS_FIELD)
            .and_then(Value::as_array)
            .ok_or(ReferenceDataError::MissingItems)?;
        let mut skipped = 0;
        let assets = items
            .iter()
            .filter_map(|item| {
                let asset = ReferenceAsset::from_json_value(item);
                if asset.is_none() {
                    skipped += 1;
                }
                asset
            })
            .collect::<Vec<_>>();
        if skipped > 0 {
            debug!("Skipped {skipped} collection items without a hash");
        }
        Ok(Self::from_assets(&assets))
    }

    /// Like [`Self::try_from_json_value`], but malformed data yields an empty set.
    pub fn from_json_value(collection: Collection, value: &Value) -> Self {
        Self::try_from_json_value(value).unwrap_or_else(|error| {
            warn!(%collection, "Ignoring reference data: {error}");
            Self::default()
        })
    }

    /// Parses a collection document; malformed data yields an empty set.
    pub fn from_json_str(collection: Collection, json: &str) -> Self {
        match serde_json::from_str::<Value>(json) {
            Ok(value) => Self::from_json_value(collection, &value),
            Err(error) => {
                warn!(%collection, "Ignoring reference data: {}", ReferenceDataError::from(error));
                Self::default()
            }
        }
    }

    /// Reads a collection file; a missing or malformed file yields an empty set.
    pub fn from_path(collection: Collection, path: &Path) -> Self {
        match fs_err::read_to_string(path) {
            Ok(json) => Self::from_json_str(collection, &json),
            Err(error) => {
                warn!(%collection, "Ignoring reference data: {}", ReferenceDataError::from(error));
                Self::default()
            }
        }
    }

    pub fn contains(&self, hash: &NormalizedHash) -> bool {
        self.hashes.contains(hash)
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

/// Where the three collection files live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferencePaths {
    pub ether_phunks: PathBuf,
    pub missing_phunks: PathBuf,
    pub dysto_phunks: PathBuf,
}

impl ReferencePaths {
    /// The standard file names inside `data_dir`.
    pub fn in_directory(data_dir: &Path) -> Self {
        ReferencePaths {
            ether_phunks: data_dir.join(Collection::EtherPhunks.file_name()),
            missing_phunks: data_dir.join(Collection::MissingPhunks.file_name()),
            dysto_phunks: data_dir.join(Collection::DystoPhunks.file_name()),
        }
    }

    pub fn path(&self, collection: Collection) -> &Path {
        match collection {
            Collection::EtherPhunks => &self.ether_phunks,
            Collection::MissingPhunks => &self.missing_phunks,
            Collection::DystoPhunks => &self.dysto_phunks,
        }
    }
}

/// The reference sets of all collections. Built once and shared by every check.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferenceSets {
    pub ether_phunks: ReferenceSet,
    pub missing_phunks: ReferenceSet,
    pub dysto_phunks: ReferenceSet,
}

impl ReferenceSets {
    /// Loads the three collection files. Never fails: unreadable files give empty sets.
    pub fn load(paths: &ReferencePaths) -> Self {
        let sets = ReferenceSets {
            ether_phunks: ReferenceSet::from_path(
                Collection::EtherPhunks,
                paths.path(Collection::EtherPhunks),
            ),
            missing_phunks: ReferenceSet::from_path(
                Collection::MissingPhunks,
                paths.path(Collection::MissingPhunks),
            ),
            dysto_phunks: ReferenceSet::from_path(
                Collection::DystoPhunks,
                paths.path(Collection::DystoPhunks),
            ),
        };
        info!(
            ether_phunks = sets.ether_phunks.len(),
            missing_phunks = sets.missing_phunks.len(),
            dysto_phunks = sets.dysto_phunks.len(),
            "Loaded reference collections"
        );
        sets
    }

    pub fn get(&self, collection: Collection) -> &ReferenceSet {
        match collection {
            Collection::EtherPhunks => &self.ether_phunks,
            Collection::MissingPhunks => &self.missing_phunks,
            Collection::DystoPhunks => &self.dysto_phunks,
        }
    }

    /// Iterates over the collections and their sets in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Collection, &ReferenceSet)> {
        Collection::ALL
            .into_iter()
            .map(move |collection| (collection, self.get(collection)))
    }

    /// Returns `true` if `hash` belongs to any collection.
    pub fn contains_any(&self, hash: &NormalizedHash) -> bool {
        self.iter().any(|(_, set)| set.contains(hash))
    }
}
