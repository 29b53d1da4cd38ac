// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Canonical content hashes used as the join key between reference collections and a
//! wallet's ethscriptions.

#[cfg(test)]
#[path = "unit_tests/hash_tests.rs"]
mod unit_tests;

use std::fmt;

use serde::{Deserialize, Serialize};

/// The number of hex characters of a SHA-256 digest.
pub const HASH_HEX_LENGTH: usize = 64;

/// A content hash in canonical form.
///
/// The two sides of a comparison are normalized differently: reference hashes keep their
/// trailing [`HASH_HEX_LENGTH`] characters, while the `content_sha` of the indexing API only
/// loses its `0x` prefix. Both are lowercased.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedHash(String);

impl NormalizedHash {
    /// Normalizes the hash of a bundled reference asset.
    pub fn from_reference(raw: &str) -> Self {
        let lowercase = raw.to_lowercase();
        let length = lowercase.chars().count();
        let suffix = lowercase
            .chars()
            .skip(length.saturating_sub(HASH_HEX_LENGTH))
            .collect();
        NormalizedHash(suffix)
    }

    /// Normalizes the `content_sha` reported by the indexing API.
    pub fn from_content_sha(raw: &str) -> Self {
        let lowercase = raw.to_lowercase();
        match lowercase.strip_prefix("0x") {
            Some(stripped) => NormalizedHash(stripped.to_string()),
            None => NormalizedHash(lowercase),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns `true` if the reference hash and the API `content_sha` designate the same content.
pub fn matches(reference: &str, content_sha: &str) -> bool {
    NormalizedHash::from_reference(reference) == NormalizedHash::from_content_sha(content_sha)
}
