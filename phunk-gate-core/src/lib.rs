// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module decides whether a wallet may pass the Phunk gate.
//!
//! A wallet passes when it holds a V2 Phunk ERC-721 token and at least one ethscription of
//! each of the three reference collections. Ethscription ownership is established by
//! matching content hashes reported by the indexing API against the bundled collections.

pub mod ethscriptions;
pub mod gate;
pub mod hash;
pub mod presentation;
pub mod reconciler;
pub mod reference;
pub mod session;

/// Helper types for tests.
#[cfg(with_testing)]
pub mod test_utils;

pub use crate::{
    gate::{CheckOutcome, GateChecker, GateReport},
    presentation::{GatePhase, PresentationDriver},
    reference::{Collection, ReferenceSets},
    session::{SessionUpdate, WalletSession},
};
