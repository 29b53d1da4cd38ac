// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module provides read-only access to an Ethereum node, as needed by the gate's
//! ERC-721 ownership check.

pub mod client;
pub mod common;
pub mod erc721;
pub mod provider;

/// Helper types for tests.
#[cfg(with_testing)]
pub mod test_utils;
