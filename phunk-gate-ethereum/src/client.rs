// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fmt::{Debug, Display};

use alloy_primitives::Bytes;
use async_trait::async_trait;

/// The read-only queries the gate performs against an Ethereum node.
#[async_trait]
pub trait EthereumQueries {
    type Error: Debug + Display + Send;

    /// Performs an `eth_call` of `contract_address` with `data` on behalf of `from`,
    /// without creating a transaction.
    async fn non_executive_call(
        &self,
        contract_address: &str,
        data: Bytes,
        from: &str,
    ) -> Result<Bytes, Self::Error>;
}
