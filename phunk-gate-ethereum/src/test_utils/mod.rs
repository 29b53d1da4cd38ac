// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use alloy::transports::TransportErrorKind;
use alloy_primitives::{Bytes, U256};
use async_trait::async_trait;

use crate::{client::EthereumQueries, common::EthereumServiceError};

/// An in-memory node answering every `eth_call` with a fixed ERC-721 balance.
pub struct FakeEthereumQueries {
    balance: Option<U256>,
    calls: AtomicUsize,
    last_call: Mutex<Option<(String, Bytes, String)>>,
}

impl FakeEthereumQueries {
    /// A node reporting `balance` for every `balanceOf` call.
    pub fn with_balance(balance: u64) -> Self {
        Self {
            balance: Some(U256::from(balance)),
            calls: AtomicUsize::new(0),
            last_call: Mutex::new(None),
        }
    }

    /// A node failing every call.
    pub fn failing() -> Self {
        Self {
            balance: None,
            calls: AtomicUsize::new(0),
            last_call: Mutex::new(None),
        }
    }

    /// The number of `eth_call`s received so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The contract, call data and sender of the most recent `eth_call`.
    pub fn last_call(&self) -> Option<(String, Bytes, String)> {
        self.last_call.lock().unwrap().clone()
    }
}

#[async_trait]
impl EthereumQueries for FakeEthereumQueries {
    type Error = EthereumServiceError;

    async fn non_executive_call(
        &self,
        contract_address: &str,
        data: Bytes,
        from: &str,
    ) -> Result<Bytes, EthereumServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_call.lock().unwrap() =
            Some((contract_address.to_string(), data, from.to_string()));
        let balance = self
            .balance
            .ok_or_else(|| TransportErrorKind::custom_str("execution reverted"))?;
        Ok(Bytes::from(balance.to_be_bytes::<32>().to_vec()))
    }
}
