// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy::{
    primitives::Address,
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::types::eth::request::{TransactionInput, TransactionRequest},
    transports::http::reqwest::Client,
};
use alloy_primitives::Bytes;
use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::{client::EthereumQueries, common::EthereumServiceError};

pub type HttpProvider = RootProvider<alloy::transports::http::Http<Client>>;

/// An Ethereum client backed by an alloy HTTP provider.
#[derive(Debug)]
pub struct EthereumClient<M> {
    pub provider: M,
}

#[async_trait]
impl EthereumQueries for EthereumClient<HttpProvider> {
    type Error = EthereumServiceError;

    async fn non_executive_call(
        &self,
        contract_address: &str,
        data: Bytes,
        from: &str,
    ) -> Result<Bytes, EthereumServiceError> {
        let contract_address = contract_address.parse::<Address>()?;
        let from = from.parse::<Address>()?;
        debug!(%contract_address, %from, "Sending eth_call");
        let input = TransactionInput::new(data);
        let tx = TransactionRequest::default()
            .from(from)
            .to(contract_address)
            .input(input);
        Ok(self.provider.call(&tx).await?)
    }
}

impl EthereumClient<HttpProvider> {
    /// Creates a client for the node at `url`. No request is sent until the first query.
    pub fn new(url: String) -> Result<Self, EthereumServiceError> {
        let rpc_url = Url::parse(&url)?;
        Ok(Self {
            provider: ProviderBuilder::new().on_http(rpc_url),
        })
    }
}
