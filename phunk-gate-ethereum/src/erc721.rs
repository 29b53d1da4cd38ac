// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Ownership checks against ERC-721 contracts.

#[cfg(test)]
#[path = "unit_tests/erc721_tests.rs"]
mod unit_tests;

use alloy_primitives::{keccak256, Address, Bytes, U256};
use tracing::{debug, instrument, warn};

use crate::{client::EthereumQueries, common::EthereumServiceError};

/// The V2 Phunks contract, the one the gate checks by default.
pub const V2_PHUNKS_CONTRACT: &str = "0xf07468eAd8cf26c752C676E43C814FEe9c8CF402";
/// The V3 Phunks contract.
pub const V3_PHUNKS_CONTRACT: &str = "0xb7D405BEE01C70A9577316C1B9C2505F146e8842";
/// The V1 Phunks contract.
pub const V1_PHUNKS_CONTRACT: &str = "0xA82F3a61F002F83Eba7D184c50bB2a8B359cA1cE";
/// The wrapped V1 Phunks contract.
pub const WRAPPED_V1_PHUNKS_CONTRACT: &str = "0x235d49774139c218034c0571Ba8f717773eDD923";

const BALANCE_OF_SIGNATURE: &str = "balanceOf(address)";

/// Encodes the call data of `balanceOf(owner)`.
pub fn balance_of_call_data(owner: &str) -> Result<Bytes, EthereumServiceError> {
    let owner = owner.parse::<Address>()?;
    let selector = keccak256(BALANCE_OF_SIGNATURE);
    let mut data = Vec::with_capacity(4 + 32);
    data.extend_from_slice(&selector[..4]);
    data.extend_from_slice(owner.into_word().as_slice());
    Ok(data.into())
}

/// Decodes the `uint256` returned by `balanceOf`.
pub fn decode_balance(answer: &[u8]) -> Result<U256, EthereumServiceError> {
    if answer.len() != 32 {
        return Err(EthereumServiceError::EthereumParsingError(format!(
            "expected a 32-byte uint256, got {} bytes",
            answer.len()
        )));
    }
    Ok(U256::from_be_slice(answer))
}

/// Checks whether wallets hold at least one token of an ERC-721 contract.
///
/// The checker works without a node: when no provider is configured every check
/// answers `false`. Errors never escape; they are logged and count as "not owned".
pub struct Erc721BalanceChecker<Q> {
    provider: Option<Q>,
    contract_address: String,
}

impl<Q> Erc721BalanceChecker<Q>
where
    Q: EthereumQueries<Error = EthereumServiceError> + Send + Sync,
{
    /// Creates a checker for `contract_address` using `provider`, if any.
    pub fn new(provider: Option<Q>, contract_address: impl Into<String>) -> Self {
        Self {
            provider,
            contract_address: contract_address.into(),
        }
    }

    /// Creates a checker for the V2 Phunks contract.
    pub fn v2_phunks(provider: Option<Q>) -> Self {
        Self::new(provider, V2_PHUNKS_CONTRACT)
    }

    /// The contract checked by [`Self::check`].
    pub fn contract_address(&self) -> &str {
        &self.contract_address
    }

    /// Returns `true` if a provider is configured.
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Checks the configured contract for `address`.
    pub async fn check(&self, address: &str) -> bool {
        self.check_erc721_balance(address, &self.contract_address)
            .await
    }

    /// Returns `true` iff `balanceOf(address)` on `contract_address` is at least one.
    #[instrument(level = "debug", skip(self))]
    pub async fn check_erc721_balance(&self, address: &str, contract_address: &str) -> bool {
        let Some(provider) = &self.provider else {
            warn!("No Ethereum provider configured; the ERC-721 check fails");
            return false;
        };
        match Self::balance_of(provider, address, contract_address).await {
            Ok(balance) => {
                debug!(%balance, "ERC-721 balance");
                balance >= U256::from(1)
            }
            Err(error) => {
                warn!("ERC-721 balance check failed: {error}");
                false
            }
        }
    }

    async fn balance_of(
        provider: &Q,
        address: &str,
        contract_address: &str,
    ) -> Result<U256, EthereumServiceError> {
        let data = balance_of_call_data(address)?;
        let answer = provider
            .non_executive_call(contract_address, data, address)
            .await?;
        decode_balance(&answer)
    }
}
