// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy::rpc::json_rpc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EthereumServiceError {
    /// The answer of a contract call could not be decoded
    #[error("Ethereum parsing error: {0}")]
    EthereumParsingError(String),

    /// Hex parsing error
    #[error(transparent)]
    FromHexError(#[from] alloy_primitives::hex::FromHexError),

    /// RPC error
    #[error(transparent)]
    RpcError(#[from] json_rpc::RpcError<alloy::transports::TransportErrorKind>),

    /// URL parsing error
    #[error(transparent)]
    UrlParseError(#[from] url::ParseError),
}
