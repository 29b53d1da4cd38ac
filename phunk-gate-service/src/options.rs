// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Command line options and the construction of the gate from them.

use std::{path::PathBuf, sync::Arc, time::Duration};

use alloy_primitives::Address;
use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use phunk_gate_core::{
    ethscriptions::{
        HttpEthscriptionsApi, DEFAULT_ETHSCRIPTIONS_URL, DEFAULT_LEGACY_ETHSCRIPTIONS_URL,
        DEFAULT_MAX_PAGES,
    },
    gate::GateChecker,
    reference::{ReferencePaths, ReferenceSets},
};
use phunk_gate_ethereum::{
    erc721::{Erc721BalanceChecker, V2_PHUNKS_CONTRACT},
    provider::{EthereumClient, HttpProvider},
};
use tracing::{info, warn};

use crate::util;

/// The Ethereum client used outside of tests.
pub type NodeClient = EthereumClient<HttpProvider>;

#[derive(Debug, Parser)]
#[command(
    name = "phunk-gate",
    version,
    about = "Checks whether a wallet holds what it takes to pass the Phunk gate"
)]
pub struct PhunkGateOptions {
    #[command(flatten)]
    pub gate: GateOptions,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the gate for one wallet and print the checks.
    Check(CheckOptions),

    /// Serve the gate and the ethscriptions proxy over HTTP.
    Serve(ServeOptions),
}

/// Where the gate gets its data from.
#[derive(Clone, Debug, Args)]
pub struct GateOptions {
    /// The Ethereum JSON-RPC endpoint used for the V2 Phunk check. Without it, that check
    /// always fails.
    #[arg(long, env = "PHUNK_GATE_RPC_URL")]
    pub rpc_url: Option<String>,

    /// The directory holding the reference collections.
    #[arg(long, env = "PHUNK_GATE_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// The base URL of the ethscriptions indexing API.
    #[arg(long, env = "PHUNK_GATE_ETHSCRIPTIONS_URL", default_value = DEFAULT_ETHSCRIPTIONS_URL)]
    pub ethscriptions_url: String,

    /// The base URL of the legacy ethscriptions API, used by the proxy endpoint.
    #[arg(
        long,
        env = "PHUNK_GATE_LEGACY_ETHSCRIPTIONS_URL",
        default_value = DEFAULT_LEGACY_ETHSCRIPTIONS_URL
    )]
    pub legacy_ethscriptions_url: String,

    /// The ERC-721 contract a wallet must hold a token of.
    #[arg(long, env = "PHUNK_GATE_CONTRACT", default_value = V2_PHUNKS_CONTRACT)]
    pub contract: Address,

    /// The largest number of ethscription pages fetched for one wallet.
    #[arg(long, env = "PHUNK_GATE_MAX_PAGES", default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: usize,

    /// The timeout of HTTP requests, in seconds.
    #[arg(
        long = "request-timeout-secs",
        default_value = "30",
        value_parser = util::parse_secs
    )]
    pub request_timeout: Duration,
}

impl GateOptions {
    /// The HTTP client shared by the indexing API and the proxy.
    pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .context("Failed to build the HTTP client")
    }

    /// Loads the reference collections from the data directory.
    pub fn reference_sets(&self) -> ReferenceSets {
        ReferenceSets::load(&ReferencePaths::in_directory(&self.data_dir))
    }

    /// The ERC-721 balance checker, backed by the configured node if any.
    pub fn balance_checker(&self) -> anyhow::Result<Erc721BalanceChecker<NodeClient>> {
        let provider = match &self.rpc_url {
            Some(url) => Some(
                EthereumClient::new(url.clone())
                    .with_context(|| format!("Invalid Ethereum RPC URL {url}"))?,
            ),
            None => {
                warn!("No Ethereum RPC URL configured; the V2 Phunk check will fail");
                None
            }
        };
        Ok(Erc721BalanceChecker::new(provider, self.contract.to_string()))
    }

    /// Builds the gate.
    pub fn gate_checker(&self, client: reqwest::Client) -> anyhow::Result<GateChecker<NodeClient>> {
        let references = Arc::new(self.reference_sets());
        let ethscriptions = Arc::new(HttpEthscriptionsApi::with_client(
            self.ethscriptions_url.clone(),
            client,
        ));
        info!(
            ethscriptions_url = %self.ethscriptions_url,
            contract = %self.contract,
            "Gate configured"
        );
        Ok(
            GateChecker::new(references, ethscriptions, self.balance_checker()?)
                .with_max_pages(self.max_pages),
        )
    }
}

#[derive(Clone, Debug, Args)]
pub struct CheckOptions {
    /// The wallet to check.
    #[arg(long)]
    pub address: Address,

    /// Print the results without the terminal animation.
    #[arg(long)]
    pub no_animation: bool,

    /// Also print what was fetched and matched for each collection.
    #[arg(long)]
    pub debug: bool,

    /// Enter the gate once the checks are revealed.
    #[arg(long)]
    pub enter: bool,

    /// The duration of one animation step, in milliseconds.
    #[arg(long = "tick-ms", default_value = "80", value_parser = util::parse_millis)]
    pub tick: Duration,
}

#[derive(Clone, Debug, Args)]
pub struct ServeOptions {
    /// The port on which to run the server.
    #[arg(long, default_value = "8080")]
    pub port: u16,

    /// The port for prometheus to scrape.
    #[cfg(with_metrics)]
    #[arg(long, default_value = "9090")]
    pub metrics_port: u16,
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;

    use super::{Command, PhunkGateOptions};

    #[test]
    fn test_check_command() {
        let options = PhunkGateOptions::try_parse_from([
            "phunk-gate",
            "--max-pages",
            "5",
            "check",
            "--address",
            "0x78d3aaf8e3cd4b350635c79b7021bd76144c582c",
            "--no-animation",
        ])
        .unwrap();
        assert_eq!(options.gate.max_pages, 5);
        let Command::Check(check) = options.command else {
            panic!("expected the check command");
        };
        assert!(check.no_animation);
        assert!(!check.enter);
    }

    #[test]
    fn test_invalid_address_is_rejected() {
        assert!(PhunkGateOptions::try_parse_from([
            "phunk-gate",
            "check",
            "--address",
            "not-an-address",
        ])
        .is_err());
    }

    #[test]
    fn test_serve_defaults() {
        let options = PhunkGateOptions::try_parse_from(["phunk-gate", "serve"]).unwrap();
        let Command::Serve(serve) = options.command else {
            panic!("expected the serve command");
        };
        assert_eq!(serve.port, 8080);
    }
}
