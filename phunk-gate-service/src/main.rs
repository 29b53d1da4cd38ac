// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{process::ExitCode, sync::Arc};

use anyhow::Context as _;
use clap::Parser as _;
use is_terminal::IsTerminal as _;
use phunk_gate_service::{
    listen_for_shutdown_signals,
    options::{CheckOptions, Command, GateOptions, PhunkGateOptions, ServeOptions},
    terminal, GateService, GateServiceConfig,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

async fn check(gate: GateOptions, options: CheckOptions) -> anyhow::Result<ExitCode> {
    let checker = gate.gate_checker(gate.http_client()?)?;
    let stdout = std::io::stdout();
    let animate = !options.no_animation && stdout.is_terminal();
    let opened = terminal::check_wallet(&checker, &options, stdout.lock(), animate)
        .await
        .context("Failed to write to the terminal")?;
    Ok(if opened {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn serve(gate: GateOptions, options: ServeOptions) -> anyhow::Result<ExitCode> {
    let client = gate.http_client()?;
    let checker = Arc::new(gate.gate_checker(client.clone())?);
    let config = GateServiceConfig {
        port: options.port,
        #[cfg(with_metrics)]
        metrics_port: options.metrics_port,
        legacy_ethscriptions_url: gate.legacy_ethscriptions_url,
    };
    let service = GateService::new(config, checker, client);

    let cancellation_token = CancellationToken::new();
    let child_token = cancellation_token.child_token();
    tokio::spawn(listen_for_shutdown_signals(cancellation_token));
    service.run(child_token).await?;
    info!("Phunk gate stopped");
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let options = PhunkGateOptions::parse();
    phunk_gate_service::tracing::init("phunk-gate")?;

    match options.command {
        Command::Check(check_options) => check(options.gate, check_options).await,
        Command::Serve(serve_options) => serve(options.gate, serve_options).await,
    }
}
