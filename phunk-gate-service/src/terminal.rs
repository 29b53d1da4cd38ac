// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Playing the gate in a terminal.

use std::{
    future::Future,
    io::{self, Write},
    time::Duration,
};

use phunk_gate_core::{
    ethscriptions::{FetchedAssets, OwnedAsset},
    gate::{GateChecker, GateReport},
    presentation::{GatePhase, PresentationDriver},
    reconciler::phunk_images,
    reference::ReferenceSets,
};
use phunk_gate_ethereum::{client::EthereumQueries, common::EthereumServiceError};
use tracing::debug;

use crate::options::CheckOptions;

/// Printed when `--enter` is given but a check failed.
pub const GATE_CLOSED: &str = "The gate stays closed.";

/// Draws the frames of a [`PresentationDriver`].
///
/// When animated, each frame replaces the previous one and steps are paced by `tick`.
/// Otherwise only the frames that matter are printed, one after the other.
pub struct Terminal<W> {
    out: W,
    animate: bool,
    tick: Duration,
    drawn_lines: usize,
}

impl<W: Write> Terminal<W> {
    pub fn new(out: W, animate: bool, tick: Duration) -> Self {
        Self {
            out,
            animate,
            tick,
            drawn_lines: 0,
        }
    }

    /// Draws the current frame of `driver`.
    pub fn draw(&mut self, driver: &PresentationDriver) -> io::Result<()> {
        if self.animate && self.drawn_lines > 0 {
            // Move to the start of the previous frame and clear it.
            write!(self.out, "\x1b[{}F\x1b[J", self.drawn_lines)?;
        }
        let lines = driver.render_lines();
        for line in &lines {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()?;
        self.drawn_lines = lines.len();
        Ok(())
    }

    /// Prints a line below the current frame, which is then left alone.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "{line}")?;
        self.drawn_lines = 0;
        Ok(())
    }

    /// Plays the splash screen while `check` runs, then reveals its report.
    pub async fn reveal<F, T>(
        &mut self,
        driver: &mut PresentationDriver,
        check: F,
    ) -> io::Result<(GateReport, T)>
    where
        F: Future<Output = (GateReport, T)>,
    {
        let (report, extra) = if self.animate {
            let splash = async {
                while matches!(driver.phase(), GatePhase::Splash(_)) {
                    self.draw(driver)?;
                    tokio::time::sleep(self.tick).await;
                    driver.tick();
                }
                Ok::<_, io::Error>(())
            };
            let (splash, outcome) = futures::join!(splash, check);
            splash?;
            outcome
        } else {
            driver.skip_splash();
            check.await
        };

        if !driver.report_ready(report.clone()) {
            debug!(address = %report.address, "The report does not match the connected wallet");
        }
        while matches!(driver.phase(), GatePhase::Checking { .. }) {
            if self.animate {
                self.draw(driver)?;
                tokio::time::sleep(self.tick).await;
            }
            driver.tick();
        }
        self.draw(driver)?;
        Ok((report, extra))
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Describes what was fetched and matched, for `--debug`.
pub fn debug_lines(
    report: &GateReport,
    fetched: &FetchedAssets,
    references: &ReferenceSets,
) -> Vec<String> {
    let mut lines = vec![format!(
        "Fetched {} ethscriptions in {} page(s)",
        report.fetched_assets, report.fetched_pages
    )];
    if let Some(error) = &report.fetch_error {
        lines.push(format!("  incomplete: {error}"));
    }
    for collection in &report.collections {
        lines.push(format!(
            "{}: {} matched",
            collection.label,
            collection.matched_assets.len()
        ));
        for asset in &collection.matched_assets {
            lines.push(format!("  {}", asset_name(asset)));
        }
    }
    let images = phunk_images(&fetched.assets, references);
    lines.push(format!("Phunk images: {}", images.len()));
    for image in images {
        lines.push(format!(
            "  {} ({})",
            asset_name(image),
            image.media_type().unwrap_or("unknown")
        ));
    }
    lines
}

fn asset_name(asset: &OwnedAsset) -> &str {
    asset
        .transaction_hash
        .as_deref()
        .or(asset.content_sha.as_deref())
        .unwrap_or("?")
}

/// Runs the `check` command and returns `true` if the gate opens.
pub async fn check_wallet<Q, W>(
    checker: &GateChecker<Q>,
    options: &CheckOptions,
    out: W,
    animate: bool,
) -> io::Result<bool>
where
    Q: EthereumQueries<Error = EthereumServiceError> + Send + Sync,
    W: Write,
{
    let address = options.address.to_string();
    let mut driver = PresentationDriver::new();
    driver.wallet_connected(&address);
    let mut terminal = Terminal::new(out, animate, options.tick);
    let (report, fetched) = terminal
        .reveal(&mut driver, checker.check_detailed(&address))
        .await?;

    if options.debug {
        for line in debug_lines(&report, &fetched, checker.references()) {
            terminal.write_line(&line)?;
        }
    }
    if options.enter {
        if driver.enter() {
            terminal.draw(&driver)?;
        } else {
            terminal.write_line(GATE_CLOSED)?;
        }
    }
    Ok(report.all_passed)
}
