// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The terminal-style reveal of a gate report.
//!
//! The driver is a pure state machine advanced by [`PresentationDriver::tick`]. How long a
//! tick lasts is up to the caller; the driver only consumes reports that are already
//! computed and never waits on the network itself.

#[cfg(test)]
#[path = "unit_tests/presentation_tests.rs"]
mod unit_tests;

use std::fmt;

use crate::gate::GateReport;

/// The message typed on the splash screen.
pub const SPLASH_MESSAGE: &str = "You Need A Phunk";
/// Cursor toggles before typing starts.
pub const PRE_TYPING_TOGGLES: usize = 12;
/// Cursor toggles after the message is typed.
pub const POST_TYPING_TOGGLES: usize = 6;
/// The prompt shown above the checks.
pub const CHECK_PROMPT: &str = "$ ./phunk-check.sh";
/// The text revealed behind the gate.
pub const GATED_CONTENT: &str = "Welcome to the Phunk Lab.";

const LABEL_WIDTH: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SplashStage {
    PreTyping { toggles: usize },
    Typing { typed: usize },
    PostTyping { toggles: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Splash {
    pub stage: SplashStage,
    pub cursor_visible: bool,
}

impl Splash {
    fn new() -> Self {
        Splash {
            stage: SplashStage::PreTyping { toggles: 0 },
            cursor_visible: true,
        }
    }

    /// The part of [`SPLASH_MESSAGE`] typed so far.
    pub fn typed_text(&self) -> &str {
        match self.stage {
            SplashStage::PreTyping { .. } => "",
            SplashStage::Typing { typed } => {
                let end = SPLASH_MESSAGE
                    .char_indices()
                    .nth(typed)
                    .map_or(SPLASH_MESSAGE.len(), |(index, _)| index);
                &SPLASH_MESSAGE[..end]
            }
            SplashStage::PostTyping { .. } => SPLASH_MESSAGE,
        }
    }

    /// Advances the animation; returns `true` once it is over.
    fn tick(&mut self) -> bool {
        match &mut self.stage {
            SplashStage::PreTyping { toggles } => {
                self.cursor_visible = !self.cursor_visible;
                *toggles += 1;
                if *toggles >= PRE_TYPING_TOGGLES {
                    self.cursor_visible = true;
                    self.stage = SplashStage::Typing { typed: 0 };
                }
                false
            }
            SplashStage::Typing { typed } => {
                if *typed < SPLASH_MESSAGE.chars().count() {
                    *typed += 1;
                } else {
                    self.stage = SplashStage::PostTyping { toggles: 0 };
                }
                false
            }
            SplashStage::PostTyping { toggles } => {
                self.cursor_visible = !self.cursor_visible;
                *toggles += 1;
                if *toggles >= POST_TYPING_TOGGLES {
                    self.cursor_visible = true;
                    return true;
                }
                false
            }
        }
    }
}

/// Where the presentation stands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatePhase {
    Splash(Splash),
    WalletDisconnected,
    /// A wallet is connected and its report is not ready yet.
    AwaitingReport,
    /// The checks are being revealed one at a time.
    Checking {
        report: GateReport,
        index: usize,
        mark_shown: bool,
    },
    Results(GateReport),
    GatedContent(GateReport),
}

/// The mark next to a check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mark {
    Pending,
    Passed,
    Failed,
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::Pending => f.write_str("..."),
            Mark::Passed => f.write_str("✔"),
            Mark::Failed => f.write_str("✗"),
        }
    }
}

/// One visible row of the check list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckLine {
    pub label: String,
    pub mark: Mark,
}

impl fmt::Display for CheckLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<width$}{}", self.label, self.mark, width = LABEL_WIDTH)
    }
}

/// Sequences the splash screen, the check reveal and the gate.
#[derive(Clone, Debug)]
pub struct PresentationDriver {
    phase: GatePhase,
    address: Option<String>,
}

impl Default for PresentationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationDriver {
    pub fn new() -> Self {
        PresentationDriver {
            phase: GatePhase::Splash(Splash::new()),
            address: None,
        }
    }

    pub fn phase(&self) -> &GatePhase {
        &self.phase
    }

    /// The connected wallet, if any.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Advances the current animation by one step.
    pub fn tick(&mut self) {
        match &mut self.phase {
            GatePhase::Splash(splash) => {
                if splash.tick() {
                    self.finish_splash();
                }
            }
            GatePhase::Checking {
                report,
                index,
                mark_shown,
            } => {
                if !*mark_shown {
                    *mark_shown = true;
                } else if *index + 1 < report.checks.len() {
                    *index += 1;
                    *mark_shown = false;
                } else {
                    self.phase = GatePhase::Results(report.clone());
                }
            }
            GatePhase::WalletDisconnected
            | GatePhase::AwaitingReport
            | GatePhase::Results(_)
            | GatePhase::GatedContent(_) => {}
        }
    }

    /// Ends the splash screen immediately.
    pub fn skip_splash(&mut self) {
        if matches!(self.phase, GatePhase::Splash(_)) {
            self.finish_splash();
        }
    }

    fn finish_splash(&mut self) {
        self.phase = if self.address.is_some() {
            GatePhase::AwaitingReport
        } else {
            GatePhase::WalletDisconnected
        };
    }

    /// Records a wallet connection. A different wallet restarts the per-wallet phases.
    pub fn wallet_connected(&mut self, address: &str) {
        let same_wallet = self
            .address
            .as_deref()
            .is_some_and(|current| current.eq_ignore_ascii_case(address));
        if same_wallet {
            return;
        }
        self.address = Some(address.to_string());
        if !matches!(self.phase, GatePhase::Splash(_)) {
            self.phase = GatePhase::AwaitingReport;
        }
    }

    /// Records a disconnection and drops everything shown for the wallet.
    pub fn wallet_disconnected(&mut self) {
        self.address = None;
        if !matches!(self.phase, GatePhase::Splash(_)) {
            self.phase = GatePhase::WalletDisconnected;
        }
    }

    /// Starts revealing `report`. Reports of any other wallet, or arriving while no report
    /// is expected, are ignored and `false` is returned.
    pub fn report_ready(&mut self, report: GateReport) -> bool {
        let expected = matches!(self.phase, GatePhase::AwaitingReport)
            && self
                .address
                .as_deref()
                .is_some_and(|address| report.is_for(address));
        if !expected {
            return false;
        }
        self.phase = if report.checks.is_empty() {
            GatePhase::Results(report)
        } else {
            GatePhase::Checking {
                report,
                index: 0,
                mark_shown: false,
            }
        };
        true
    }

    /// Opens the gate if every check passed and the reveal is over.
    pub fn enter(&mut self) -> bool {
        match &self.phase {
            GatePhase::Results(report) if report.all_passed => {
                self.phase = GatePhase::GatedContent(report.clone());
                true
            }
            _ => false,
        }
    }

    /// The rows of the check list that are visible right now.
    pub fn visible_checks(&self) -> Vec<CheckLine> {
        let mark = |passed: bool| if passed { Mark::Passed } else { Mark::Failed };
        match &self.phase {
            GatePhase::Checking {
                report,
                index,
                mark_shown,
            } => report
                .checks
                .iter()
                .enumerate()
                .take(index + 1)
                .map(|(position, check)| CheckLine {
                    label: check.label.clone(),
                    mark: if position < *index || *mark_shown {
                        mark(check.passed)
                    } else {
                        Mark::Pending
                    },
                })
                .collect(),
            GatePhase::Results(report) | GatePhase::GatedContent(report) => report
                .checks
                .iter()
                .map(|check| CheckLine {
                    label: check.label.clone(),
                    mark: mark(check.passed),
                })
                .collect(),
            GatePhase::Splash(_) | GatePhase::WalletDisconnected | GatePhase::AwaitingReport => {
                Vec::new()
            }
        }
    }

    /// The text of the current frame.
    pub fn render_lines(&self) -> Vec<String> {
        match &self.phase {
            GatePhase::Splash(splash) => {
                let cursor = if splash.cursor_visible { "|" } else { " " };
                vec![format!("{}{}", splash.typed_text(), cursor)]
            }
            GatePhase::WalletDisconnected => vec!["Connect a wallet to continue.".to_string()],
            GatePhase::AwaitingReport => vec![CHECK_PROMPT.to_string()],
            GatePhase::Checking { .. } | GatePhase::Results(_) => std::iter::once(
                CHECK_PROMPT.to_string(),
            )
            .chain(self.visible_checks().iter().map(ToString::to_string))
            .collect(),
            GatePhase::GatedContent(_) => vec![GATED_CONTENT.to_string()],
        }
    }
}
