// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module provides unified handling for tracing subscribers within the gate's binaries.

use std::{
    env,
    fs::{File, OpenOptions},
    path::Path,
    sync::Arc,
};

use anyhow::{bail, Context as _};
use is_terminal::IsTerminal as _;
use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{
        self,
        format::{FmtSpan, Format, Full},
        time::FormatTime,
        FormatFields, MakeWriter,
    },
    layer::{Layer, SubscriberExt as _},
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Initializes tracing in a standard way.
///
/// The environment variables `RUST_LOG`, `RUST_LOG_SPAN_EVENTS`, and `RUST_LOG_FORMAT`
/// can be used to control the verbosity, the span event verbosity, and the output format,
/// respectively.
///
/// The `PHUNK_GATE_LOG_DIR` environment variable can be used to configure a directory to
/// store log files. If it is set, a file named `log_name` with the `log` extension is
/// created in the directory.
pub fn init(log_name: &str) -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        .from_env_lossy();

    let span_events = env::var("RUST_LOG_SPAN_EVENTS")
        .ok()
        .map_or(FmtSpan::NONE, |s| fmt_span_from_str(&s));

    let format = env::var("RUST_LOG_FORMAT").ok();
    let color_output =
        !env::var("NO_COLOR").is_ok_and(|x| !x.is_empty()) && std::io::stderr().is_terminal();

    let stderr_layer = prepare_formatted_layer(
        format.as_deref(),
        fmt::layer()
            .with_span_events(span_events.clone())
            .with_writer(std::io::stderr)
            .with_ansi(color_output),
    )?;

    let maybe_log_file_layer = open_log_file(log_name)?
        .map(|file_writer| {
            prepare_formatted_layer(
                format.as_deref(),
                fmt::layer()
                    .with_span_events(span_events)
                    .with_writer(Arc::new(file_writer))
                    .with_ansi(false),
            )
        })
        .transpose()?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(maybe_log_file_layer)
        .with(stderr_layer)
        .try_init()?;
    Ok(())
}

/// Opens a log file for writing.
///
/// The location of the file is determined by the `PHUNK_GATE_LOG_DIR` environment
/// variable, and its name by the `log_name` parameter.
///
/// Returns [`None`] if the `PHUNK_GATE_LOG_DIR` environment variable is not set.
fn open_log_file(log_name: &str) -> anyhow::Result<Option<File>> {
    let Some(log_directory) = env::var_os("PHUNK_GATE_LOG_DIR") else {
        return Ok(None);
    };
    let mut log_file_path = Path::new(&log_directory).join(log_name);
    log_file_path.set_extension("log");

    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(&log_file_path)
        .with_context(|| format!("Failed to open {} for writing", log_file_path.display()))?;
    Ok(Some(file))
}

/// Applies a requested `formatting` to the log output of the provided `layer`.
///
/// Returns a boxed [`Layer`] with the formatting applied to the original `layer`.
fn prepare_formatted_layer<S, N, W, T>(
    formatting: Option<&str>,
    layer: fmt::Layer<S, N, Format<Full, T>, W>,
) -> anyhow::Result<Box<dyn Layer<S> + Send + Sync>>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    N: for<'writer> FormatFields<'writer> + Send + Sync + 'static,
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
    T: FormatTime + Send + Sync + 'static,
{
    Ok(match formatting.unwrap_or("plain") {
        "json" => layer.json().boxed(),
        "pretty" => layer.pretty().boxed(),
        "plain" => layer.boxed(),
        format => {
            bail!("Invalid RUST_LOG_FORMAT: `{format}`.  Valid values are `json` or `pretty`.")
        }
    })
}

fn fmt_span_from_str(events: &str) -> FmtSpan {
    let mut fmt_span = FmtSpan::NONE;
    for event in events.split(',') {
        fmt_span |= match event {
            "new" => FmtSpan::NEW,
            "enter" => FmtSpan::ENTER,
            "exit" => FmtSpan::EXIT,
            "close" => FmtSpan::CLOSE,
            "active" => FmtSpan::ACTIVE,
            "full" => FmtSpan::FULL,
            _ => FmtSpan::NONE,
        };
    }
    fmt_span
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::fmt::format::FmtSpan;

    use super::fmt_span_from_str;

    #[test]
    fn test_span_events() {
        assert_eq!(fmt_span_from_str("new,close"), FmtSpan::NEW | FmtSpan::CLOSE);
        assert_eq!(fmt_span_from_str("full"), FmtSpan::FULL);
        assert_eq!(fmt_span_from_str("nonsense"), FmtSpan::NONE);
    }
}
