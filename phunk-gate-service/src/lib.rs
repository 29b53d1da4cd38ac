// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The `phunk-gate` command line tool and HTTP service.

pub mod options;
pub mod server;
pub mod terminal;
pub mod tracing;
pub mod util;

pub use crate::{
    server::{GateService, GateServiceConfig},
    util::listen_for_shutdown_signals,
};
