// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! A library for Phunk gate metrics.

pub mod monitoring_server;
pub mod prometheus_util;
