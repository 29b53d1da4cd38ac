// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module defines util functions for interacting with Prometheus (logging metrics, etc)

use prometheus::{
    histogram_opts, register_histogram_vec, register_int_counter, register_int_counter_vec,
    HistogramVec, IntCounter, IntCounterVec, Opts,
};

const PHUNK_GATE_NAMESPACE: &str = "phunk_gate";

/// Wrapper around prometheus register_int_counter_vec! macro which also sets the phunk_gate namespace
pub fn register_int_counter_vec(
    name: &str,
    description: &str,
    label_names: &[&str],
) -> IntCounterVec {
    let counter_opts = Opts::new(name, description).namespace(PHUNK_GATE_NAMESPACE);
    register_int_counter_vec!(counter_opts, label_names).expect("IntCounterVec can be created")
}

/// Wrapper around prometheus register_int_counter! macro which also sets the phunk_gate namespace
pub fn register_int_counter(name: &str, description: &str) -> IntCounter {
    let counter_opts = Opts::new(name, description).namespace(PHUNK_GATE_NAMESPACE);
    register_int_counter!(counter_opts).expect("IntCounter can be created")
}

/// Wrapper around prometheus register_histogram_vec! macro which also sets the phunk_gate namespace
pub fn register_histogram_vec(
    name: &str,
    description: &str,
    label_names: &[&str],
    buckets: Option<Vec<f64>>,
) -> HistogramVec {
    let histogram_opts = if let Some(buckets) = buckets {
        histogram_opts!(name, description, buckets).namespace(PHUNK_GATE_NAMESPACE)
    } else {
        histogram_opts!(name, description).namespace(PHUNK_GATE_NAMESPACE)
    };

    register_histogram_vec!(histogram_opts, label_names).expect("HistogramVec can be created")
}

/// Construct the bucket interval exponentially starting from a value and an ending value.
pub fn exponential_bucket_latencies(max_latency: f64) -> Option<Vec<f64>> {
    let mut buckets = Vec::new();
    let mut latency = 1.0;
    while latency < max_latency {
        buckets.push(latency);
        latency *= 2.0;
    }
    buckets.push(max_latency);
    Some(buckets)
}
