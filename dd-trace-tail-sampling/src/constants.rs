// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Shared constants for the dd-trace-tail-sampling crate

/// Probabilistic sampling
pub mod probabilistic {
    /// Number of hash buckets, a power of two so a bucket is picked with a mask
    pub const NUM_HASH_BUCKETS: u32 = 0x4000;
    /// Mask selecting the low 14 bits of a hash
    pub const BIT_MASK_HASH_BUCKETS: u32 = NUM_HASH_BUCKETS - 1;
    /// Maximum sampling percentage
    pub const MAX_PERCENTAGE: f64 = 100.0;
    /// Minimum sampling percentage
    pub const MIN_PERCENTAGE: f64 = 0.0;
}

/// Environment variables read by [`crate::config::TailSamplingConfig::from_env`]
pub mod env {
    /// JSON list of policy configurations
    pub const POLICIES: &str = "DD_TAIL_SAMPLING_POLICIES";
    /// Log level for the tail sampler diagnostics
    pub const LOG_LEVEL: &str = "DD_LOG_LEVEL";
}

/// Policy type names used in configuration
pub mod policy_type {
    pub const ALWAYS_SAMPLE: &str = "always_sample";
    pub const DURATION: &str = "duration";
    pub const PROBABILISTIC: &str = "probabilistic";
    pub const RATE_LIMITING: &str = "rate_limiting";
    pub const NUMERIC_ATTRIBUTE: &str = "numeric_attribute";
    pub const STRING_ATTRIBUTE: &str = "string_attribute";
}
