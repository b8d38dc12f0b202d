// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::time::SystemTimeError;

use thiserror::Error;

/// A policy could not reach a decision.
///
/// Callers must treat this as the policy abstaining, not as a `NotSampled` vote.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EvaluationError {
    #[error("trace data lock was poisoned by a panicking writer")]
    PoisonedTrace,
    #[error("internal state of the {policy} policy was poisoned")]
    PoisonedState { policy: &'static str },
    #[error("system clock is before the unix epoch: {0}")]
    Clock(#[from] SystemTimeError),
}

/// Invalid tail sampling configuration.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("cannot parse tail sampling configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("policy names cannot be empty")]
    EmptyPolicyName,
    #[error("policy name `{0}` is used more than once")]
    DuplicatePolicyName(String),
    #[error("policy `{name}`: min_duration_ms ({min}) is greater than max_duration_ms ({max})")]
    InvalidDurationBounds { name: String, min: u64, max: u64 },
    #[error("policy `{name}`: sampling_percentage {value} is not a number")]
    InvalidPercentage { name: String, value: f64 },
    #[error("policy `{name}`: min_value ({min}) is greater than max_value ({max})")]
    InvalidAttributeRange { name: String, min: i64, max: i64 },
    #[error("policy `{name}`: at least one value is required")]
    EmptyAttributeValues { name: String },
}

pub type Result<T, E = EvaluationError> = std::result::Result<T, E>;
