// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Tail sampling policies
//!
//! Each policy looks at a trace once its spans have been collected and votes to keep
//! or drop it:
//! - [`DurationFilter`]: root span duration within bounds
//! - [`ProbabilisticFilter`]: a fixed share of traces, picked by hashing the trace id
//! - [`RateLimiting`]: a budget of spans per second and per minute
//! - [`AlwaysSample`], [`NumericAttributeFilter`], [`StringAttributeFilter`]
//!
//! Combining the votes of several policies is left to the caller.

pub mod always_sample;
pub mod config;
pub mod constants;
pub mod decision;
pub mod duration_filter;
pub mod error;
pub mod evaluator;
pub mod hash;
pub mod log;
pub mod numeric_attribute_filter;
pub mod probabilistic_filter;
pub mod rate_limiting;
pub mod string_attribute_filter;
pub mod types;

// Re-exports for convenient usage
pub use always_sample::AlwaysSample;
pub use config::{PolicyCfg, PolicyType, TailSamplingConfig};
pub use decision::Decision;
pub use duration_filter::DurationFilter;
pub use error::{ConfigError, EvaluationError};
pub use evaluator::{Policy, PolicyEvaluator};
pub use numeric_attribute_filter::NumericAttributeFilter;
pub use probabilistic_filter::ProbabilisticFilter;
pub use rate_limiting::RateLimiting;
pub use string_attribute_filter::StringAttributeFilter;
pub use types::{Batch, Span, TraceData};
