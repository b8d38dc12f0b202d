// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::always_sample::AlwaysSample;
use crate::constants::probabilistic::{MAX_PERCENTAGE, MIN_PERCENTAGE};
use crate::constants::{env, policy_type};
use crate::duration_filter::DurationFilter;
use crate::error::ConfigError;
use crate::evaluator::{Policy, PolicyEvaluator};
use crate::log::{self, LevelFilter};
use crate::numeric_attribute_filter::NumericAttributeFilter;
use crate::probabilistic_filter::ProbabilisticFilter;
use crate::rate_limiting::RateLimiting;
use crate::string_attribute_filter::StringAttributeFilter;
use crate::{dd_debug, dd_warn};

/// Configuration for a single named policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyCfg {
    /// Unique name of the policy
    pub name: String,

    #[serde(flatten)]
    pub policy: PolicyType,
}

/// Policy type and its parameters, tagged by `type` in JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PolicyType {
    AlwaysSample,
    Duration {
        #[serde(default)]
        min_duration_ms: Option<u64>,
        #[serde(default)]
        max_duration_ms: Option<u64>,
    },
    Probabilistic {
        /// Percentage of traces to keep, 0 to 100
        sampling_percentage: f64,
        #[serde(default)]
        hash_seed: u32,
    },
    RateLimiting {
        /// 0 disables the per second window
        #[serde(default)]
        spans_per_second: u64,
        /// 0 disables the per minute window
        #[serde(default)]
        spans_per_minute: u64,
    },
    NumericAttribute {
        key: String,
        min_value: i64,
        max_value: i64,
    },
    StringAttribute {
        key: String,
        values: Vec<String>,
    },
}

impl PolicyType {
    /// Value of the `type` tag for this policy
    pub fn type_name(&self) -> &'static str {
        match self {
            PolicyType::AlwaysSample => policy_type::ALWAYS_SAMPLE,
            PolicyType::Duration { .. } => policy_type::DURATION,
            PolicyType::Probabilistic { .. } => policy_type::PROBABILISTIC,
            PolicyType::RateLimiting { .. } => policy_type::RATE_LIMITING,
            PolicyType::NumericAttribute { .. } => policy_type::NUMERIC_ATTRIBUTE,
            PolicyType::StringAttribute { .. } => policy_type::STRING_ATTRIBUTE,
        }
    }
}

impl PolicyCfg {
    pub fn new(name: impl Into<String>, policy: PolicyType) -> Self {
        PolicyCfg {
            name: name.into(),
            policy,
        }
    }

    /// Checks the parameters and builds the evaluator for this policy
    pub fn build_evaluator(&self) -> Result<Box<dyn PolicyEvaluator>, ConfigError> {
        let name = &self.name;
        let evaluator: Box<dyn PolicyEvaluator> = match &self.policy {
            PolicyType::AlwaysSample => Box::new(AlwaysSample),
            PolicyType::Duration {
                min_duration_ms,
                max_duration_ms,
            } => {
                if let (Some(min), Some(max)) = (*min_duration_ms, *max_duration_ms) {
                    if min > max {
                        return Err(ConfigError::InvalidDurationBounds {
                            name: name.clone(),
                            min,
                            max,
                        });
                    }
                }
                Box::new(DurationFilter::new(*min_duration_ms, *max_duration_ms))
            }
            PolicyType::Probabilistic {
                sampling_percentage,
                hash_seed,
            } => {
                if sampling_percentage.is_nan() {
                    return Err(ConfigError::InvalidPercentage {
                        name: name.clone(),
                        value: *sampling_percentage,
                    });
                }
                if !(MIN_PERCENTAGE..=MAX_PERCENTAGE).contains(sampling_percentage) {
                    dd_warn!(
                        "policy `{}`: sampling_percentage {} clamped to [0, 100]",
                        name,
                        sampling_percentage
                    );
                }
                Box::new(ProbabilisticFilter::new(*sampling_percentage, *hash_seed))
            }
            PolicyType::RateLimiting {
                spans_per_second,
                spans_per_minute,
            } => {
                if *spans_per_second == 0 && *spans_per_minute == 0 {
                    dd_warn!(
                        "policy `{}`: no rate limit window is configured, no trace will be sampled",
                        name
                    );
                }
                Box::new(RateLimiting::new(*spans_per_second, *spans_per_minute))
            }
            PolicyType::NumericAttribute {
                key,
                min_value,
                max_value,
            } => {
                if min_value > max_value {
                    return Err(ConfigError::InvalidAttributeRange {
                        name: name.clone(),
                        min: *min_value,
                        max: *max_value,
                    });
                }
                Box::new(NumericAttributeFilter::new(key.clone(), *min_value, *max_value))
            }
            PolicyType::StringAttribute { key, values } => {
                if values.is_empty() {
                    return Err(ConfigError::EmptyAttributeValues { name: name.clone() });
                }
                Box::new(StringAttributeFilter::new(key.clone(), values.iter().cloned()))
            }
        };
        Ok(evaluator)
    }
}

/// Configuration for the tail sampling policies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TailSamplingConfig {
    /// Policies in evaluation order
    #[serde(default)]
    pub policies: Vec<PolicyCfg>,

    /// Log level for policy diagnostics, left untouched when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LevelFilter>,
}

impl TailSamplingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policies(policies: Vec<PolicyCfg>) -> Self {
        TailSamplingConfig {
            policies,
            log_level: None,
        }
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Reads `DD_TAIL_SAMPLING_POLICIES` and `DD_LOG_LEVEL` from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key value source.
    ///
    /// A malformed policy list is an error, an unknown log level is ignored with a
    /// warning.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let policies = match lookup(env::POLICIES) {
            Some(json) => serde_json::from_str(&json)?,
            None => Vec::new(),
        };
        let log_level = lookup(env::LOG_LEVEL).and_then(|raw| match raw.parse::<LevelFilter>() {
            Ok(level) => Some(level),
            Err(e) => {
                dd_warn!("ignoring {}={}: {}", env::LOG_LEVEL, raw, e);
                None
            }
        });
        Ok(TailSamplingConfig {
            policies,
            log_level,
        })
    }

    /// Installs the configured log level, if any
    pub fn apply_log_level(&self) {
        if let Some(level) = self.log_level {
            log::set_max_level(level);
        }
    }

    /// Validates every policy and builds them, in configuration order
    pub fn build_policies(&self) -> Result<Vec<Policy>, ConfigError> {
        let mut seen = HashSet::new();
        self.policies
            .iter()
            .map(|cfg| {
                if cfg.name.is_empty() {
                    return Err(ConfigError::EmptyPolicyName);
                }
                if !seen.insert(cfg.name.as_str()) {
                    return Err(ConfigError::DuplicatePolicyName(cfg.name.clone()));
                }
                let evaluator = cfg.build_evaluator()?;
                dd_debug!("built {} policy `{}`", cfg.policy.type_name(), cfg.name);
                Ok(Policy::new(cfg.name.clone(), evaluator))
            })
            .collect()
    }
}
