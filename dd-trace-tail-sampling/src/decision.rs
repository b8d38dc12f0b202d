// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of evaluating a policy against a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// The trace is kept
    Sampled,
    /// The trace is discarded
    NotSampled,
}

impl Decision {
    pub fn is_sampled(&self) -> bool {
        matches!(self, Decision::Sampled)
    }
}

impl From<bool> for Decision {
    fn from(sampled: bool) -> Self {
        if sampled {
            Decision::Sampled
        } else {
            Decision::NotSampled
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Decision::Sampled => "sampled",
            Decision::NotSampled => "not_sampled",
        };
        f.write_str(s)
    }
}
