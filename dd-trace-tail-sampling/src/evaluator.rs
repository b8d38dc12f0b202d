// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use crate::decision::Decision;
use crate::error::Result;
use crate::types::{Span, TraceData};

/// A tail sampling policy.
///
/// The coordinator calls [`evaluate`](PolicyEvaluator::evaluate) once the decision wait
/// for a trace is over, possibly more than once for the same trace, and possibly from
/// several threads at the same time for different traces. An `Err` from any method
/// means the policy abstains; it must never be read as [`Decision::NotSampled`].
pub trait PolicyEvaluator: fmt::Debug + Send + Sync {
    /// Decides whether the trace should be kept.
    fn evaluate(&self, trace_id: &[u8], trace: &TraceData) -> Result<Decision>;

    /// Called with spans that arrived after the decision for their trace was made.
    fn on_late_arriving_spans(&self, early_decision: Decision, spans: &[Span]) -> Result<()>;

    /// Called when the trace is evicted before its decision wait is over.
    fn on_dropped_spans(&self, trace_id: &[u8], trace: &TraceData) -> Result<Decision>;
}

/// A configured policy and the name it was registered under
pub struct Policy {
    name: String,
    evaluator: Box<dyn PolicyEvaluator>,
}

impl Policy {
    pub fn new(name: impl Into<String>, evaluator: Box<dyn PolicyEvaluator>) -> Self {
        Policy {
            name: name.into(),
            evaluator,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn evaluator(&self) -> &dyn PolicyEvaluator {
        self.evaluator.as_ref()
    }
}

impl fmt::Debug for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Policy")
            .field("name", &self.name)
            .field("evaluator", &self.evaluator)
            .finish()
    }
}
