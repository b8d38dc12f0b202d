// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::dd_debug;
use crate::decision::Decision;
use crate::error::Result;
use crate::evaluator::PolicyEvaluator;
use crate::types::{Span, TraceData};

/// Samples every trace that reaches its decision time.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysSample;

impl PolicyEvaluator for AlwaysSample {
    fn evaluate(&self, _trace_id: &[u8], _trace: &TraceData) -> Result<Decision> {
        dd_debug!("Evaluating spans in always-sample filter");
        Ok(Decision::Sampled)
    }

    fn on_late_arriving_spans(&self, _early_decision: Decision, _spans: &[Span]) -> Result<()> {
        dd_debug!("Triggering action for late arriving spans in always-sample filter");
        Ok(())
    }

    fn on_dropped_spans(&self, _trace_id: &[u8], _trace: &TraceData) -> Result<Decision> {
        dd_debug!("Triggering action for dropped spans in always-sample filter");
        Ok(Decision::NotSampled)
    }
}
