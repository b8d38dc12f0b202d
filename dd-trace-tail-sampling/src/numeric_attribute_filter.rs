// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use opentelemetry::{Key, Value};

use crate::dd_debug;
use crate::decision::Decision;
use crate::error::Result;
use crate::evaluator::PolicyEvaluator;
use crate::types::{Span, TraceData};

/// Samples traces with at least one span whose integer attribute `key` falls within
/// `[min_value, max_value]`.
#[derive(Clone, Debug, PartialEq)]
pub struct NumericAttributeFilter {
    key: Key,
    min_value: i64,
    max_value: i64,
}

impl NumericAttributeFilter {
    pub fn new(key: impl Into<Key>, min_value: i64, max_value: i64) -> Self {
        NumericAttributeFilter {
            key: key.into(),
            min_value,
            max_value,
        }
    }

    fn matches(&self, span: &Span) -> bool {
        span.attributes.iter().any(|kv| match kv.value {
            Value::I64(v) => kv.key == self.key && (self.min_value..=self.max_value).contains(&v),
            _ => false,
        })
    }
}

impl PolicyEvaluator for NumericAttributeFilter {
    fn evaluate(&self, _trace_id: &[u8], trace: &TraceData) -> Result<Decision> {
        dd_debug!("Evaluating spans in numeric-attribute filter");
        let batches = trace.received_batches()?;
        let sampled = batches
            .iter()
            .flat_map(|batch| batch.iter())
            .any(|span| self.matches(span));
        Ok(Decision::from(sampled))
    }

    fn on_late_arriving_spans(&self, _early_decision: Decision, _spans: &[Span]) -> Result<()> {
        dd_debug!("Triggering action for late arriving spans in numeric-attribute filter");
        Ok(())
    }

    fn on_dropped_spans(&self, _trace_id: &[u8], _trace: &TraceData) -> Result<Decision> {
        dd_debug!("Triggering action for dropped spans in numeric-attribute filter");
        Ok(Decision::NotSampled)
    }
}
