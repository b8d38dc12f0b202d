// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;

use opentelemetry::{Key, Value};

use crate::dd_debug;
use crate::decision::Decision;
use crate::error::Result;
use crate::evaluator::PolicyEvaluator;
use crate::types::{Span, TraceData};

/// Samples traces with at least one span whose string attribute `key` is one of
/// `values`.
#[derive(Clone, Debug, PartialEq)]
pub struct StringAttributeFilter {
    key: Key,
    values: HashSet<String>,
}

impl StringAttributeFilter {
    pub fn new<I, S>(key: impl Into<Key>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StringAttributeFilter {
            key: key.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    fn matches(&self, span: &Span) -> bool {
        span.attributes.iter().any(|kv| {
            kv.key == self.key
                && matches!(&kv.value, Value::String(s) if self.values.contains(s.as_str()))
        })
    }
}

impl PolicyEvaluator for StringAttributeFilter {
    fn evaluate(&self, _trace_id: &[u8], trace: &TraceData) -> Result<Decision> {
        dd_debug!("Evaluating spans in string-attribute filter");
        let batches = trace.received_batches()?;
        let sampled = batches
            .iter()
            .flat_map(|batch| batch.iter())
            .any(|span| self.matches(span));
        Ok(Decision::from(sampled))
    }

    fn on_late_arriving_spans(&self, _early_decision: Decision, _spans: &[Span]) -> Result<()> {
        dd_debug!("Triggering action for late arriving spans in string-attribute filter");
        Ok(())
    }

    fn on_dropped_spans(&self, _trace_id: &[u8], _trace: &TraceData) -> Result<Decision> {
        dd_debug!("Triggering action for dropped spans in string-attribute filter");
        Ok(Decision::NotSampled)
    }
}
