// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use crate::dd_debug;
use crate::decision::Decision;
use crate::error::Result;
use crate::evaluator::PolicyEvaluator;
use crate::types::{Span, TraceData};

/// Keeps traces whose root span lasted between optional lower and upper bounds.
///
/// Both bounds are inclusive and an unset bound does not constrain the decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DurationFilter {
    min_duration: Option<Duration>,
    max_duration: Option<Duration>,
}

impl DurationFilter {
    /// Creates a filter from bounds expressed in whole milliseconds.
    pub fn new(min_duration_ms: Option<u64>, max_duration_ms: Option<u64>) -> Self {
        DurationFilter {
            min_duration: min_duration_ms.map(Duration::from_millis),
            max_duration: max_duration_ms.map(Duration::from_millis),
        }
    }

    pub fn min_duration(&self) -> Option<Duration> {
        self.min_duration
    }

    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration
    }

    fn within_bounds(&self, root: &Span) -> bool {
        match root.duration() {
            Some(actual) => {
                self.min_duration.is_none_or(|min| actual >= min)
                    && self.max_duration.is_none_or(|max| actual <= max)
            }
            // ended before it started: below any lower bound, never above the upper one
            None => self.min_duration.is_none(),
        }
    }
}

impl PolicyEvaluator for DurationFilter {
    fn evaluate(&self, _trace_id: &[u8], trace: &TraceData) -> Result<Decision> {
        dd_debug!("Evaluating spans in duration filter");
        let batches = trace.received_batches()?;

        // Only the first root span found decides
        let root = batches.iter().flat_map(|batch| batch.iter()).find(|span| span.is_root());
        Ok(match root {
            Some(root) => Decision::from(self.within_bounds(root)),
            None => Decision::NotSampled,
        })
    }

    fn on_late_arriving_spans(&self, _early_decision: Decision, _spans: &[Span]) -> Result<()> {
        dd_debug!("Triggering action for late arriving spans in duration filter");
        Ok(())
    }

    fn on_dropped_spans(&self, _trace_id: &[u8], _trace: &TraceData) -> Result<Decision> {
        dd_debug!("Triggering action for dropped spans in duration filter");
        Ok(Decision::NotSampled)
    }
}
