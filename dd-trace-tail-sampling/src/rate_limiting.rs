// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::constants::policy_type;
use crate::dd_debug;
use crate::decision::Decision;
use crate::error::{EvaluationError, Result};
use crate::evaluator::PolicyEvaluator;
use crate::types::{Span, TraceData};

/// Caps the number of sampled spans per wall clock second and per wall clock minute.
///
/// Windows are fixed: they start on second and minute boundaries, not on first use, so
/// bursts straddling a boundary can exceed the cap over a rolling interval. A trace is
/// kept when it fits in the current second; otherwise the minute window gets a chance.
///
/// Windows only move forward. A clock reading older than the current window, taken by a
/// thread that lost the race for the lock or after the wall clock stepped back, is
/// charged to the current window.
pub struct RateLimiting {
    /// 0 disables the per second window
    spans_per_second: u64,
    /// 0 disables the per minute window
    spans_per_minute: u64,

    /// Counters shared by every trace evaluated through this policy
    inner: Mutex<RateLimitingState>,
}

#[derive(Debug, Default)]
struct RateLimitingState {
    /// Seconds since the unix epoch
    current_second: u64,
    spans_in_current_second: u64,
    /// Minutes since the unix epoch
    current_minute: u64,
    spans_in_current_minute: u64,
}

impl fmt::Debug for RateLimiting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("RateLimiting");
        s.field("spans_per_second", &self.spans_per_second)
            .field("spans_per_minute", &self.spans_per_minute);
        if let Ok(state) = self.inner.try_lock() {
            s.field("spans_in_current_second", &state.spans_in_current_second)
                .field("spans_in_current_minute", &state.spans_in_current_minute);
        }
        s.finish()
    }
}

impl RateLimiting {
    pub fn new(spans_per_second: u64, spans_per_minute: u64) -> Self {
        RateLimiting {
            spans_per_second,
            spans_per_minute,
            inner: Mutex::new(RateLimitingState::default()),
        }
    }

    pub fn spans_per_second(&self) -> u64 {
        self.spans_per_second
    }

    pub fn spans_per_minute(&self) -> u64 {
        self.spans_per_minute
    }

    /// Admits `span_count` spans against the windows containing `now`.
    fn evaluate_at(&self, now: SystemTime, span_count: u64) -> Result<Decision> {
        let current_second = now.duration_since(UNIX_EPOCH)?.as_secs();
        let current_minute = current_second / 60;

        let mut state = self
            .inner
            .lock()
            .map_err(|_| EvaluationError::PoisonedState {
                policy: policy_type::RATE_LIMITING,
            })?;

        if self.spans_per_second != 0 {
            if current_second > state.current_second {
                state.current_second = current_second;
                state.spans_in_current_second = 0;
            }

            let projected = state.spans_in_current_second.saturating_add(span_count);
            if projected < self.spans_per_second {
                state.spans_in_current_second = projected;
                return Ok(Decision::Sampled);
            }
        }

        if self.spans_per_minute != 0 {
            if current_minute > state.current_minute {
                state.current_minute = current_minute;
                state.spans_in_current_minute = 0;
            }

            let projected = state.spans_in_current_minute.saturating_add(span_count);
            if projected < self.spans_per_minute {
                state.spans_in_current_minute = projected;
                return Ok(Decision::Sampled);
            }
        }

        Ok(Decision::NotSampled)
    }
}

impl PolicyEvaluator for RateLimiting {
    fn evaluate(&self, _trace_id: &[u8], trace: &TraceData) -> Result<Decision> {
        dd_debug!("Evaluating spans in rate-limiting filter");
        self.evaluate_at(SystemTime::now(), trace.span_count())
    }

    fn on_late_arriving_spans(&self, _early_decision: Decision, _spans: &[Span]) -> Result<()> {
        dd_debug!("Triggering action for late arriving spans in rate-limiting filter");
        Ok(())
    }

    /// Evicted traces are let through rather than counted against the limits.
    fn on_dropped_spans(&self, _trace_id: &[u8], _trace: &TraceData) -> Result<Decision> {
        dd_debug!("Triggering action for dropped spans in rate-limiting filter");
        Ok(Decision::Sampled)
    }
}
