// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Trace state shared between the ingest path and the policy evaluators

use std::{
    borrow::Cow,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
    time::{Duration, SystemTime},
};

use opentelemetry::{trace::TraceId, KeyValue, SpanId};
use opentelemetry_sdk::trace::SpanData;

use crate::error::{EvaluationError, Result};

/// A finished span as seen by the tail sampler.
#[derive(Clone, Debug, PartialEq)]
pub struct Span {
    pub trace_id: TraceId,
    pub span_id: SpanId,
    /// `SpanId::INVALID` for root spans
    pub parent_span_id: SpanId,
    pub name: Cow<'static, str>,
    pub start_time: SystemTime,
    pub end_time: SystemTime,
    pub attributes: Vec<KeyValue>,
}

impl Span {
    pub fn new(
        trace_id: TraceId,
        span_id: SpanId,
        parent_span_id: SpanId,
        start_time: SystemTime,
        end_time: SystemTime,
    ) -> Self {
        Span {
            trace_id,
            span_id,
            parent_span_id,
            name: Cow::Borrowed(""),
            start_time,
            end_time,
            attributes: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_attributes(mut self, attributes: impl IntoIterator<Item = KeyValue>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_span_id == SpanId::INVALID
    }

    /// Elapsed time between start and end, `None` if the span ends before it starts
    pub fn duration(&self) -> Option<Duration> {
        self.end_time.duration_since(self.start_time).ok()
    }
}

impl From<&SpanData> for Span {
    fn from(span: &SpanData) -> Self {
        Span {
            trace_id: span.span_context.trace_id(),
            span_id: span.span_context.span_id(),
            parent_span_id: span.parent_span_id,
            name: span.name.clone(),
            start_time: span.start_time,
            end_time: span.end_time,
            attributes: span.attributes.clone(),
        }
    }
}

/// Spans received together for a single trace
pub type Batch = Arc<[Span]>;

/// Everything received so far for one trace id.
///
/// Batches are only reachable through [`TraceData::received_batches`], which clones the
/// list under the lock and hands it back once the lock is released. The span count is a
/// separate atomic so the rate limiter can read it without taking the lock.
#[derive(Debug, Default)]
pub struct TraceData {
    received_batches: Mutex<Vec<Batch>>,
    span_count: AtomicU64,
}

impl TraceData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a trace record from already received batches, in arrival order
    pub fn from_batches<I, B>(batches: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Vec<Span>>,
    {
        let trace = TraceData::new();
        for batch in batches {
            trace.append_batch(batch.into());
        }
        trace
    }

    /// Appends a newly arrived batch and returns the updated span count.
    pub fn append_batch(&self, spans: Vec<Span>) -> u64 {
        let added = spans.len() as u64;
        // A panic while pushing cannot leave the list half written, so the guard is
        // still usable after poisoning.
        let mut batches = self
            .received_batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        batches.push(Arc::from(spans));
        self.span_count.fetch_add(added, Ordering::AcqRel) + added
    }

    pub fn span_count(&self) -> u64 {
        self.span_count.load(Ordering::Acquire)
    }

    /// Snapshot of the batches received so far.
    pub fn received_batches(&self) -> Result<Vec<Batch>> {
        let batches = self
            .received_batches
            .lock()
            .map_err(|_| EvaluationError::PoisonedTrace)?;
        Ok(batches.clone())
    }
}


#[cfg(test)]
mod tests {
    use std::{panic, sync::Arc, thread, time::Duration};

    use super::test_utils::{child_span, root_span, start};
    use super::*;

    #[test]
    fn test_append_batch_tracks_span_count() {
        let trace = TraceData::new();
        assert_eq!(trace.span_count(), 0);
        assert!(trace.received_batches().unwrap().is_empty());

        let total = trace.append_batch(vec![root_span(Duration::from_millis(5))]);
        assert_eq!(total, 1);
        let total = trace.append_batch(vec![
            child_span(Duration::from_millis(1)),
            child_span(Duration::from_millis(2)),
        ]);
        assert_eq!(total, 3);
        assert_eq!(trace.span_count(), 3);

        let batches = trace.received_batches().unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 1);
        assert_eq!(batches[1].len(), 2);
        assert!(batches[0][0].is_root());
        assert!(!batches[1][0].is_root());
    }

    #[test]
    fn test_snapshot_is_detached_from_later_appends() {
        let trace = TraceData::from_batches([vec![root_span(Duration::ZERO)]]);
        let snapshot = trace.received_batches().unwrap();
        trace.append_batch(vec![child_span(Duration::ZERO)]);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(trace.received_batches().unwrap().len(), 2);
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let trace = Arc::new(TraceData::new());
        let poisoner = trace.clone();
        let _ = thread::spawn(move || {
            let _guard = poisoner.received_batches.lock().unwrap();
            panic::panic_any("poison the trace lock");
        })
        .join();

        assert!(matches!(
            trace.received_batches(),
            Err(EvaluationError::PoisonedTrace)
        ));
        // ingest keeps working so the trace can still be disposed of
        assert_eq!(trace.append_batch(vec![root_span(Duration::ZERO)]), 1);
    }

    fn span_data(span_id: u8, parent_span_id: SpanId) -> SpanData {
        SpanData {
            span_context: opentelemetry::trace::SpanContext::new(
                TraceId::from_bytes([7; 16]),
                SpanId::from_bytes([span_id; 8]),
                opentelemetry::TraceFlags::SAMPLED,
                false,
                opentelemetry::trace::TraceState::default(),
            ),
            parent_span_id,
            span_kind: opentelemetry::trace::SpanKind::Server,
            name: Cow::Borrowed("GET /users"),
            start_time: start(),
            end_time: start() + Duration::from_millis(250),
            attributes: vec![KeyValue::new("http.status_code", 503_i64)],
            dropped_attributes_count: 0,
            events: opentelemetry_sdk::trace::SpanEvents::default(),
            links: opentelemetry_sdk::trace::SpanLinks::default(),
            status: opentelemetry::trace::Status::Unset,
            instrumentation_scope: opentelemetry::InstrumentationScope::builder("test").build(),
        }
    }

    #[test]
    fn test_from_span_data() {
        let root = Span::from(&span_data(1, SpanId::INVALID));
        assert_eq!(root.trace_id, TraceId::from_bytes([7; 16]));
        assert_eq!(root.span_id, SpanId::from_bytes([1; 8]));
        assert!(root.is_root());
        assert_eq!(root.name, "GET /users");
        assert_eq!(root.start_time, start());
        assert_eq!(root.end_time, start() + Duration::from_millis(250));
        assert_eq!(root.duration(), Some(Duration::from_millis(250)));
        assert_eq!(
            root.attributes,
            vec![KeyValue::new("http.status_code", 503_i64)]
        );

        let child = Span::from(&span_data(2, SpanId::from_bytes([1; 8])));
        assert!(!child.is_root());
        assert_eq!(child.parent_span_id, root.span_id);
        assert_eq!(child.trace_id, root.trace_id);
    }

    #[test]
    fn test_with_name() {
        let span = root_span(Duration::ZERO);
        assert_eq!(span.name, "");

        let span = span.with_name("checkout").with_name(String::from("checkout-v2"));
        assert_eq!(span.name, "checkout-v2");
        assert!(span.attributes.is_empty());
    }

    #[test]
    fn test_negative_duration() {
        let mut span = root_span(Duration::from_millis(10));
        assert_eq!(span.duration(), Some(Duration::from_millis(10)));
        span.end_time = start() - Duration::from_millis(1);
        assert_eq!(span.duration(), None);
    }
}
