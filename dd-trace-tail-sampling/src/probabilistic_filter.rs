// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use crate::constants::probabilistic::{
    BIT_MASK_HASH_BUCKETS, MAX_PERCENTAGE, MIN_PERCENTAGE, NUM_HASH_BUCKETS,
};
use crate::dd_debug;
use crate::decision::Decision;
use crate::error::Result;
use crate::evaluator::PolicyEvaluator;
use crate::hash::murmur3_32;
use crate::types::{Span, TraceData};

/// Keeps `sampling_percentage`% of the traces, picked by hashing the trace id.
///
/// The decision only depends on the trace id and the seed, so every sampler configured
/// with the same seed and percentage keeps the same traces.
#[derive(Clone)]
pub struct ProbabilisticFilter {
    sampling_percentage: f64,
    hash_seed: u32,
    scaled_sampling_rate: u32,
}

impl fmt::Debug for ProbabilisticFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbabilisticFilter")
            .field("sampling_percentage", &self.sampling_percentage)
            .field("hash_seed", &self.hash_seed)
            .finish()
    }
}

impl ProbabilisticFilter {
    fn calculate_threshold(percentage: f64) -> u32 {
        (percentage * f64::from(NUM_HASH_BUCKETS) / MAX_PERCENTAGE).round() as u32
    }

    /// `sampling_percentage` is clamped between 0.0 and 100.0 inclusive, NaN samples
    /// nothing.
    pub fn new(sampling_percentage: f64, hash_seed: u32) -> Self {
        let clamped = if sampling_percentage.is_nan() {
            MIN_PERCENTAGE
        } else {
            sampling_percentage.clamp(MIN_PERCENTAGE, MAX_PERCENTAGE)
        };

        ProbabilisticFilter {
            sampling_percentage: clamped,
            hash_seed,
            scaled_sampling_rate: Self::calculate_threshold(clamped),
        }
    }

    pub fn sampling_percentage(&self) -> f64 {
        self.sampling_percentage
    }

    pub fn hash_seed(&self) -> u32 {
        self.hash_seed
    }

    fn should_sample(&self, trace_id: &[u8]) -> bool {
        (murmur3_32(trace_id, self.hash_seed) & BIT_MASK_HASH_BUCKETS) < self.scaled_sampling_rate
    }
}

impl PolicyEvaluator for ProbabilisticFilter {
    fn evaluate(&self, trace_id: &[u8], _trace: &TraceData) -> Result<Decision> {
        dd_debug!("Evaluating spans in probabilistic filter");
        Ok(Decision::from(self.should_sample(trace_id)))
    }

    fn on_late_arriving_spans(&self, _early_decision: Decision, _spans: &[Span]) -> Result<()> {
        dd_debug!("Triggering action for late arriving spans in probabilistic filter");
        Ok(())
    }

    fn on_dropped_spans(&self, _trace_id: &[u8], _trace: &TraceData) -> Result<Decision> {
        dd_debug!("Triggering action for dropped spans in probabilistic filter");
        Ok(Decision::NotSampled)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn trace_ids(count: u128) -> impl Iterator<Item = [u8; 16]> {
        // spread the ids out instead of only touching the low bytes
        (1..=count).map(|i| i.wrapping_mul(0x9e37_79b9_7f4a_7c15_f39c_c060_5ced_c835).to_be_bytes())
    }

    fn sampled_ids(filter: &ProbabilisticFilter, ids: &[[u8; 16]]) -> HashSet<[u8; 16]> {
        let trace = TraceData::new();
        ids.iter()
            .filter(|id| filter.evaluate(id.as_slice(), &trace).unwrap().is_sampled())
            .copied()
            .collect()
    }

    #[test]
    fn check_debug_impl() {
        let filter = ProbabilisticFilter::new(12.5, 22);
        let debug_output = format!("{filter:?}");
        assert!(debug_output.contains("ProbabilisticFilter"));
        assert!(debug_output.contains("sampling_percentage: 12.5"));
        assert!(debug_output.contains("hash_seed: 22"));
    }

    #[test]
    fn test_threshold_scaling() {
        let cases = [
            (0.0, 0),
            (0.01, 2), // 1.6384 rounds up
            (1.0, 164),
            (20.0, 3277),
            (25.0, 4096),
            (50.0, 8192),
            (100.0, NUM_HASH_BUCKETS),
        ];
        for (percentage, expected) in cases {
            let filter = ProbabilisticFilter::new(percentage, 0);
            assert_eq!(
                filter.scaled_sampling_rate, expected,
                "threshold for {percentage}%"
            );
        }
    }

    #[test]
    fn test_percentage_is_clamped() {
        assert_eq!(ProbabilisticFilter::new(-5.0, 0).sampling_percentage(), 0.0);
        assert_eq!(ProbabilisticFilter::new(250.0, 0).sampling_percentage(), 100.0);
        let nan = ProbabilisticFilter::new(f64::NAN, 0);
        assert_eq!(nan.sampling_percentage(), 0.0);
        assert_eq!(nan.scaled_sampling_rate, 0);
    }

    #[test]
    fn test_known_bucket() {
        // murmur3 of 16 zero bytes with seed 0 is 0x8134cdf8, bucket 3576
        let trace_id = [0u8; 16];
        let trace = TraceData::new();

        let above = ProbabilisticFilter::new(25.0, 0);
        assert_eq!(above.evaluate(&trace_id, &trace).unwrap(), Decision::Sampled);

        let below = ProbabilisticFilter::new(20.0, 0);
        assert_eq!(below.evaluate(&trace_id, &trace).unwrap(), Decision::NotSampled);
    }

    #[test]
    fn test_zero_and_hundred_percent() {
        let ids: Vec<_> = trace_ids(2_000).collect();
        for seed in [0, 1, 22, u32::MAX] {
            let none = ProbabilisticFilter::new(0.0, seed);
            let all = ProbabilisticFilter::new(100.0, seed);
            assert!(sampled_ids(&none, &ids).is_empty(), "seed {seed}");
            assert_eq!(sampled_ids(&all, &ids).len(), ids.len(), "seed {seed}");
        }
    }

    #[test]
    fn test_sampled_set_grows_with_percentage() {
        let ids: Vec<_> = trace_ids(2_000).collect();
        let mut previous = HashSet::new();
        for step in 0..=40u32 {
            let percentage = f64::from(step) * 2.5;
            let sampled = sampled_ids(&ProbabilisticFilter::new(percentage, 7), &ids);
            assert!(
                previous.is_subset(&sampled),
                "sampled set shrank at {percentage}%"
            );
            previous = sampled;
        }
    }

    #[test]
    fn test_sample_rate_is_roughly_respected() {
        let ids: Vec<_> = trace_ids(20_000).collect();
        let sampled = sampled_ids(&ProbabilisticFilter::new(30.0, 1234), &ids).len();
        let rate = sampled as f64 / ids.len() as f64;
        assert!(
            (0.27..=0.33).contains(&rate),
            "Expected rate around 0.3, got {rate}"
        );
    }

    #[test]
    fn test_deterministic_per_seed() {
        let trace = TraceData::new();
        let filter = ProbabilisticFilter::new(50.0, 42);
        let same = ProbabilisticFilter::new(50.0, 42);
        for id in trace_ids(100) {
            assert_eq!(
                filter.evaluate(&id, &trace).unwrap(),
                same.evaluate(&id, &trace).unwrap()
            );
        }
    }

    #[test]
    fn test_dropped_spans_are_not_sampled() {
        let filter = ProbabilisticFilter::new(100.0, 0);
        let trace = TraceData::new();
        assert_eq!(
            filter.on_dropped_spans(&[0; 16], &trace).unwrap(),
            Decision::NotSampled
        );
        assert!(filter.on_late_arriving_spans(Decision::Sampled, &[]).is_ok());
    }
}
