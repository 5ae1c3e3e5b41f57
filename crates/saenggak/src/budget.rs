// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Sampling budget configuration.
//!
//! Controls how many completions the self-consistency sampler may draw, how
//! they are grouped into generation batches, and when early stopping is
//! evaluated. Fixed for the lifetime of a world model instance and read-only
//! from the sampler's perspective.

use crate::error::{Error, Result};

/// Budget and early-stop policy for one self-consistency run.
///
/// Invariants (checked by [`validate`](Self::validate) before any oracle
/// call): `1 <= batch_size <= early_stop_base <= n_confidence` and
/// `early_stop_threshold` in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingBudget {
    /// Total sample cap for one run.
    pub n_confidence: usize,
    /// Completions requested per generation call.
    pub batch_size: usize,
    /// Samples drawn between early-stop evaluations (checkpoint group size).
    pub early_stop_base: usize,
    /// Confidence ratio at which sampling may stop early. A threshold of 1.0
    /// only stops on a unanimous, untied vote.
    pub early_stop_threshold: f64,
}

impl Default for SamplingBudget {
    fn default() -> Self {
        Self {
            n_confidence: 8,
            batch_size: 2,
            early_stop_base: 8,
            early_stop_threshold: 1.0,
        }
    }
}

impl SamplingBudget {
    /// Create a budget drawing up to `n_confidence` samples, with the
    /// checkpoint group spanning the whole budget (no early stop before
    /// exhaustion).
    pub fn new(n_confidence: usize) -> Self {
        Self {
            n_confidence,
            early_stop_base: n_confidence,
            ..Self::default()
        }
    }

    /// Set the per-call batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the checkpoint group size.
    pub fn with_early_stop_base(mut self, early_stop_base: usize) -> Self {
        self.early_stop_base = early_stop_base;
        self
    }

    /// Set the early-stop confidence threshold.
    pub fn with_early_stop_threshold(mut self, threshold: f64) -> Self {
        self.early_stop_threshold = threshold;
        self
    }

    /// Check the budget invariants.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::budget("batch_size must be positive"));
        }
        if self.batch_size > self.early_stop_base {
            return Err(Error::budget(format!(
                "batch_size ({}) exceeds early_stop_base ({})",
                self.batch_size, self.early_stop_base
            )));
        }
        if self.early_stop_base > self.n_confidence {
            return Err(Error::budget(format!(
                "early_stop_base ({}) exceeds n_confidence ({})",
                self.early_stop_base, self.n_confidence
            )));
        }
        if !(self.early_stop_threshold > 0.0 && self.early_stop_threshold <= 1.0) {
            return Err(Error::budget(format!(
                "early_stop_threshold ({}) must be in (0, 1]",
                self.early_stop_threshold
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget_is_valid() {
        let budget = SamplingBudget::default();
        assert_eq!(budget.n_confidence, 8);
        assert_eq!(budget.batch_size, 2);
        assert_eq!(budget.early_stop_base, 8);
        assert!(budget.validate().is_ok());
    }

    #[test]
    fn test_new_spans_whole_budget() {
        let budget = SamplingBudget::new(4);
        assert_eq!(budget.early_stop_base, 4);
        assert!(budget.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let budget = SamplingBudget::new(4)
            .with_batch_size(2)
            .with_early_stop_base(2)
            .with_early_stop_threshold(0.5);
        assert!(budget.validate().is_ok());
        assert_eq!(budget.batch_size, 2);
        assert_eq!(budget.early_stop_base, 2);
        assert!((budget.early_stop_threshold - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_zero_batch() {
        let budget = SamplingBudget::new(4).with_batch_size(0);
        assert!(budget.validate().is_err());
    }

    #[test]
    fn test_rejects_batch_larger_than_group() {
        let budget = SamplingBudget::new(8)
            .with_early_stop_base(2)
            .with_batch_size(4);
        assert!(budget.validate().is_err());
    }

    #[test]
    fn test_rejects_group_larger_than_cap() {
        let budget = SamplingBudget::new(4).with_early_stop_base(8);
        assert!(budget.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_threshold() {
        assert!(SamplingBudget::new(4)
            .with_early_stop_threshold(0.0)
            .validate()
            .is_err());
        assert!(SamplingBudget::new(4)
            .with_early_stop_threshold(1.5)
            .validate()
            .is_err());
    }
}
