// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Adaptive self-consistency sampling.
//!
//! This module provides the [`consistency`] entry point: draw multiple
//! stochastic completions of the same prompt, bucket them by canonical
//! answer, and stop early once the leading answer is confident enough.
//!
//! The sampling budget is partitioned into checkpoint groups of
//! `early_stop_base` samples; within a group, completions are requested in
//! batches of `batch_size` per oracle call. After each full group, sampling
//! stops if the leading bucket's share of the samples drawn so far meets
//! `early_stop_threshold` — unless the leader is tied with a second bucket of
//! equal count, in which case sampling continues to break the tie with more
//! evidence.
//!
//! # Examples
//!
//! ```
//! use saenggak::consistency::consistency;
//! use saenggak::budget::SamplingBudget;
//! use saenggak::oracle::MockOracle;
//!
//! let oracle = MockOracle::new(|_| "The answer is 42.".to_string());
//!
//! let result = consistency(&oracle, "Question 5.1: What is 6 * 7?")
//!     .budget(SamplingBudget::new(4))
//!     .go()
//!     .unwrap();
//! assert_eq!(result.confidence, 1.0);
//! ```

use crate::budget::SamplingBudget;
use crate::error::{Error, Result};
use crate::extract::{Extract, NumericExtract};
use crate::oracle::{GenerateOptions, TextOracle};
use crate::rng::RandomSource;
use crate::tally::AnswerTally;

/// Entry point for adaptive self-consistency sampling.
///
/// Creates a builder over an oracle and a fully formatted prompt.
///
/// # Examples
///
/// ```
/// use saenggak::consistency::consistency;
/// use saenggak::budget::SamplingBudget;
/// use saenggak::oracle::MockOracle;
///
/// let oracle = MockOracle::new(|_| "The answer is 3.".to_string());
///
/// let result = consistency(&oracle, "prompt")
///     .budget(SamplingBudget::new(4).with_early_stop_base(2).with_early_stop_threshold(0.5))
///     .go()
///     .unwrap();
/// assert!(result.stopped_early);
/// ```
pub fn consistency<'a, O: TextOracle>(
    oracle: &'a O,
    prompt: &'a str,
) -> Consistency<'a, O, NumericExtract> {
    Consistency::new(oracle, prompt)
}

/// Self-consistency sampling builder.
pub struct Consistency<'a, O: TextOracle, E: Extract> {
    oracle: &'a O,
    prompt: &'a str,
    budget: SamplingBudget,
    options: GenerateOptions,
    extractor: E,
    rng: Option<RandomSource>,
}

impl<'a, O: TextOracle> Consistency<'a, O, NumericExtract> {
    /// Create a new sampler with the default budget and extractor.
    pub fn new(oracle: &'a O, prompt: &'a str) -> Self {
        Self {
            oracle,
            prompt,
            budget: SamplingBudget::default(),
            options: GenerateOptions::default(),
            extractor: NumericExtract,
            rng: None,
        }
    }
}

impl<'a, O: TextOracle, E: Extract> Consistency<'a, O, E> {
    /// Set the sampling budget.
    pub fn budget(mut self, budget: SamplingBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Set the generation options used for every oracle call.
    pub fn options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.options.temperature = temperature;
        self
    }

    /// Thread an explicit random source through the run.
    ///
    /// Each generation batch receives a seed derived from this source,
    /// making the run reproducible with a deterministic oracle.
    pub fn seeded(mut self, rng: RandomSource) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Replace the canonical-answer extractor.
    pub fn extract_with<E2: Extract>(self, extractor: E2) -> Consistency<'a, O, E2> {
        Consistency {
            oracle: self.oracle,
            prompt: self.prompt,
            budget: self.budget,
            options: self.options,
            extractor,
            rng: self.rng,
        }
    }

    /// Execute synchronously.
    #[cfg(feature = "native")]
    pub fn go(self) -> Result<ConsistencyResult> {
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            tokio::task::block_in_place(|| handle.block_on(self.run()))
        } else {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to create tokio runtime")
                .block_on(self.run())
        }
    }

    /// Execute synchronously (fallback without tokio).
    #[cfg(not(feature = "native"))]
    pub fn go(self) -> Result<ConsistencyResult> {
        futures::executor::block_on(self.run())
    }

    /// Execute synchronously, returning the result and the full tally.
    #[cfg(feature = "native")]
    pub fn go_with_tally(self) -> Result<(ConsistencyResult, AnswerTally)> {
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            tokio::task::block_in_place(|| handle.block_on(self.run_with_tally()))
        } else {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to create tokio runtime")
                .block_on(self.run_with_tally())
        }
    }

    /// Execute synchronously, returning the result and the full tally
    /// (fallback without tokio).
    #[cfg(not(feature = "native"))]
    pub fn go_with_tally(self) -> Result<(ConsistencyResult, AnswerTally)> {
        futures::executor::block_on(self.run_with_tally())
    }

    /// Execute asynchronously.
    pub async fn run(self) -> Result<ConsistencyResult> {
        let (result, _) = self.run_with_tally().await?;
        Ok(result)
    }

    /// Execute asynchronously, returning the result and the full tally.
    ///
    /// The tally exposes the whole vote distribution for callers that want
    /// diagnostics beyond the winning answer.
    pub async fn run_with_tally(mut self) -> Result<(ConsistencyResult, AnswerTally)> {
        self.budget.validate()?;

        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("consistency", cap = self.budget.n_confidence).entered();

        let mut tally = AnswerTally::new();
        let mut drawn = 0usize;
        let mut stopped_early = false;

        let mut start1 = 0;
        while start1 < self.budget.n_confidence {
            // One checkpoint group: [start1, stop1). The last group may be
            // shorter than early_stop_base.
            let stop1 = (start1 + self.budget.early_stop_base).min(self.budget.n_confidence);

            let mut start = start1;
            while start < stop1 {
                let stop = (start + self.budget.batch_size).min(stop1);
                let num = stop - start;

                if let Some(rng) = self.rng.as_mut() {
                    self.options.seed = Some(rng.next_u64());
                }

                let prompts = vec![self.prompt.to_string(); num];
                let outputs = self.oracle.generate(&prompts, &self.options).await?;
                if outputs.len() != num {
                    return Err(Error::oracle(format!(
                        "expected {} completions, oracle returned {}",
                        num,
                        outputs.len()
                    )));
                }
                for output in outputs {
                    let raw = output.trim().to_string();
                    let key = self.extractor.extract(&raw);
                    tally.record(key, raw);
                }
                drawn = stop;
                start = stop;
            }

            // Early-stop evaluation only after the whole group completed.
            // A leader tied for first place never stops the run: more
            // evidence is needed to break the tie.
            if let Some(leader) = tally.leader() {
                let ratio = leader.count() as f64 / stop1 as f64;

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    drawn = stop1,
                    leading = leader.count(),
                    ratio,
                    "consistency checkpoint"
                );

                if ratio >= self.budget.early_stop_threshold && !tally.leader_is_tied() {
                    if stop1 < self.budget.n_confidence {
                        stopped_early = true;
                    }
                    break;
                }
            }

            start1 = stop1;
        }

        let result = match tally.leader() {
            // Budget exhausted with nothing tallied: a valid but
            // uninformative result, not an error.
            None => ConsistencyResult {
                answer: String::new(),
                confidence: 0.0,
                samples_drawn: drawn,
                stopped_early: false,
            },
            Some(leader) => ConsistencyResult {
                answer: leader.first_output().to_string(),
                confidence: leader.count() as f64 / tally.total() as f64,
                samples_drawn: drawn,
                stopped_early,
            },
        };

        #[cfg(feature = "tracing")]
        tracing::info!(
            answer = %result.answer,
            confidence = result.confidence,
            samples = result.samples_drawn,
            "consistency complete"
        );

        Ok((result, tally))
    }
}

/// Result of one self-consistency run.
#[derive(Debug, Clone)]
pub struct ConsistencyResult {
    /// The first raw completion recorded in the winning bucket. Empty when
    /// the budget was exhausted with nothing tallied.
    pub answer: String,
    /// Winning bucket size over total samples drawn; 0.0 when nothing was
    /// tallied.
    pub confidence: f64,
    /// Total completions drawn before stopping.
    pub samples_drawn: usize,
    /// Whether the early-stop policy fired before the budget was exhausted.
    pub stopped_early: bool,
}

impl ConsistencyResult {
    /// Whether any answer was tallied at all.
    pub fn has_answer(&self) -> bool {
        self.confidence > 0.0
    }
}

// ============================================================================
// Tests
// ============================================================================
