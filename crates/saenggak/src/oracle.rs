// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Text-generation oracle trait using Generic Associated Types (GATs).
//!
//! This module provides the [`TextOracle`] trait which defines the interface
//! to the external language-model backend. Using GATs instead of `async_trait`
//! allows zero-cost async without boxing.
//!
//! The oracle is a collaborator, not a component of this library: token
//! generation, batching and checkpoint loading all live behind this seam.
//! One call requests several independent stochastic completions of the same
//! prompt and must return exactly one completion per input prompt, in order.
//!
//! # Examples
//!
//! ```
//! use saenggak::oracle::{MockOracle, TextOracle};
//!
//! // Create a mock oracle for testing
//! let oracle = MockOracle::new(|prompt| format!("completion of: {}", prompt));
//! ```

use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Options for one generation call.
///
/// Read-only for the lifetime of a sampling run; the sampler only ever
/// overrides the per-batch `seed`.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    /// Suppress echoing the input prompt in the completion.
    pub hide_input: bool,
    /// Stochastic sampling rather than greedy decoding.
    pub do_sample: bool,
    /// Sampling temperature.
    pub temperature: f64,
    /// Stop sequence terminating each completion.
    pub stop: Option<String>,
    /// Explicit seed for reproducible sampling. `None` leaves seeding
    /// to the backend.
    pub seed: Option<u64>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            hide_input: true,
            do_sample: true,
            temperature: 0.8,
            stop: Some("\n".to_string()),
            seed: None,
        }
    }
}

impl GenerateOptions {
    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the stop sequence.
    pub fn with_stop(mut self, stop: impl Into<String>) -> Self {
        self.stop = Some(stop.into());
        self
    }

    /// Set an explicit seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Disable stochastic sampling (greedy decoding).
    pub fn greedy(mut self) -> Self {
        self.do_sample = false;
        self
    }
}

/// Trait for text-generation backends.
///
/// This trait uses GATs for zero-cost async without boxing. Implementations
/// can be synchronous (returning `Ready<T>`) or asynchronous (returning
/// custom futures).
///
/// # Contract
///
/// `generate` must return exactly one completion per input prompt, in the
/// same order. Callers treat any failure as a hard failure; retry policy
/// belongs to the caller, not the oracle.
pub trait TextOracle: Send + Sync {
    /// The future type returned by `generate()`.
    type GenerateFut<'a>: Future<Output = Result<Vec<String>>> + Send + 'a
    where
        Self: 'a;

    /// Generate one completion for each prompt.
    fn generate<'a>(
        &'a self,
        prompts: &'a [String],
        options: &'a GenerateOptions,
    ) -> Self::GenerateFut<'a>;

    /// Get the model name for logging.
    fn model_name(&self) -> &str {
        "unknown"
    }
}

/// A mock oracle for testing and examples.
///
/// Applies a closure to each prompt synchronously. Useful for exercising
/// sampling loops without an actual backend.
pub struct MockOracle<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    generator: F,
    calls: AtomicUsize,
    name: &'static str,
}

impl<F> MockOracle<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    /// Create a new mock oracle with the given generator function.
    pub fn new(generator: F) -> Self {
        Self {
            generator,
            calls: AtomicUsize::new(0),
            name: "mock",
        }
    }

    /// Set a custom name for the mock oracle.
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Number of `generate` calls issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<F> TextOracle for MockOracle<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    type GenerateFut<'a>
        = std::future::Ready<Result<Vec<String>>>
    where
        Self: 'a;

    fn generate<'a>(
        &'a self,
        prompts: &'a [String],
        _options: &'a GenerateOptions,
    ) -> Self::GenerateFut<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outputs = prompts.iter().map(|p| (self.generator)(p)).collect();
        std::future::ready(Ok(outputs))
    }

    fn model_name(&self) -> &str {
        self.name
    }
}

/// A mock oracle that replays a fixed script of completions.
///
/// Each requested completion pops the next scripted output. Requesting more
/// completions than scripted is an error, which makes tests fail loudly when
/// a sampler draws more samples than expected.
pub struct ScriptedOracle {
    script: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    /// Create a scripted oracle from a sequence of completions.
    pub fn new<I, S>(outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(outputs.into_iter().map(Into::into).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of scripted completions not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().expect("script lock poisoned").len()
    }

    /// Number of `generate` calls issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextOracle for ScriptedOracle {
    type GenerateFut<'a>
        = std::future::Ready<Result<Vec<String>>>
    where
        Self: 'a;

    fn generate<'a>(
        &'a self,
        prompts: &'a [String],
        _options: &'a GenerateOptions,
    ) -> Self::GenerateFut<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().expect("script lock poisoned");
        let mut outputs = Vec::with_capacity(prompts.len());
        for _ in prompts {
            match script.pop_front() {
                Some(out) => outputs.push(out),
                None => {
                    return std::future::ready(Err(Error::oracle(
                        "scripted oracle exhausted",
                    )))
                }
            }
        }
        std::future::ready(Ok(outputs))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// An oracle that fails with a specific error.
///
/// Useful for testing error propagation through the sampler.
#[derive(Debug, Clone)]
pub struct FailingOracle {
    message: String,
}

impl FailingOracle {
    /// Create a new failing oracle with the given error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl TextOracle for FailingOracle {
    type GenerateFut<'a>
        = std::future::Ready<Result<Vec<String>>>
    where
        Self: 'a;

    fn generate<'a>(
        &'a self,
        _prompts: &'a [String],
        _options: &'a GenerateOptions,
    ) -> Self::GenerateFut<'a> {
        std::future::ready(Err(Error::oracle(&self.message)))
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_oracle() {
        let oracle = MockOracle::new(|prompt| format!("Response: {}", prompt));
        let prompts = vec!["a".to_string(), "b".to_string()];

        let outputs = oracle
            .generate(&prompts, &GenerateOptions::default())
            .await
            .unwrap();
        assert_eq!(outputs, vec!["Response: a", "Response: b"]);
        assert_eq!(oracle.calls(), 1);
    }

    #[tokio::test]
    async fn test_scripted_oracle() {
        let oracle = ScriptedOracle::new(["one", "two", "three"]);
        let prompts = vec!["p".to_string(); 2];

        let outputs = oracle
            .generate(&prompts, &GenerateOptions::default())
            .await
            .unwrap();
        assert_eq!(outputs, vec!["one", "two"]);
        assert_eq!(oracle.remaining(), 1);
    }

    #[tokio::test]
    async fn test_scripted_oracle_exhausted() {
        let oracle = ScriptedOracle::new(["only"]);
        let prompts = vec!["p".to_string(); 2];

        let result = oracle.generate(&prompts, &GenerateOptions::default()).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().is_oracle_error());
    }

    #[tokio::test]
    async fn test_failing_oracle() {
        let oracle = FailingOracle::new("intentional failure");
        let prompts = vec!["p".to_string()];

        let result = oracle.generate(&prompts, &GenerateOptions::default()).await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("intentional failure"));
    }

    #[test]
    fn test_generate_options_default() {
        let options = GenerateOptions::default();
        assert!(options.hide_input);
        assert!(options.do_sample);
        assert!((options.temperature - 0.8).abs() < f64::EPSILON);
        assert_eq!(options.stop.as_deref(), Some("\n"));
        assert!(options.seed.is_none());
    }

    #[test]
    fn test_generate_options_builders() {
        let options = GenerateOptions::default()
            .with_temperature(0.2)
            .with_stop("\n\n")
            .with_seed(7)
            .greedy();
        assert!((options.temperature - 0.2).abs() < f64::EPSILON);
        assert_eq!(options.stop.as_deref(), Some("\n\n"));
        assert_eq!(options.seed, Some(7));
        assert!(!options.do_sample);
    }
}
