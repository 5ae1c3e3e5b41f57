// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Decomposition world model: the state transition consumed by an external
//! search driver.
//!
//! The driver owns a [`ReasoningState`], proposes candidate sub-questions
//! (actions), and calls [`WorldModel::step`] / [`WorldModel::is_terminal`].
//! One step renders the prompt from the accumulated history plus the new
//! action, runs the adaptive self-consistency sampler, and returns the
//! extended state together with the vote confidence. Tree search itself,
//! action proposal and reward shaping all live outside this crate.
//!
//! # Examples
//!
//! ```
//! use saenggak::oracle::MockOracle;
//! use saenggak::world::{is_terminal, DecompositionModel, WorldModel};
//!
//! let oracle = MockOracle::new(|_| "The answer is 5.".to_string());
//! let model = DecompositionModel::new(oracle, "How many apples are left?");
//!
//! let state = model.init_state();
//! assert!(!is_terminal(&state));
//! ```

use crate::budget::SamplingBudget;
use crate::consistency::consistency;
use crate::error::{Error, Result};
use crate::extract::{Extract, NumericExtract};
use crate::oracle::{GenerateOptions, TextOracle};
use crate::prompt::PromptSpec;
use crate::rng::RandomSource;
use crate::state::{ReasoningState, ReasoningStep};
use std::future::Future;
use std::pin::Pin;

/// Sentinel substring marking a terminal sub-question.
///
/// The action proposer signals that no further decomposition is needed by
/// starting the final sub-question with this phrase.
pub const TERMINAL_MARKER: &str = "Now we can answer";

/// Check whether the latest sub-question declares the reasoning complete.
///
/// Case-sensitive substring match, no normalization. An empty state is never
/// terminal.
pub fn is_terminal(state: &ReasoningState) -> bool {
    state
        .last()
        .is_some_and(|step| step.sub_question.contains(TERMINAL_MARKER))
}

/// World model seam consumed by the external search driver.
///
/// Uses a GAT future for `step` so implementations control their own future
/// type. The driver owns the state; `step` reads it and returns a new one.
pub trait WorldModel: Send + Sync {
    /// State owned by the search driver.
    type State;
    /// Proposed action (for decomposition: candidate sub-question text).
    type Action: ?Sized;
    /// The future type returned by `step()`.
    type StepFut<'a>: Future<Output = Result<(Self::State, f64)>> + Send + 'a
    where
        Self: 'a;

    /// State at trajectory start.
    fn init_state(&self) -> Self::State;

    /// Apply `action` to `state`, returning the new state and the step's
    /// diagnostic confidence. The input state is left unmodified.
    fn step<'a>(&'a self, state: &'a Self::State, action: &'a Self::Action) -> Self::StepFut<'a>;

    /// Whether `state` is terminal.
    fn is_terminal(&self, state: &Self::State) -> bool;
}

/// Self-consistency world model for multi-step question decomposition.
///
/// Owns the oracle and the fixed per-instance configuration (prompt
/// templates, sampling budget, generation options, extractor). The target
/// question is the only retargetable piece, via [`set_question`](Self::set_question).
pub struct DecompositionModel<O: TextOracle, E: Extract = NumericExtract> {
    oracle: O,
    prompt: PromptSpec,
    question: String,
    budget: SamplingBudget,
    options: GenerateOptions,
    extractor: E,
    seed: Option<u64>,
}

impl<O: TextOracle> DecompositionModel<O, NumericExtract> {
    /// Create a model over `oracle` targeting `question`, with the default
    /// prompt templates, budget and extractor.
    pub fn new(oracle: O, question: impl Into<String>) -> Self {
        Self {
            oracle,
            prompt: PromptSpec::default(),
            question: question.into(),
            budget: SamplingBudget::default(),
            options: GenerateOptions::default(),
            extractor: NumericExtract,
            seed: None,
        }
    }
}

impl<O: TextOracle, E: Extract + Clone> DecompositionModel<O, E> {
    /// Set the prompt templates.
    pub fn with_prompt(mut self, prompt: PromptSpec) -> Self {
        self.prompt = prompt;
        self
    }

    /// Set the sampling budget.
    pub fn with_budget(mut self, budget: SamplingBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Set the generation options.
    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.options.temperature = temperature;
        self
    }

    /// Seed the model for reproducible sampling. Each step derives its own
    /// stream from this seed and the step depth.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replace the canonical-answer extractor.
    pub fn with_extractor<E2: Extract + Clone>(self, extractor: E2) -> DecompositionModel<O, E2> {
        DecompositionModel {
            oracle: self.oracle,
            prompt: self.prompt,
            question: self.question,
            budget: self.budget,
            options: self.options,
            extractor,
            seed: self.seed,
        }
    }

    /// The question currently targeted.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Retarget the model at a new question (e.g. the next dataset example).
    pub fn set_question(&mut self, question: impl Into<String>) {
        self.question = question.into();
    }

    /// Apply one decomposition step.
    ///
    /// Rejects empty action text before any oracle call; oracle failures
    /// propagate unretried. Returns the extended state and the winning
    /// answer's confidence.
    pub async fn transition(
        &self,
        state: &ReasoningState,
        action: &str,
    ) -> Result<(ReasoningState, f64)> {
        if action.trim().is_empty() {
            return Err(Error::prompt("action text is empty"));
        }

        let prompt = self.prompt.render(&self.question, state, action);

        let sampler = consistency(&self.oracle, &prompt)
            .budget(self.budget)
            .options(self.options.clone())
            .extract_with(self.extractor.clone());
        let sampler = match self.seed {
            Some(seed) => sampler.seeded(RandomSource::new(
                seed ^ (state.len() as u64 + 1).wrapping_mul(0x9e37_79b9_7f4a_7c15),
            )),
            None => sampler,
        };

        let result = sampler.run().await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            depth = state.len() + 1,
            confidence = result.confidence,
            samples = result.samples_drawn,
            "decomposition step"
        );

        let confidence = result.confidence;
        let next = state.extended(ReasoningStep::new(action, result.answer, confidence));
        Ok((next, confidence))
    }
}

impl<O: TextOracle, E: Extract + Clone> WorldModel for DecompositionModel<O, E> {
    type State = ReasoningState;
    type Action = str;
    type StepFut<'a>
        = Pin<Box<dyn Future<Output = Result<(ReasoningState, f64)>> + Send + 'a>>
    where
        Self: 'a;

    fn init_state(&self) -> ReasoningState {
        ReasoningState::new()
    }

    fn step<'a>(&'a self, state: &'a ReasoningState, action: &'a str) -> Self::StepFut<'a> {
        Box::pin(self.transition(state, action))
    }

    fn is_terminal(&self, state: &ReasoningState) -> bool {
        is_terminal(state)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{FailingOracle, MockOracle, ScriptedOracle};
    use crate::state::ReasoningStep;

    #[test]
    fn test_terminal_predicate() {
        let empty = ReasoningState::new();
        assert!(!is_terminal(&empty));

        let ongoing = empty.extended(ReasoningStep::new(
            "How many apples were eaten?",
            "The answer is 3.",
            1.0,
        ));
        assert!(!is_terminal(&ongoing));

        let done = ongoing.extended(ReasoningStep::new(
            "Now we can answer the question: how many apples are left?",
            "The answer is 2.",
            0.9,
        ));
        assert!(is_terminal(&done));
    }

    #[test]
    fn test_terminal_predicate_is_case_sensitive() {
        let state = ReasoningState::new().extended(ReasoningStep::new(
            "now we can answer the question",
            "a",
            1.0,
        ));
        assert!(!is_terminal(&state));
    }

    #[test]
    fn test_terminal_checks_only_last_step() {
        let state = ReasoningState::new()
            .extended(ReasoningStep::new("Now we can answer: part one", "a", 1.0))
            .extended(ReasoningStep::new("But wait, one more part?", "b", 1.0));
        assert!(!is_terminal(&state));
    }

    #[tokio::test]
    async fn test_step_extends_state_by_one() {
        let oracle = MockOracle::new(|_| "The answer is 5.".to_string());
        let model = DecompositionModel::new(oracle, "How many apples?")
            .with_budget(SamplingBudget::new(4));

        let state = model.init_state();
        let (next, confidence) = model.step(&state, "How many were bought?").await.unwrap();

        assert_eq!(next.len(), 1);
        assert_eq!(state.len(), 0);
        assert_eq!(confidence, 1.0);

        let step = next.last().unwrap();
        assert_eq!(step.sub_question, "How many were bought?");
        assert_eq!(step.sub_answer, "The answer is 5.");
        assert_eq!(step.confidence, 1.0);
    }

    #[tokio::test]
    async fn test_step_rejects_empty_action() {
        let oracle = MockOracle::new(|_| "The answer is 5.".to_string());
        let model = DecompositionModel::new(oracle, "q");

        let state = model.init_state();
        let result = model.step(&state, "   ").await;
        assert!(matches!(result, Err(Error::Prompt(_))));
    }

    #[tokio::test]
    async fn test_step_prompt_layout() {
        // The oracle sees the rendered prompt; assert its shape there.
        let oracle = MockOracle::new(|prompt: &str| {
            assert!(prompt.contains("Question 5: How many apples?"));
            assert!(prompt.contains("Question 5.1: sub one?"));
            assert!(prompt.contains("Answer 5.1: The answer is 3."));
            assert!(prompt.contains("Question 5.2: sub two?"));
            assert!(prompt.ends_with("Answer 5.2:"));
            "The answer is 7.".to_string()
        });
        let model = DecompositionModel::new(oracle, "How many apples?")
            .with_budget(SamplingBudget::new(2).with_batch_size(2));

        let state = model
            .init_state()
            .extended(ReasoningStep::new("sub one?", "The answer is 3.", 1.0));
        let (next, _) = model.step(&state, "sub two?").await.unwrap();
        assert_eq!(next.len(), 2);
    }

    #[tokio::test]
    async fn test_step_confidence_from_vote_share() {
        let oracle = ScriptedOracle::new([
            "The answer is 3.",
            "The answer is 5.",
            "The answer is 3.",
            "The answer is 3.",
        ]);
        let model =
            DecompositionModel::new(oracle, "q").with_budget(SamplingBudget::new(4));

        let state = model.init_state();
        let (next, confidence) = model.step(&state, "sub?").await.unwrap();

        assert!((confidence - 0.75).abs() < f64::EPSILON);
        assert_eq!(next.last().unwrap().sub_answer, "The answer is 3.");
    }

    #[tokio::test]
    async fn test_oracle_failure_is_a_hard_failure() {
        let model = DecompositionModel::new(FailingOracle::new("down"), "q");
        let state = model.init_state();

        let result = model.step(&state, "sub?").await;
        assert!(result.is_err());
        assert!(result.unwrap_err().is_oracle_error());
    }

    #[tokio::test]
    async fn test_set_question_retargets_prompt() {
        let oracle = MockOracle::new(|prompt: &str| {
            assert!(prompt.contains("second question"));
            "The answer is 1.".to_string()
        });
        let mut model = DecompositionModel::new(oracle, "first question")
            .with_budget(SamplingBudget::new(2).with_batch_size(2));
        model.set_question("second question");

        let state = model.init_state();
        model.step(&state, "sub?").await.unwrap();
    }

    #[tokio::test]
    async fn test_seeded_steps_are_reproducible() {
        let make_model = || {
            let oracle = MockOracle::new(|_| "The answer is 4.".to_string());
            DecompositionModel::new(oracle, "q")
                .with_budget(SamplingBudget::new(4))
                .with_seed(99)
        };

        let a = make_model();
        let b = make_model();
        let state = ReasoningState::new();

        let (next_a, conf_a) = a.step(&state, "sub?").await.unwrap();
        let (next_b, conf_b) = b.step(&state, "sub?").await.unwrap();
        assert_eq!(conf_a, conf_b);
        assert_eq!(
            next_a.last().unwrap().sub_answer,
            next_b.last().unwrap().sub_answer
        );
    }

    // The model is usable through the trait by a generic driver.
    async fn drive<W>(model: &W, actions: &[&str]) -> W::State
    where
        W: WorldModel<State = ReasoningState, Action = str>,
    {
        let mut state = model.init_state();
        for action in actions {
            if model.is_terminal(&state) {
                break;
            }
            let (next, _) = model.step(&state, action).await.unwrap();
            state = next;
        }
        state
    }

    #[tokio::test]
    async fn test_generic_driver_runs_to_terminal() {
        let oracle = MockOracle::new(|_| "The answer is 6.".to_string());
        let model =
            DecompositionModel::new(oracle, "q").with_budget(SamplingBudget::new(2).with_batch_size(2));

        let state = drive(
            &model,
            &[
                "How many to start?",
                "Now we can answer the question: how many remain?",
                "This action should never run",
            ],
        )
        .await;

        assert_eq!(state.len(), 2);
        assert!(is_terminal(&state));
    }
}
