// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Reasoning state: the ordered history of resolved decomposition steps.
//!
//! A [`ReasoningState`] is never mutated in place. Extending it returns a new
//! state whose prefix is shared structurally with the old one, so search
//! branches holding the same prefix never observe each other's extensions.
//! Steps sit behind `Arc`, which makes the extension a shallow pointer copy
//! rather than a deep copy of the history.

use std::fmt;
use std::sync::Arc;

/// One resolved decomposition step.
#[derive(Debug, Clone, PartialEq)]
pub struct ReasoningStep {
    /// The sub-question that was posed.
    pub sub_question: String,
    /// The sub-answer selected by majority vote.
    pub sub_answer: String,
    /// Vote share of the winning answer, in `[0, 1]`.
    pub confidence: f64,
}

impl ReasoningStep {
    /// Create a new step.
    pub fn new(
        sub_question: impl Into<String>,
        sub_answer: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            sub_question: sub_question.into(),
            sub_answer: sub_answer.into(),
            confidence,
        }
    }
}

/// Ordered, append-only history of reasoning steps.
///
/// Cloning and extending are cheap: both copy `Arc` pointers, not step
/// contents.
#[derive(Debug, Clone, Default)]
pub struct ReasoningState {
    steps: Vec<Arc<ReasoningStep>>,
}

impl ReasoningState {
    /// Create an empty state (trajectory start).
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of resolved steps.
    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no step has been resolved yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The most recent step, if any.
    pub fn last(&self) -> Option<&ReasoningStep> {
        self.steps.last().map(Arc::as_ref)
    }

    /// The step at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&ReasoningStep> {
        self.steps.get(index).map(Arc::as_ref)
    }

    /// Iterate over the steps in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = &ReasoningStep> {
        self.steps.iter().map(Arc::as_ref)
    }

    /// Return a new state with `step` appended. `self` is unchanged; the
    /// shared prefix is not copied.
    #[must_use]
    pub fn extended(&self, step: ReasoningStep) -> Self {
        let mut steps = self.steps.clone();
        steps.push(Arc::new(step));
        Self { steps }
    }
}

impl fmt::Display for ReasoningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, step) in self.iter().enumerate() {
            writeln!(
                f,
                "{}. {} -> {} ({:.2})",
                idx + 1,
                step.sub_question,
                step.sub_answer,
                step.confidence
            )?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
