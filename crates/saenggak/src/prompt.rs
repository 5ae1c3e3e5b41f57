// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Prompt templates for the decomposition world model.
//!
//! A [`PromptSpec`] holds the four template pieces the state transition
//! concatenates into a generation prompt: a fixed instruction preamble
//! (usually carrying few-shot examples), a question-restatement prefix, and
//! indexed sub-question / sub-answer prefixes. The indexed prefixes contain a
//! `{}` slot replaced with the 1-based step index.
//!
//! Specs are plain serde structs, so they can be loaded from the same JSON
//! prompt files the surrounding drivers use:
//!
//! ```
//! use saenggak::prompt::PromptSpec;
//!
//! let spec = PromptSpec::from_json(r#"{
//!     "input": "Solve by decomposition.\n\n",
//!     "question_prefix": "Question 5:",
//!     "subquestion_prefix": "Question 5.{}:",
//!     "answer_prefix": "Answer 5.{}:"
//! }"#).unwrap();
//! assert_eq!(spec.subquestion_prefix(3), "Question 5.3:");
//! ```

use crate::error::Result;
use crate::state::ReasoningState;
use serde::{Deserialize, Serialize};

/// Template pieces for rendering a decomposition prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSpec {
    /// Instruction preamble, typically ending with few-shot examples.
    pub input: String,
    /// Prefix for the question-restatement line.
    pub question_prefix: String,
    /// Indexed prefix for sub-question lines; `{}` is the 1-based index.
    pub subquestion_prefix: String,
    /// Indexed prefix for sub-answer lines; `{}` is the 1-based index.
    pub answer_prefix: String,
}

impl Default for PromptSpec {
    fn default() -> Self {
        Self {
            input: concat!(
                "Given a question, please decompose it into sub-questions. ",
                "For each sub-question, please answer it in a complete sentence, ",
                "ending with \"The answer is\". When the original question is ",
                "answerable, please start the sub-question with ",
                "\"Now we can answer the question: \".\n\n",
            )
            .to_string(),
            question_prefix: "Question 5: ".to_string(),
            subquestion_prefix: "Question 5.{}:".to_string(),
            answer_prefix: "Answer 5.{}:".to_string(),
        }
    }
}

impl PromptSpec {
    /// Load a spec from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sub-question prefix for the given 1-based index.
    pub fn subquestion_prefix(&self, index: usize) -> String {
        indexed(&self.subquestion_prefix, index)
    }

    /// Sub-answer prefix for the given 1-based index.
    pub fn answer_prefix(&self, index: usize) -> String {
        indexed(&self.answer_prefix, index)
    }

    /// Render the full generation prompt for one state transition.
    ///
    /// Layout: preamble, question restatement, every resolved step as a
    /// sub-question/sub-answer pair (1-based), the new action as sub-question
    /// `len + 1`, then the open sub-answer prefix for the model to complete.
    pub fn render(&self, question: &str, state: &ReasoningState, action: &str) -> String {
        let mut out = String::with_capacity(self.input.len() + question.len() + 256);
        out.push_str(&self.input);
        out.push_str(&self.question_prefix);
        out.push_str(question);
        out.push('\n');
        for (idx, step) in state.iter().enumerate() {
            out.push_str(&self.subquestion_prefix(idx + 1));
            out.push(' ');
            out.push_str(&step.sub_question);
            out.push('\n');
            out.push_str(&self.answer_prefix(idx + 1));
            out.push(' ');
            out.push_str(&step.sub_answer);
            out.push('\n');
        }
        let next = state.len() + 1;
        out.push_str(&self.subquestion_prefix(next));
        out.push(' ');
        out.push_str(action);
        out.push('\n');
        out.push_str(&self.answer_prefix(next));
        out
    }
}

fn indexed(template: &str, index: usize) -> String {
    template.replacen("{}", &index.to_string(), 1)
}

// ============================================================================
// Tests
// ============================================================================
