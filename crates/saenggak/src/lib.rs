// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! # Saenggak - Self-Consistency Reasoning World Model
//!
//! Building block for language-model-guided question decomposition: a world
//! model that resolves one sub-question at a time by sampling a text
//! generation oracle repeatedly, majority-voting the extracted answers, and
//! stopping early once the vote is confident enough.
//!
//! An external search driver (MCTS or otherwise) owns the reasoning state and
//! proposes candidate sub-questions; this crate turns each proposal into a
//! resolved step with a confidence value. The oracle backend, the search
//! algorithm and dataset handling all live behind narrow seams
//! ([`TextOracle`], [`WorldModel`]).
//!
//! ## Quick Start
//!
//! ```
//! use saenggak::prelude::*;
//!
//! # fn main() -> saenggak::Result<()> {
//! let oracle = MockOracle::new(|_| "The answer is 5.".to_string());
//! let model = DecompositionModel::new(oracle, "How many apples are left?")
//!     .with_budget(SamplingBudget::new(4).with_batch_size(2));
//!
//! let state = model.init_state();
//! assert!(!is_terminal(&state));
//!
//! // Sample a single prompt directly:
//! let oracle = MockOracle::new(|_| "The answer is 42.".to_string());
//! let result = consistency(&oracle, "Question 5.1: what is 6 * 7?").go()?;
//! assert_eq!(result.confidence, 1.0);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Allow common patterns that trigger clippy warnings but are intentional
#![allow(clippy::needless_lifetimes)]
#![allow(clippy::should_implement_trait)]

pub mod budget;
pub mod consistency;
pub mod error;
pub mod extract;
pub mod oracle;
pub mod prompt;
pub mod rng;
pub mod state;
pub mod tally;
pub mod world;

// Re-exports for convenience
pub use budget::SamplingBudget;
pub use consistency::{consistency, Consistency, ConsistencyResult};
pub use error::{Error, Result};
pub use extract::{judge_answer, AnswerKey, Extract, FnExtract, NumericExtract};
pub use oracle::{FailingOracle, GenerateOptions, MockOracle, ScriptedOracle, TextOracle};
pub use prompt::PromptSpec;
pub use rng::RandomSource;
pub use state::{ReasoningState, ReasoningStep};
pub use tally::{AnswerTally, Bucket};
pub use world::{is_terminal, DecompositionModel, WorldModel, TERMINAL_MARKER};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::budget::SamplingBudget;
    pub use crate::consistency::{consistency, Consistency, ConsistencyResult};
    pub use crate::error::{Error, Result};
    pub use crate::extract::{judge_answer, AnswerKey, Extract, FnExtract, NumericExtract};
    pub use crate::oracle::{
        FailingOracle, GenerateOptions, MockOracle, ScriptedOracle, TextOracle,
    };
    pub use crate::prompt::PromptSpec;
    pub use crate::rng::RandomSource;
    pub use crate::state::{ReasoningState, ReasoningStep};
    pub use crate::tally::AnswerTally;
    pub use crate::world::{is_terminal, DecompositionModel, WorldModel, TERMINAL_MARKER};
}

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
