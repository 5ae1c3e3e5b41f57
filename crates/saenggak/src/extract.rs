// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Canonical-answer extraction.
//!
//! Self-consistency voting buckets raw completions by the *canonical answer*
//! they express, not by their literal text. This module provides the
//! [`Extract`] seam plus the default [`NumericExtract`] implementation for
//! math word problems: it prefers an option letter or number following an
//! "answer is" marker and falls back to the last number in the text.
//!
//! # Examples
//!
//! ```
//! use saenggak::extract::{AnswerKey, Extract, NumericExtract};
//!
//! let extract = NumericExtract;
//! assert_eq!(
//!     extract.extract("The total is 750 + 175. The answer is 925."),
//!     AnswerKey::Value("925".to_string()),
//! );
//! assert_eq!(
//!     extract.extract("The answer is (C)."),
//!     AnswerKey::Value("C".to_string()),
//! );
//! assert_eq!(extract.extract("I am not sure."), AnswerKey::NoAnswer);
//! ```

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Canonical answer used as a tally bucket key.
///
/// Opaque and comparable; completions with equal keys vote together.
/// `NoAnswer` is a first-class key: unparseable completions are tallied
/// under it like any other value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnswerKey {
    /// A canonicalized answer value.
    Value(String),
    /// No answer could be extracted from the completion.
    NoAnswer,
}

impl AnswerKey {
    /// Check whether this key is the no-answer sentinel.
    #[inline]
    pub fn is_no_answer(&self) -> bool {
        matches!(self, Self::NoAnswer)
    }
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{}", v),
            Self::NoAnswer => write!(f, "<no answer>"),
        }
    }
}

/// Trait for canonical-answer extraction.
///
/// Implementations map a raw completion to the bucket key used for voting.
pub trait Extract: Send + Sync {
    /// Extract the canonical answer from a raw completion.
    fn extract(&self, raw: &str) -> AnswerKey;
}

/// Extractor created from a closure.
pub struct FnExtract<F>(pub F);

impl<F: Fn(&str) -> AnswerKey + Send + Sync> Extract for FnExtract<F> {
    fn extract(&self, raw: &str) -> AnswerKey {
        (self.0)(raw)
    }
}

fn option_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Option letter right after the marker: "(C)", "C." etc.
    RE.get_or_init(|| Regex::new(r"^[\s:]*\(?([A-Ea-e])\)?(?:[\s.,)]|$)").expect("valid regex"))
}

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[-+]?\$?\d[\d,]*(?:\.\d+)?").expect("valid regex"))
}

/// Default extractor for math word problems (AQuA-style).
///
/// Resolution order:
/// 1. option letter (`A`-`E`) immediately following the last "answer is"
///    marker, case-insensitive on the marker;
/// 2. first number following that marker;
/// 3. last number anywhere in the text;
/// 4. [`AnswerKey::NoAnswer`].
///
/// Numbers are canonicalized by stripping `$` and `,`, dropping a trailing
/// period and collapsing through `f64` so that `"3"`, `"3.0"` and `"$3"`
/// vote together.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericExtract;

impl NumericExtract {
    fn after_marker(raw: &str) -> Option<&str> {
        // ASCII lowering keeps byte offsets aligned with `raw`.
        let lower = raw.to_ascii_lowercase();
        let idx = lower.rfind("answer is")?;
        Some(&raw[idx + "answer is".len()..])
    }

    fn canonical_number(text: &str) -> Option<String> {
        let m = number_re().find(text)?;
        Some(clean_number(m.as_str()))
    }
}

fn clean_number(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect::<String>()
        .trim_end_matches('.')
        .to_string();
    match cleaned.parse::<f64>() {
        Ok(v) => format!("{}", v),
        Err(_) => cleaned,
    }
}

impl Extract for NumericExtract {
    fn extract(&self, raw: &str) -> AnswerKey {
        if let Some(rest) = Self::after_marker(raw) {
            if let Some(caps) = option_re().captures(rest) {
                return AnswerKey::Value(caps[1].to_uppercase());
            }
            if let Some(num) = Self::canonical_number(rest) {
                return AnswerKey::Value(num);
            }
        }
        // No marker (or nothing usable after it): last number in the text.
        if let Some(m) = number_re().find_iter(raw).last() {
            return AnswerKey::Value(clean_number(m.as_str()));
        }
        AnswerKey::NoAnswer
    }
}

/// Judge a predicted answer against the gold answer.
///
/// Both sides are canonicalized with [`NumericExtract`] semantics: option
/// letters compare case-insensitively, numbers compare by value. An
/// unextractable prediction never matches.
pub fn judge_answer(prediction: &str, gold: &str) -> bool {
    let predicted = NumericExtract.extract(prediction);
    let AnswerKey::Value(predicted) = predicted else {
        return false;
    };
    let gold = gold.trim();
    if predicted.eq_ignore_ascii_case(gold) {
        return true;
    }
    match (predicted.parse::<f64>(), gold.parse::<f64>()) {
        (Ok(p), Ok(g)) => (p - g).abs() < 1e-9,
        _ => false,
    }
}

// ============================================================================
// Tests
// ============================================================================
