// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Insertion-ordered answer tally for majority voting.
//!
//! Maps each canonical [`AnswerKey`] to the ordered list of raw completions
//! that produced it. Buckets keep their insertion order, so "first seen wins"
//! tie-breaking is deterministic and independent of any hash map iteration
//! order. A tally lives for exactly one sampling run and is discarded
//! afterwards.

use crate::extract::AnswerKey;
use smallvec::SmallVec;

/// One vote bucket: a canonical answer and the raw completions behind it.
#[derive(Debug, Clone)]
pub struct Bucket {
    key: AnswerKey,
    outputs: SmallVec<[String; 4]>,
}

impl Bucket {
    /// The canonical answer this bucket votes for.
    #[inline]
    pub fn key(&self) -> &AnswerKey {
        &self.key
    }

    /// Raw completions in the order they were recorded.
    #[inline]
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Number of votes in this bucket.
    #[inline]
    pub fn count(&self) -> usize {
        self.outputs.len()
    }

    /// The first raw completion recorded for this answer.
    #[inline]
    pub fn first_output(&self) -> &str {
        &self.outputs[0]
    }
}

/// Insertion-ordered mapping from canonical answer to its raw completions.
#[derive(Debug, Clone, Default)]
pub struct AnswerTally {
    buckets: Vec<Bucket>,
}

impl AnswerTally {
    /// Create an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one raw completion under its canonical answer.
    pub fn record(&mut self, key: AnswerKey, raw: impl Into<String>) {
        let raw = raw.into();
        if let Some(bucket) = self.buckets.iter_mut().find(|b| b.key == key) {
            bucket.outputs.push(raw);
        } else {
            self.buckets.push(Bucket {
                key,
                outputs: SmallVec::from_iter([raw]),
            });
        }
    }

    /// Whether no completions have been recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of distinct answers seen.
    #[inline]
    pub fn distinct(&self) -> usize {
        self.buckets.len()
    }

    /// Total completions recorded across all buckets.
    pub fn total(&self) -> usize {
        self.buckets.iter().map(Bucket::count).sum()
    }

    /// All buckets in insertion order.
    #[inline]
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// The leading bucket: largest count, earliest-seen on equal counts.
    pub fn leader(&self) -> Option<&Bucket> {
        // max_by_key returns the LAST maximum; scan manually to keep the first.
        let mut best: Option<&Bucket> = None;
        for bucket in &self.buckets {
            match best {
                Some(b) if bucket.count() <= b.count() => {}
                _ => best = Some(bucket),
            }
        }
        best
    }

    /// Whether the leader is tied with another bucket of equal count.
    ///
    /// A tied leader blocks early stopping: more evidence is needed to
    /// break the tie.
    pub fn leader_is_tied(&self) -> bool {
        let Some(leader) = self.leader() else {
            return false;
        };
        self.buckets
            .iter()
            .filter(|b| b.count() == leader.count())
            .count()
            >= 2
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> AnswerKey {
        AnswerKey::Value(s.to_string())
    }

    #[test]
    fn test_record_and_totals() {
        let mut tally = AnswerTally::new();
        assert!(tally.is_empty());

        tally.record(key("42"), "The answer is 42.");
        tally.record(key("42"), "So, the answer is 42");
        tally.record(key("41"), "The answer is 41.");

        assert!(!tally.is_empty());
        assert_eq!(tally.total(), 3);
        assert_eq!(tally.distinct(), 2);
    }

    #[test]
    fn test_every_output_in_exactly_one_bucket() {
        let mut tally = AnswerTally::new();
        tally.record(key("a"), "raw1");
        tally.record(AnswerKey::NoAnswer, "raw2");
        tally.record(key("a"), "raw3");

        let per_bucket: usize = tally.buckets().iter().map(Bucket::count).sum();
        assert_eq!(per_bucket, tally.total());
        assert_eq!(tally.total(), 3);
    }

    #[test]
    fn test_leader_by_count() {
        let mut tally = AnswerTally::new();
        tally.record(key("3"), "r1");
        tally.record(key("5"), "r2");
        tally.record(key("3"), "r3");

        let leader = tally.leader().unwrap();
        assert_eq!(leader.key(), &key("3"));
        assert_eq!(leader.count(), 2);
        assert_eq!(leader.first_output(), "r1");
        assert!(!tally.leader_is_tied());
    }

    #[test]
    fn test_leader_tie_breaks_first_seen() {
        let mut tally = AnswerTally::new();
        tally.record(key("5"), "r1");
        tally.record(key("3"), "r2");

        // Equal counts: first-inserted key wins.
        let leader = tally.leader().unwrap();
        assert_eq!(leader.key(), &key("5"));
        assert!(tally.leader_is_tied());
    }

    #[test]
    fn test_no_answer_bucket_can_lead() {
        let mut tally = AnswerTally::new();
        tally.record(AnswerKey::NoAnswer, "gibberish one");
        tally.record(AnswerKey::NoAnswer, "gibberish two");
        tally.record(key("7"), "The answer is 7.");

        let leader = tally.leader().unwrap();
        assert!(leader.key().is_no_answer());
        assert_eq!(leader.first_output(), "gibberish one");
    }

    #[test]
    fn test_empty_tally() {
        let tally = AnswerTally::new();
        assert!(tally.leader().is_none());
        assert!(!tally.leader_is_tied());
        assert_eq!(tally.total(), 0);
    }
}
