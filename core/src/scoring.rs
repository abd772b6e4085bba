use crate::error::FaqError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// How a prompt is compared with a reference question. Picked once at
/// startup; each strategy carries its own acceptance threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringStrategy {
    /// Jaccard similarity of the two lemma sets.
    #[default]
    SetOverlap,
    /// Normalized Levenshtein similarity of the joined lemma strings.
    SequenceRatio,
}

impl ScoringStrategy {
    pub fn threshold(self) -> f64 {
        match self {
            ScoringStrategy::SetOverlap => 0.6,
            ScoringStrategy::SequenceRatio => 0.7,
        }
    }

    pub fn score(self, prompt_set: &BTreeSet<String>, prompt_joined: &str, set: &BTreeSet<String>, joined: &str) -> f64 {
        match self {
            ScoringStrategy::SetOverlap => jaccard(prompt_set, set),
            ScoringStrategy::SequenceRatio => sequence_ratio(prompt_joined, joined),
        }
    }

    pub fn accepts(self, score: f64) -> bool { score >= self.threshold() }
}

impl fmt::Display for ScoringStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringStrategy::SetOverlap => f.write_str("set-overlap"),
            ScoringStrategy::SequenceRatio => f.write_str("sequence-ratio"),
        }
    }
}

impl FromStr for ScoringStrategy {
    type Err = FaqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "set-overlap" | "jaccard" => Ok(ScoringStrategy::SetOverlap),
            "sequence-ratio" | "sequence" => Ok(ScoringStrategy::SequenceRatio),
            other => Err(FaqError::Config(format!("unknown scoring strategy: {other}"))),
        }
    }
}

/// |A ∩ B| / |A ∪ B|, or 0.0 when both sets are empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let inter = a.intersection(b).count();
    let union = a.len() + b.len() - inter;
    if union == 0 { 0.0 } else { inter as f64 / union as f64 }
}

/// Edit-distance similarity in [0, 1]. Two empty strings share nothing to
/// match on and score 0.0.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(a, b)
}

pub(crate) fn round3(x: f64) -> f64 { (x * 1000.0).round() / 1000.0 }
