//! Core types for match scoring and resolution outcomes

use crate::candidate::Candidate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Matching tier, ordered by precedence (lower wins)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Byte-for-byte equality
    Exact,
    /// Equality after case folding
    CaseInsensitive,
    /// Case-folded name starts with the case-folded input
    Prefix,
    /// Normalized similarity at or above the configured threshold
    Fuzzy,
}

impl MatchStrategy {
    /// Fixed score for the deterministic tiers; `None` for fuzzy
    pub fn fixed_score(&self) -> Option<f64> {
        match self {
            Self::Exact => Some(1.0),
            Self::CaseInsensitive => Some(0.95),
            Self::Prefix => Some(0.9),
            Self::Fuzzy => None,
        }
    }

    /// Human-readable tier label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::CaseInsensitive => "case-insensitive",
            Self::Prefix => "prefix",
            Self::Fuzzy => "fuzzy",
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A candidate paired with the tier that matched it and its score in [0.0, 1.0]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMatch {
    pub candidate: Candidate,
    pub strategy: MatchStrategy,
    pub score: f64,
}

impl ScoredMatch {
    /// Create a match for one of the fixed-score tiers
    ///
    /// Fuzzy matches carry a computed score; use [`ScoredMatch::fuzzy`].
    pub fn fixed(candidate: Candidate, strategy: MatchStrategy) -> Self {
        Self {
            candidate,
            score: strategy.fixed_score().unwrap_or(0.0),
            strategy,
        }
    }

    /// Create an exact match (also used for recognized identifiers)
    pub fn exact(candidate: Candidate) -> Self {
        Self::fixed(candidate, MatchStrategy::Exact)
    }

    /// Create a fuzzy match with a computed similarity score
    pub fn fuzzy(candidate: Candidate, score: f64) -> Self {
        Self {
            candidate,
            strategy: MatchStrategy::Fuzzy,
            score: score.clamp(0.0, 1.0),
        }
    }
}

/// Result of one resolution
///
/// "No match" and "many matches" are expected outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// Exactly one candidate chosen
    Resolved(ScoredMatch),

    /// Several candidates matched and none could be chosen
    Ambiguous(Vec<ScoredMatch>),

    /// Nothing matched; carries advisory suggestions (never auto-selected)
    NotFound(Vec<Candidate>),
}

impl ResolutionOutcome {
    /// Returns true if a single candidate was chosen
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Borrow the chosen match, if any
    pub fn resolved(&self) -> Option<&ScoredMatch> {
        match self {
            Self::Resolved(found) => Some(found),
            _ => None,
        }
    }

    /// Take the chosen candidate, if any
    pub fn into_candidate(self) -> Option<Candidate> {
        match self {
            Self::Resolved(found) => Some(found.candidate),
            _ => None,
        }
    }
}
