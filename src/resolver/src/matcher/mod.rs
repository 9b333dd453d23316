//! Tiered matching of user input against candidates
//!
//! Tiers are tried in precedence order and the first tier that yields at least
//! one candidate wins:
//!
//! 1. exact (byte equality)
//! 2. case-insensitive
//! 3. prefix (case-insensitive)
//! 4. fuzzy (only if enabled)
//!
//! Every candidate a winning tier matches is returned; choosing between them is
//! the [`Disambiguator`](crate::Disambiguator)'s job.

mod similarity;


pub use similarity::normalized_similarity;

use crate::candidate::Candidate;
use crate::config::ResolverConfig;
use crate::error::{ResolveError, Result};
use crate::types::{MatchStrategy, ScoredMatch};
use tracing::debug;

/// Input prepared once per match call
struct Query<'a> {
    raw: &'a str,
    folded: String,
}

/// Candidate name prepared once per match call
struct Name<'a> {
    raw: &'a str,
    folded: String,
}

type TierFn = fn(&Query<'_>, &Name<'_>) -> bool;

fn is_exact(query: &Query<'_>, name: &Name<'_>) -> bool {
    name.raw == query.raw
}

fn is_case_insensitive(query: &Query<'_>, name: &Name<'_>) -> bool {
    name.folded == query.folded
}

fn is_prefix(query: &Query<'_>, name: &Name<'_>) -> bool {
    name.folded.starts_with(&query.folded)
}

/// Deterministic tiers in precedence order
const TIERS: [(MatchStrategy, TierFn); 3] = [
    (MatchStrategy::Exact, is_exact),
    (MatchStrategy::CaseInsensitive, is_case_insensitive),
    (MatchStrategy::Prefix, is_prefix),
];

/// Locale-independent case fold
fn fold(s: &str) -> String {
    s.to_lowercase()
}

/// Match `input` against `candidates`
///
/// # Arguments
///
/// * `input` - User input; trimmed before matching
/// * `candidates` - Candidates in source order
/// * `fuzzy_enabled` - Whether the fuzzy tier may run
/// * `fuzzy_threshold` - Minimum similarity kept by the fuzzy tier
///
/// # Returns
///
/// All matches of the first non-empty tier. Fuzzy matches are ordered by
/// descending score with source order as the tiebreak; the other tiers keep
/// source order. Fails with `InvalidInput` on empty input.
pub fn match_candidates(
    input: &str,
    candidates: &[Candidate],
    fuzzy_enabled: bool,
    fuzzy_threshold: f64,
) -> Result<Vec<ScoredMatch>> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ResolveError::InvalidInput("Input is required".to_string()));
    }

    let query = Query {
        raw: input,
        folded: fold(input),
    };
    let names: Vec<Name<'_>> = candidates
        .iter()
        .map(|c| Name {
            raw: &c.display_name,
            folded: fold(&c.display_name),
        })
        .collect();

    for (strategy, tier) in TIERS {
        let matches: Vec<ScoredMatch> = candidates
            .iter()
            .zip(&names)
            .filter(|(_, name)| tier(&query, name))
            .map(|(candidate, _)| ScoredMatch::fixed(candidate.clone(), strategy))
            .collect();

        if !matches.is_empty() {
            debug!("'{}' matched {} candidate(s) at {} tier", input, matches.len(), strategy);
            return Ok(matches);
        }
    }

    if !fuzzy_enabled {
        return Ok(Vec::new());
    }

    let matches = rank_by_similarity(&query.folded, candidates, &names, fuzzy_threshold);
    debug!("'{}' matched {} candidate(s) at fuzzy tier", input, matches.len());
    Ok(matches)
}

/// Fuzzy-rank candidates whose folded similarity reaches `threshold`
///
/// Used by the fuzzy tier and, with a relaxed threshold, for suggestions.
pub fn rank_fuzzy(input: &str, candidates: &[Candidate], threshold: f64) -> Vec<ScoredMatch> {
    let names: Vec<Name<'_>> = candidates
        .iter()
        .map(|c| Name {
            raw: &c.display_name,
            folded: fold(&c.display_name),
        })
        .collect();

    rank_by_similarity(&fold(input.trim()), candidates, &names, threshold)
}

fn rank_by_similarity(
    folded_input: &str,
    candidates: &[Candidate],
    names: &[Name<'_>],
    threshold: f64,
) -> Vec<ScoredMatch> {
    let mut matches: Vec<ScoredMatch> = candidates
        .iter()
        .zip(names)
        .filter_map(|(candidate, name)| {
            let score = normalized_similarity(folded_input, &name.folded);
            (score >= threshold).then(|| ScoredMatch::fuzzy(candidate.clone(), score))
        })
        .collect();

    // Stable: equal scores keep source order
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches
}

/// Matcher bound to a fuzzy configuration
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    fuzzy_enabled: bool,
    fuzzy_threshold: f64,
}

impl Matcher {
    /// Creates a matcher with explicit fuzzy settings
    pub fn new(fuzzy_enabled: bool, fuzzy_threshold: f64) -> Self {
        Self {
            fuzzy_enabled,
            fuzzy_threshold,
        }
    }

    /// Creates a matcher from resolver settings
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(config.fuzzy_enabled, config.fuzzy_threshold)
    }

    /// See [`match_candidates`]
    pub fn find_matches(&self, input: &str, candidates: &[Candidate]) -> Result<Vec<ScoredMatch>> {
        match_candidates(input, candidates, self.fuzzy_enabled, self.fuzzy_threshold)
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::from_config(&ResolverConfig::default())
    }
}
