//! Plain-text diagnostics for resolution outcomes
//!
//! No colours or tables here; callers decorate as they see fit.

use crate::candidate::{Candidate, CandidateKind};
use crate::types::{MatchStrategy, ResolutionOutcome, ScoredMatch};
use std::fmt::Write;

/// Upper-cases the first character
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Formats a score as a whole percentage ("91%")
pub fn percent(score: f64) -> String {
    format!("{:.0}%", score * 100.0)
}

/// Note shown when a resolution was not an exact match
pub fn match_note(kind: CandidateKind, found: &ScoredMatch) -> Option<String> {
    let how = match found.strategy {
        MatchStrategy::Exact => return None,
        MatchStrategy::CaseInsensitive => "case-insensitive match".to_string(),
        MatchStrategy::Prefix => "prefix match".to_string(),
        MatchStrategy::Fuzzy => format!("fuzzy match, score: {}", percent(found.score)),
    };
    Some(format!(
        "Using {} '{}' ({})",
        kind.noun(),
        found.candidate.display_name,
        how
    ))
}

/// Title of the interactive selection prompt
pub fn prompt_title(kind: CandidateKind) -> String {
    format!("Multiple {} match your input", kind.plural())
}

/// One line of the interactive selection prompt
pub fn prompt_option(found: &ScoredMatch) -> String {
    match found.strategy {
        MatchStrategy::Fuzzy => format!(
            "{} (score: {})",
            found.candidate.display_name,
            percent(found.score)
        ),
        _ => found.candidate.display_name.clone(),
    }
}

/// Message for a miss, with "did you mean" suggestions
pub fn not_found(kind: CandidateKind, input: &str, suggestions: &[Candidate]) -> String {
    let mut out = format!("{} '{}' not found", capitalize(kind.noun()), input);

    if !suggestions.is_empty() {
        out.push_str("\n\nDid you mean:");
        for (i, suggestion) in suggestions.iter().enumerate() {
            let _ = write!(out, "\n  {}. {}", i + 1, suggestion.display_name);
        }
    }

    let _ = write!(
        out,
        "\n\nTip: Run 'pimctl list {}' to see all available {}",
        kind.noun(),
        kind.plural()
    );
    out
}

/// Message for several matches in non-interactive mode
pub fn ambiguous(kind: CandidateKind, input: &str, matches: &[ScoredMatch]) -> String {
    let mut out = format!(
        "Multiple {} match '{}' (non-interactive mode)\n\nMatching candidates:",
        kind.plural(),
        input
    );

    for found in matches {
        let _ = write!(
            out,
            "\n  - {} [{}] ({} match)",
            found.candidate.display_name, found.candidate.id, found.strategy
        );
    }

    out.push_str("\n\nTip: Use the exact name or ID, or run in interactive mode");
    out
}

/// Diagnostic for an outcome: the match note when resolved, the failure
/// message otherwise
pub fn describe(kind: CandidateKind, input: &str, outcome: &ResolutionOutcome) -> Option<String> {
    match outcome {
        ResolutionOutcome::Resolved(found) => match_note(kind, found),
        ResolutionOutcome::Ambiguous(matches) => Some(ambiguous(kind, input, matches)),
        ResolutionOutcome::NotFound(suggestions) => Some(not_found(kind, input, suggestions)),
    }
}
