//! Turning scored matches into a single answer
//!
//! ```text
//!            ┌─ 0 matches ─→ NotFound(suggestions)
//! Start ─────┼─ 1 match ───→ Resolved
//!            └─ N matches ─┬─ Interactive ────→ prompt → Resolved | Cancelled | InvalidSelection
//!                          └─ NonInteractive ─→ Ambiguous
//! ```

use crate::candidate::{Candidate, CandidateKind};
use crate::config::ResolverConfig;
use crate::error::{ResolveError, Result};
use crate::matcher::rank_fuzzy;
use crate::report;
use crate::types::{ResolutionOutcome, ScoredMatch};
use std::io;
use tracing::debug;

/// Whether an operator can be prompted synchronously
///
/// Supplied by the caller; the engine never inspects the terminal itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractiveMode {
    Interactive,
    NonInteractive,
}

impl InteractiveMode {
    /// Maps a terminal-attached flag to a mode
    pub fn from_tty(is_tty: bool) -> Self {
        if is_tty {
            Self::Interactive
        } else {
            Self::NonInteractive
        }
    }
}

/// Answer from a selection prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Zero-based index into the presented options
    Index(usize),
    /// Operator aborted
    Cancelled,
}

/// Presents ranked options to an operator and returns their choice
///
/// Returning an `io::Error` of kind `Interrupted` is treated as a cancellation.
pub trait PromptSink {
    fn select(&self, title: &str, options: &[String]) -> io::Result<Selection>;
}

impl<F> PromptSink for F
where
    F: Fn(&str, &[String]) -> io::Result<Selection>,
{
    fn select(&self, title: &str, options: &[String]) -> io::Result<Selection> {
        self(title, options)
    }
}

/// Prompt sink for embeddings without an operator; always cancels
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl PromptSink for NoPrompt {
    fn select(&self, _title: &str, _options: &[String]) -> io::Result<Selection> {
        Ok(Selection::Cancelled)
    }
}

/// What the disambiguator needs to know about the query
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub kind: CandidateKind,
    pub input: &'a str,
    pub candidates: &'a [Candidate],
}

/// Decides between resolving, prompting and failing
#[derive(Debug, Clone, Copy)]
pub struct Disambiguator {
    suggestion_limit: usize,
    suggestion_threshold: f64,
}

impl Disambiguator {
    /// Creates a disambiguator with explicit suggestion settings
    pub fn new(suggestion_limit: usize, suggestion_threshold: f64) -> Self {
        Self {
            suggestion_limit,
            suggestion_threshold,
        }
    }

    /// Creates a disambiguator from resolver settings
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(config.suggestion_limit, config.suggestion_threshold)
    }

    /// Resolve a scored match list to an outcome
    ///
    /// # Arguments
    ///
    /// * `context` - Kind, input and the full candidate set (for suggestions)
    /// * `matches` - Matcher output
    /// * `mode` - Whether `prompt` may be used
    /// * `prompt` - Operator prompt; ignored in non-interactive mode
    ///
    /// # Returns
    ///
    /// `Resolved`, `Ambiguous` or `NotFound`; a `Cancelled`, `InvalidSelection`
    /// or `Prompt` condition if the interactive prompt did not yield a choice.
    pub fn resolve(
        &self,
        context: &MatchContext<'_>,
        mut matches: Vec<ScoredMatch>,
        mode: InteractiveMode,
        prompt: &dyn PromptSink,
    ) -> Result<ResolutionOutcome> {
        match matches.len() {
            0 => {
                let suggestions = self.suggestions(context.input, context.candidates);
                debug!(
                    "No {} matched '{}', {} suggestion(s)",
                    context.kind.noun(),
                    context.input,
                    suggestions.len()
                );
                Ok(ResolutionOutcome::NotFound(suggestions))
            }
            1 => Ok(ResolutionOutcome::Resolved(matches.remove(0))),
            n => match mode {
                InteractiveMode::NonInteractive => {
                    debug!("{} {} match '{}', refusing to pick", n, context.kind.plural(), context.input);
                    Ok(ResolutionOutcome::Ambiguous(matches))
                }
                InteractiveMode::Interactive => self.prompt(context.kind, matches, prompt),
            },
        }
    }

    /// Advisory suggestions for a miss, best first
    ///
    /// Uses fuzzy ranking with the relaxed suggestion threshold; never used to
    /// select a candidate.
    pub fn suggestions(&self, input: &str, candidates: &[Candidate]) -> Vec<Candidate> {
        rank_fuzzy(input, candidates, self.suggestion_threshold)
            .into_iter()
            .take(self.suggestion_limit)
            .map(|m| m.candidate)
            .collect()
    }

    fn prompt(
        &self,
        kind: CandidateKind,
        mut matches: Vec<ScoredMatch>,
        prompt: &dyn PromptSink,
    ) -> Result<ResolutionOutcome> {
        let options: Vec<String> = matches.iter().map(report::prompt_option).collect();

        let selection = match prompt.select(&report::prompt_title(kind), &options) {
            Ok(selection) => selection,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => Selection::Cancelled,
            Err(err) => return Err(ResolveError::Prompt(err)),
        };

        match selection {
            Selection::Index(index) if index < matches.len() => {
                Ok(ResolutionOutcome::Resolved(matches.swap_remove(index)))
            }
            Selection::Index(index) => Err(ResolveError::InvalidSelection {
                selected: index + 1,
                available: matches.len(),
            }),
            Selection::Cancelled => Err(ResolveError::Cancelled),
        }
    }
}

impl Default for Disambiguator {
    fn default() -> Self {
        Self::from_config(&ResolverConfig::default())
    }
}
