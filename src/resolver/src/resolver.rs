//! Resolution orchestrator
//!
//! Composes identifier recognition, the candidate cache, the matcher and the
//! disambiguator into a single `resolve` call.
//!
//! # Architecture
//!
//! ```text
//! input ─→ Recognizers ──────────────────────────────────────→ Resolved
//!            │ (no match)
//!            ├─ #N ─→ displayed list | Cache ─→ position ─────→ Resolved
//!            ↓
//!          Cache ──(miss)──→ fetcher
//!            ↓
//!          Matcher ─→ Disambiguator ─→ Resolved | Ambiguous | NotFound
//! ```

use std::sync::Arc;
use tracing::debug;

use crate::cache::ResultCache;
use crate::candidate::{Candidate, SourceKey};
use crate::config::ResolverConfig;
use crate::disambiguate::{Disambiguator, InteractiveMode, MatchContext, NoPrompt, PromptSink};
use crate::error::ResolveError;
use crate::matcher::Matcher;
use crate::reference::{default_recognizers, parse_position, IdentifierRecognizer};
use crate::report;
use crate::types::{ResolutionOutcome, ScoredMatch};

/// One resolution request
#[derive(Debug, Clone)]
pub struct ResolveRequest<'a> {
    /// Operator input
    pub input: &'a str,
    /// Candidate source (kind + scope); also the cache key
    pub source: SourceKey,
    /// Whether the operator may be prompted
    pub mode: InteractiveMode,
    /// List previously shown to the operator, for `#N` selection
    pub displayed: Option<&'a [Candidate]>,
}

impl<'a> ResolveRequest<'a> {
    /// Creates a non-interactive request
    pub fn new(input: &'a str, source: SourceKey) -> Self {
        Self {
            input,
            source,
            mode: InteractiveMode::NonInteractive,
            displayed: None,
        }
    }

    /// Set the interactive mode
    pub fn mode(mut self, mode: InteractiveMode) -> Self {
        self.mode = mode;
        self
    }

    /// Resolve `#N` positions against a previously displayed list
    pub fn displayed(mut self, displayed: &'a [Candidate]) -> Self {
        self.displayed = Some(displayed);
        self
    }
}

/// Public entry point of the resolution engine
///
/// # Examples
///
/// ```
/// use pimctl_resolver::{
///     Candidate, CandidateKind, MatchStrategy, ResolveRequest, Resolver, ResolverConfig, SourceKey,
/// };
/// use std::convert::Infallible;
///
/// let resolver = Resolver::new(ResolverConfig::default());
/// let request = ResolveRequest::new("Contributer", SourceKey::new(CandidateKind::Role));
///
/// let outcome = resolver
///     .resolve(&request, || Ok::<_, Infallible>(vec![Candidate::new("Contributor", "c")]))
///     .unwrap();
///
/// let found = outcome.resolved().unwrap();
/// assert_eq!(found.strategy, MatchStrategy::Fuzzy);
/// assert!(found.score > 0.9);
/// ```
pub struct Resolver {
    config: ResolverConfig,
    cache: Arc<ResultCache>,
    matcher: Matcher,
    disambiguator: Disambiguator,
    recognizers: Vec<Box<dyn IdentifierRecognizer>>,
    prompt: Box<dyn PromptSink>,
}

impl Resolver {
    /// Creates a resolver with its own cache, the default recognizers and no prompt
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            matcher: Matcher::from_config(&config),
            disambiguator: Disambiguator::from_config(&config),
            cache: Arc::new(ResultCache::new()),
            recognizers: default_recognizers(),
            prompt: Box::new(NoPrompt),
            config,
        }
    }

    /// Share a cache with other resolvers
    pub fn with_cache(mut self, cache: Arc<ResultCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Set the operator prompt used in interactive mode
    pub fn with_prompt(mut self, prompt: impl PromptSink + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    /// Add an identifier recognizer, checked after the built-in ones
    pub fn with_recognizer(mut self, recognizer: impl IdentifierRecognizer + 'static) -> Self {
        self.recognizers.push(Box::new(recognizer));
        self
    }

    /// Drop all identifier recognizers
    pub fn without_recognizers(mut self) -> Self {
        self.recognizers.clear();
        self
    }

    /// Resolver settings
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Candidate cache
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Resolve one input
    ///
    /// # Arguments
    ///
    /// * `request` - Input, source, mode and optional displayed list
    /// * `fetcher` - Listing call for the source; invoked at most once per TTL window
    ///
    /// # Returns
    ///
    /// The outcome, or a condition: `InvalidInput` for blank input,
    /// `InvalidPosition` for an out-of-range `#N`, prompt conditions in
    /// interactive mode, and `Fetch` carrying the fetcher's error unchanged.
    pub fn resolve<F, E>(
        &self,
        request: &ResolveRequest<'_>,
        fetcher: F,
    ) -> Result<ResolutionOutcome, ResolveError<E>>
    where
        F: FnOnce() -> Result<Vec<Candidate>, E>,
    {
        let kind = request.source.kind;
        let input = request.input.trim();
        if input.is_empty() {
            return Err(ResolveError::InvalidInput(format!(
                "{} input is required",
                report::capitalize(kind.noun())
            )));
        }

        if let Some(candidate) = self.recognize(request, input) {
            debug!("'{}' recognized as {} identifier '{}'", input, kind.noun(), candidate.id);
            return Ok(ResolutionOutcome::Resolved(ScoredMatch::exact(candidate)));
        }

        let key = request.source.cache_key();

        if let Some(position) = parse_position(input) {
            let listed: Arc<[Candidate]> = match request.displayed {
                Some(displayed) => Arc::from(displayed.to_vec()),
                None => self
                    .cache
                    .get_or_fetch(&key, self.config.cache_ttl(), fetcher)
                    .map_err(ResolveError::Fetch)?,
            };
            return Self::select_position(kind.noun(), &listed, position);
        }

        let candidates = self
            .cache
            .get_or_fetch(&key, self.config.cache_ttl(), fetcher)
            .map_err(ResolveError::Fetch)?;

        let matches = self
            .matcher
            .find_matches(input, &candidates)
            .map_err(|e| e.widen())?;

        let context = MatchContext {
            kind,
            input,
            candidates: &candidates,
        };
        let outcome = self
            .disambiguator
            .resolve(&context, matches, request.mode, self.prompt.as_ref())
            .map_err(|e| e.widen())?;

        if let ResolutionOutcome::Resolved(found) = &outcome {
            if let Some(note) = report::match_note(kind, found) {
                debug!("{}", note);
            }
        }

        Ok(outcome)
    }

    fn recognize(&self, request: &ResolveRequest<'_>, input: &str) -> Option<Candidate> {
        self.recognizers
            .iter()
            .find_map(|r| r.recognize(request.source.kind, input))
    }

    fn select_position<E>(
        noun: &'static str,
        listed: &[Candidate],
        position: usize,
    ) -> Result<ResolutionOutcome, ResolveError<E>> {
        match position.checked_sub(1).and_then(|i| listed.get(i)) {
            Some(candidate) => Ok(ResolutionOutcome::Resolved(ScoredMatch::exact(candidate.clone()))),
            None => Err(ResolveError::InvalidPosition {
                noun,
                position,
                available: listed.len(),
            }),
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}
