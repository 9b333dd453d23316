//! Integration tests for end-to-end resolution
//!
//! Tests the full pipeline (recognizers → cache → matcher → disambiguator)
//! through the public `Resolver` API: the reference scenarios, positional
//! selection, cache reuse across resolutions, interactive flows and fetch
//! error propagation.

use pimctl_resolver::{
    Candidate, CandidateKind, InteractiveMode, MatchStrategy, ResolutionOutcome, ResolveError,
    ResolveRequest, Resolver, ResolverConfig, Selection, SourceKey,
};
use std::cell::Cell;
use std::convert::Infallible;
use std::io;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::Level;

fn roles(names: &[&str]) -> Vec<Candidate> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Candidate::new(*name, format!("role-{}", i + 1)))
        .collect()
}

fn role_request(input: &str) -> ResolveRequest<'_> {
    ResolveRequest::new(input, SourceKey::scoped(CandidateKind::Role, "/subscriptions/sub-a"))
}

fn fetch(names: &'static [&'static str]) -> impl FnOnce() -> Result<Vec<Candidate>, Infallible> {
    move || Ok(roles(names))
}

// ============================================================================
// REFERENCE SCENARIOS
// ============================================================================

#[test]
fn test_scenario_case_insensitive() {
    let resolver = Resolver::default();
    let outcome = resolver
        .resolve(&role_request("owner"), fetch(&["Owner", "Contributor", "Reader"]))
        .unwrap();

    let found = outcome.resolved().expect("should resolve");
    assert_eq!(found.candidate.display_name, "Owner");
    assert_eq!(found.strategy, MatchStrategy::CaseInsensitive);
    assert_eq!(found.score, 0.95);
}

#[test]
fn test_scenario_prefix_ambiguous_non_interactive() {
    let resolver = Resolver::default();
    let outcome = resolver
        .resolve(
            &role_request("Security").mode(InteractiveMode::NonInteractive),
            fetch(&["Security Administrator", "Security Reader"]),
        )
        .unwrap();

    match outcome {
        ResolutionOutcome::Ambiguous(matches) => {
            assert_eq!(matches.len(), 2, "every candidate must be listed");
            assert!(matches.iter().all(|m| m.strategy == MatchStrategy::Prefix));
            assert_eq!(matches[0].candidate.display_name, "Security Administrator");
            assert_eq!(matches[1].candidate.display_name, "Security Reader");
        }
        other => panic!("expected Ambiguous, got {:?}", other),
    }
}

#[test]
fn test_scenario_fuzzy_typo() {
    let resolver = Resolver::new(ResolverConfig {
        fuzzy_threshold: 0.8,
        ..Default::default()
    });
    let outcome = resolver
        .resolve(&role_request("Contributer"), fetch(&["Contributor"]))
        .unwrap();

    let found = outcome.resolved().expect("should resolve");
    assert_eq!(found.candidate.display_name, "Contributor");
    assert_eq!(found.strategy, MatchStrategy::Fuzzy);
    assert!((found.score - 0.91).abs() < 0.01, "score was {}", found.score);
}

#[test]
fn test_scenario_empty_candidates() {
    let resolver = Resolver::default();
    let outcome = resolver.resolve(&role_request("Anything"), fetch(&[])).unwrap();
    assert_eq!(outcome, ResolutionOutcome::NotFound(vec![]));
}

// ============================================================================
// FAILURE CONDITIONS
// ============================================================================

#[test]
fn test_blank_input_never_fetches() {
    let resolver = Resolver::default();
    let fetched = Cell::new(false);

    let result = resolver.resolve(&role_request("   "), || {
        fetched.set(true);
        Ok::<_, Infallible>(vec![])
    });

    match result {
        Err(ResolveError::InvalidInput(msg)) => assert_eq!(msg, "Role input is required"),
        other => panic!("expected InvalidInput, got {:?}", other),
    }
    assert!(!fetched.get());
}

#[test]
fn test_not_found_with_suggestions_fuzzy_disabled() {
    let resolver = Resolver::new(ResolverConfig {
        fuzzy_enabled: false,
        ..Default::default()
    });
    let outcome = resolver
        .resolve(&role_request("Contributer"), fetch(&["Owner", "Contributor", "Reader"]))
        .unwrap();

    match outcome {
        ResolutionOutcome::NotFound(suggestions) => {
            assert_eq!(suggestions[0].display_name, "Contributor");
            assert!(suggestions.len() <= 3);
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_fetch_error_propagates_unchanged() {
    #[derive(Debug, PartialEq)]
    struct Unauthorized(u16);

    let resolver = Resolver::default();
    let result = resolver.resolve(&role_request("Owner"), || Err(Unauthorized(403)));

    match result {
        Err(err) => assert_eq!(err.into_fetch_error(), Some(Unauthorized(403))),
        Ok(outcome) => panic!("expected fetch error, got {:?}", outcome),
    }
}

// ============================================================================
// IDENTIFIER BYPASS & POSITIONS
// ============================================================================

#[test]
fn test_full_path_bypasses_fetch() {
    let resolver = Resolver::default();
    let path = "/subscriptions/87654321-4321-4321-4321-210987654321/resourceGroups/my-rg";
    let request = ResolveRequest::new(path, SourceKey::new(CandidateKind::Scope));

    let outcome = resolver
        .resolve(&request, || -> Result<Vec<Candidate>, Infallible> {
            panic!("identifiers must not fetch")
        })
        .unwrap();

    assert_eq!(outcome.into_candidate().unwrap().id, path);
    assert!(resolver.cache().is_empty());
}

#[test]
fn test_directory_scope_bypass() {
    let resolver = Resolver::default();
    let request = ResolveRequest::new("directory", SourceKey::new(CandidateKind::Scope));
    let outcome = resolver
        .resolve(&request, || -> Result<Vec<Candidate>, Infallible> { panic!("no fetch") })
        .unwrap();
    assert_eq!(outcome.into_candidate().unwrap().id, "/");
}

#[test]
fn test_role_by_number() {
    let resolver = Resolver::default();
    for input in ["2", "#2"] {
        let outcome = resolver
            .resolve(&role_request(input), fetch(&["Owner", "Contributor", "Reader"]))
            .unwrap();
        assert_eq!(outcome.into_candidate().unwrap().display_name, "Contributor");
    }
}

#[test]
fn test_role_by_number_uses_displayed_list() {
    let resolver = Resolver::default();
    let displayed = roles(&["Reader", "Owner"]);
    let request = role_request("#2").displayed(&displayed);

    let outcome = resolver
        .resolve(&request, || -> Result<Vec<Candidate>, Infallible> { panic!("no fetch") })
        .unwrap();
    assert_eq!(outcome.into_candidate().unwrap().display_name, "Owner");
}

#[test]
fn test_role_by_invalid_number() {
    let resolver = Resolver::default();
    let result = resolver.resolve(&role_request("#9"), fetch(&["Owner", "Reader"]));

    match result {
        Err(ResolveError::InvalidPosition {
            noun,
            position,
            available,
        }) => {
            assert_eq!(noun, "role");
            assert_eq!(position, 9);
            assert_eq!(available, 2);
        }
        other => panic!("expected InvalidPosition, got {:?}", other),
    }

    let zero = resolver.resolve(&role_request("0"), fetch(&["Owner"]));
    assert!(matches!(zero, Err(ResolveError::InvalidPosition { .. })));
}

// ============================================================================
// CACHING ACROSS RESOLUTIONS
// ============================================================================

#[test]
fn test_repeated_resolution_fetches_once() {
    let resolver = Resolver::default();
    let calls = AtomicUsize::new(0);
    let counting = || {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok::<_, Infallible>(roles(&["Owner", "Reader"]))
    };

    resolver.resolve(&role_request("owner"), counting).unwrap();
    resolver.resolve(&role_request("Reader"), counting).unwrap();
    resolver.resolve(&role_request("#1"), counting).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(resolver.cache().stats().hits, 2);
}

#[test]
fn test_scopes_do_not_share_entries() {
    let resolver = Resolver::default();
    let in_a = ResolveRequest::new("Owner", SourceKey::scoped(CandidateKind::Role, "/subscriptions/a"));
    let in_b = ResolveRequest::new("Owner", SourceKey::scoped(CandidateKind::Role, "/subscriptions/b"));

    let a = resolver
        .resolve(&in_a, || Ok::<_, Infallible>(vec![Candidate::new("Owner", "owner-a")]))
        .unwrap();
    let b = resolver
        .resolve(&in_b, || Ok::<_, Infallible>(vec![Candidate::new("Owner", "owner-b")]))
        .unwrap();

    assert_eq!(a.into_candidate().unwrap().id, "owner-a");
    assert_eq!(b.into_candidate().unwrap().id, "owner-b");
    assert_eq!(resolver.cache().len(), 2);
}

// ============================================================================
// INTERACTIVE MODE
// ============================================================================

#[test]
fn test_interactive_selects_chosen_candidate() {
    let resolver = Resolver::default().with_prompt(|_: &str, options: &[String]| -> io::Result<Selection> {
        assert_eq!(options.len(), 2);
        Ok(Selection::Index(1))
    });
    let request = role_request("Security").mode(InteractiveMode::Interactive);

    let outcome = resolver
        .resolve(&request, fetch(&["Security Administrator", "Security Reader"]))
        .unwrap();

    let found = outcome.resolved().unwrap();
    assert_eq!(found.candidate.display_name, "Security Reader");
    assert_eq!(found.strategy, MatchStrategy::Prefix);
}

#[test]
fn test_interactive_cancel_surfaces_condition() {
    let resolver = Resolver::default()
        .with_prompt(|_: &str, _: &[String]| -> io::Result<Selection> { Ok(Selection::Cancelled) });
    let request = role_request("Security").mode(InteractiveMode::Interactive);

    let result = resolver.resolve(&request, fetch(&["Security Administrator", "Security Reader"]));
    assert!(result.unwrap_err().is_cancelled());
}

#[test]
fn test_interactive_single_match_does_not_prompt() {
    let prompted = Rc::new(Cell::new(false));
    let flag = Rc::clone(&prompted);
    let resolver = Resolver::default().with_prompt(move |_: &str, _: &[String]| -> io::Result<Selection> {
        flag.set(true);
        Ok(Selection::Index(0))
    });
    let request = role_request("Reader").mode(InteractiveMode::Interactive);

    let outcome = resolver.resolve(&request, fetch(&["Owner", "Reader"])).unwrap();
    assert!(outcome.is_resolved());
    assert!(!prompted.get());
}

#[test]
fn test_default_prompt_cancels() {
    let resolver = Resolver::default();
    let request = role_request("Security").mode(InteractiveMode::Interactive);

    let result = resolver.resolve(&request, fetch(&["Security Administrator", "Security Reader"]));
    assert!(matches!(result, Err(ResolveError::Cancelled)));
}

// ============================================================================
// LOGGING
// ============================================================================

/// Shared buffer the fmt subscriber writes into
#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Capture {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

fn logged_resolution(level: Level) -> String {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let outcome = Resolver::default()
            .resolve(&role_request("owner"), fetch(&["Owner", "Reader"]))
            .unwrap();
        assert!(outcome.is_resolved());
    });

    capture.text()
}

#[test]
fn test_match_note_not_logged_at_info() {
    let logs = logged_resolution(Level::INFO);
    assert!(!logs.contains("Using role 'Owner'"), "unexpected log output: {}", logs);
}

#[test]
fn test_match_note_logged_once_at_debug() {
    let logs = logged_resolution(Level::DEBUG);
    assert_eq!(logs.matches("Using role 'Owner' (case-insensitive match)").count(), 1);
}
