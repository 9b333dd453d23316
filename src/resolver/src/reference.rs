//! Inputs that are unambiguous by construction
//!
//! Full resource paths, the tenant root and subscription ids never need
//! matching; `#N` list positions select directly from a listing.

use crate::candidate::{Candidate, CandidateKind};
use uuid::Uuid;

/// Recognizes an opaque identifier format and turns it into a candidate
pub trait IdentifierRecognizer: Send + Sync {
    /// Returns the candidate the input denotes, or `None` if the format does not apply
    fn recognize(&self, kind: CandidateKind, input: &str) -> Option<Candidate>;
}

/// Full ARM-style resource paths (`/subscriptions/..`, `/providers/..`)
///
/// The leading slash is optional and added when missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourcePathRecognizer;

impl ResourcePathRecognizer {
    const ROOTS: [&'static str; 2] = ["subscriptions/", "providers/"];

    /// Normalizes a resource path, or `None` if the input is not one
    pub fn normalize(input: &str) -> Option<String> {
        let bare = input.strip_prefix('/').unwrap_or(input);
        let is_path = Self::ROOTS
            .iter()
            .any(|root| bare.len() > root.len() && bare.starts_with(root));

        is_path.then(|| format!("/{}", bare))
    }
}

impl IdentifierRecognizer for ResourcePathRecognizer {
    fn recognize(&self, _kind: CandidateKind, input: &str) -> Option<Candidate> {
        Self::normalize(input).map(|path| Candidate::new(path.clone(), path))
    }
}

/// The tenant root scope: `directory` or `/`
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryScopeRecognizer;

impl IdentifierRecognizer for DirectoryScopeRecognizer {
    fn recognize(&self, kind: CandidateKind, input: &str) -> Option<Candidate> {
        if kind != CandidateKind::Scope {
            return None;
        }

        (input == "/" || input.eq_ignore_ascii_case("directory"))
            .then(|| Candidate::new("directory", "/"))
    }
}

/// A bare subscription GUID (hyphenated form) as a subscription scope
#[derive(Debug, Clone, Copy, Default)]
pub struct SubscriptionIdRecognizer;

impl SubscriptionIdRecognizer {
    /// Returns true for a hyphenated GUID
    pub fn is_subscription_id(input: &str) -> bool {
        input.len() == 36 && Uuid::try_parse(input).is_ok()
    }
}

impl IdentifierRecognizer for SubscriptionIdRecognizer {
    fn recognize(&self, kind: CandidateKind, input: &str) -> Option<Candidate> {
        if kind != CandidateKind::Scope || !Self::is_subscription_id(input) {
            return None;
        }

        let path = format!("/subscriptions/{}", input);
        Some(Candidate::new(path.clone(), path))
    }
}

/// Recognizers applied by a default [`Resolver`](crate::Resolver)
pub fn default_recognizers() -> Vec<Box<dyn IdentifierRecognizer>> {
    vec![
        Box::new(ResourcePathRecognizer),
        Box::new(DirectoryScopeRecognizer),
        Box::new(SubscriptionIdRecognizer),
    ]
}

/// Parses a 1-based list position: `#3` or `3`
///
/// Returns `None` for anything else, including `#` alone and `#abc`.
pub fn parse_position(input: &str) -> Option<usize> {
    let digits = input.strip_prefix('#').unwrap_or(input);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
