//! Scope shorthand expansion for callers without a scope listing
//!
//! When no scope candidates are available the input is expanded by format
//! alone: full paths pass through, `directory` is the tenant root, a GUID is a
//! subscription and any other single name is a resource group in the current
//! subscription.

use crate::candidate::CandidateKind;
use crate::reference::{
    DirectoryScopeRecognizer, IdentifierRecognizer, ResourcePathRecognizer, SubscriptionIdRecognizer,
};

/// Expands a scope input to a full scope path
///
/// # Arguments
///
/// * `input` - Scope as typed by the operator
/// * `subscription` - Current subscription id, needed for resource group names
///
/// # Returns
///
/// The scope path, or `None` when the input cannot be expanded (a bare name
/// with no subscription context, or a relative path).
pub fn expand_scope(input: &str, subscription: Option<&str>) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let recognized = [
        &ResourcePathRecognizer as &dyn IdentifierRecognizer,
        &DirectoryScopeRecognizer,
        &SubscriptionIdRecognizer,
    ]
    .iter()
    .find_map(|r| r.recognize(CandidateKind::Scope, input));

    if let Some(scope) = recognized {
        return Some(scope.id);
    }

    match subscription {
        Some(sub) if !input.contains('/') => {
            Some(format!("/subscriptions/{}/resourceGroups/{}", sub, input))
        }
        _ => None,
    }
}
