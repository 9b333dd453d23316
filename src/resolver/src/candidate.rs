//! Candidate items and the sources they come from

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// An item eligible for matching
///
/// Candidates are produced by a candidate source (a listing call) and are
/// immutable for the lifetime of the cache window that holds them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    /// Human label matched against user input
    #[serde(alias = "name", alias = "displayName")]
    pub display_name: String,

    /// Opaque, stable identifier returned once resolved
    pub id: String,

    /// Free-form attributes (e.g. `scope` path, `status`)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl Candidate {
    /// Create a candidate without metadata
    pub fn new(display_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            id: id.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata attribute
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Look up a metadata attribute
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

/// What kind of item a resolution targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    Role,
    Scope,
    Group,
}

impl CandidateKind {
    /// Singular noun used in diagnostics ("role")
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Role => "role",
            Self::Scope => "scope",
            Self::Group => "group",
        }
    }

    /// Plural noun, also the cache namespace ("roles")
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Role => "roles",
            Self::Scope => "scopes",
            Self::Group => "groups",
        }
    }
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

impl FromStr for CandidateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "role" | "roles" => Ok(Self::Role),
            "scope" | "scopes" => Ok(Self::Scope),
            "group" | "groups" => Ok(Self::Group),
            _ => Err(format!(
                "Unknown kind '{}'. Valid options: role, scope, group",
                s
            )),
        }
    }
}

/// Identity of a candidate source: the kind of listing plus the scope it ran under
///
/// Two resolutions share cached candidates only when their source keys are equal,
/// so the same role name under two scopes never hits the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceKey {
    pub kind: CandidateKind,
    pub scope: Option<String>,
}

impl SourceKey {
    /// Source key for an unscoped listing
    pub fn new(kind: CandidateKind) -> Self {
        Self { kind, scope: None }
    }

    /// Restrict the source to a scope
    pub fn scoped(kind: CandidateKind, scope: impl Into<String>) -> Self {
        Self {
            kind,
            scope: Some(scope.into()),
        }
    }

    /// Cache key string, e.g. `roles@/subscriptions/abc` or `scopes@all`
    pub fn cache_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}@{}", self.kind.plural(), scope),
            None => write!(f, "{}@all", self.kind.plural()),
        }
    }
}
