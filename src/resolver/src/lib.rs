//! # pimctl Input Resolution Engine
//!
//! Turns an imprecise, human-typed identifier (a role name, a scope name, a
//! list position) into exactly one concrete candidate.
//!
//! ## Features
//!
//! - **Tiered matching**: exact, case-insensitive, prefix, then fuzzy
//! - **TTL result cache** keyed per candidate source and scope
//! - **Two-mode disambiguation**: prompt an operator, or fail deterministically
//!   when running non-interactively
//! - **Identifier bypass** for full resource paths, tenant root, subscription ids
//!   and `#N` list positions
//!
//! ## Example
//!
//! ```rust
//! use pimctl_resolver::{
//!     Candidate, CandidateKind, InteractiveMode, ResolutionOutcome, ResolveRequest,
//!     Resolver, ResolverConfig, SourceKey,
//! };
//! use std::convert::Infallible;
//!
//! let resolver = Resolver::new(ResolverConfig::default());
//! let request = ResolveRequest::new("owner", SourceKey::new(CandidateKind::Role))
//!     .mode(InteractiveMode::NonInteractive);
//!
//! let outcome = resolver
//!     .resolve(&request, || {
//!         Ok::<_, Infallible>(vec![
//!             Candidate::new("Owner", "role-1"),
//!             Candidate::new("Reader", "role-2"),
//!         ])
//!     })
//!     .unwrap();
//!
//! match outcome {
//!     ResolutionOutcome::Resolved(found) => assert_eq!(found.candidate.id, "role-1"),
//!     other => panic!("unexpected outcome: {:?}", other),
//! }
//! ```

pub mod cache;
pub mod candidate;
pub mod config;
pub mod disambiguate;
pub mod error;
pub mod matcher;
pub mod reference;
pub mod report;
pub mod resolver;
pub mod scope;
pub mod types;

// Re-export commonly used types
pub use cache::{CacheStats, ResultCache};
pub use candidate::{Candidate, CandidateKind, SourceKey};
pub use config::{ConfigError, ResolverConfig};
pub use disambiguate::{Disambiguator, InteractiveMode, NoPrompt, PromptSink, Selection};
pub use error::ResolveError;
pub use matcher::{match_candidates, Matcher};
pub use reference::IdentifierRecognizer;
pub use resolver::{ResolveRequest, Resolver};
pub use types::{MatchStrategy, ResolutionOutcome, ScoredMatch};
