//! Terminal output helpers
//!
//! Results go to stdout; notes and diagnostics go to stderr so the output
//! stays usable in scripts.

use colored::Colorize;
use pimctl_resolver::{Candidate, ScoredMatch};

/// Print a success message
pub fn success(message: &str) {
    eprintln!("{} {}", "✓".green(), message);
}

/// Print an informational note
pub fn note(message: &str) {
    eprintln!("{}", message.dimmed());
}

/// Print a warning
pub fn warning(message: &str) {
    eprintln!("{} {}", "!".yellow(), message.yellow());
}

/// Print an error; the first line is highlighted, the rest is kept as is
pub fn error(message: &str) {
    let (headline, rest) = message.split_once('\n').unwrap_or((message, ""));
    eprintln!("{} {}", "✗".red(), headline.red().bold());
    if !rest.is_empty() {
        eprintln!("{}", rest);
    }
}

/// Print a candidate listing numbered for `#N` selection
pub fn numbered(candidates: &[Candidate]) {
    let width = candidates.len().to_string().len();
    for (i, candidate) in candidates.iter().enumerate() {
        println!(
            "{:>width$}. {} {}",
            i + 1,
            candidate.display_name.bold(),
            format!("[{}]", candidate.id).dimmed(),
            width = width
        );
    }
}

/// Print a resolved candidate: `name<TAB>id`
pub fn resolved(found: &ScoredMatch) {
    println!("{}\t{}", found.candidate.display_name, found.candidate.id);
}
