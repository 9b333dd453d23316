//! File-backed candidate listings
//!
//! A candidate file is a JSON or YAML array of `{display_name, id, metadata}`
//! records. The format is picked by extension; unknown extensions try JSON
//! first, then YAML.

use pimctl_resolver::Candidate;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read candidate file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse candidate file {path:?} as JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse candidate file {path:?} as YAML: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
    Unknown,
}

impl Format {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => Self::Yaml,
            _ => Self::Unknown,
        }
    }
}

/// Load the candidates listed in `path`, in file order
pub fn load_candidates(path: &Path) -> Result<Vec<Candidate>, SourceError> {
    let contents = std::fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let json = |contents: &str| {
        serde_json::from_str(contents).map_err(|source| SourceError::Json {
            path: path.to_path_buf(),
            source,
        })
    };
    let yaml = |contents: &str| {
        serde_yaml::from_str(contents).map_err(|source| SourceError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    };

    match Format::of(path) {
        Format::Json => json(&contents),
        Format::Yaml => yaml(&contents),
        Format::Unknown => json(&contents).or_else(|_| yaml(&contents)),
    }
}
