use crate::domain::encoding::Encoding;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no bookmark store named {file_name} found under {}", root.display())]
    NotFound { root: PathBuf, file_name: String },

    #[error(
        "found {} bookmark stores under {}, refusing to guess: {}",
        candidates.len(),
        root.display(),
        display_paths(candidates)
    )]
    Ambiguous {
        root: PathBuf,
        candidates: Vec<PathBuf>,
    },

    #[error("cannot write bookmark store {}: {source}", path.display())]
    Unwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read bookmark store {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("bookmark store is malformed: {0}")]
    Malformed(String),

    #[error("converting {} to {target} failed: {reason}", path.display())]
    Conversion {
        path: PathBuf,
        target: Encoding,
        reason: String,
    },

    #[error("cannot run converter {}: {source}", program.display())]
    ConverterUnavailable {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        StoreError::Malformed(msg.into())
    }

    /// Unparsable or unconvertible content. The store can be regenerated;
    /// anything else points at the location or the environment.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StoreError::Malformed(_) | StoreError::Conversion { .. })
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type StoreResult<T> = Result<T, StoreError>;
