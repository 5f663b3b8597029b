//! Errors surfaced by the store.
//!
//! Read paths are total and never produce these; only configuration and the
//! fallible ingest entry point (`Engine::try_add_triple`) do.

use std::path::PathBuf;

use crate::TermId;

/// Which position of a triple carried a bad identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriplePosition {
    Subject,
    Predicate,
    Object,
}

impl std::fmt::Display for TriplePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TriplePosition::Subject => "subject",
            TriplePosition::Predicate => "predicate",
            TriplePosition::Object => "object",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("reserved identifier {id} used as {position}")]
    ReservedIdentifier {
        position: TriplePosition,
        id: TermId,
    },
    #[error("predicate/subject index saturated at {capacity} slots")]
    IndexSaturated { capacity: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
