//! RDF ingestion for Tickgraph.
//!
//! Parses N-Triples or Turtle with `sophia` and feeds every statement into an
//! [`Engine`]: each term is interned by its N-Triples rendering (`<iri>`,
//! `_:label`, `"literal"@lang`), then the triple is added. Optionally,
//! `rdf:type` statements also record the subject's class so the SHACL
//! `class_check` can see it.
//!
//! The engine only ever sees interned ids; this crate is the only place that
//! knows about RDF syntax.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use sophia::api::prelude::*;
use sophia::api::source::StreamError;
use tickgraph_store::{Engine, EngineError, TermId};

pub const RDF_TYPE_IRI: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

// ============================================================================
// Formats and options
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    NTriples,
    Turtle,
}

impl RdfFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "nt" | "ntriples" => Some(Self::NTriples),
            "ttl" | "turtle" => Some(Self::Turtle),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::NTriples => "N-Triples",
            Self::Turtle => "Turtle",
        }
    }
}

impl std::fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Record `(s, rdf:type, c)` as the class of `s`.
    pub populate_types: bool,
    /// Rendered predicate treated as `rdf:type`.
    pub type_predicate: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            populate_types: true,
            type_predicate: format!("<{RDF_TYPE_IRI}>"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Statements read from the source.
    pub statements: u64,
    /// Statements that also set a subject's class.
    pub type_assignments: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported RDF file extension: {0:?}")]
    UnsupportedFormat(String),
    #[error("failed to parse {format}: {message}")]
    Parse { format: RdfFormat, message: String },
    #[error(transparent)]
    Engine(#[from] EngineError),
}

// ============================================================================
// Loading
// ============================================================================

struct Loader<'a> {
    engine: &'a mut Engine,
    type_predicate: Option<TermId>,
    summary: LoadSummary,
}

impl Loader<'_> {
    fn push(&mut self, s: &str, p: &str, o: &str) -> Result<(), EngineError> {
        let s = self.engine.intern(s);
        let p = self.engine.intern(p);
        let o = self.engine.intern(o);
        self.engine.try_add_triple(s, p, o)?;
        self.summary.statements += 1;
        if self.type_predicate == Some(p) {
            self.engine.try_set_type(s, o)?;
            self.summary.type_assignments += 1;
        }
        Ok(())
    }
}

fn stream_error<E>(format: RdfFormat, err: StreamError<E, EngineError>) -> IngestError
where
    E: std::error::Error,
{
    match err {
        StreamError::SourceError(e) => IngestError::Parse {
            format,
            message: e.to_string(),
        },
        StreamError::SinkError(e) => IngestError::Engine(e),
    }
}

/// Load every statement from `reader` into `engine`.
///
/// Stops at the first parse or engine error; statements before it stay in
/// the engine.
pub fn load_reader<R: BufRead>(
    engine: &mut Engine,
    reader: R,
    format: RdfFormat,
    options: &LoadOptions,
) -> Result<LoadSummary, IngestError> {
    let type_predicate = options
        .populate_types
        .then(|| engine.intern(&options.type_predicate));
    let mut loader = Loader {
        engine,
        type_predicate,
        summary: LoadSummary::default(),
    };

    match format {
        RdfFormat::NTriples => {
            let mut parser = sophia::turtle::parser::nt::parse_bufread(reader);
            parser
                .try_for_each_triple(|t| -> Result<(), EngineError> {
                    loader.push(&t.s().to_string(), &t.p().to_string(), &t.o().to_string())
                })
                .map_err(|e| stream_error(format, e))?;
        }
        RdfFormat::Turtle => {
            let mut parser = sophia::turtle::parser::turtle::parse_bufread(reader);
            parser
                .try_for_each_triple(|t| -> Result<(), EngineError> {
                    loader.push(&t.s().to_string(), &t.p().to_string(), &t.o().to_string())
                })
                .map_err(|e| stream_error(format, e))?;
        }
    }

    let summary = loader.summary;
    tracing::info!(
        format = %format,
        statements = summary.statements,
        type_assignments = summary.type_assignments,
        "loaded RDF"
    );
    Ok(summary)
}

/// Load an in-memory document.
pub fn load_str(
    engine: &mut Engine,
    text: &str,
    format: RdfFormat,
    options: &LoadOptions,
) -> Result<LoadSummary, IngestError> {
    load_reader(engine, text.as_bytes(), format, options)
}

/// Load a file, picking the format from its extension.
pub fn load_path(
    engine: &mut Engine,
    path: &Path,
    options: &LoadOptions,
) -> Result<LoadSummary, IngestError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let format = RdfFormat::from_extension(ext)
        .ok_or_else(|| IngestError::UnsupportedFormat(ext.to_string()))?;

    tracing::debug!(path = %path.display(), format = %format, "loading RDF file");
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_reader(engine, BufReader::new(file), format, options)
}
