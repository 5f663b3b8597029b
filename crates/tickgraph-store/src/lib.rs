//! Tickgraph store: in-memory RDF triples with constant-time probes.
//!
//! Every primitive read (pattern existence, class membership, cardinality,
//! predicate/object lookup) is a handful of array or hash probes:
//!
//! 1. **String interning**: terms are byte strings mapped to dense `u32` ids
//!    (DJB2 chained hashing, ids start at 2).
//! 2. **Subject bit-vectors**: `P[p]` holds every subject with some `(s, p, *)`,
//!    `O[o]` every subject with some `(s, *, o)`; joins are word-wise ANDs.
//! 3. **Predicate/subject index**: a fixed-capacity open-addressed table from
//!    `(p, s)` to the ordered object list.
//! 4. **SHACL checks**: class, min-count and max-count read straight off the
//!    type array and the `(p, s)` object list length.
//!
//! ## Concurrency
//!
//! One writer. `&mut Engine` is required to ingest; any number of threads may
//! share `&Engine` for reads (see [`Engine::validate_subjects`]).
//!
//! ## Module Organization
//!
//! - `bitvec`: dense bit-vectors with cached popcount
//! - `interner`: byte string ⇄ `TermId`
//! - `index`: `(p, s) → [o]` open-addressed table
//! - `engine`: the aggregate, ingest, typing, stats
//! - `query`: `ask_pattern` and the materializing reads
//! - `shacl`: cardinality/class validators and node shapes
//! - `closure`: bounded transitive closure over one predicate

pub mod bitvec;
pub mod closure;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod interner;
pub mod query;
pub mod shacl;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use bitvec::{BitVector, Ones};
pub use config::{DuplicatePolicy, EngineConfig, ProbePolicy};
pub use engine::{Engine, EngineStats};
pub use error::{EngineError, TriplePosition};
pub use interner::StringInterner;
pub use shacl::{NodeShape, ShapeSpec, ShapeViolation, ValidationReport};

// ============================================================================
// Identifiers
// ============================================================================

/// Interned term id.
///
/// 0 is the empty-slot marker and the object wildcard; 1 is reserved.
/// The interner issues ids from 2 upward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct TermId(u32);

impl TermId {
    /// "Any object" in `ask_pattern`; also "no type" in the type array.
    pub const WILDCARD: TermId = TermId(0);
    pub const RESERVED: TermId = TermId(1);
    /// First id the interner hands out.
    pub const FIRST: TermId = TermId(2);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Position in per-id arrays and bit-vectors.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_reserved(self) -> bool {
        self.0 < TermId::FIRST.0
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TermId> for u32 {
    fn from(id: TermId) -> u32 {
        id.0
    }
}
