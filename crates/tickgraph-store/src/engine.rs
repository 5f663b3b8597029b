//! The engine: interner, subject bit-vectors, `(p, s)` index and counters.

use serde::Serialize;

use crate::bitvec::BitVector;
use crate::config::{DuplicatePolicy, EngineConfig};
use crate::error::{EngineError, TriplePosition};
use crate::index::PsIndex;
use crate::interner::StringInterner;
use crate::TermId;

/// In-memory triple store.
///
/// Dropping the engine releases every index. Results returned by value
/// (bit-vectors, id arrays) are owned by the caller; slices returned by
/// [`Engine::get_objects`] borrow the engine and cannot outlive the next
/// mutation.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    interner: StringInterner,
    /// `P[p]`: subjects with some `(s, p, *)`.
    predicates: Vec<Option<BitVector>>,
    /// `O[o]`: subjects with some `(s, *, o)`.
    objects: Vec<Option<BitVector>>,
    ps_index: PsIndex,
    /// Outgoing edges per subject, multiplicities included.
    property_count: Vec<u64>,
    /// One class per subject; `TermId::WILDCARD` means untyped.
    types: Vec<TermId>,
    triple_count: u64,
    max_subject: TermId,
    max_predicate: TermId,
    max_object: TermId,
    occupancy_warned: bool,
}

/// Snapshot of engine counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStats {
    pub triples: u64,
    pub interned_terms: usize,
    pub distinct_predicates: usize,
    pub distinct_objects: usize,
    pub ps_slots_occupied: usize,
    pub ps_capacity: usize,
    pub ps_load_factor: f64,
    pub max_subject_id: u32,
    pub max_predicate_id: u32,
    pub max_object_id: u32,
    pub typed_subjects: usize,
}

/// Ensure `v[idx]` exists, doubling the length when it must grow.
fn grow_for<T: Clone>(v: &mut Vec<T>, idx: usize, fill: T, what: &'static str) {
    if idx < v.len() {
        return;
    }
    let new_len = (idx + 1).max(v.len() * 2);
    tracing::debug!(array = what, from = v.len(), to = new_len, "growing id array");
    v.resize(new_len, fill);
}

impl Engine {
    /// Engine with the default configuration.
    pub fn new() -> Self {
        Self::build(EngineConfig::default())
    }

    /// Engine with a validated custom configuration.
    pub fn with_config(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        tracing::debug!(
            ps_capacity = config.ps_capacity,
            interner_buckets = config.interner_buckets,
            probe_policy = ?config.probe_policy,
            duplicate_policy = ?config.duplicate_policy,
            "creating engine"
        );
        let ids = config.initial_id_capacity;
        Self {
            interner: StringInterner::with_buckets(config.interner_buckets),
            predicates: vec![None; ids],
            objects: vec![None; ids],
            ps_index: PsIndex::with_capacity(config.ps_capacity),
            property_count: vec![0; ids],
            types: vec![TermId::WILDCARD; ids],
            triple_count: 0,
            max_subject: TermId::WILDCARD,
            max_predicate: TermId::WILDCARD,
            max_object: TermId::WILDCARD,
            occupancy_warned: false,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Interning
    // ========================================================================

    /// Intern a term. Equal bytes always map to the same id.
    pub fn intern(&mut self, bytes: impl AsRef<[u8]>) -> TermId {
        self.interner.intern(bytes.as_ref())
    }

    /// Existing id for `bytes`, without inserting.
    pub fn lookup(&self, bytes: impl AsRef<[u8]>) -> Option<TermId> {
        self.interner.lookup(bytes.as_ref())
    }

    /// Canonical bytes of an interned id.
    pub fn resolve(&self, id: TermId) -> Option<&[u8]> {
        self.interner.resolve(id)
    }

    /// Canonical bytes of an interned id, if they are UTF-8.
    pub fn resolve_str(&self, id: TermId) -> Option<&str> {
        self.resolve(id).and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    // ========================================================================
    // Ingest
    // ========================================================================

    /// Insert the edge `(s, p, o)`.
    ///
    /// # Panics
    ///
    /// Panics when an id is reserved (0 or 1) or the predicate/subject index
    /// is saturated. Use [`Engine::try_add_triple`] to handle those cases.
    pub fn add_triple(&mut self, s: TermId, p: TermId, o: TermId) {
        if let Err(err) = self.try_add_triple(s, p, o) {
            panic!("add_triple({s}, {p}, {o}) failed: {err}");
        }
    }

    /// Insert the edge `(s, p, o)`, reporting contract violations.
    ///
    /// On error nothing is modified.
    pub fn try_add_triple(&mut self, s: TermId, p: TermId, o: TermId) -> Result<(), EngineError> {
        for (position, id) in [
            (TriplePosition::Subject, s),
            (TriplePosition::Predicate, p),
            (TriplePosition::Object, o),
        ] {
            if id.is_reserved() {
                return Err(EngineError::ReservedIdentifier { position, id });
            }
        }

        let (slot, claimed) = match self.ps_index.find_or_claim(p, s) {
            Ok(found) => found,
            Err(_) => {
                let capacity = self.ps_index.capacity();
                tracing::error!(capacity, predicate = %p, subject = %s, "ps index saturated");
                return Err(EngineError::IndexSaturated { capacity });
            }
        };
        if claimed {
            tracing::trace!(slot, predicate = %p, subject = %s, "claimed ps slot");
            self.check_occupancy();
        } else if self.config.duplicate_policy == DuplicatePolicy::Ignore
            && self.ps_index.slot(slot).objects().contains(&o)
        {
            return Ok(());
        }

        grow_for(&mut self.predicates, p.index(), None, "predicates");
        grow_for(&mut self.objects, o.index(), None, "objects");
        grow_for(&mut self.property_count, s.index(), 0, "property_count");
        grow_for(&mut self.types, s.index(), TermId::WILDCARD, "types");

        let bits = self.config.initial_bit_capacity;
        self.predicates[p.index()]
            .get_or_insert_with(|| BitVector::with_capacity(bits))
            .set(s.index());
        self.objects[o.index()]
            .get_or_insert_with(|| BitVector::with_capacity(bits))
            .set(s.index());

        self.ps_index.push_object(slot, o);
        self.property_count[s.index()] += 1;
        self.triple_count += 1;

        self.max_subject = self.max_subject.max(s);
        self.max_predicate = self.max_predicate.max(p);
        self.max_object = self.max_object.max(o);
        Ok(())
    }

    fn check_occupancy(&mut self) {
        if self.occupancy_warned {
            return;
        }
        let load = self.ps_index.load_factor();
        if load >= self.config.occupancy_warn_ratio {
            self.occupancy_warned = true;
            tracing::warn!(
                occupied = self.ps_index.occupied(),
                capacity = self.ps_index.capacity(),
                load,
                "ps index nearing saturation"
            );
        }
    }

    // ========================================================================
    // Out-of-band typing
    // ========================================================================

    /// Record `c` as the class of `s`, replacing any previous class.
    ///
    /// # Panics
    ///
    /// Panics when `s` or `c` is reserved.
    pub fn set_type(&mut self, s: TermId, c: TermId) {
        if let Err(err) = self.try_set_type(s, c) {
            panic!("set_type({s}, {c}) failed: {err}");
        }
    }

    pub fn try_set_type(&mut self, s: TermId, c: TermId) -> Result<(), EngineError> {
        if s.is_reserved() {
            return Err(EngineError::ReservedIdentifier {
                position: TriplePosition::Subject,
                id: s,
            });
        }
        if c.is_reserved() {
            return Err(EngineError::ReservedIdentifier {
                position: TriplePosition::Object,
                id: c,
            });
        }
        grow_for(&mut self.types, s.index(), TermId::WILDCARD, "types");
        grow_for(&mut self.property_count, s.index(), 0, "property_count");
        self.types[s.index()] = c;
        Ok(())
    }

    /// Class of `s`, if one was set.
    pub fn type_of(&self, s: TermId) -> Option<TermId> {
        self.types
            .get(s.index())
            .copied()
            .filter(|&c| c != TermId::WILDCARD)
    }

    /// Subjects whose recorded class is `c`.
    pub fn subjects_of_type(&self, c: TermId) -> BitVector {
        if c.is_reserved() {
            return BitVector::new();
        }
        self.types
            .iter()
            .enumerate()
            .filter(|&(_, &t)| t == c)
            .map(|(s, _)| s)
            .collect()
    }

    // ========================================================================
    // Index access
    // ========================================================================

    /// `P[p]`, if any triple used `p` as predicate.
    pub fn predicate_vector(&self, p: TermId) -> Option<&BitVector> {
        self.predicates.get(p.index()).and_then(Option::as_ref)
    }

    /// `O[o]`, if any triple used `o` as object.
    pub fn object_vector(&self, o: TermId) -> Option<&BitVector> {
        self.objects.get(o.index()).and_then(Option::as_ref)
    }

    pub(crate) fn ps_index(&self) -> &PsIndex {
        &self.ps_index
    }

    pub(crate) fn types(&self) -> &[TermId] {
        &self.types
    }

    /// Total outgoing edges of `s` (duplicates counted).
    pub fn property_count(&self, s: TermId) -> u64 {
        self.property_count.get(s.index()).copied().unwrap_or(0)
    }

    /// Number of successful `add_triple` insertions.
    pub fn triple_count(&self) -> u64 {
        self.triple_count
    }

    pub fn max_subject_id(&self) -> TermId {
        self.max_subject
    }

    pub fn max_predicate_id(&self) -> TermId {
        self.max_predicate
    }

    pub fn max_object_id(&self) -> TermId {
        self.max_object
    }

    pub fn is_empty(&self) -> bool {
        self.triple_count == 0
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            triples: self.triple_count,
            interned_terms: self.interner.len(),
            distinct_predicates: self.predicates.iter().flatten().count(),
            distinct_objects: self.objects.iter().flatten().count(),
            ps_slots_occupied: self.ps_index.occupied(),
            ps_capacity: self.ps_index.capacity(),
            ps_load_factor: self.ps_index.load_factor(),
            max_subject_id: self.max_subject.raw(),
            max_predicate_id: self.max_predicate.raw(),
            max_object_id: self.max_object.raw(),
            typed_subjects: self
                .types
                .iter()
                .filter(|&&t| t != TermId::WILDCARD)
                .count(),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
