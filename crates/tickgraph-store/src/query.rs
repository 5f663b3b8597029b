//! Read primitives: `ask_pattern` and the subject/object materializations.
//!
//! `ask_pattern`, `get_objects` and `count_subjects` never allocate. The
//! `get_*_vector` and `materialize_subjects` calls return owned results.

use crate::bitvec::BitVector;
use crate::engine::Engine;
use crate::index::PsSlot;
use crate::TermId;

impl Engine {
    #[inline]
    fn ps_slot(&self, p: TermId, s: TermId) -> Option<&PsSlot> {
        self.ps_index().find(p, s, self.config().probe_policy)
    }

    /// Whether `(s, p, o)` is stored.
    ///
    /// `o == TermId::WILDCARD` asks whether any `(s, p, *)` is stored.
    #[inline]
    pub fn ask_pattern(&self, s: TermId, p: TermId, o: TermId) -> bool {
        match self.ps_slot(p, s) {
            None => false,
            Some(slot) if o == TermId::WILDCARD => !slot.objects().is_empty(),
            Some(slot) => slot.objects().contains(&o),
        }
    }

    /// Objects of `(s, p, *)` in insertion order, duplicates included.
    /// Empty when the pair was never written.
    #[inline]
    pub fn get_objects(&self, p: TermId, s: TermId) -> &[TermId] {
        self.ps_slot(p, s).map(PsSlot::objects).unwrap_or(&[])
    }

    /// Number of `(s, p, *)` edges, duplicates included.
    #[inline]
    pub fn edge_count(&self, s: TermId, p: TermId) -> u64 {
        self.get_objects(p, s).len() as u64
    }

    /// `P[p] AND O[o]`: subjects with some `(s, p, *)` and some `(s, *, o)`.
    pub fn get_subject_vector(&self, p: TermId, o: TermId) -> BitVector {
        match (self.predicate_vector(p), self.object_vector(o)) {
            (Some(pv), Some(ov)) => pv.and(ov),
            _ => BitVector::new(),
        }
    }

    /// Subjects with an actual `(s, p, o)` edge.
    ///
    /// `get_subject_vector` is the positional join `P[p] AND O[o]`, which also
    /// admits `s` with `(s, p, x)` and `(s, q, o)`. This narrows it with one
    /// `ask_pattern` per candidate.
    pub fn get_matching_subjects(&self, p: TermId, o: TermId) -> BitVector {
        let candidates = self.get_subject_vector(p, o);
        let mut exact = BitVector::with_capacity(candidates.bit_capacity());
        for s in candidates.iter_ones() {
            if self.ask_pattern(TermId::new(s as u32), p, o) {
                exact.set(s);
            }
        }
        exact
    }

    /// `popcount(P[p] AND O[o])` without allocating.
    pub fn count_subjects(&self, p: TermId, o: TermId) -> u64 {
        match (self.predicate_vector(p), self.object_vector(o)) {
            (Some(pv), Some(ov)) => pv.and_count(ov),
            _ => 0,
        }
    }

    /// Bit-vector over the object ids of `(s, p, *)`.
    pub fn get_object_vector(&self, p: TermId, s: TermId) -> BitVector {
        let objects = self.get_objects(p, s);
        let mut out = match objects.iter().max() {
            Some(max) => BitVector::with_capacity(max.index() + 1),
            None => return BitVector::new(),
        };
        for o in objects {
            out.set(o.index());
        }
        out
    }

    /// Subjects of `P[p] AND O[o]` as ascending ids.
    ///
    /// Enumerates the AND word by word with count-trailing-zeros; the
    /// intersection itself is never materialized.
    pub fn materialize_subjects(&self, p: TermId, o: TermId) -> Vec<TermId> {
        let (Some(pv), Some(ov)) = (self.predicate_vector(p), self.object_vector(o)) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(pv.and_count(ov) as usize);
        for (w, (a, b)) in pv.words().iter().zip(ov.words()).enumerate() {
            let mut word = a & b;
            while word != 0 {
                let bit = word.trailing_zeros();
                out.push(TermId::new(w as u32 * 64 + bit));
                word &= word - 1;
            }
        }
        out
    }
}
