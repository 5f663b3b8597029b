//! Predicate/subject → objects index.
//!
//! Open addressing over a fixed power-of-two slot array with linear probing.
//! A slot whose `(predicate, subject)` is `(0, 0)` is empty; since id 0 is
//! never issued, no live entry can look like the marker.
//!
//! Each live slot keeps its objects in insertion order, duplicates included.

use crate::config::{ProbePolicy, FAST_PROBE_BUDGET};
use crate::TermId;

/// Spread `(p, s)` over 32 bits: fold `s` into `p` rotated by 16, then an
/// xor-shift-multiply finalizer.
#[inline]
pub fn mix(p: u32, s: u32) -> u32 {
    let mut h = p ^ (s << 16) ^ (s >> 16);
    h ^= h >> 16;
    h = h.wrapping_mul(0x045d_9f3b);
    h ^= h >> 16;
    h
}

/// One `(predicate, subject)` entry.
#[derive(Debug, Clone, Default)]
pub struct PsSlot {
    predicate: TermId,
    subject: TermId,
    objects: Vec<TermId>,
}

impl PsSlot {
    #[inline]
    pub fn is_vacant(&self) -> bool {
        self.predicate == TermId::WILDCARD && self.subject == TermId::WILDCARD
    }

    #[inline]
    fn matches(&self, p: TermId, s: TermId) -> bool {
        self.predicate == p && self.subject == s
    }

    pub fn predicate(&self) -> TermId {
        self.predicate
    }

    pub fn subject(&self) -> TermId {
        self.subject
    }

    /// Objects in insertion order, with multiplicities.
    #[inline]
    pub fn objects(&self) -> &[TermId] {
        &self.objects
    }

    /// Append `o`, growing the list 0 → 4 → 8 → 16 → …
    fn push_object(&mut self, o: TermId) {
        if self.objects.len() == self.objects.capacity() {
            let extra = self.objects.capacity().max(4);
            self.objects.reserve_exact(extra);
        }
        self.objects.push(o);
    }
}

/// Returned by [`PsIndex::find_or_claim`] when every slot holds another pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Saturated;

/// Fixed-capacity open-addressed `(p, s) → [o]` table.
#[derive(Debug)]
pub struct PsIndex {
    slots: Box<[PsSlot]>,
    mask: usize,
    occupied: usize,
}

impl PsIndex {
    /// `capacity` must be a power of two (checked by `EngineConfig::validate`).
    pub fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two());
        Self {
            slots: vec![PsSlot::default(); capacity].into_boxed_slice(),
            mask: capacity - 1,
            occupied: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live `(p, s)` slots.
    #[inline]
    pub fn occupied(&self) -> usize {
        self.occupied
    }

    pub fn load_factor(&self) -> f64 {
        self.occupied as f64 / self.slots.len() as f64
    }

    #[inline]
    fn home(&self, p: TermId, s: TermId) -> usize {
        mix(p.raw(), s.raw()) as usize & self.mask
    }

    /// Look up the slot for `(p, s)`.
    ///
    /// The first [`FAST_PROBE_BUDGET`] slots are checked inline. Under
    /// [`ProbePolicy::Bounded`] the search stops there; otherwise it keeps
    /// probing until an empty slot or a full wrap.
    #[inline]
    pub fn find(&self, p: TermId, s: TermId, policy: ProbePolicy) -> Option<&PsSlot> {
        let home = self.home(p, s);
        let fast = FAST_PROBE_BUDGET.min(self.slots.len());
        for i in 0..fast {
            let slot = &self.slots[(home + i) & self.mask];
            if slot.is_vacant() {
                return None;
            }
            if slot.matches(p, s) {
                return Some(slot);
            }
        }
        match policy {
            ProbePolicy::Bounded => None,
            ProbePolicy::Exhaustive => self.find_slow(p, s, home, fast),
        }
    }

    #[cold]
    fn find_slow(&self, p: TermId, s: TermId, home: usize, start: usize) -> Option<&PsSlot> {
        for i in start..self.slots.len() {
            let slot = &self.slots[(home + i) & self.mask];
            if slot.is_vacant() {
                return None;
            }
            if slot.matches(p, s) {
                return Some(slot);
            }
        }
        None
    }

    /// Index of the slot for `(p, s)`, claiming an empty one if absent.
    /// The flag is `true` when a slot was claimed.
    pub fn find_or_claim(&mut self, p: TermId, s: TermId) -> Result<(usize, bool), Saturated> {
        let home = self.home(p, s);
        for i in 0..self.slots.len() {
            let idx = (home + i) & self.mask;
            let slot = &mut self.slots[idx];
            if slot.matches(p, s) {
                return Ok((idx, false));
            }
            if slot.is_vacant() {
                slot.predicate = p;
                slot.subject = s;
                self.occupied += 1;
                return Ok((idx, true));
            }
        }
        Err(Saturated)
    }

    #[inline]
    pub fn slot(&self, idx: usize) -> &PsSlot {
        &self.slots[idx]
    }

    pub fn push_object(&mut self, idx: usize, o: TermId) {
        self.slots[idx].push_object(o);
    }

    /// Live slots in table order.
    pub fn iter(&self) -> impl Iterator<Item = &PsSlot> {
        self.slots.iter().filter(|slot| !slot.is_vacant())
    }
}
