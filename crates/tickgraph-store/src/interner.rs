//! String interning: byte strings ⇄ dense `TermId`s.
//!
//! A fixed number of buckets, each a chain of ids, keyed by the DJB2 hash of
//! the bytes. The interner owns one copy of every byte string; the chain only
//! stores ids and compares against that copy.
//!
//! Ids start at [`TermId::FIRST`] (2) and increase by one per new string.
//! 0 and 1 are never issued.

use crate::TermId;

/// Default chain count.
pub const DEFAULT_BUCKETS: usize = 8192;

/// DJB2 (`h = h * 33 + byte`, seed 5381) over 64-bit wrapping arithmetic.
#[inline]
pub fn djb2(bytes: &[u8]) -> u64 {
    let mut h: u64 = 5381;
    for &b in bytes {
        h = (h << 5).wrapping_add(h).wrapping_add(u64::from(b));
    }
    h
}

/// Chained-hash string interner.
#[derive(Debug)]
pub struct StringInterner {
    buckets: Vec<Vec<TermId>>,
    /// `strings[id - FIRST]` is the canonical copy for `id`.
    strings: Vec<Box<[u8]>>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self::with_buckets(DEFAULT_BUCKETS)
    }

    /// Interner with `buckets` chains. A zero count is bumped to one.
    pub fn with_buckets(buckets: usize) -> Self {
        Self {
            buckets: vec![Vec::new(); buckets.max(1)],
            strings: Vec::new(),
        }
    }

    #[inline]
    fn bucket_of(&self, bytes: &[u8]) -> usize {
        (djb2(bytes) % self.buckets.len() as u64) as usize
    }

    #[inline]
    fn slot_of(id: TermId) -> Option<usize> {
        id.raw().checked_sub(TermId::FIRST.raw()).map(|i| i as usize)
    }

    /// Intern `bytes`, returning its stable id.
    ///
    /// # Panics
    ///
    /// Panics when the 32-bit id space is exhausted.
    pub fn intern(&mut self, bytes: &[u8]) -> TermId {
        let bucket = self.bucket_of(bytes);
        for &id in &self.buckets[bucket] {
            if let Some(existing) = Self::slot_of(id).and_then(|i| self.strings.get(i)) {
                if existing.as_ref() == bytes {
                    return id;
                }
            }
        }

        let next = u32::try_from(self.strings.len())
            .ok()
            .and_then(|n| n.checked_add(TermId::FIRST.raw()));
        let Some(raw) = next else {
            panic!("string interner exhausted the 32-bit identifier space");
        };
        let id = TermId::new(raw);
        self.strings.push(bytes.into());
        self.buckets[bucket].push(id);
        id
    }

    /// Look up an existing id for `bytes` without inserting.
    pub fn lookup(&self, bytes: &[u8]) -> Option<TermId> {
        let bucket = self.bucket_of(bytes);
        self.buckets[bucket].iter().copied().find(|&id| {
            Self::slot_of(id)
                .and_then(|i| self.strings.get(i))
                .is_some_and(|s| s.as_ref() == bytes)
        })
    }

    /// Canonical bytes for `id`, if it was issued by this interner.
    pub fn resolve(&self, id: TermId) -> Option<&[u8]> {
        Self::slot_of(id)
            .and_then(|i| self.strings.get(i))
            .map(|s| s.as_ref())
    }

    /// Number of distinct strings interned.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Largest id issued so far.
    pub fn max_id(&self) -> Option<TermId> {
        let n = u32::try_from(self.strings.len()).ok()?;
        n.checked_sub(1).map(|last| TermId::new(last + TermId::FIRST.raw()))
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Length of the longest chain (hash quality diagnostic).
    pub fn longest_chain(&self) -> usize {
        self.buckets.iter().map(Vec::len).max().unwrap_or(0)
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}
