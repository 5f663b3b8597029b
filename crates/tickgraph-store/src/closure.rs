//! Bounded transitive closure over a single predicate.
//!
//! Breadth-first over `get_objects(p, node)`, at most `max_depth` hops. The
//! visited set is a bit-vector indexed by object id.

use crate::bitvec::BitVector;
use crate::engine::Engine;
use crate::TermId;

impl Engine {
    /// Ids reachable from `start` in 1..=`max_depth` hops along `p`.
    ///
    /// `start` is included only if it lies on a cycle within the bound.
    pub fn transitive_closure(&self, start: TermId, p: TermId, max_depth: usize) -> BitVector {
        let mut reached = BitVector::new();
        let mut frontier = vec![start];
        let mut next = Vec::new();

        for _ in 0..max_depth {
            for &node in &frontier {
                for &o in self.get_objects(p, node) {
                    if !reached.test(o.index()) {
                        reached.set(o.index());
                        next.push(o);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            std::mem::swap(&mut frontier, &mut next);
            next.clear();
        }
        reached
    }

    /// Whether `o` is reachable from `s` in 1..=`max_depth` hops along `p`.
    /// Stops at the first hop that reaches `o`.
    pub fn reaches(&self, s: TermId, p: TermId, o: TermId, max_depth: usize) -> bool {
        let mut visited = BitVector::new();
        let mut frontier = vec![s];
        let mut next = Vec::new();

        for _ in 0..max_depth {
            for &node in &frontier {
                for &target in self.get_objects(p, node) {
                    if target == o {
                        return true;
                    }
                    if !visited.test(target.index()) {
                        visited.set(target.index());
                        next.push(target);
                    }
                }
            }
            if next.is_empty() {
                return false;
            }
            std::mem::swap(&mut frontier, &mut next);
            next.clear();
        }
        false
    }
}
