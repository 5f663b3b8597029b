//! SHACL-style validators over the store's indexes.
//!
//! - `min_count(s, p, k)`: at least `k` edges `(s, p, *)`
//! - `max_count(s, p, k)`: at most `k` edges `(s, p, *)`
//! - `class_check(s, c)`: the recorded class of `s` is `c`
//!
//! Counts include duplicate edges, matching `triple_count`. Each check is one
//! `(p, s)` probe or one array read and allocates nothing.
//!
//! [`NodeShape`] bundles a class with required/min/max predicates;
//! [`Engine::conforms`] evaluates it with short-circuiting in the order
//! class → required → min → max.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::error::EngineError;
use crate::TermId;

impl Engine {
    /// At least `k` edges `(s, p, *)`. Always true for `k == 0`.
    #[inline]
    pub fn min_count(&self, s: TermId, p: TermId, k: u64) -> bool {
        self.edge_count(s, p) >= k
    }

    /// At most `k` edges `(s, p, *)`. Always true when the pair is absent.
    #[inline]
    pub fn max_count(&self, s: TermId, p: TermId, k: u64) -> bool {
        self.edge_count(s, p) <= k
    }

    /// The recorded class of `s` is exactly `c`. Unknown `s` is false.
    #[inline]
    pub fn class_check(&self, s: TermId, c: TermId) -> bool {
        let recorded = self
            .types()
            .get(s.index())
            .copied()
            .unwrap_or(TermId::WILDCARD);
        (recorded == c) & !c.is_reserved()
    }

    /// Composite check: class, required predicates, min then max counts.
    pub fn conforms(&self, s: TermId, shape: &NodeShape) -> bool {
        self.class_check(s, shape.class)
            && shape.required.iter().all(|&p| self.min_count(s, p, 1))
            && shape.min_counts.iter().all(|&(p, k)| self.min_count(s, p, k))
            && shape.max_counts.iter().all(|&(p, k)| self.max_count(s, p, k))
    }

    /// Like [`Engine::conforms`], naming the first failed constraint.
    pub fn validate(&self, s: TermId, shape: &NodeShape) -> Result<(), ShapeViolation> {
        if !self.class_check(s, shape.class) {
            return Err(ShapeViolation::ClassMismatch {
                expected: shape.class,
                found: self.type_of(s),
            });
        }
        for &predicate in &shape.required {
            if !self.min_count(s, predicate, 1) {
                return Err(ShapeViolation::MissingRequired { predicate });
            }
        }
        for &(predicate, min) in &shape.min_counts {
            if !self.min_count(s, predicate, min) {
                return Err(ShapeViolation::MinCount {
                    predicate,
                    min,
                    found: self.edge_count(s, predicate),
                });
            }
        }
        for &(predicate, max) in &shape.max_counts {
            if !self.max_count(s, predicate, max) {
                return Err(ShapeViolation::MaxCount {
                    predicate,
                    max,
                    found: self.edge_count(s, predicate),
                });
            }
        }
        Ok(())
    }

    /// Validate many subjects in parallel against one shape.
    ///
    /// Violations are reported in the order of `subjects`.
    pub fn validate_subjects(&self, shape: &NodeShape, subjects: &[TermId]) -> ValidationReport {
        let violations: Vec<(TermId, ShapeViolation)> = subjects
            .par_iter()
            .filter_map(|&s| self.validate(s, shape).err().map(|v| (s, v)))
            .collect();
        tracing::debug!(
            checked = subjects.len(),
            violations = violations.len(),
            class = %shape.class,
            "validated subjects"
        );
        ValidationReport {
            checked: subjects.len(),
            violations,
        }
    }

    /// Validate every subject whose recorded class is the shape's class.
    pub fn validate_class(&self, shape: &NodeShape) -> ValidationReport {
        let targets: Vec<TermId> = self
            .subjects_of_type(shape.class)
            .iter_ones()
            .map(|s| TermId::new(s as u32))
            .collect();
        self.validate_subjects(shape, &targets)
    }
}

// ============================================================================
// Shapes
// ============================================================================

/// A node shape over interned ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeShape {
    pub class: TermId,
    /// Predicates needing at least one edge.
    pub required: Vec<TermId>,
    pub min_counts: Vec<(TermId, u64)>,
    pub max_counts: Vec<(TermId, u64)>,
}

impl NodeShape {
    pub fn new(class: TermId) -> Self {
        Self {
            class,
            required: Vec::new(),
            min_counts: Vec::new(),
            max_counts: Vec::new(),
        }
    }

    pub fn require(mut self, predicate: TermId) -> Self {
        self.required.push(predicate);
        self
    }

    pub fn min(mut self, predicate: TermId, count: u64) -> Self {
        self.min_counts.push((predicate, count));
        self
    }

    pub fn max(mut self, predicate: TermId, count: u64) -> Self {
        self.max_counts.push((predicate, count));
        self
    }
}

/// The first constraint a subject failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeViolation {
    #[error("expected class {expected}, found {found:?}")]
    ClassMismatch {
        expected: TermId,
        found: Option<TermId>,
    },
    #[error("missing required predicate {predicate}")]
    MissingRequired { predicate: TermId },
    #[error("predicate {predicate}: expected at least {min} values, found {found}")]
    MinCount {
        predicate: TermId,
        min: u64,
        found: u64,
    },
    #[error("predicate {predicate}: expected at most {max} values, found {found}")]
    MaxCount {
        predicate: TermId,
        max: u64,
        found: u64,
    },
}

/// Outcome of validating a batch of subjects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub checked: usize,
    pub violations: Vec<(TermId, ShapeViolation)>,
}

impl ValidationReport {
    pub fn conforms(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn conforming(&self) -> usize {
        self.checked - self.violations.len()
    }
}

/// Serializable shape using term strings instead of ids.
///
/// ```json
/// {"class": "<http://ex/Person>",
///  "required": ["<http://ex/name>"],
///  "min_count": {"<http://ex/email>": 1},
///  "max_count": {"<http://ex/name>": 1}}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeSpec {
    pub class: String,
    pub required: Vec<String>,
    pub min_count: BTreeMap<String, u64>,
    pub max_count: BTreeMap<String, u64>,
}

impl ShapeSpec {
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Intern every term and build the id-level shape.
    pub fn resolve(&self, engine: &mut Engine) -> Result<NodeShape, EngineError> {
        if self.class.is_empty() {
            return Err(EngineError::InvalidConfig(
                "shape class must not be empty".to_string(),
            ));
        }
        let mut shape = NodeShape::new(engine.intern(&self.class));
        for p in &self.required {
            shape = shape.require(engine.intern(p));
        }
        for (p, &k) in &self.min_count {
            shape = shape.min(engine.intern(p), k);
        }
        for (p, &k) in &self.max_count {
            shape = shape.max(engine.intern(p), k);
        }
        Ok(shape)
    }
}
