//! Integration tests for the complete Tickgraph pipeline
//!
//! These tests verify end-to-end functionality across crates:
//! - RDF text → ingest → engine indexes → queries
//! - Shape JSON → resolved shape → batch validation
//! - Engine config file → engine behaviour
//!
//! Run with: cargo test --test integration_tests

use tempfile::tempdir;
use tickgraph_ingest_rdf::{load_path, load_str, LoadOptions, RdfFormat};
use tickgraph_store::{
    DuplicatePolicy, Engine, EngineConfig, NodeShape, ShapeSpec, ShapeViolation, TermId,
};

// ============================================================================
// Core scenarios over interned strings
// ============================================================================

#[test]
fn test_scenarios_end_to_end() {
    let mut engine = Engine::new();
    let [alpha, beta, gamma] = ["alpha", "beta", "gamma"].map(|t| engine.intern(t));
    let kappa = engine.intern("kappa");
    let delta = engine.intern("delta");
    let epsilon = engine.intern("epsilon");
    let person = engine.intern("class_Person");

    // Single triple, then a duplicate.
    engine.add_triple(alpha, kappa, delta);
    assert!(engine.ask_pattern(alpha, kappa, delta));
    engine.add_triple(alpha, kappa, delta);
    assert_eq!(engine.get_objects(kappa, alpha), &[delta, delta]);
    assert!(!engine.max_count(alpha, kappa, 1));

    // Intersection over three subjects.
    engine.add_triple(beta, kappa, delta);
    engine.add_triple(gamma, kappa, delta);
    engine.add_triple(alpha, kappa, epsilon);
    assert_eq!(engine.get_subject_vector(kappa, delta).popcount(), 3);
    assert_eq!(
        engine.materialize_subjects(kappa, delta),
        vec![alpha, beta, gamma]
    );

    // Class check.
    engine.set_type(alpha, person);
    assert!(engine.class_check(alpha, person));
    assert!(!engine.class_check(beta, person));

    // Composite shape.
    let shape = NodeShape::new(person).min(kappa, 1).max(kappa, 3);
    assert!(engine.conforms(alpha, &shape));
    assert!(!engine.conforms(alpha, &shape.clone().max(kappa, 2)));

    let stats = engine.stats();
    assert_eq!(stats.triples, 5);
    assert_eq!(stats.ps_slots_occupied, 3);
    assert_eq!(stats.typed_subjects, 1);
}

#[test]
fn test_interned_ids_round_trip_through_queries() {
    let mut engine = Engine::new();
    let s = engine.intern("<http://ex.org/s>");
    let p = engine.intern("<http://ex.org/p>");
    let o = engine.intern("\"42\"");
    engine.add_triple(s, p, o);

    let found: Vec<&str> = engine
        .materialize_subjects(p, o)
        .into_iter()
        .filter_map(|id| engine.resolve_str(id))
        .collect();
    assert_eq!(found, vec!["<http://ex.org/s>"]);
    assert_eq!(engine.lookup("\"42\""), Some(o));
    assert_eq!(engine.lookup("\"43\""), None);
}

// ============================================================================
// RDF → engine → SHACL
// ============================================================================

const PEOPLE: &str = r#"
@prefix ex: <http://ex.org/> .

ex:alice a ex:Person ;
    ex:name "Alice" ;
    ex:email "alice@ex.org" ;
    ex:knows ex:bob .

ex:bob a ex:Person ;
    ex:name "Bob", "Robert" .

ex:carol a ex:Person ;
    ex:email "carol@ex.org" .

ex:widget a ex:Machine ;
    ex:name "Widget" .
"#;

const PERSON_SHAPE: &str = r#"{
    "class": "<http://ex.org/Person>",
    "required": ["<http://ex.org/name>"],
    "max_count": {"<http://ex.org/name>": 1}
}"#;

#[test]
fn test_ingest_then_validate_class() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("people.ttl");
    std::fs::write(&path, PEOPLE).unwrap();

    let mut engine = Engine::new();
    let summary = load_path(&mut engine, &path, &LoadOptions::default()).unwrap();
    assert_eq!(summary.type_assignments, 4);

    let shape = ShapeSpec::from_json_str(PERSON_SHAPE)
        .unwrap()
        .resolve(&mut engine)
        .unwrap();
    let report = engine.validate_class(&shape);
    assert_eq!(report.checked, 3);
    assert_eq!(report.conforming(), 1);

    let bob = engine.lookup("<http://ex.org/bob>").unwrap();
    let carol = engine.lookup("<http://ex.org/carol>").unwrap();
    let name = engine.lookup("<http://ex.org/name>").unwrap();
    assert_eq!(
        report.violations,
        vec![
            (
                bob,
                ShapeViolation::MaxCount {
                    predicate: name,
                    max: 1,
                    found: 2
                }
            ),
            (carol, ShapeViolation::MissingRequired { predicate: name }),
        ]
    );

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["checked"], 3);
    assert_eq!(json["violations"][1][1]["kind"], "missing_required");
}

#[test]
fn test_machine_fails_person_class() {
    let mut engine = Engine::new();
    load_str(&mut engine, PEOPLE, RdfFormat::Turtle, &LoadOptions::default()).unwrap();
    let shape = ShapeSpec::from_json_str(PERSON_SHAPE)
        .unwrap()
        .resolve(&mut engine)
        .unwrap();

    let widget = engine.lookup("<http://ex.org/widget>").unwrap();
    let machine = engine.lookup("<http://ex.org/Machine>").unwrap();
    assert_eq!(
        engine.validate(widget, &shape),
        Err(ShapeViolation::ClassMismatch {
            expected: shape.class,
            found: Some(machine)
        })
    );
}

#[test]
fn test_closure_over_ingested_graph() {
    let doc = "<urn:a> <urn:sub> <urn:b> .\n\
               <urn:b> <urn:sub> <urn:c> .\n\
               <urn:c> <urn:sub> <urn:d> .\n";
    let mut engine = Engine::new();
    load_str(&mut engine, doc, RdfFormat::NTriples, &LoadOptions::default()).unwrap();

    let a = engine.lookup("<urn:a>").unwrap();
    let d = engine.lookup("<urn:d>").unwrap();
    let sub = engine.lookup("<urn:sub>").unwrap();
    assert_eq!(engine.transitive_closure(a, sub, 8).popcount(), 3);
    assert!(engine.reaches(a, sub, d, 3));
    assert!(!engine.reaches(a, sub, d, 2));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_file_drives_duplicate_policy() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("engine.json");
    std::fs::write(&path, r#"{"duplicate_policy": "ignore"}"#).unwrap();
    let config = EngineConfig::from_path(&path).unwrap();
    assert_eq!(config.duplicate_policy, DuplicatePolicy::Ignore);

    let mut engine = Engine::with_config(config).unwrap();
    let doc = "<urn:s> <urn:p> <urn:o> .\n<urn:s> <urn:p> <urn:o> .\n";
    let summary = load_str(&mut engine, doc, RdfFormat::NTriples, &LoadOptions::default()).unwrap();
    assert_eq!(summary.statements, 2);
    assert_eq!(engine.triple_count(), 1);

    let s = engine.lookup("<urn:s>").unwrap();
    let p = engine.lookup("<urn:p>").unwrap();
    assert!(engine.max_count(s, p, 1));
    assert!(engine.ask_pattern(s, p, TermId::WILDCARD));
}
