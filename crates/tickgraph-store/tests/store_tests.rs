//! Store E2E Tests

use tickgraph_store::*;

// ============================================================================
// Scenario helpers
// ============================================================================

struct People {
    engine: Engine,
    alpha: TermId,
    knows: TermId,
    beta: TermId,
}

fn single_triple() -> People {
    let mut engine = Engine::new();
    let alpha = engine.intern("a");
    let knows = engine.intern("knows");
    let beta = engine.intern("b");
    engine.add_triple(alpha, knows, beta);
    People {
        engine,
        alpha,
        knows,
        beta,
    }
}

// ============================================================================
// Ask / objects
// ============================================================================

#[test]
fn test_single_triple_ask() {
    let People {
        engine,
        alpha,
        knows,
        beta,
    } = single_triple();

    assert!(engine.ask_pattern(alpha, knows, beta));
    assert!(!engine.ask_pattern(alpha, knows, alpha));
    assert_eq!(engine.get_objects(knows, alpha), &[beta]);
    assert!(engine.min_count(alpha, knows, 1));
    assert!(engine.max_count(alpha, knows, 1));
}

#[test]
fn test_duplicate_edge() {
    let People {
        mut engine,
        alpha,
        knows,
        beta,
    } = single_triple();
    engine.add_triple(alpha, knows, beta);

    assert!(engine.ask_pattern(alpha, knows, beta));
    assert_eq!(engine.get_objects(knows, alpha), &[beta, beta]);
    assert!(engine.min_count(alpha, knows, 2));
    assert!(!engine.max_count(alpha, knows, 1));
    assert_eq!(engine.triple_count(), 2);
    assert_eq!(engine.property_count(alpha), 2);
    // Bit-vectors stay idempotent.
    assert_eq!(engine.predicate_vector(knows).unwrap().popcount(), 1);
    assert_eq!(engine.object_vector(beta).unwrap().popcount(), 1);
}

#[test]
fn test_n_duplicates_boundary() {
    let People {
        mut engine,
        alpha,
        knows,
        beta,
    } = single_triple();
    for _ in 1..7 {
        engine.add_triple(alpha, knows, beta);
    }
    let n = 7;
    assert_eq!(engine.get_objects(knows, alpha).len(), n as usize);
    assert!(engine.min_count(alpha, knows, n));
    assert!(!engine.min_count(alpha, knows, n + 1));
}

#[test]
fn test_wildcard_agrees_with_min_count() {
    let People {
        engine,
        alpha,
        knows,
        beta,
    } = single_triple();
    for (s, p) in [(alpha, knows), (beta, knows), (alpha, alpha)] {
        assert_eq!(
            engine.ask_pattern(s, p, TermId::WILDCARD),
            engine.min_count(s, p, 1)
        );
    }
}

// ============================================================================
// Intersections
// ============================================================================

#[test]
fn test_predicate_object_intersection() {
    let mut engine = Engine::new();
    let alpha = engine.intern("alpha");
    let beta = engine.intern("beta");
    let gamma = engine.intern("gamma");
    let kappa = engine.intern("kappa");
    let delta = engine.intern("delta");
    let epsilon = engine.intern("epsilon");

    engine.add_triple(alpha, kappa, delta);
    engine.add_triple(beta, kappa, delta);
    engine.add_triple(gamma, kappa, delta);
    engine.add_triple(alpha, kappa, epsilon);

    assert_eq!(engine.get_subject_vector(kappa, delta).popcount(), 3);
    assert_eq!(
        engine.materialize_subjects(kappa, delta),
        vec![alpha, beta, gamma]
    );
    assert_eq!(engine.get_objects(kappa, alpha).len(), 2);
}

#[test]
fn test_bit_vector_growth_hundred_subjects() {
    let mut engine = Engine::new();
    let subjects: Vec<TermId> = (1..=100)
        .map(|i| engine.intern(format!("s{i}")))
        .collect();
    let kappa = engine.intern("kappa");
    let delta = engine.intern("delta");
    for &s in &subjects {
        engine.add_triple(s, kappa, delta);
    }

    let pv = engine.predicate_vector(kappa).unwrap();
    let ov = engine.object_vector(delta).unwrap();
    assert_eq!(pv.popcount(), 100);
    assert_eq!(ov.popcount(), 100);
    assert_eq!(pv.and(ov).popcount(), 100);
    assert_eq!(pv.popcount(), pv.popcount_from_words());
    assert_eq!(engine.materialize_subjects(kappa, delta), subjects);
}

// ============================================================================
// SHACL
// ============================================================================

#[test]
fn test_class_check() {
    let mut engine = Engine::new();
    let alpha = engine.intern("alpha");
    let beta = engine.intern("beta");
    let person = engine.intern("class_Person");
    let machine = engine.intern("class_Machine");
    engine.set_type(alpha, person);

    assert!(engine.class_check(alpha, person));
    assert!(!engine.class_check(alpha, machine));
    assert!(!engine.class_check(beta, person));
}

#[test]
fn test_shacl_composite() {
    let mut engine = Engine::new();
    let alpha = engine.intern("alpha");
    let person = engine.intern("class_Person");
    let name = engine.intern("name");
    let email = engine.intern("email");
    let phone = engine.intern("phone");
    let value = engine.intern("\"v\"");
    engine.add_triple(alpha, name, value);
    engine.add_triple(alpha, email, value);
    engine.set_type(alpha, person);

    let shape = NodeShape::new(person)
        .min(name, 1)
        .min(email, 1)
        .max(name, 1);
    assert!(engine.conforms(alpha, &shape));

    let with_phone = shape.min(phone, 1);
    assert!(!engine.conforms(alpha, &with_phone));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.json");
    std::fs::write(
        &path,
        r#"{"ps_capacity": 1024, "duplicate_policy": "ignore", "probe_policy": "bounded"}"#,
    )
    .unwrap();

    let config = EngineConfig::from_path(&path).unwrap();
    assert_eq!(config.ps_capacity, 1024);
    assert_eq!(config.duplicate_policy, DuplicatePolicy::Ignore);

    let engine = Engine::with_config(config).unwrap();
    assert_eq!(engine.stats().ps_capacity, 1024);
}

#[test]
fn test_with_config_validates() {
    let config = EngineConfig {
        ps_capacity: 3,
        ..EngineConfig::default()
    };
    assert!(matches!(
        Engine::with_config(config),
        Err(EngineError::InvalidConfig(_))
    ));
}

// ============================================================================
// Parallel validation over a shared engine
// ============================================================================

#[test]
fn test_validate_subjects_in_parallel() {
    let mut engine = Engine::new();
    let person = engine.intern("Person");
    let name = engine.intern("name");
    let lit = engine.intern("\"x\"");
    let subjects: Vec<TermId> = (0..500)
        .map(|i| engine.intern(format!("p{i}")))
        .collect();
    for (i, &s) in subjects.iter().enumerate() {
        engine.set_type(s, person);
        if i % 5 != 0 {
            engine.add_triple(s, name, lit);
        }
    }

    let shape = NodeShape::new(person).require(name);
    let report = engine.validate_subjects(&shape, &subjects);
    assert_eq!(report.checked, 500);
    assert_eq!(report.violations.len(), 100);
    let failing: Vec<TermId> = report.violations.iter().map(|(s, _)| *s).collect();
    let expected: Vec<TermId> = subjects.iter().copied().step_by(5).collect();
    assert_eq!(failing, expected);
}
