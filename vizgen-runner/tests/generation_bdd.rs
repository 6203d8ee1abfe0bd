//! BDD tests for the generation pipeline:
//! - Base spec + exhaustive mutation over a property list
//! - Depth-first output order and branch isolation
//! - Field naming, improvement, and oracle filtering on every leaf

use rand::rngs::StdRng;
use rand::SeedableRng;

use vizgen_core::distribution::{Definitions, Distributions};
use vizgen_core::domain::{Channel, FieldType, Mark, Property, ScaleDef};
use vizgen_core::improve::ImprovementPass;
use vizgen_core::model::SpecModel;
use vizgen_core::schema::DataSchema;
use vizgen_runner::{AcceptAll, Generator, SchemaOracle, ValidationTask, ValidityOracle};

/// Two marks, two channels, one always-on type.
fn two_mark_table() -> Distributions {
    Distributions::from_json_str(
        r#"{
            "mark": {
                "probability": 1.0,
                "values": [
                    { "name": "bar", "probability": 0.5 },
                    { "name": "point", "probability": 0.5 }
                ]
            },
            "channel": {
                "probability": 1.0,
                "values": [
                    { "name": "x", "probability": 0.6 },
                    { "name": "y", "probability": 0.4 }
                ]
            },
            "type": {
                "probability": 1.0,
                "values": [
                    { "name": "quantitative", "probability": 1.0 },
                    { "name": "nominal", "probability": 0.5 }
                ]
            }
        }"#,
    )
    .unwrap()
}

fn two_mark_definitions() -> Definitions {
    Definitions {
        top_level_props: vec![Property::Mark],
        encoding_props: vec![Property::FieldType],
    }
}

fn two_mark_generator() -> Generator {
    let model = SpecModel::new(two_mark_table(), two_mark_definitions()).unwrap();
    Generator::new(model, DataSchema::synthetic(2))
}

#[test]
fn bdd_scenario_mutating_mark_yields_one_leaf_per_mark() {
    // GIVEN a model with two marks and a single-encoding base spec
    // (no improvements, so sibling leaves stay bit-identical apart from mark)
    let model = SpecModel::new(two_mark_table(), two_mark_definitions())
        .unwrap()
        .with_improvements(ImprovementPass::empty());
    let generator = Generator::new(model, DataSchema::synthetic(2));
    let mut rng = StdRng::seed_from_u64(42);

    // WHEN one interaction mutates over the mark property
    let specs = generator
        .generate_interaction(&[Property::Mark], 1, &mut rng)
        .expect("generation should succeed");

    // THEN every leaf survives the oracle, in table order
    assert_eq!(specs.len(), 2);
    assert_eq!(specs[0].mark, Some(Mark::Bar));
    assert_eq!(specs[1].mark, Some(Mark::Point));

    // AND both leaves carry the same named encoding
    for spec in &specs {
        assert_eq!(spec.encoding.len(), 1);
        let (_, encoding) = spec.encoding.iter().next().unwrap();
        assert!(encoding.field_type.is_some());
        let code = encoding.field_type.unwrap().code();
        assert_eq!(encoding.field.as_deref(), Some(format!("{code}1").as_str()));
    }
    assert_eq!(specs[0].encoding, specs[1].encoding);
}

#[test]
fn bdd_scenario_leaf_count_is_the_product_of_enum_counts() {
    // GIVEN the built-in table (9 marks, 4 types, 6 aggregates)
    let model = SpecModel::new(Distributions::default_table(), Definitions::default()).unwrap();
    let generator = Generator::new(model, DataSchema::new(vec![]))
        .with_oracle(Box::new(AcceptAll));

    let props = [Property::Mark, Property::FieldType, Property::Aggregate];
    assert_eq!(generator.expected_leaves(&props).unwrap(), 9 * 4 * 6);

    // WHEN an interaction mutates over all three properties
    let mut rng = StdRng::seed_from_u64(7);
    let specs = generator
        .generate_interaction(&props, 2, &mut rng)
        .expect("generation should succeed");

    // THEN with a pass-through oracle every leaf is kept
    assert_eq!(specs.len(), 9 * 4 * 6);
}

#[test]
fn bdd_scenario_outer_property_varies_slowest() {
    // GIVEN two properties with two enums each
    let model = SpecModel::new(two_mark_table(), two_mark_definitions()).unwrap();
    let generator =
        Generator::new(model, DataSchema::synthetic(1)).with_oracle(Box::new(AcceptAll));
    let mut rng = StdRng::seed_from_u64(3);

    // WHEN the interaction mutates mark, then type
    let specs = generator
        .generate_interaction(&[Property::Mark, Property::FieldType], 1, &mut rng)
        .expect("generation should succeed");

    // THEN output is depth-first: mark repeats per block, type cycles within
    assert_eq!(specs.len(), 4);
    let marks: Vec<_> = specs.iter().map(|s| s.mark.unwrap()).collect();
    assert_eq!(marks, vec![Mark::Bar, Mark::Bar, Mark::Point, Mark::Point]);

    let types: Vec<_> = specs
        .iter()
        .map(|s| s.encoding.values().next().unwrap().field_type.unwrap())
        .collect();
    assert_eq!(
        types,
        vec![
            FieldType::Quantitative,
            FieldType::Nominal,
            FieldType::Quantitative,
            FieldType::Nominal
        ]
    );
}

#[test]
fn bdd_scenario_channel_mutation_moves_or_keeps_the_encoding() {
    // GIVEN a single-encoding base spec over a two-channel table
    // (no improvements, so the moved encoding compares equal to the kept one)
    let model = SpecModel::new(two_mark_table(), two_mark_definitions())
        .unwrap()
        .with_improvements(ImprovementPass::empty());
    let generator = Generator::new(model, DataSchema::synthetic(1));
    let mut rng = StdRng::seed_from_u64(11);

    // WHEN the interaction mutates the channel property
    let specs = generator
        .generate_interaction(&[Property::Channel], 1, &mut rng)
        .expect("generation should succeed");

    // THEN the x-leaf holds the encoding on x and the y-leaf on y;
    // whichever channel the base spec drew, one leaf was a no-op and the
    // other a rename, and branch isolation keeps them from interfering
    assert_eq!(specs.len(), 2);
    assert_eq!(specs[0].used_channels(), vec![Channel::X]);
    assert_eq!(specs[1].used_channels(), vec![Channel::Y]);
    assert_eq!(
        specs[0].encoding_at(Channel::X),
        specs[1].encoding_at(Channel::Y),
        "the rename must move the encoding intact"
    );
}

#[test]
fn bdd_scenario_channel_interactions_cover_every_leaf_on_the_default_table() {
    // GIVEN the built-in table, where x holds full popularity and the base
    // spec regularly lands its single encoding there
    let model = SpecModel::new(Distributions::default_table(), Definitions::default()).unwrap();
    let generator = Generator::new(model, DataSchema::new(vec![]))
        .with_oracle(Box::new(AcceptAll));
    let channels = generator.expected_leaves(&[Property::Channel]).unwrap();

    // WHEN interactions mutate over the channel property across many seeds
    for seed in 0..40 {
        let mut rng = StdRng::seed_from_u64(seed);
        let specs = generator
            .generate_interaction(&[Property::Channel], 1, &mut rng)
            .unwrap_or_else(|err| panic!("seed {seed}: interaction aborted: {err}"));

        // THEN no branch aborts and every enum value yields its leaf
        assert_eq!(specs.len(), channels, "seed {seed}");
    }
}

#[test]
fn bdd_scenario_schema_oracle_rejects_what_accept_all_keeps() {
    // GIVEN a table whose encodings never receive a type
    let table = Distributions::from_json_str(
        r#"{
            "mark": {
                "probability": 1.0,
                "values": [
                    { "name": "bar", "probability": 0.5 },
                    { "name": "point", "probability": 0.5 }
                ]
            },
            "channel": {
                "probability": 1.0,
                "values": [{ "name": "x", "probability": 1.0 }]
            },
            "type": {
                "probability": 0.0,
                "values": [{ "name": "quantitative", "probability": 1.0 }]
            }
        }"#,
    )
    .unwrap();
    let definitions = two_mark_definitions();

    // WHEN the same interaction runs under each oracle
    let strict = Generator::new(
        SpecModel::new(table.clone(), definitions.clone()).unwrap(),
        DataSchema::synthetic(1),
    );
    let lenient = Generator::new(
        SpecModel::new(table, definitions).unwrap(),
        DataSchema::synthetic(1),
    )
    .with_oracle(Box::new(AcceptAll));

    let strict_specs = strict
        .generate_interaction(&[Property::Mark], 1, &mut StdRng::seed_from_u64(5))
        .unwrap();
    let lenient_specs = lenient
        .generate_interaction(&[Property::Mark], 1, &mut StdRng::seed_from_u64(5))
        .unwrap();

    // THEN untyped encodings fail schema validation but pass AcceptAll
    assert_eq!(strict_specs.len(), 0);
    assert_eq!(lenient_specs.len(), 2);
}

#[test]
fn bdd_scenario_accepted_specs_resolve_against_the_schema() {
    // GIVEN the default pipeline with a three-encoding base spec
    let model = SpecModel::new(Distributions::default_table(), Definitions::default()).unwrap();
    let schema = DataSchema::synthetic(3);
    let generator = Generator::new(model, schema);
    let mut rng = StdRng::seed_from_u64(21);

    // WHEN an interaction mutates over the type property
    let specs = generator
        .generate_interaction(&[Property::FieldType], 3, &mut rng)
        .expect("generation should succeed");

    // THEN every accepted spec names real fields of the right type
    assert!(!specs.is_empty());
    for spec in &specs {
        for encoding in spec.encoding.values() {
            let field = encoding.field.as_deref().expect("accepted leaves are named");
            let resolved = generator.schema().get(field).expect("field must exist");
            assert_eq!(Some(resolved.field_type), encoding.field_type);
        }
        let task = ValidationTask::new(spec, generator.schema());
        assert!(SchemaOracle.is_valid(&task));
    }
}

#[test]
fn bdd_scenario_rect_leaves_get_a_zero_scale() {
    // GIVEN the default table, which includes the rect mark
    let model = SpecModel::new(Distributions::default_table(), Definitions::default()).unwrap();
    let generator = Generator::new(model, DataSchema::synthetic(1));
    let mut rng = StdRng::seed_from_u64(17);

    // WHEN an interaction mutates over the mark property
    let specs = generator
        .generate_interaction(&[Property::Mark], 1, &mut rng)
        .expect("generation should succeed");

    // THEN the improvement pass anchored every rect leaf at zero
    let rects: Vec<_> = specs.iter().filter(|s| s.mark == Some(Mark::Rect)).collect();
    assert!(!rects.is_empty(), "one leaf per mark, so rect must appear");
    for spec in rects {
        assert_eq!(spec.scale, Some(ScaleDef::Zero));
    }
}

#[test]
fn bdd_scenario_identical_seeds_replay_the_interaction() {
    // GIVEN one generator and two rngs with the same seed
    let generator = two_mark_generator();
    let props = [Property::Mark, Property::FieldType];

    // WHEN the interaction runs twice
    let first = generator
        .generate_interaction(&props, 2, &mut StdRng::seed_from_u64(99))
        .unwrap();
    let second = generator
        .generate_interaction(&props, 2, &mut StdRng::seed_from_u64(99))
        .unwrap();

    // THEN the runs are indistinguishable
    assert_eq!(first, second);
}
