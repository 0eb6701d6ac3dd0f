//! End-to-end scenarios for generalization, suppression and lattice search.

use deid_core::{
    Attribute, Dataset, DeidError, Generalized, IntervalGeneralizer, Lattice, Node,
    NominalGeneralizer, SearchSettings, Tag, TagPropagation, Value, anonymize,
};

fn ages() -> Dataset {
    let generalizer = IntervalGeneralizer::new(10.0, 52.0, 4).unwrap();
    let rows = [10, 12, 50, 52]
        .into_iter()
        .map(|age| vec![Value::Integer(age)])
        .collect();
    Dataset::new(vec![Attribute::new("age", generalizer)], rows).unwrap()
}

fn survey() -> Dataset {
    let age = IntervalGeneralizer::new(20.0, 80.0, 4).unwrap();
    let answers = NominalGeneralizer::from_labels(
        [
            ("completely agree", "agree"),
            ("mostly agree", "agree"),
            ("mostly disagree", "disagree"),
            ("completely disagree", "disagree"),
        ]
        .into_iter()
        .map(|(value, parent)| {
            (
                Value::from(value),
                vec![Some(parent.to_string()), None],
            )
        }),
    )
    .unwrap();
    let rows = [
        (21, "completely agree"),
        (24, "mostly agree"),
        (27, "completely agree"),
        (29, "mostly agree"),
        (44, "mostly disagree"),
        (46, "completely disagree"),
        (48, "mostly disagree"),
        (49, "completely disagree"),
        (71, "mostly agree"),
        (78, "completely disagree"),
    ]
    .into_iter()
    .map(|(age, answer)| vec![Value::Integer(age), Value::from(answer)])
    .collect();
    Dataset::new(
        vec![Attribute::new("age", age), Attribute::new("answer", answers)],
        rows,
    )
    .unwrap()
}

#[test]
fn interval_scenario_extremes() {
    let data = ages();
    let bottom = data.suppression_rate(&Node::new(vec![0]), 2).unwrap();
    let top = data.suppression_rate(&Node::new(vec![3]), 2).unwrap();
    assert!((bottom - 1.0).abs() < f64::EPSILON);
    assert!(top.abs() < f64::EPSILON);
    assert!(
        data.generalized_projection(&Node::new(vec![3]))
            .iter()
            .all(|row| row[0] == Generalized::Suppressed)
    );
}

#[test]
fn interval_scenario_search_selects_first_band() {
    let generalizer = IntervalGeneralizer::new(10.0, 60.0, 4).unwrap();
    let rows = [10, 12, 50, 52]
        .into_iter()
        .map(|age| vec![Value::Integer(age)])
        .collect();
    let data = Dataset::new(vec![Attribute::new("age", generalizer)], rows).unwrap();
    let outcome = anonymize(&data, &SearchSettings::default().with_k(2), &mut ()).unwrap();
    assert_eq!(outcome.node, Node::new(vec![1]));
    assert!(outcome.suppression_rate.abs() < f64::EPSILON);
    assert_eq!(outcome.stats.evaluations, 1);
    assert_eq!(outcome.lattice.tag(&Node::new(vec![3])), Some(Tag::KAnonymous));
}

#[test]
fn interval_maximum_falls_outside_every_band() {
    // 52 is the upper bound, so it is suppressed at levels 1 and 2 and the
    // 50 it would otherwise share a band with is left alone.
    let data = ages();
    let band = data.suppression_rate(&Node::new(vec![1]), 2).unwrap();
    let half = data.suppression_rate(&Node::new(vec![2]), 2).unwrap();
    assert!((band - 0.5).abs() < f64::EPSILON);
    assert!((half - 0.5).abs() < f64::EPSILON);

    let err = anonymize(&data, &SearchSettings::default().with_k(2), &mut ()).unwrap_err();
    assert!(matches!(err, DeidError::NoSolution { k: 2, .. }));
}

#[test]
fn nominal_scenario_rates() {
    let generalizer = NominalGeneralizer::from_labels([
        (Value::from("A"), vec![Some("X".to_string())]),
        (Value::from("B"), vec![Some("X".to_string())]),
    ])
    .unwrap();
    let data = Dataset::new(
        vec![Attribute::new("code", generalizer)],
        vec![vec![Value::from("A")], vec![Value::from("B")]],
    )
    .unwrap();
    let bottom = data.suppression_rate(&Node::new(vec![0]), 2).unwrap();
    let top = data.suppression_rate(&Node::new(vec![1]), 2).unwrap();
    assert!((bottom - 1.0).abs() < f64::EPSILON);
    assert!(top.abs() < f64::EPSILON);
}

#[test]
fn unknown_and_missing_values_share_the_top_label() {
    let generalizer = NominalGeneralizer::from_labels([
        (Value::from("A"), vec![Some("X".to_string()), Some("any".to_string())]),
        (Value::from("B"), vec![Some("X".to_string()), Some("any".to_string())]),
    ])
    .unwrap();
    let rows = [Value::from("A"), Value::from("B"), Value::from("C"), Value::Null]
        .into_iter()
        .map(|value| vec![value])
        .collect();
    let data = Dataset::new(vec![Attribute::new("code", generalizer)], rows).unwrap();

    let top = data.max_node();
    assert!(data.suppression_rate(&top, 4).unwrap().abs() < f64::EPSILON);
    assert!(
        data.generalized_projection(&top)
            .iter()
            .all(|row| row[0] == Generalized::Label("any".into()))
    );
}

#[test]
fn two_level_lattice_is_never_evaluated() {
    // Level ranges of width one are the search's base case, so a single
    // two-level attribute leaves every node untagged.
    let generalizer =
        NominalGeneralizer::suppress_only(["A", "B"].into_iter().map(Value::from)).unwrap();
    let data = Dataset::new(
        vec![Attribute::new("code", generalizer)],
        vec![vec![Value::from("A")], vec![Value::from("B")]],
    )
    .unwrap();
    let err = anonymize(&data, &SearchSettings::default().with_k(2), &mut ()).unwrap_err();
    assert!(matches!(err, DeidError::NoSolution { k: 2, .. }));
}

#[test]
fn survey_search_picks_lowest_level() {
    let data = survey();
    let settings = SearchSettings::default()
        .with_k(2)
        .with_max_suppression_rate(0.2);
    let outcome = anonymize(&data, &settings, &mut ()).unwrap();
    assert_eq!(outcome.node, Node::new(vec![1, 0]));
    assert!((outcome.suppression_rate - 0.2).abs() < 1e-12);

    let table = data.anonymize(&outcome.node, settings.k, false).unwrap();
    assert_eq!(table.total_rows, 10);
    assert_eq!(table.suppressed_rows, 2);
    assert_eq!(table.rows.len(), 8);
    assert_eq!(table.equivalence_classes, 4);
}

#[test]
fn search_is_deterministic() {
    let data = survey();
    let settings = SearchSettings::default().with_k(3);
    let run = || {
        let mut lattice = Lattice::new(data.max_node());
        lattice
            .search(&data, &settings, &data.min_node(), &mut ())
            .unwrap();
        (0..=lattice.max_level())
            .flat_map(|level| {
                lattice
                    .level(level)
                    .map(|(node, tag)| (node.clone(), tag))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn bidirectional_propagation_tags_at_least_as_many_nodes() {
    let data = survey();
    let settings = SearchSettings::default().with_k(3);

    let mut upward = Lattice::new(data.max_node());
    let up_stats = upward
        .search(&data, &settings, &data.min_node(), &mut ())
        .unwrap();

    let mut both = Lattice::new(data.max_node()).with_propagation(TagPropagation::Bidirectional);
    let both_stats = both
        .search(&data, &settings, &data.min_node(), &mut ())
        .unwrap();

    assert!(both_stats.nodes_tagged >= up_stats.nodes_tagged);
    assert!(both_stats.evaluations <= up_stats.evaluations);
}

#[test]
fn empty_dataset_is_fatal() {
    let generalizer = IntervalGeneralizer::new(0.0, 1.0, 3).unwrap();
    let data = Dataset::new(vec![Attribute::new("x", generalizer)], vec![]).unwrap();
    let err = anonymize(&data, &SearchSettings::default(), &mut ()).unwrap_err();
    assert!(matches!(err, DeidError::EmptyDataset));
}
