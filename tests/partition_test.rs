//! Tests for the radial partition layout

use std::f64::consts::{PI, TAU};

use rstest::rstest;

use sunburst::domain::{
    build_tree, Partition, PartitionConfig, PathKey, Record, Tree, FULL_TURN,
};
use sunburst::util::testing::{init_test_setup, sample_records};

const EPS: f64 = 1e-9;

fn layout(records: &[Record], radius: f64) -> Partition {
    let config = PartitionConfig {
        radius,
        pad_angle: 0.0,
    };
    Partition::layout(build_tree(records), config).expect("layout")
}

fn rect(partition: &Partition, key: &[&str]) -> sunburst::domain::Rect {
    partition
        .rect_of(&PathKey::new(key.iter().copied()))
        .unwrap_or_else(|| panic!("no rect for {:?}", key))
}

fn assert_layout_invariants(partition: &Partition) {
    let tree: &Tree = partition.tree();
    for (idx, node) in tree.iter() {
        let parent = partition.rect(idx).unwrap();
        assert!(parent.angle_start >= 0.0 && parent.angle_end <= TAU + EPS);
        assert!(parent.angle_start <= parent.angle_end);
        assert!(parent.radius_inner <= parent.radius_outer);

        if node.is_leaf() {
            continue;
        }

        let children = partition.layout_children(idx);
        let span_sum: f64 = children
            .iter()
            .map(|&c| partition.rect(c).unwrap().angle_span())
            .sum();
        let total_weight: f64 = children
            .iter()
            .map(|&c| tree.get_node(c).unwrap().weight)
            .sum();
        if total_weight > 0.0 {
            assert!(
                (span_sum - parent.angle_span()).abs() < EPS,
                "coverage broken under {:?}",
                node.name
            );
        }

        let mut cursor = parent.angle_start;
        for &c in children {
            let child = partition.rect(c).unwrap();
            assert_eq!(child.angle_start, cursor, "gap or overlap under {:?}", node.name);
            assert_eq!(child.radius_inner, parent.radius_outer);
            cursor = child.angle_end;
        }
    }
}

#[test]
fn given_sample_when_partitioning_then_matches_expected_angles() {
    // Arrange
    init_test_setup();

    // Act
    let partition = layout(&sample_records(), 100.0);

    // Assert
    let a = rect(&partition, &["A"]);
    let d = rect(&partition, &["D"]);
    let b = rect(&partition, &["A", "B"]);
    let c = rect(&partition, &["A", "C"]);

    assert!((a.angle_span() - PI).abs() < EPS);
    assert!((d.angle_span() - PI).abs() < EPS);
    assert_eq!(a.angle_start, 0.0);
    assert_eq!(d.angle_end, FULL_TURN);

    assert!((b.angle_span() - 2.0 * PI / 3.0).abs() < EPS);
    assert!((c.angle_span() - PI / 3.0).abs() < EPS);
    assert_eq!(b.angle_start, a.angle_start);
    assert_eq!(c.angle_end, a.angle_end);
}

#[test]
fn given_sample_when_partitioning_then_one_ring_per_depth() {
    let partition = layout(&sample_records(), 100.0);

    let root = partition.rect(partition.tree().root()).unwrap();
    assert_eq!((root.radius_inner, root.radius_outer), (0.0, 0.0));
    assert_eq!(root.angle_span(), FULL_TURN);

    let a = rect(&partition, &["A"]);
    assert_eq!((a.radius_inner, a.radius_outer), (0.0, 50.0));
    let d = rect(&partition, &["D"]);
    assert_eq!((d.radius_inner, d.radius_outer), (0.0, 50.0));
    let b = rect(&partition, &["A", "B"]);
    assert_eq!((b.radius_inner, b.radius_outer), (50.0, 100.0));
}

#[test]
fn given_unsorted_weights_when_partitioning_then_largest_first() {
    let records = vec![
        Record::from_path(["small"], Some(1.0)),
        Record::from_path(["large"], Some(5.0)),
        Record::from_path(["medium"], Some(3.0)),
    ];

    let partition = layout(&records, 10.0);

    let order: Vec<_> = partition.nodes().into_iter().map(|n| n.name).collect();
    assert_eq!(order, vec!["large", "medium", "small"]);
    assert_eq!(rect(&partition, &["large"]).angle_start, 0.0);
}

#[test]
fn given_all_zero_weights_when_partitioning_then_children_have_zero_width() {
    let records = vec![
        Record::from_path(["a", "x"], Some(0.0)),
        Record::from_path(["b"], Some(0.0)),
    ];

    let partition = layout(&records, 10.0);

    for node in partition.nodes() {
        assert_eq!(node.rect.angle_span(), 0.0, "{}", node.key);
        assert!(node.rect.angle_start.is_finite());
    }
}

#[test]
fn given_empty_tree_when_partitioning_then_no_rendered_nodes() {
    let partition = layout(&[], 10.0);

    assert!(partition.nodes().is_empty());
    assert_eq!(partition.max_depth(), 0);
    assert_eq!(partition.static_rects().len(), 1);
}

#[test]
fn given_rendered_nodes_then_fill_key_is_top_level_ancestor() {
    let partition = layout(&sample_records(), 100.0);

    let fills: Vec<_> = partition
        .nodes()
        .into_iter()
        .map(|n| (n.key.to_string(), n.fill_key, n.depth))
        .collect();

    assert_eq!(
        fills,
        vec![
            ("A".to_string(), "A".to_string(), 1),
            ("A/B".to_string(), "A".to_string(), 2),
            ("A/C".to_string(), "A".to_string(), 2),
            ("D".to_string(), "D".to_string(), 1),
        ]
    );
}

#[rstest]
#[case::sample(sample_records())]
#[case::uneven(vec![
    Record::from_path(["a", "b", "c"], Some(0.1)),
    Record::from_path(["a", "b", "d"], Some(0.2)),
    Record::from_path(["a", "e"], Some(0.3)),
    Record::from_path(["f"], Some(1e-6)),
    Record::from_path(["g", "h"], Some(12345.678)),
    Record::from_path(["g", "i"], Some(0.0)),
])]
#[case::wide((0..50).map(|i| Record::from_path([format!("n{}", i % 7), format!("m{}", i)], Some(i as f64))).collect())]
fn given_records_when_partitioning_then_coverage_and_radial_invariants_hold(
    #[case] records: Vec<Record>,
) {
    let partition = layout(&records, 250.0);

    assert_layout_invariants(&partition);
}
