//! Properties every reconstruction must satisfy, checked on fixed charts and
//! on random detector output.

use proptest::prelude::*;

use flowsnap::{
    document::to_json,
    pool::{ConnectionPool, NodeKind},
    reconstruct,
    shape::ShapeId,
};
use flowsnap_core::{
    detection::{Detection, Detections},
    geometry::Point,
};

const THRESHOLD: f32 = 50.0;

fn check_deterministic(detections: &Detections) {
    let first = reconstruct(detections, THRESHOLD);
    let second = reconstruct(detections, THRESHOLD);

    assert_eq!(
        to_json(&first.graph_document()).unwrap(),
        to_json(&second.graph_document()).unwrap()
    );
    assert_eq!(
        to_json(&first.matrix_document()).unwrap(),
        to_json(&second.matrix_document()).unwrap()
    );
}

fn check_anchor_completeness(detections: &Detections) {
    let result = reconstruct(detections, THRESHOLD);
    for shape in result.shapes() {
        let anchors: Vec<_> = result.pool().anchors_of(shape.id()).collect();
        assert_eq!(anchors.len(), 4, "shape {} has {} anchors", shape.id(), anchors.len());
    }
    assert_eq!(result.pool().anchors().count(), 4 * result.shapes().len());
}

fn check_edges_and_matrix(detections: &Detections) {
    let result = reconstruct(detections, THRESHOLD);
    let matrix = result.matrix_document().matrix;
    let n = result.shapes().len();

    for edge in result.edges() {
        assert_ne!(edge.from(), edge.to(), "self-loop {edge:?}");
    }

    assert_eq!(matrix.len(), n);
    for (i, row) in matrix.iter().enumerate() {
        assert_eq!(row.len(), n);
        for (j, cell) in row.iter().enumerate() {
            let expected = result.edges().contains(ShapeId::new(i), ShapeId::new(j));
            assert_eq!(*cell == 1, expected, "cell ({i}, {j})");
            assert!(*cell <= 1);
        }
    }
}

fn check_arrow_links_are_known(detections: &Detections) {
    let result = reconstruct(detections, THRESHOLD);
    for arrow in result.arrows() {
        assert_ne!(arrow.tail().id(), arrow.tip().id());
        for node in [arrow.tail(), arrow.tip()] {
            assert_eq!(result.pool().node(node.id()), Some(node));
        }
    }
}

fn check_idempotent_resnap(x: f32, y: f32) {
    let mut pool = ConnectionPool::new();
    let first = pool.resolve(Point::new(x, y));
    let second = pool.resolve(Point::new(x, y));
    assert_eq!(first.id(), second.id());
    assert_eq!(pool.len(), 1);
}

fn detection_strategy(classes: std::ops::RangeInclusive<u32>) -> impl Strategy<Value = Detection> {
    (
        classes,
        0.0f32..1000.0,
        0.0f32..1000.0,
        1.0f32..200.0,
        1.0f32..200.0,
    )
        .prop_map(|(class_id, x, y, w, h)| Detection::new(class_id, [x, y, w, h]))
}

fn detections_strategy() -> impl Strategy<Value = Detections> {
    (
        prop::collection::vec(detection_strategy(4..=9), 0..12),
        prop::collection::vec(detection_strategy(0..=3), 0..24),
    )
        .prop_map(|(shapes, arrows)| Detections::new(shapes, arrows))
}

proptest! {
    #[test]
    fn prop_deterministic(detections in detections_strategy()) {
        check_deterministic(&detections);
    }

    #[test]
    fn prop_anchor_completeness(detections in detections_strategy()) {
        check_anchor_completeness(&detections);
    }

    #[test]
    fn prop_edges_match_matrix(detections in detections_strategy()) {
        check_edges_and_matrix(&detections);
    }

    #[test]
    fn prop_arrow_links_are_known(detections in detections_strategy()) {
        check_arrow_links_are_known(&detections);
    }

    #[test]
    fn prop_idempotent_resnap(x in -1000.0f32..1000.0, y in -1000.0f32..1000.0) {
        check_idempotent_resnap(x, y);
    }
}

/// Shape A has its right anchor at (0, 0), shape B its left anchor at
/// (200, 0).
fn two_shapes() -> Vec<Detection> {
    vec![
        Detection::new(7, [-20.0, -10.0, 20.0, 20.0]),
        Detection::new(7, [200.0, -10.0, 20.0, 20.0]),
    ]
}

#[test]
fn test_transitive_chain_collapse() {
    // A.right (0, 0) → floating (100, 0) → B.left (200, 0).
    let detections = Detections::new(
        two_shapes(),
        vec![
            Detection::new(2, [0.0, -5.0, 100.0, 10.0]),
            Detection::new(2, [100.0, -5.0, 100.0, 10.0]),
        ],
    );

    let result = reconstruct(&detections, THRESHOLD);
    assert_eq!(result.arrows().len(), 2);
    assert!(
        result
            .arrows()
            .iter()
            .all(|arrow| arrow.tail().kind() == NodeKind::Floating
                || arrow.tip().kind() == NodeKind::Floating),
        "neither arrow spans A to B directly"
    );
    assert_eq!(result.edges().len(), 1);
    assert!(result.edges().contains(ShapeId::new(0), ShapeId::new(1)));
}

#[test]
fn test_fan_out_on_shared_tail() {
    // A.bottom (50, 40) → floating (50, 150); from there to B.top (50, 300)
    // and to C.left (300, 150).
    let detections = Detections::new(
        vec![
            Detection::new(9, [0.0, 0.0, 100.0, 40.0]),
            Detection::new(7, [0.0, 300.0, 100.0, 40.0]),
            Detection::new(6, [300.0, 130.0, 100.0, 40.0]),
        ],
        vec![
            Detection::new(0, [45.0, 40.0, 10.0, 110.0]),
            Detection::new(0, [45.0, 150.0, 10.0, 150.0]),
            Detection::new(2, [50.0, 145.0, 250.0, 10.0]),
        ],
    );

    let result = reconstruct(&detections, THRESHOLD);
    assert_eq!(result.edges().len(), 2);
    assert!(result.edges().contains(ShapeId::new(0), ShapeId::new(1)));
    assert!(result.edges().contains(ShapeId::new(0), ShapeId::new(2)));
}

#[test]
fn test_snap_correctness() {
    let mut pool = ConnectionPool::with_threshold(THRESHOLD);
    let existing = pool.resolve(Point::new(0.0, 0.0));

    let near = pool.resolve(Point::new(30.0, 39.0));
    assert_eq!(near.id(), existing.id());
    assert_eq!(pool.len(), 1);

    let far = pool.resolve(Point::new(30.0, 40.0));
    assert_ne!(far.id(), existing.id());
    assert_eq!(pool.len(), 2);
}

#[test]
fn test_empty_and_noise_only_inputs() {
    let noise = Detections::new(
        vec![Detection::new(5, [0.0, 0.0, 10.0, 10.0])],
        vec![Detection::new(0, [0.0, 0.0, 0.0, 0.0])],
    );
    for detections in [Detections::default(), noise] {
        check_deterministic(&detections);
        check_edges_and_matrix(&detections);
        assert!(reconstruct(&detections, THRESHOLD).edges().is_empty());
    }
}
