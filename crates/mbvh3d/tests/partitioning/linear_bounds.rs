use approx::assert_relative_eq;
use mbvh3d::bounding_volume::{Aabb, BoundingVolume, LinearAabb};
use mbvh3d::math::Real;
use mbvh3d::partitioning::{
    AlignedNodeMb4d, ArenaConfig, ArenaError, NodeArena, NodeKind, NodeRecordMb4d, NodeRef,
};
use mbvh3d::utils::Interval;
use na::{Point3, Vector3};

fn sweeping_box() -> LinearAabb {
    let unit = Vector3::repeat(1.0);
    LinearAabb::new(
        Aabb::from_half_extents(Point3::new(-4.0, 0.0, 0.0), unit),
        Aabb::from_half_extents(Point3::new(4.0, 0.0, 0.0), unit),
    )
}

#[test]
fn child_bounds_follow_the_local_motion() {
    let mut arena = NodeArena::<8>::new();
    let node = AlignedNodeMb4d::create(&mut arena, 1, true).unwrap();
    let dt = Interval(0.25 as Real, 0.75);
    AlignedNodeMb4d::set_children(
        &mut arena,
        node,
        &[NodeRecordMb4d::new(NodeRef::encode_leaf(3), sweeping_box(), dt)],
    );
    let node = arena.get::<AlignedNodeMb4d<8>>(node);

    // Halfway through its time range the box is halfway through its motion.
    let at_half = node.bounds_at_time(0.5).extract(0);
    assert_relative_eq!(
        at_half,
        Aabb::from_half_extents(Point3::origin(), Vector3::repeat(1.0)),
        epsilon = 1.0e-4
    );
    assert!(node
        .bounds_at_time(0.25)
        .extract(0)
        .contains(&sweeping_box().bounds0));
    assert_relative_eq!(
        node.bounds_at_time(0.25).extract(0),
        sweeping_box().bounds0,
        epsilon = 1.0e-4
    );

    let mask = node.valid_time_mask(0.1);
    assert!(mask.iter().all(|valid| !valid));
    assert!(node.valid_time_mask(0.5)[0]);
    assert!(!node.valid_time_mask(0.75)[0]);

    // The expected area only depends on the box size, which doesn’t change here.
    assert_relative_eq!(node.expected_half_area(0), 12.0, max_relative = 1.0e-4);
    assert_relative_eq!(
        node.as_motion_node().expected_half_area(0),
        12.0,
        max_relative = 1.0e-4
    );
}

#[test]
fn slots_are_assigned_in_order() {
    let mut arena = NodeArena::<4>::new();
    let node = AlignedNodeMb4d::create(&mut arena, 2, true).unwrap();
    let aabb = Aabb::from_half_extents(Point3::new(1.0, 2.0, 3.0), Vector3::repeat(0.5));
    AlignedNodeMb4d::set_children(
        &mut arena,
        node,
        &[
            NodeRecordMb4d::from_static(NodeRef::encode_leaf(10), aabb),
            NodeRecordMb4d::new(
                NodeRef::encode_leaf(11),
                LinearAabb::from_aabb(aabb),
                Interval(0.5, 1.0),
            ),
        ],
    );

    let node = arena.get::<AlignedNodeMb4d<4>>(node);
    assert_eq!(node.child(0).leaf_data(), Some(10));
    assert_eq!(node.child(1).leaf_data(), Some(11));
    assert_eq!(node.child(2), NodeRef::EMPTY);
    assert_eq!(node.base().num_children(), 2);
    assert_relative_eq!(node.lbounds(0).bounds(), aabb);
    assert_relative_eq!(node.lbounds(1).bounds(), aabb, epsilon = 1.0e-4);
    assert_eq!(node.lower_t()[1], 0.5);
}

#[test]
fn arena_errors_are_reported() {
    let mut arena = NodeArena::<4>::with_config(ArenaConfig {
        max_bytes: Some(0),
        ..ArenaConfig::default()
    });

    let err = AlignedNodeMb4d::create(&mut arena, 4, true).unwrap_err();
    assert!(matches!(err, ArenaError::Exhausted { used: 0, capacity: 0, .. }));
    assert!(err.to_string().starts_with("node arena exhausted"));
    assert!(arena.is_empty());
    assert_eq!(
        NodeRef::encode_node(NodeKind::AlignedMb4d, 0).to_string(),
        "AlignedMb4d#0"
    );
}
