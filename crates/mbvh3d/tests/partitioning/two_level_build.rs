use mbvh3d::bounding_volume::{Aabb, BoundingVolume, LinearAabb};
use mbvh3d::math::Real;
use mbvh3d::partitioning::{
    has_time_splits, AlignedNodeMb, AlignedNodeMb4d, AlignedNodeMb4dFactory, AlignedNodeMbFactory,
    ArenaConfig, ArenaError, ChildRecords, NodeArena, NodeFactory, NodeKind, NodeRecordMb4d,
    NodeRef,
};
use mbvh3d::utils::Interval;
use na::{Point3, Vector3};

const WIDTH: usize = 4;

fn make_leaves(count: usize) -> Vec<NodeRecordMb4d> {
    (0..count)
        .map(|i| {
            let x = i as Real * 3.0;
            let start = Aabb::from_half_extents(Point3::new(x, 0.0, 0.0), Vector3::repeat(1.0));
            let end = Aabb::from_half_extents(Point3::new(x, 2.0, 1.0), Vector3::repeat(0.5));
            // Every third leaf only exists during a part of the shutter interval.
            let dt = match i % 3 {
                0 => Interval(0.0, 0.5),
                1 => Interval(0.5, 1.0),
                _ => Interval::UNIT,
            };
            NodeRecordMb4d::new(
                NodeRef::encode_leaf(i as u32),
                LinearAabb::new(start, end),
                dt,
            )
        })
        .collect()
}

/// A linear bound, local to `dt`, enclosing every child during its own time range.
fn enclosing_bound(children: &[NodeRecordMb4d], dt: Interval<Real>) -> LinearAabb {
    let mut result = LinearAabb::new_invalid();

    for child in children {
        let global = child.lbounds.global(child.dt);
        result.merge(&LinearAabb::new(
            global.interpolate(dt.0),
            global.interpolate(dt.1),
        ));
    }

    result
}

fn make_parent<F: NodeFactory<WIDTH>>(
    factory: &F,
    arena: &mut NodeArena<WIDTH>,
    children: &[NodeRecordMb4d],
) -> Result<NodeRecordMb4d, ArenaError> {
    let node = factory.create(arena, children.len(), has_time_splits(children))?;
    factory.set(arena, node, children);

    let dt = children
        .iter()
        .fold(Interval::EMPTY, |dt, child| {
            dt.enclose(child.dt.0).enclose(child.dt.1)
        });
    Ok(NodeRecordMb4d::new(node, enclosing_bound(children, dt), dt))
}

fn build<F: NodeFactory<WIDTH>>(
    factory: &F,
    arena: &mut NodeArena<WIDTH>,
    leaves: &[NodeRecordMb4d],
) -> Result<NodeRecordMb4d, ArenaError> {
    let mut inner = ChildRecords::<WIDTH>::new();

    for chunk in leaves.chunks(WIDTH) {
        inner.push(make_parent(factory, arena, chunk)?);
    }

    make_parent(factory, arena, &inner)
}

/// The node containing `leaf` and the slot it occupies.
fn find_leaf(arena: &NodeArena<WIDTH>, root: NodeRef, leaf: NodeRef) -> Option<(NodeRef, usize)> {
    let children = match root.kind()? {
        NodeKind::AlignedMb => *arena.get::<AlignedNodeMb<WIDTH>>(root).base().children(),
        NodeKind::AlignedMb4d => *arena.get::<AlignedNodeMb4d<WIDTH>>(root).base().children(),
        _ => return None,
    };

    children.iter().enumerate().find_map(|(i, child)| {
        if *child == leaf {
            Some((root, i))
        } else if child.is_empty() || child.is_leaf() {
            None
        } else {
            find_leaf(arena, *child, leaf)
        }
    })
}

#[test]
fn two_level_build_with_time_splits() {
    let leaves = make_leaves(16);
    let mut arena = NodeArena::new();
    let root = build(&AlignedNodeMb4dFactory, &mut arena, &leaves).unwrap();

    assert_eq!(arena.node_count(), 5);
    assert_eq!(arena.count::<AlignedNodeMb4d<WIDTH>>(), 4);
    // Each group of leaves covers the whole interval, so the root needs no time storage.
    assert_eq!(root.dt, Interval::UNIT);
    assert!(root.node.is_aligned_node_mb());

    for leaf in &leaves {
        let (parent, slot) = find_leaf(&arena, root.node, leaf.node).unwrap();
        let node = arena.get::<AlignedNodeMb4d<WIDTH>>(parent);

        // The end of a time range is excluded, unless it is the end of the shutter interval.
        assert_eq!(node.valid_time_mask(leaf.dt.1)[slot], leaf.dt.1 == 1.0);

        for t in [leaf.dt.0, leaf.dt.midpoint(), 0.9 * leaf.dt.1 + 0.1 * leaf.dt.0] {
            assert!(node.valid_time_mask(t)[slot]);
            let leaf_t = (t - leaf.dt.0) / leaf.dt.width();
            let bounds = node.bounds_at_time(t).extract(slot);
            assert!(bounds.contains(&leaf.lbounds.interpolate(leaf_t)));
        }

        assert!(arena.expected_half_area(parent, slot).unwrap() > 0.0);
    }
}

#[test]
fn two_level_build_without_time_storage() {
    let leaves = make_leaves(16);
    let mut with_time = NodeArena::new();
    let mut without_time = NodeArena::new();
    build(&AlignedNodeMb4dFactory, &mut with_time, &leaves).unwrap();
    let root = build(&AlignedNodeMbFactory, &mut without_time, &leaves).unwrap();

    assert_eq!(without_time.count::<AlignedNodeMb4d<WIDTH>>(), 0);
    assert_eq!(without_time.count::<AlignedNodeMb<WIDTH>>(), 5);
    assert!(without_time.bytes_used() < with_time.bytes_used());

    for leaf in &leaves {
        let (parent, slot) = find_leaf(&without_time, root.node, leaf.node).unwrap();
        assert_eq!(parent.kind(), Some(NodeKind::AlignedMb));
        assert!(without_time.expected_half_area(parent, slot).is_some());
    }
    assert_eq!(without_time.expected_half_area(leaves[0].node, 0), None);
    assert_eq!(without_time.expected_half_area(NodeRef::EMPTY, 0), None);
}

#[test]
fn build_aborts_when_the_arena_is_exhausted() {
    let leaves = make_leaves(16);
    let mut arena = NodeArena::with_config(ArenaConfig {
        initial_capacity: 2,
        max_bytes: Some(3 * core::mem::size_of::<AlignedNodeMb4d<WIDTH>>()),
    });

    let result = build(&AlignedNodeMb4dFactory, &mut arena, &leaves);
    assert!(matches!(result, Err(ArenaError::Exhausted { .. })));
    assert_eq!(arena.node_count(), 3);

    arena.clear();
    assert!(build(&AlignedNodeMb4dFactory, &mut arena, &leaves[..8]).is_ok());
}
