use super::{AlignedNodeMb, AlignedNodeMb4d, ArenaError, NodeArena, NodeRef};
use crate::bounding_volume::{Aabb, LinearAabb};
use crate::math::Real;
use crate::utils::Interval;
use arrayvec::ArrayVec;

/// A child as produced by a builder: its reference, its linear bound and its time range.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct NodeRecordMb4d {
    /// The child node or leaf.
    pub node: NodeRef,
    /// The linear bound of the child, local to `dt`.
    pub lbounds: LinearAabb,
    /// The time range during which the child exists.
    pub dt: Interval<Real>,
}

impl NodeRecordMb4d {
    /// A child existing during `dt` and bounded by `lbounds` over that range.
    #[inline]
    pub fn new(node: NodeRef, lbounds: LinearAabb, dt: Interval<Real>) -> Self {
        Self { node, lbounds, dt }
    }

    /// A child that doesn’t move and exists during the whole shutter interval.
    #[inline]
    pub fn from_static(node: NodeRef, aabb: Aabb) -> Self {
        Self::new(node, LinearAabb::from_aabb(aabb), Interval::UNIT)
    }

    /// Does this child exist during a strict sub-range of `[0, 1]` only?
    #[inline]
    pub fn has_time_split(&self) -> bool {
        !self.dt.is_unit()
    }
}

/// The children of a node being built.
pub type ChildRecords<const N: usize> = ArrayVec<NodeRecordMb4d, N>;

/// Does any of `children` need a time range?
pub fn has_time_splits(children: &[NodeRecordMb4d]) -> bool {
    children.iter().any(NodeRecordMb4d::has_time_split)
}

/// Node creation and child assignment, as seen by a tree builder.
///
/// A builder generic over this trait doesn’t need to know which node layout it is
/// producing.
pub trait NodeFactory<const N: usize> {
    /// Allocates a cleared node for `num_children` children.
    fn create(
        &self,
        arena: &mut NodeArena<N>,
        num_children: usize,
        has_time_splits: bool,
    ) -> Result<NodeRef, ArenaError>;

    /// Assigns `children` to the node `node` returned by [`NodeFactory::create`].
    fn set(&self, arena: &mut NodeArena<N>, node: NodeRef, children: &[NodeRecordMb4d]);
}

/// Creates [`AlignedNodeMb4d`] nodes when children have time splits, and
/// [`AlignedNodeMb`] nodes otherwise.
#[derive(Copy, Clone, Debug, Default)]
pub struct AlignedNodeMb4dFactory;

impl<const N: usize> NodeFactory<N> for AlignedNodeMb4dFactory {
    fn create(
        &self,
        arena: &mut NodeArena<N>,
        num_children: usize,
        has_time_splits: bool,
    ) -> Result<NodeRef, ArenaError> {
        AlignedNodeMb4d::create(arena, num_children, has_time_splits)
    }

    fn set(&self, arena: &mut NodeArena<N>, node: NodeRef, children: &[NodeRecordMb4d]) {
        AlignedNodeMb4d::set_children(arena, node, children)
    }
}

/// Always creates [`AlignedNodeMb`] nodes.
///
/// The bound of a child with a time split is still exact inside its time range, but the
/// node can’t tell traversal when the child doesn’t exist.
#[derive(Copy, Clone, Debug, Default)]
pub struct AlignedNodeMbFactory;

impl<const N: usize> NodeFactory<N> for AlignedNodeMbFactory {
    fn create(
        &self,
        arena: &mut NodeArena<N>,
        num_children: usize,
        _has_time_splits: bool,
    ) -> Result<NodeRef, ArenaError> {
        debug_assert!(
            num_children <= N,
            "{num_children} children don’t fit in a {N}-wide node"
        );
        arena.alloc_cleared::<AlignedNodeMb<N>>()
    }

    fn set(&self, arena: &mut NodeArena<N>, node: NodeRef, children: &[NodeRecordMb4d]) {
        let target = arena.get_mut::<AlignedNodeMb<N>>(node);
        for (i, child) in children.iter().enumerate() {
            target.set(i, child);
        }
    }
}
