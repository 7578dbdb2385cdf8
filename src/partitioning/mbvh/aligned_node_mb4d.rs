use super::{
    AabbLanes, AlignedNodeMb, ArenaError, BaseNode, NodeArena, NodeKind, NodeRecordMb4d, NodeRef,
};
use crate::bounding_volume::{Aabb, LinearAabb};
use crate::math::{Lanes, Real};
use crate::utils::Interval;
use core::fmt;

/// A motion node whose children are only valid during a sub-range of the shutter interval.
///
/// On top of the linear bound of an [`AlignedNodeMb`], each child stores the time range
/// `[lower_t, upper_t)` during which it exists. Time-split builds produce children that
/// only cover a part of `[0, 1]`: bounding them over their own range instead of the whole
/// interval gives much tighter boxes.
///
/// A time range ending at `1.0` is stored with an upper bound one ulp above `1.0`, so
/// the half-open validity test still accepts `t = 1.0`.
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Zeroable)]
#[repr(C, align(16))]
pub struct AlignedNodeMb4d<const N: usize> {
    pub(super) node: AlignedNodeMb<N>,
    pub(super) lower_t: Lanes<N>,
    pub(super) upper_t: Lanes<N>,
}

impl<const N: usize> AlignedNodeMb4d<N> {
    /// The stored upper time bound of children whose range ends at `1.0`.
    pub const ONE_PLUS_ULP: Real = 1.0 + Real::EPSILON;

    /// Resets every slot to an unused child with an empty bound and an empty time range.
    pub fn clear(&mut self) {
        self.lower_t = Lanes::repeat(Real::INFINITY);
        self.upper_t = Lanes::repeat(Real::NEG_INFINITY);
        self.node.clear();
    }

    /// Allocates a new cleared node able to hold `num_children` children.
    ///
    /// If `has_time_splits` is `false`, no child will need a time range and the smaller
    /// [`AlignedNodeMb`] layout is allocated instead. The returned reference is tagged
    /// accordingly, so [`AlignedNodeMb4d::set_children`] can tell both layouts apart.
    pub fn create(
        arena: &mut NodeArena<N>,
        num_children: usize,
        has_time_splits: bool,
    ) -> Result<NodeRef, ArenaError> {
        debug_assert!(
            num_children <= N,
            "{num_children} children don’t fit in a {N}-wide node"
        );

        if has_time_splits {
            arena.alloc_cleared::<Self>()
        } else {
            arena.alloc_cleared::<AlignedNodeMb<N>>()
        }
    }

    /// Assigns `children` to the first slots of the node referenced by `node`.
    ///
    /// `node` must have been returned by [`AlignedNodeMb4d::create`]. Nodes without
    /// time storage get the bound of each child re-expressed over `[0, 1]`, the others
    /// additionally record each child’s time range.
    pub fn set_children(arena: &mut NodeArena<N>, node: NodeRef, children: &[NodeRecordMb4d]) {
        debug_assert!(
            children.len() <= N,
            "{} children don’t fit in a {N}-wide node",
            children.len()
        );

        match node.kind() {
            Some(NodeKind::AlignedMb) => {
                let target = arena.get_mut::<AlignedNodeMb<N>>(node);
                for (i, child) in children.iter().enumerate() {
                    target.set(i, child);
                }
            }
            Some(NodeKind::AlignedMb4d) => {
                let target = arena.get_mut::<Self>(node);
                for (i, child) in children.iter().enumerate() {
                    target.set(i, child);
                }
            }
            other => {
                debug_assert!(false, "cannot assign motion children to a {other:?} node");
                return;
            }
        }

        log::trace!("Assigned {} children to node {}.", children.len(), node);
    }

    /// Sets the reference, bound and time range of the `i`-th child.
    #[inline]
    pub fn set(&mut self, i: usize, child: &NodeRecordMb4d) {
        self.node.set_ref(i, child.node);
        self.set_bounds(i, &child.lbounds, child.dt);
    }

    /// Sets the bound and time range of the `i`-th child.
    ///
    /// `bounds` is local to `dt`: it maps `dt.0` to `bounds.bounds0` and `dt.1` to
    /// `bounds.bounds1`. It is stored re-expressed over `[0, 1]`.
    pub fn set_bounds(&mut self, i: usize, bounds: &LinearAabb, dt: Interval<Real>) {
        debug_assert!(
            dt.is_valid_time_range(),
            "invalid time range {dt} for child {i}"
        );

        self.node.set_bounds(i, &bounds.global(dt));
        self.lower_t[i] = dt.0;
        self.upper_t[i] = if dt.1 == 1.0 { Self::ONE_PLUS_ULP } else { dt.1 };
    }

    /// The stored time range of the `i`-th child.
    ///
    /// The upper bound is one ulp above `1.0` for ranges ending at `1.0`.
    #[inline]
    pub fn time_range(&self, i: usize) -> Interval<Real> {
        Interval(self.lower_t[i], self.upper_t[i])
    }

    /// The lower time bounds of all the children.
    #[inline]
    pub fn lower_t(&self) -> &Lanes<N> {
        &self.lower_t
    }

    /// The upper time bounds of all the children.
    #[inline]
    pub fn upper_t(&self) -> &Lanes<N> {
        &self.upper_t
    }

    /// Lane-wise check of which children exist at time `t`.
    ///
    /// Unused slots are never valid.
    pub fn valid_time_mask(&self, t: Real) -> [bool; N] {
        core::array::from_fn(|i| self.lower_t[i] <= t && t < self.upper_t[i])
    }

    /// Returns the expected half area of the `i`-th child when `t` is uniformly sampled
    /// in its time range.
    #[inline]
    pub fn expected_half_area(&self, i: usize) -> Real {
        self.lbounds(i).expected_half_area_in(self.time_range(i))
    }

    /// The reference of the `i`-th child.
    #[inline]
    pub fn child(&self, i: usize) -> NodeRef {
        self.node.child(i)
    }

    /// The child references of this node.
    #[inline]
    pub fn base(&self) -> &BaseNode<N> {
        self.node.base()
    }

    /// The linear motion part of this node.
    #[inline]
    pub fn as_motion_node(&self) -> &AlignedNodeMb<N> {
        &self.node
    }

    /// The global box of the `i`-th child at time 0.
    #[inline]
    pub fn bounds0(&self, i: usize) -> Aabb {
        self.node.bounds0(i)
    }

    /// The global box of the `i`-th child at time 1.
    #[inline]
    pub fn bounds1(&self, i: usize) -> Aabb {
        self.node.bounds1(i)
    }

    /// The global linear bound of the `i`-th child.
    #[inline]
    pub fn lbounds(&self, i: usize) -> LinearAabb {
        self.node.lbounds(i)
    }

    /// The boxes of all the children at time `t`.
    ///
    /// Lanes of children that don’t exist at `t` hold extrapolated boxes, see
    /// [`AlignedNodeMb4d::valid_time_mask`].
    #[inline]
    pub fn bounds_at_time(&self, t: Real) -> AabbLanes<N> {
        self.node.bounds_at_time(t)
    }
}

impl<const N: usize> fmt::Display for AlignedNodeMb4d<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "AlignedNodeMb4d {{")?;
        for i in 0..N {
            let lbounds = self.lbounds(i);
            writeln!(f, "  child{} {{", i)?;
            writeln!(f, "    ref = {},", self.child(i))?;
            writeln!(f, "    bounds0 = {},", lbounds.interpolate(self.lower_t[i]))?;
            writeln!(f, "    bounds1 = {},", lbounds.interpolate(self.upper_t[i]))?;
            writeln!(
                f,
                "    time_bounds = {}, {}",
                self.lower_t[i], self.upper_t[i]
            )?;
            writeln!(f, "  }}")?;
        }
        write!(f, "}}")
    }
}
