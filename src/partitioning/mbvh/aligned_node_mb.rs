use super::{AabbLanes, BaseNode, NodeRecordMb4d, NodeRef};
use crate::bounding_volume::{Aabb, BoundingVolume, LinearAabb};
use crate::math::Real;
use core::fmt;

/// A node storing, for each child, its box at time 0 and its box at time 1.
///
/// The bound of a child at time `t` is the linear interpolation of both boxes, and it is
/// valid for every `t` of the shutter interval `[0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Zeroable)]
#[repr(C, align(16))]
pub struct AlignedNodeMb<const N: usize> {
    pub(super) bounds0: AabbLanes<N>,
    pub(super) bounds1: AabbLanes<N>,
    pub(super) base: BaseNode<N>,
}

impl<const N: usize> AlignedNodeMb<N> {
    /// Resets every slot to an unused child with an empty bound at both times.
    pub fn clear(&mut self) {
        self.bounds0 = AabbLanes::new_invalid();
        self.bounds1 = AabbLanes::new_invalid();
        self.base.clear();
    }

    /// Sets the reference of the `i`-th child.
    #[inline]
    pub fn set_ref(&mut self, i: usize, child: NodeRef) {
        self.base.set_ref(i, child);
    }

    /// Sets the linear bound of the `i`-th child, expressed over `[0, 1]`.
    #[inline]
    pub fn set_bounds(&mut self, i: usize, bounds: &LinearAabb) {
        self.bounds0.replace(i, &bounds.bounds0);
        self.bounds1.replace(i, &bounds.bounds1);
    }

    /// Sets the reference and bound of the `i`-th child.
    ///
    /// The child bound is re-expressed over `[0, 1]`, so it is exact inside `child.dt`
    /// and conservative elsewhere (the child doesn’t exist outside of `child.dt`).
    pub fn set(&mut self, i: usize, child: &NodeRecordMb4d) {
        self.set_ref(i, child.node);
        self.set_bounds(i, &child.lbounds.global(child.dt));
    }

    /// The reference of the `i`-th child.
    #[inline]
    pub fn child(&self, i: usize) -> NodeRef {
        self.base.child(i)
    }

    /// The child references of this node.
    #[inline]
    pub fn base(&self) -> &BaseNode<N> {
        &self.base
    }

    /// The box of the `i`-th child at time 0.
    #[inline]
    pub fn bounds0(&self, i: usize) -> Aabb {
        self.bounds0.extract(i)
    }

    /// The box of the `i`-th child at time 1.
    #[inline]
    pub fn bounds1(&self, i: usize) -> Aabb {
        self.bounds1.extract(i)
    }

    /// The linear bound of the `i`-th child.
    #[inline]
    pub fn lbounds(&self, i: usize) -> LinearAabb {
        LinearAabb::new(self.bounds0(i), self.bounds1(i))
    }

    /// The static box enclosing the `i`-th child over the whole interval.
    #[inline]
    pub fn bounds(&self, i: usize) -> Aabb {
        self.bounds0(i).merged(&self.bounds1(i))
    }

    /// The boxes of all the children at time `t`.
    #[inline]
    pub fn bounds_at_time(&self, t: Real) -> AabbLanes<N> {
        self.bounds0.lerp(&self.bounds1, t)
    }

    /// Returns the expected half area of the `i`-th child when `t` is uniformly sampled
    /// in `[0, 1]`.
    #[inline]
    pub fn expected_half_area(&self, i: usize) -> Real {
        self.lbounds(i).expected_half_area()
    }
}

impl<const N: usize> fmt::Display for AlignedNodeMb<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "AlignedNodeMb {{")?;
        for i in 0..N {
            writeln!(f, "  child{} {{", i)?;
            writeln!(f, "    ref = {},", self.child(i))?;
            writeln!(f, "    bounds0 = {},", self.bounds0(i))?;
            writeln!(f, "    bounds1 = {}", self.bounds1(i))?;
            writeln!(f, "  }}")?;
        }
        write!(f, "}}")
    }
}
