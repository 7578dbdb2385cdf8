use super::{AabbLanes, NodeRef};
use crate::bounding_volume::Aabb;
use crate::math::Real;
use core::fmt;

/// The child references shared by every node layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq, bytemuck::Zeroable)]
#[repr(C)]
pub struct BaseNode<const N: usize> {
    pub(super) children: [NodeRef; N],
}

impl<const N: usize> BaseNode<N> {
    /// Marks every child slot as unused.
    #[inline]
    pub fn clear(&mut self) {
        self.children = [NodeRef::EMPTY; N];
    }

    /// Sets the reference of the `i`-th child.
    ///
    /// Each slot is assigned at most once during the lifetime of a node.
    #[inline]
    pub fn set_ref(&mut self, i: usize, child: NodeRef) {
        debug_assert!(i < N, "child index {i} out of bounds for a {N}-wide node");
        debug_assert!(
            self.children[i].is_empty(),
            "child slot {i} was already assigned"
        );
        self.children[i] = child;
    }

    /// The reference of the `i`-th child, [`NodeRef::EMPTY`] if the slot is unused.
    #[inline]
    pub fn child(&self, i: usize) -> NodeRef {
        self.children[i]
    }

    /// The child references of all the slots.
    #[inline]
    pub fn children(&self) -> &[NodeRef; N] {
        &self.children
    }

    /// The number of slots holding a child.
    pub fn num_children(&self) -> usize {
        self.children.iter().filter(|c| !c.is_empty()).count()
    }
}

/// A node storing one static box per child.
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Zeroable)]
#[repr(C, align(16))]
pub struct AlignedNode<const N: usize> {
    pub(super) bounds: AabbLanes<N>,
    pub(super) base: BaseNode<N>,
}

impl<const N: usize> AlignedNode<N> {
    /// Resets every slot to an unused child with an empty box.
    pub fn clear(&mut self) {
        self.bounds = AabbLanes::new_invalid();
        self.base.clear();
    }

    /// Sets the reference and box of the `i`-th child.
    pub fn set(&mut self, i: usize, child: NodeRef, aabb: &Aabb) {
        self.base.set_ref(i, child);
        self.set_bounds(i, aabb);
    }

    /// Sets the box of the `i`-th child.
    #[inline]
    pub fn set_bounds(&mut self, i: usize, aabb: &Aabb) {
        self.bounds.replace(i, aabb);
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

    /// The box of the `i`-th child.
    #[inline]
    pub fn bounds(&self, i: usize) -> Aabb {
        self.bounds.extract(i)
    }

    /// The boxes of all the children.
    #[inline]
    pub fn lanes(&self) -> &AabbLanes<N> {
        &self.bounds
    }

    /// The half area of the box of the `i`-th child.
    #[inline]
    pub fn half_area(&self, i: usize) -> Real {
        self.bounds(i).half_area()
    }
}

impl<const N: usize> fmt::Display for AlignedNode<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "AlignedNode {{")?;
        for i in 0..N {
            writeln!(
                f,
                "  child{} {{ ref = {}, bounds = {} }}",
                i,
                self.child(i),
                self.bounds(i)
            )?;
        }
        write!(f, "}}")
    }
}
