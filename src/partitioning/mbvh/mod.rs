//! Nodes of a wide BVH over motion-blurred geometry.
//!
//! Three layouts share the same [`NodeRef`] type:
//! - [`AlignedNode`]: one static box per child.
//! - [`AlignedNodeMb`]: one box at time 0 and one box at time 1 per child, valid over
//!   the whole shutter interval.
//! - [`AlignedNodeMb4d`]: same as [`AlignedNodeMb`] plus, per child, the time range
//!   during which its bound is valid.
//!
//! All nodes live in a [`NodeArena`] and are released together with it.

pub use self::aabb_lanes::AabbLanes;
pub use self::aligned_node::{AlignedNode, BaseNode};
pub use self::aligned_node_mb::AlignedNodeMb;
pub use self::aligned_node_mb4d::AlignedNodeMb4d;
pub use self::arena::{ArenaConfig, ArenaError, ArenaNode, NodeArena};
pub use self::node_record::{
    has_time_splits, AlignedNodeMb4dFactory, AlignedNodeMbFactory, ChildRecords, NodeFactory,
    NodeRecordMb4d,
};
pub use self::node_ref::{NodeKind, NodeRef};

mod aabb_lanes;
mod aligned_node;
mod aligned_node_mb;
mod aligned_node_mb4d;
mod arena;
mod node_record;
mod node_ref;
