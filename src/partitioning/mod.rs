//! Spatial partitioning tools.

pub use self::mbvh::{
    has_time_splits, AabbLanes, AlignedNode, AlignedNodeMb, AlignedNodeMb4d,
    AlignedNodeMb4dFactory, AlignedNodeMbFactory, ArenaConfig, ArenaError, ArenaNode, BaseNode,
    ChildRecords, NodeArena, NodeFactory, NodeKind, NodeRecordMb4d, NodeRef,
};

mod mbvh;
