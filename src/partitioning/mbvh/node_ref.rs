use core::fmt;

/// The concrete layout a [`NodeRef`] points to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum NodeKind {
    /// An [`AlignedNode`](super::AlignedNode): one static box per child.
    Aligned = 0,
    /// An [`AlignedNodeMb`](super::AlignedNodeMb): one linear bound per child.
    AlignedMb = 1,
    /// An [`AlignedNodeMb4d`](super::AlignedNodeMb4d): one linear bound and one time
    /// range per child.
    AlignedMb4d = 2,
    /// A leaf. The payload is user data, typically the index of a primitive range.
    Leaf = 3,
}

impl NodeKind {
    #[inline]
    fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(NodeKind::Aligned),
            1 => Some(NodeKind::AlignedMb),
            2 => Some(NodeKind::AlignedMb4d),
            3 => Some(NodeKind::Leaf),
            _ => None,
        }
    }
}

/// A tagged reference to a node or leaf.
///
/// The low [`NodeRef::TAG_BITS`] bits identify the [`NodeKind`], the remaining bits are
/// either the index of the node in the pool of its layout inside a
/// [`NodeArena`](super::NodeArena), or the leaf payload. The all-ones value is
/// [`NodeRef::EMPTY`], the content of unused child slots.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, bytemuck::Zeroable)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[repr(transparent)]
pub struct NodeRef(u32);

impl Default for NodeRef {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl NodeRef {
    /// Number of low bits reserved for the node kind.
    pub const TAG_BITS: u32 = 3;
    const TAG_MASK: u32 = (1 << Self::TAG_BITS) - 1;

    /// The largest node index or leaf payload that can be encoded.
    pub const MAX_PAYLOAD: u32 = u32::MAX >> Self::TAG_BITS;

    /// Required alignment, in bytes, of every node referenced by a `NodeRef`.
    ///
    /// Traversal loads the lanes of a node with aligned SIMD loads.
    pub const BYTE_NODE_ALIGNMENT: usize = 16;

    /// The reference stored in unused child slots.
    pub const EMPTY: Self = NodeRef(u32::MAX);

    /// Encodes a reference to the `index`-th node of the given layout.
    #[inline]
    pub fn encode_node(kind: NodeKind, index: u32) -> Self {
        debug_assert!(
            index <= Self::MAX_PAYLOAD,
            "node index {index} doesn’t fit in a NodeRef"
        );
        NodeRef((index << Self::TAG_BITS) | kind as u32)
    }

    /// Encodes a reference to a leaf carrying the given payload.
    #[inline]
    pub fn encode_leaf(payload: u32) -> Self {
        Self::encode_node(NodeKind::Leaf, payload)
    }

    /// The layout this reference points to, or `None` for [`NodeRef::EMPTY`].
    #[inline]
    pub fn kind(self) -> Option<NodeKind> {
        NodeKind::from_tag(self.0 & Self::TAG_MASK)
    }

    /// The index of the referenced node in the pool of its layout, or the leaf payload.
    #[inline]
    pub fn index(self) -> u32 {
        debug_assert!(!self.is_empty(), "the empty NodeRef has no index");
        self.0 >> Self::TAG_BITS
    }

    /// The payload of this reference if it is a leaf.
    #[inline]
    pub fn leaf_data(self) -> Option<u32> {
        self.is_leaf().then(|| self.index())
    }

    /// The raw bits of this reference.
    #[inline]
    pub fn to_bits(self) -> u32 {
        self.0
    }

    /// Is this the reference of an unused child slot?
    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }

    /// Does this reference a leaf?
    #[inline]
    pub fn is_leaf(self) -> bool {
        self.kind() == Some(NodeKind::Leaf)
    }

    /// Does this reference an [`AlignedNode`](super::AlignedNode)?
    #[inline]
    pub fn is_aligned_node(self) -> bool {
        self.kind() == Some(NodeKind::Aligned)
    }

    /// Does this reference an [`AlignedNodeMb`](super::AlignedNodeMb)?
    #[inline]
    pub fn is_aligned_node_mb(self) -> bool {
        self.kind() == Some(NodeKind::AlignedMb)
    }

    /// Does this reference an [`AlignedNodeMb4d`](super::AlignedNodeMb4d)?
    #[inline]
    pub fn is_aligned_node_mb4d(self) -> bool {
        self.kind() == Some(NodeKind::AlignedMb4d)
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind() {
            None => write!(f, "empty"),
            Some(NodeKind::Leaf) => write!(f, "leaf({})", self.index()),
            Some(kind) => write!(f, "{:?}#{}", kind, self.index()),
        }
    }
}
