use super::{AlignedNode, AlignedNodeMb, AlignedNodeMb4d, NodeKind, NodeRef};
use crate::math::Real;
use bytemuck::Zeroable;
use core::mem::{align_of, size_of};

/// Configuration of a [`NodeArena`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ArenaConfig {
    /// Number of nodes of each layout to reserve memory for upfront.
    pub initial_capacity: usize,
    /// Upper bound on the total size, in bytes, of the allocated nodes.
    ///
    /// `None` means the arena is only limited by the available memory.
    pub max_bytes: Option<usize>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            max_bytes: None,
        }
    }
}

/// Errors raised when a [`NodeArena`] can’t provide a new node.
///
/// There is no way to recover a half-built tree from these: the build must be aborted
/// and the arena released.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The byte budget of [`ArenaConfig::max_bytes`] would be exceeded.
    #[error("node arena exhausted: {requested} bytes requested with {used} of {capacity} bytes already in use")]
    Exhausted {
        /// Size of the node that couldn’t be allocated.
        requested: usize,
        /// Bytes allocated so far.
        used: usize,
        /// The byte budget of the arena.
        capacity: usize,
    },
    /// The pool of the given layout has as many nodes as a [`NodeRef`] can address.
    #[error("too many {kind:?} nodes: a NodeRef can address at most {max} of them")]
    TooManyNodes {
        /// The layout that ran out of indices.
        kind: NodeKind,
        /// The largest addressable node index.
        max: u32,
    },
}

/// A node layout that can be allocated from a [`NodeArena`].
pub trait ArenaNode<const N: usize>: Zeroable {
    /// The tag of references to this layout.
    const KIND: NodeKind;

    #[doc(hidden)]
    fn pool(arena: &NodeArena<N>) -> &Vec<Self>;
    #[doc(hidden)]
    fn pool_mut(arena: &mut NodeArena<N>) -> &mut Vec<Self>;

    /// Resets this node to its sentinel state: every slot unused, every bound empty.
    fn clear(&mut self);
}

macro_rules! impl_arena_node(
    ($Node: ident, $kind: expr, $pool: ident) => {
        impl<const N: usize> ArenaNode<N> for $Node<N> {
            const KIND: NodeKind = $kind;

            #[inline]
            fn pool(arena: &NodeArena<N>) -> &Vec<Self> {
                &arena.$pool
            }

            #[inline]
            fn pool_mut(arena: &mut NodeArena<N>) -> &mut Vec<Self> {
                &mut arena.$pool
            }

            #[inline]
            fn clear(&mut self) {
                $Node::clear(self)
            }
        }
    }
);

impl_arena_node!(AlignedNode, NodeKind::Aligned, aligned);
impl_arena_node!(AlignedNodeMb, NodeKind::AlignedMb, aligned_mb);
impl_arena_node!(AlignedNodeMb4d, NodeKind::AlignedMb4d, aligned_mb4d);

static_assertions::const_assert!(align_of::<AlignedNode<4>>() >= NodeRef::BYTE_NODE_ALIGNMENT);
static_assertions::const_assert!(align_of::<AlignedNode<8>>() >= NodeRef::BYTE_NODE_ALIGNMENT);
static_assertions::const_assert!(align_of::<AlignedNodeMb<4>>() >= NodeRef::BYTE_NODE_ALIGNMENT);
static_assertions::const_assert!(align_of::<AlignedNodeMb<8>>() >= NodeRef::BYTE_NODE_ALIGNMENT);
static_assertions::const_assert!(
    align_of::<AlignedNodeMb4d<4>>() >= NodeRef::BYTE_NODE_ALIGNMENT
);
static_assertions::const_assert!(
    align_of::<AlignedNodeMb4d<8>>() >= NodeRef::BYTE_NODE_ALIGNMENT
);
// Time ranges are only paid for by nodes with time splits.
static_assertions::const_assert!(size_of::<AlignedNodeMb<4>>() < size_of::<AlignedNodeMb4d<4>>());
static_assertions::const_assert!(size_of::<AlignedNodeMb<8>>() < size_of::<AlignedNodeMb4d<8>>());

/// A scoped arena owning every node of a tree.
///
/// Nodes are never freed individually: they all live until the arena is dropped or
/// [cleared](NodeArena::clear). Each layout has its own pool and a [`NodeRef`] is the
/// index of a node in the pool selected by its tag.
///
/// Distinct arenas can be used from distinct threads, e.g., to build sibling subtrees
/// in parallel.
#[derive(Clone, Debug, Default)]
pub struct NodeArena<const N: usize> {
    config: ArenaConfig,
    aligned: Vec<AlignedNode<N>>,
    aligned_mb: Vec<AlignedNodeMb<N>>,
    aligned_mb4d: Vec<AlignedNodeMb4d<N>>,
    bytes_used: usize,
}

impl<const N: usize> NodeArena<N> {
    /// An empty arena without any byte budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty arena configured by `config`.
    pub fn with_config(config: ArenaConfig) -> Self {
        Self {
            config,
            aligned: Vec::with_capacity(config.initial_capacity),
            aligned_mb: Vec::with_capacity(config.initial_capacity),
            aligned_mb4d: Vec::with_capacity(config.initial_capacity),
            bytes_used: 0,
        }
    }

    /// The configuration of this arena.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Allocates a zero-initialized node of type `T`.
    ///
    /// The node isn’t in a usable state yet: callers must [clear](ArenaNode::clear) it
    /// before assigning children.
    pub fn alloc_zeroed<T: ArenaNode<N>>(&mut self) -> Result<NodeRef, ArenaError> {
        let requested = size_of::<T>();

        if let Some(capacity) = self.config.max_bytes {
            if self.bytes_used + requested > capacity {
                log::debug!(
                    "Refusing to allocate a {:?} node: {} + {} bytes exceeds the {} bytes budget.",
                    T::KIND,
                    self.bytes_used,
                    requested,
                    capacity
                );
                return Err(ArenaError::Exhausted {
                    requested,
                    used: self.bytes_used,
                    capacity,
                });
            }
        }

        let pool = T::pool_mut(self);
        let index = pool.len();

        if index > NodeRef::MAX_PAYLOAD as usize {
            return Err(ArenaError::TooManyNodes {
                kind: T::KIND,
                max: NodeRef::MAX_PAYLOAD,
            });
        }

        pool.push(T::zeroed());
        debug_assert_eq!(
            (&pool[index] as *const T as usize) % NodeRef::BYTE_NODE_ALIGNMENT,
            0,
            "misaligned node"
        );

        self.bytes_used += requested;
        Ok(NodeRef::encode_node(T::KIND, index as u32))
    }

    /// Allocates a node of type `T` and [clears](ArenaNode::clear) it.
    pub fn alloc_cleared<T: ArenaNode<N>>(&mut self) -> Result<NodeRef, ArenaError> {
        let node = self.alloc_zeroed::<T>()?;
        self.get_mut::<T>(node).clear();
        log::trace!("Allocated node {}.", node);
        Ok(node)
    }

    /// The node of type `T` referenced by `node`.
    ///
    /// Panics if `node` doesn’t reference a node allocated by this arena.
    #[inline]
    pub fn get<T: ArenaNode<N>>(&self, node: NodeRef) -> &T {
        debug_assert_eq!(node.kind(), Some(T::KIND), "node reference tag mismatch");
        &T::pool(self)[node.index() as usize]
    }

    /// The node of type `T` referenced by `node`, mutably.
    ///
    /// Panics if `node` doesn’t reference a node allocated by this arena.
    #[inline]
    pub fn get_mut<T: ArenaNode<N>>(&mut self, node: NodeRef) -> &mut T {
        debug_assert_eq!(node.kind(), Some(T::KIND), "node reference tag mismatch");
        &mut T::pool_mut(self)[node.index() as usize]
    }

    /// The node of type `T` referenced by `node`, if `node` is tagged with `T::KIND`
    /// and was allocated by this arena.
    #[inline]
    pub fn try_get<T: ArenaNode<N>>(&self, node: NodeRef) -> Option<&T> {
        if node.kind() != Some(T::KIND) {
            return None;
        }
        T::pool(self).get(node.index() as usize)
    }

    /// Total size, in bytes, of the nodes allocated so far.
    pub fn bytes_used(&self) -> usize {
        self.bytes_used
    }

    /// Number of nodes of type `T` allocated so far.
    pub fn count<T: ArenaNode<N>>(&self) -> usize {
        T::pool(self).len()
    }

    /// Number of nodes of type `T` this arena can hold without reallocating.
    pub fn capacity<T: ArenaNode<N>>(&self) -> usize {
        T::pool(self).capacity()
    }

    /// Number of nodes allocated so far, all layouts included.
    pub fn node_count(&self) -> usize {
        self.aligned.len() + self.aligned_mb.len() + self.aligned_mb4d.len()
    }

    /// Is this arena free of any node?
    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    /// Releases every node of this arena at once.
    ///
    /// All the `NodeRef` obtained from this arena are invalidated.
    pub fn clear(&mut self) {
        self.aligned.clear();
        self.aligned_mb.clear();
        self.aligned_mb4d.clear();
        self.bytes_used = 0;
    }

    /// The expected half area of the `i`-th child of `node`, whatever its layout.
    ///
    /// Time is sampled uniformly in the child’s time range, which is `[0, 1]` for every
    /// layout but [`AlignedNodeMb4d`]. Returns `None` if `node` is a leaf or empty, or if
    /// its `i`-th slot is unused.
    pub fn expected_half_area(&self, node: NodeRef, i: usize) -> Option<Real> {
        match node.kind()? {
            NodeKind::Aligned => {
                let node = self.get::<AlignedNode<N>>(node);
                (!node.child(i).is_empty()).then(|| node.half_area(i))
            }
            NodeKind::AlignedMb => {
                let node = self.get::<AlignedNodeMb<N>>(node);
                (!node.child(i).is_empty()).then(|| node.expected_half_area(i))
            }
            NodeKind::AlignedMb4d => {
                let node = self.get::<AlignedNodeMb4d<N>>(node);
                (!node.child(i).is_empty()).then(|| node.expected_half_area(i))
            }
            NodeKind::Leaf => None,
        }
    }
}
