use core::fmt;
use core::ops::{Index, IndexMut, Not};

/// Stable handle to a node slot in a tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left = 0,
    Right = 1,
}

impl Not for Side {
    type Output = Side;

    fn not(self) -> Self::Output {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    /// Returns `true` if the color is [`Red`].
    ///
    /// [`Red`]: Color::Red
    #[must_use]
    pub fn is_red(&self) -> bool {
        matches!(self, Self::Red)
    }

    /// Returns `true` if the color is [`Black`].
    ///
    /// [`Black`]: Color::Black
    #[must_use]
    pub fn is_black(&self) -> bool {
        matches!(self, Self::Black)
    }
}

/// Per-node bookkeeping owned by a balancing policy.
pub trait Meta: Copy + fmt::Debug {
    /// Metadata of a freshly attached leaf.
    fn leaf() -> Self;

    /// Recomputes derived data after the node's children changed.
    /// `None` stands for an empty child.
    fn refresh(&mut self, _left: Option<Self>, _right: Option<Self>) {}

    fn color(&self) -> Option<Color> {
        None
    }

    fn height(&self) -> Option<u32> {
        None
    }
}

impl Meta for () {
    fn leaf() -> Self {}
}

pub(crate) struct Node<T, M> {
    pub(crate) value: T,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: [Option<NodeId>; 2],
    pub(crate) meta: M,
}

impl<T, M> Node<T, M> {
    pub(crate) fn leaf(value: T, parent: Option<NodeId>, meta: M) -> Self {
        Self {
            value,
            parent,
            children: [None, None],
            meta,
        }
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Option<NodeId> {
        self.children[side as usize]
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children == [None, None]
    }
}

/// Slot arena holding every node of one tree. Freed slots are recycled.
pub(crate) struct Nodes<T, M> {
    slots: Vec<Option<Node<T, M>>>,
    free: Vec<NodeId>,
}

impl<T, M> Nodes<T, M> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn alloc(&mut self, node: Node<T, M>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                debug_assert!(self.slots[id.0].is_none());
                self.slots[id.0] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    pub(crate) fn release(&mut self, id: NodeId) -> Node<T, M> {
        match self.slots[id.0].take() {
            Some(node) => {
                self.free.push(id);
                node
            }
            None => unreachable!("released vacant slot {id:?}"),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

impl<T, M> Index<NodeId> for Nodes<T, M> {
    type Output = Node<T, M>;

    fn index(&self, id: NodeId) -> &Self::Output {
        match &self.slots[id.0] {
            Some(node) => node,
            None => unreachable!("dangling node id {id:?}"),
        }
    }
}

impl<T, M> IndexMut<NodeId> for Nodes<T, M> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        match &mut self.slots[id.0] {
            Some(node) => node,
            None => unreachable!("dangling node id {id:?}"),
        }
    }
}

/// Read-only view of a node, for traversal and export.
pub struct NodeRef<'a, T, M> {
    nodes: &'a Nodes<T, M>,
    id: NodeId,
}

impl<T, M> Clone for NodeRef<'_, T, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, M> Copy for NodeRef<'_, T, M> {}

impl<'a, T, M: Meta> NodeRef<'a, T, M> {
    pub(crate) fn new(nodes: &'a Nodes<T, M>, id: NodeId) -> Self {
        Self { nodes, id }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn value(&self) -> &'a T {
        &self.nodes[self.id].value
    }

    pub fn left(&self) -> Option<NodeRef<'a, T, M>> {
        self.child(Side::Left)
    }

    pub fn right(&self) -> Option<NodeRef<'a, T, M>> {
        self.child(Side::Right)
    }

    pub fn child(&self, side: Side) -> Option<NodeRef<'a, T, M>> {
        self.nodes[self.id]
            .child(side)
            .map(|id| NodeRef::new(self.nodes, id))
    }

    pub fn parent(&self) -> Option<NodeRef<'a, T, M>> {
        self.nodes[self.id]
            .parent
            .map(|id| NodeRef::new(self.nodes, id))
    }

    /// Node color, only for red-black trees.
    pub fn color(&self) -> Option<Color> {
        self.nodes[self.id].meta.color()
    }

    /// Stored subtree height, only for AVL trees.
    pub fn height(&self) -> Option<u32> {
        self.nodes[self.id].meta.height()
    }

    pub fn meta(&self) -> M {
        self.nodes[self.id].meta
    }

    pub fn is_leaf(&self) -> bool {
        self.nodes[self.id].is_leaf()
    }
}

impl<T, M> fmt::Debug for NodeRef<'_, T, M>
where
    T: fmt::Debug,
    M: Meta,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = &self.nodes[self.id];
        let mut f = f.debug_struct("Node");
        f.field("value", &node.value).field("meta", &node.meta);

        let mut dbg_opt_node = |name: &str, link: Option<NodeId>| match link {
            Some(id) => {
                f.field(name, &Some(&self.nodes[id].value));
            }
            None => {
                f.field(name, &None::<T>);
            }
        };

        dbg_opt_node("parent", node.parent);
        dbg_opt_node("left", node.child(Side::Left));
        dbg_opt_node("right", node.child(Side::Right));

        f.finish()
    }
}
