use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;
use core::mem;
use std::path::Path;

use log::{debug, error, trace};

use crate::error::TreeError;
use crate::node::{Meta, Node, NodeId, NodeRef, Nodes, Side};
use crate::render;

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// Rebalancing strategy plugged into [`Tree`].
///
/// The engine performs every structural mutation (attach, unlink, splice)
/// and then hands the affected position to the policy, which may rotate and
/// update its per-node [`Meta`] to restore its own invariants.
pub trait Policy: sealed::Sealed + Sized {
    type Meta: Meta;

    /// Name used in `Debug` output and error messages.
    const NAME: &'static str;

    /// Called with the freshly attached leaf.
    fn after_insert<T: Ord + fmt::Debug>(
        _tree: &mut Tree<T, Self>,
        _node: NodeId,
    ) -> Result<(), TreeError> {
        Ok(())
    }

    /// Called once a node has been physically unlinked.
    fn after_delete<T: Ord + fmt::Debug>(
        _tree: &mut Tree<T, Self>,
        _hole: Hole<Self::Meta>,
    ) -> Result<(), TreeError> {
        Ok(())
    }

    /// Checks the policy's own invariants on top of the search-tree ones.
    fn verify<T: Ord + fmt::Debug>(_tree: &Tree<T, Self>) -> Result<(), TreeError> {
        Ok(())
    }
}

/// The slot left behind by an unlinked node.
#[derive(Debug, Clone, Copy)]
pub struct Hole<M> {
    /// The node that physically lost a child and on which side, `None` if
    /// the root itself was replaced.
    pub(crate) link: Option<(NodeId, Side)>,
    /// Subtree now occupying the slot.
    pub(crate) occupant: Option<NodeId>,
    /// Metadata of the node that was physically removed.
    pub(crate) removed: M,
}

/// An ordered set of unique values stored in a binary search tree whose
/// balancing is chosen by `P`.
pub struct Tree<T, P: Policy> {
    // INVARIANTS:
    //  * every live slot is reachable from `root` through exactly one link
    //  * `p.children[s] == Some(n)` iff `n.parent == Some(p)`
    nodes: Nodes<T, P::Meta>,
    root: Option<NodeId>,
    len: usize,
    marker: PhantomData<P>,
}

impl<T, P: Policy> Default for Tree<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P> fmt::Debug for Tree<T, P>
where
    T: fmt::Debug,
    P: Policy,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct TreeDebug<'a, T, P: Policy> {
            tree: &'a Tree<T, P>,
        }

        impl<T, P> fmt::Debug for TreeDebug<'_, T, P>
        where
            T: fmt::Debug,
            P: Policy,
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let mut f = f.debug_list();
                self.tree.inorder_core(|node| {
                    f.entry(&NodeRef::new(&self.tree.nodes, node));
                });
                f.finish()
            }
        }

        f.debug_struct(P::NAME)
            .field("len", &self.len)
            .field("root", &self.root())
            .field("nodes", &TreeDebug { tree: self })
            .finish()
    }
}

impl<T, P: Policy> Tree<T, P> {
    pub const fn new() -> Self {
        Self {
            nodes: Nodes::new(),
            root: None,
            len: 0,
            marker: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    /// Read-only view of the root node.
    pub fn root(&self) -> Option<NodeRef<'_, T, P::Meta>> {
        self.root.map(|root| NodeRef::new(&self.nodes, root))
    }

    pub fn lookup<Q>(&self, key: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_raw(key).map(|node| &self.nodes[node].value)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_raw(key).is_some()
    }

    fn get_raw<Q>(&self, key: &Q) -> Option<NodeId>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut opt_cur = self.root;

        loop {
            let cur = opt_cur?;
            let node = &self.nodes[cur];
            match key.cmp(node.value.borrow()) {
                Ordering::Less => opt_cur = node.child(Side::Left),
                Ordering::Equal => return Some(cur),
                Ordering::Greater => opt_cur = node.child(Side::Right),
            }
        }
    }

    pub fn min(&self) -> Option<&T> {
        self.root.map(|root| &self.nodes[self.min_of(root)].value)
    }

    pub fn max(&self) -> Option<&T> {
        self.root.map(|root| &self.nodes[self.max_of(root)].value)
    }

    pub(crate) fn min_of(&self, root: NodeId) -> NodeId {
        let mut x = root;
        while let Some(left) = self.nodes[x].child(Side::Left) {
            x = left;
        }

        x
    }

    pub(crate) fn max_of(&self, root: NodeId) -> NodeId {
        let mut x = root;
        while let Some(right) = self.nodes[x].child(Side::Right) {
            x = right;
        }

        x
    }

    /// Number of nodes on the longest root-to-leaf path, 0 for an empty tree.
    pub fn height(&self) -> usize {
        let mut level: Vec<NodeId> = self.root.into_iter().collect();
        let mut height = 0;
        while !level.is_empty() {
            height += 1;
            level = level
                .iter()
                .flat_map(|&node| self.nodes[node].children)
                .flatten()
                .collect();
        }

        height
    }

    pub fn inorder_for_each<F>(&self, mut f: F)
    where
        F: FnMut(&T),
    {
        self.inorder_core(|node| f(&self.nodes[node].value));
    }

    pub fn preorder_for_each<F>(&self, mut f: F)
    where
        F: FnMut(&T),
    {
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(node) = stack.pop() {
            let node = &self.nodes[node];
            f(&node.value);
            stack.extend(node.child(Side::Right));
            stack.extend(node.child(Side::Left));
        }
    }

    pub fn postorder_for_each<F>(&self, mut f: F)
    where
        F: FnMut(&T),
    {
        // node-right-left pre-order, reversed
        let mut order = Vec::with_capacity(self.len);
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(self.nodes[node].child(Side::Left));
            stack.extend(self.nodes[node].child(Side::Right));
        }

        for node in order.into_iter().rev() {
            f(&self.nodes[node].value);
        }
    }

    fn inorder_core<F>(&self, mut f: F)
    where
        F: FnMut(NodeId),
    {
        let mut stack = Vec::new();
        let mut cur = self.root;
        loop {
            while let Some(node) = cur {
                stack.push(node);
                cur = self.nodes[node].child(Side::Left);
            }

            let Some(node) = stack.pop() else { break };
            f(node);
            cur = self.nodes[node].child(Side::Right);
        }
    }

    pub(crate) fn inorder_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(self.len);
        self.inorder_core(|node| ids.push(node));
        ids
    }

    #[inline]
    pub(crate) fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    #[inline]
    pub(crate) fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node].parent
    }

    #[inline]
    pub(crate) fn child(&self, node: NodeId, side: Side) -> Option<NodeId> {
        self.nodes[node].child(side)
    }

    #[inline]
    pub(crate) fn meta(&self, node: NodeId) -> P::Meta {
        self.nodes[node].meta
    }

    #[inline]
    pub(crate) fn meta_mut(&mut self, node: NodeId) -> &mut P::Meta {
        &mut self.nodes[node].meta
    }

    /// Metadata of an optional node, `None` for an empty child.
    #[inline]
    pub(crate) fn meta_of(&self, node: Option<NodeId>) -> Option<P::Meta> {
        node.map(|node| self.nodes[node].meta)
    }

    /// The parent of `node` and which of its children `node` is.
    pub(crate) fn link_of(&self, node: NodeId) -> Option<(NodeId, Side)> {
        let parent = self.nodes[node].parent?;
        let side = if self.nodes[parent].child(Side::Left) == Some(node) {
            Side::Left
        } else {
            Side::Right
        };

        Some((parent, side))
    }

    /// Links `child` under `parent` and points it back at `parent`.
    pub(crate) fn set_child(&mut self, parent: NodeId, side: Side, child: Option<NodeId>) {
        self.nodes[parent].children[side as usize] = child;
        if let Some(child) = child {
            self.nodes[child].parent = Some(parent);
        }
    }

    /// Replaces subtree `old` with subtree `new` and detaches `old`.
    pub(crate) fn replace_subtree(&mut self, old: NodeId, new: Option<NodeId>) {
        match self.link_of(old) {
            Some((parent, side)) => self.set_child(parent, side, new),
            None => {
                // `old` was the root
                self.root = new;
                if let Some(new) = new {
                    self.nodes[new].parent = None;
                }
            }
        }

        self.nodes[old].parent = None;
    }

    /// Recomputes derived metadata of `node` from its children.
    pub(crate) fn refresh(&mut self, node: NodeId) {
        let [left, right] = self.nodes[node].children;
        let left = self.meta_of(left);
        let right = self.meta_of(right);
        self.nodes[node].meta.refresh(left, right);
    }

    /// Rotates `node` down towards `dir`. Its child on the other side takes
    /// its place and is returned. Does nothing if that child is missing.
    ///
    /// Only links and derived metadata change, never colors.
    pub(crate) fn rotate(&mut self, node: NodeId, dir: Side) -> Option<NodeId> {
        // dir = Left:
        //    p                       p
        //    |                       |
        // +-node-+               +-pivot-+
        // |      |      -->      |       |
        // a  +-pivot-+       +-node-+    c
        //    |       |       |      |
        //    b       c       a      b
        // where a, b, c can be any subtrees
        let pivot = self.nodes[node].child(!dir)?;
        trace!("rotate {dir:?} around {node:?}, {pivot:?} moves up");

        let inner = self.nodes[pivot].child(dir);
        self.set_child(node, !dir, inner);
        self.replace_subtree(node, Some(pivot));
        self.set_child(pivot, dir, Some(node));

        self.refresh(node);
        self.refresh(pivot);
        Some(pivot)
    }
}

impl<T, P> Tree<T, P>
where
    T: Ord + fmt::Debug,
    P: Policy,
{
    /// Inserts `value`. Fails with [`TreeError::DuplicateKey`] and leaves the
    /// tree untouched if an equal value is already present.
    pub fn insert(&mut self, value: T) -> Result<(), TreeError> {
        debug!("{}: insert {value:?}", P::NAME);
        let slot = self.locate_insert(&value)?;
        let node = self.attach(value, slot);
        self.len += 1;
        P::after_insert(self, node)?;
        self.verify_after_mutation()
    }

    /// Removes the value equal to `key` and returns it.
    pub fn delete<Q>(&mut self, key: &Q) -> Result<T, TreeError>
    where
        T: Borrow<Q>,
        Q: Ord + fmt::Debug + ?Sized,
    {
        let Some(root) = self.root else {
            return Err(TreeError::EmptyTree);
        };
        let target = self
            .get_raw(key)
            .ok_or_else(|| TreeError::NotFound(format!("{key:?}")))?;
        debug!("{}: delete {key:?}", P::NAME);

        if target == root && self.nodes[root].is_leaf() {
            let node = self.nodes.release(root);
            self.clear();
            return Ok(node.value);
        }

        let (value, hole) = self.unlink(target);
        self.len -= 1;
        P::after_delete(self, hole)?;
        self.verify_after_mutation()?;
        Ok(value)
    }

    /// Checks search order, link consistency and the node count, then the
    /// policy's own invariants.
    pub fn check_invariants(&self) -> Result<(), TreeError> {
        self.verify_structure()?;
        P::verify(self)
    }

    /// Finds the empty slot where `value` belongs: the would-be parent and
    /// side, or `None` if the tree is empty.
    pub(crate) fn locate_insert(&self, value: &T) -> Result<Option<(NodeId, Side)>, TreeError> {
        let mut slot = None;
        let mut cur = self.root;
        while let Some(node) = cur {
            let side = match value.cmp(&self.nodes[node].value) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Err(TreeError::DuplicateKey(format!("{value:?}"))),
            };
            slot = Some((node, side));
            cur = self.nodes[node].child(side);
        }

        Ok(slot)
    }

    fn attach(&mut self, value: T, slot: Option<(NodeId, Side)>) -> NodeId {
        let parent = slot.map(|(parent, _)| parent);
        let node = self
            .nodes
            .alloc(Node::leaf(value, parent, <P::Meta as Meta>::leaf()));
        match slot {
            Some((parent, side)) => self.set_child(parent, side, Some(node)),
            None => self.root = Some(node),
        }

        node
    }

    /// Physically removes one node so that `target`'s value leaves the tree.
    ///
    /// With two children `target` stays in place and takes over the value of
    /// its in-order successor, which is spliced out instead.
    pub(crate) fn unlink(&mut self, target: NodeId) -> (T, Hole<P::Meta>) {
        let [left, right] = self.nodes[target].children;
        match (left, right) {
            (Some(_), Some(right)) => {
                let successor = self.min_of(right);
                let Some((parent, side)) = self.link_of(successor) else {
                    unreachable!("successor {successor:?} lies below {target:?}")
                };
                // successor has no left child
                let occupant = self.nodes[successor].child(Side::Right);
                trace!("splice successor {successor:?} out of {parent:?} ({side:?})");
                self.set_child(parent, side, occupant);

                let removed = self.nodes.release(successor);
                let value = mem::replace(&mut self.nodes[target].value, removed.value);
                let hole = Hole {
                    link: Some((parent, side)),
                    occupant,
                    removed: removed.meta,
                };
                (value, hole)
            }
            (child, None) | (None, child) => {
                let link = self.link_of(target);
                trace!("replace {target:?} with {child:?}");
                self.replace_subtree(target, child);

                let removed = self.nodes.release(target);
                let hole = Hole {
                    link,
                    occupant: child,
                    removed: removed.meta,
                };
                (removed.value, hole)
            }
        }
    }

    /// Rotation whose pivot must exist.
    pub(crate) fn try_rotate(&mut self, node: NodeId, dir: Side) -> Result<NodeId, TreeError> {
        self.rotate(node, dir)
            .ok_or_else(|| self.violation(node, format!("rotation {dir:?} has no pivot")))
    }

    pub(crate) fn violation(&self, node: NodeId, reason: impl Into<String>) -> TreeError {
        self.violation_at(Some(node), reason.into())
    }

    fn violation_at(&self, node: Option<NodeId>, reason: String) -> TreeError {
        let (value, meta) = match node {
            Some(node) => (
                format!("{:?}", self.nodes[node].value),
                format!("{:?}", self.nodes[node].meta),
            ),
            None => ("<none>".to_owned(), "-".to_owned()),
        };
        error!("{} invariant violated at {value}: {reason}", P::NAME);
        TreeError::InvariantViolation {
            variant: P::NAME,
            value,
            meta,
            reason,
            rendering: render::pretty(self.root(), |v| format!("{v:?}")),
        }
    }

    fn verify_after_mutation(&self) -> Result<(), TreeError> {
        if cfg!(any(debug_assertions, feature = "verify")) {
            self.check_invariants()
        } else {
            Ok(())
        }
    }

    fn verify_structure(&self) -> Result<(), TreeError> {
        if let Some(root) = self.root {
            if self.nodes[root].parent.is_some() {
                return Err(self.violation(root, "root has a parent"));
            }
        }

        let ids = self.inorder_ids();
        if ids.len() != self.len {
            return Err(self.violation_at(
                self.root,
                format!("{} reachable nodes but len is {}", ids.len(), self.len),
            ));
        }

        for (i, &node) in ids.iter().enumerate() {
            for side in [Side::Left, Side::Right] {
                if let Some(child) = self.nodes[node].child(side) {
                    if self.nodes[child].parent != Some(node) {
                        return Err(self.violation(child, "parent link does not match owner"));
                    }
                }
            }

            if i > 0 && self.nodes[ids[i - 1]].value >= self.nodes[node].value {
                return Err(self.violation(node, "in-order sequence is not strictly ascending"));
            }
        }

        Ok(())
    }
}

impl<T, P> Tree<T, P>
where
    T: fmt::Display,
    P: Policy,
{
    /// Multi-line drawing of the tree shape.
    pub fn pretty_print(&self) -> String {
        render::pretty(self.root(), |v| v.to_string())
    }

    /// Writes the tree as a Graphviz digraph.
    pub fn write_dot<W: fmt::Write>(&self, w: W) -> fmt::Result {
        render::dot(self.root(), w)
    }

    /// `Display` adapter producing the DOT description.
    pub fn dot(&self) -> render::Dot<'_, T, P::Meta> {
        render::Dot::new(self.root())
    }

    pub fn to_dot(&self) -> String {
        self.dot().to_string()
    }

    /// Writes the DOT description to `path`, creating parent directories.
    pub fn export_dot(&self, path: impl AsRef<Path>) -> Result<(), TreeError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, self.to_dot())?;
        debug!("{}: exported to {}", P::NAME, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary_search_tree::BinarySearchTree;

    #[derive(Debug)]
    struct TestNode {
        value: i32,
        left: Option<Box<TestNode>>,
        right: Option<Box<TestNode>>,
    }

    impl TestNode {
        fn leaf(value: i32) -> Option<Box<Self>> {
            Some(Box::new(Self {
                value,
                left: None,
                right: None,
            }))
        }

        fn node(value: i32, left: Option<Box<Self>>, right: Option<Box<Self>>) -> Option<Box<Self>> {
            Some(Box::new(Self { value, left, right }))
        }
    }

    fn assert_shape(tree: &BinarySearchTree<i32>, expected: &Option<Box<TestNode>>) {
        fn inner(actual: Option<NodeRef<'_, i32, ()>>, expected: &Option<Box<TestNode>>) {
            match (actual, expected) {
                (None, None) => {}
                (Some(actual), Some(expected)) => {
                    assert_eq!(*actual.value(), expected.value);
                    if let Some(left) = actual.left() {
                        assert_eq!(left.parent().map(|p| p.id()), Some(actual.id()));
                    }
                    if let Some(right) = actual.right() {
                        assert_eq!(right.parent().map(|p| p.id()), Some(actual.id()));
                    }
                    inner(actual.left(), &expected.left);
                    inner(actual.right(), &expected.right);
                }
                (actual, expected) => panic!(
                    "shape mismatch: {:?} vs {:?}",
                    actual.map(|n| *n.value()),
                    expected.as_ref().map(|n| n.value)
                ),
            }
        }

        inner(tree.root(), expected);
        assert!(tree.root().map_or(true, |root| root.parent().is_none()));
    }

    fn sample() -> BinarySearchTree<i32> {
        let mut tree = BinarySearchTree::new();
        for v in [12, 9, 15, 14, 16] {
            tree.insert(v).unwrap();
        }
        tree
    }

    #[test]
    fn rotate_roundtrip() {
        let mut tree = sample();

        let expected0 = TestNode::node(
            12,
            TestNode::leaf(9),
            TestNode::node(15, TestNode::leaf(14), TestNode::leaf(16)),
        );
        assert_shape(&tree, &expected0);

        let root = tree.root_id().unwrap();
        assert!(tree.rotate(root, Side::Left).is_some());
        let expected1 = TestNode::node(
            15,
            TestNode::node(12, TestNode::leaf(9), TestNode::leaf(14)),
            TestNode::leaf(16),
        );
        assert_shape(&tree, &expected1);

        let root = tree.root_id().unwrap();
        assert!(tree.rotate(root, Side::Left).is_some());
        let expected2 = TestNode::node(
            16,
            TestNode::node(
                15,
                TestNode::node(12, TestNode::leaf(9), TestNode::leaf(14)),
                None,
            ),
            None,
        );
        assert_shape(&tree, &expected2);

        let node = tree.get_raw(&12).unwrap();
        assert!(tree.rotate(node, Side::Left).is_some());
        let expected3 = TestNode::node(
            16,
            TestNode::node(
                15,
                TestNode::node(14, TestNode::node(12, TestNode::leaf(9), None), None),
                None,
            ),
            None,
        );
        assert_shape(&tree, &expected3);

        let node = tree.get_raw(&14).unwrap();
        assert!(tree.rotate(node, Side::Right).is_some());
        assert_shape(&tree, &expected2);

        let root = tree.root_id().unwrap();
        assert!(tree.rotate(root, Side::Right).is_some());
        assert_shape(&tree, &expected1);

        let root = tree.root_id().unwrap();
        assert!(tree.rotate(root, Side::Right).is_some());
        assert_shape(&tree, &expected0);

        tree.check_invariants().unwrap();
    }

    #[test]
    fn rotate_without_pivot_is_noop() {
        let mut tree = sample();
        let leaf = tree.get_raw(&9).unwrap();
        assert!(tree.rotate(leaf, Side::Left).is_none());
        assert!(tree.rotate(leaf, Side::Right).is_none());
        assert!(tree.try_rotate(leaf, Side::Left).unwrap_err().is_fatal());
    }

    #[test]
    fn locate_insert() {
        let tree = sample();
        assert!(matches!(
            tree.locate_insert(&15),
            Err(TreeError::DuplicateKey(v)) if v == "15"
        ));

        let (parent, side) = tree.locate_insert(&13).unwrap().unwrap();
        assert_eq!(tree.nodes[parent].value, 14);
        assert_eq!(side, Side::Left);

        let (parent, side) = tree.locate_insert(&20).unwrap().unwrap();
        assert_eq!(tree.nodes[parent].value, 16);
        assert_eq!(side, Side::Right);

        let empty = BinarySearchTree::<i32>::new();
        assert!(empty.locate_insert(&1).unwrap().is_none());
    }

    #[test]
    fn unlink_two_children_keeps_target_node() {
        let mut tree = sample();
        let target = tree.get_raw(&12).unwrap();

        let (value, hole) = tree.unlink(target);
        tree.len -= 1;
        assert_eq!(value, 12);
        // 14 is the successor, it moved into the root slot
        assert_eq!(tree.root_id(), Some(target));
        assert_eq!(tree.nodes[target].value, 14);

        let (parent, side) = hole.link.unwrap();
        assert_eq!(tree.nodes[parent].value, 15);
        assert_eq!(side, Side::Left);
        assert!(hole.occupant.is_none());
        tree.check_invariants().unwrap();
    }

    #[test]
    fn unlink_successor_is_right_child() {
        let mut tree = sample();
        let target = tree.get_raw(&15).unwrap();

        let (value, hole) = tree.unlink(target);
        tree.len -= 1;
        assert_eq!(value, 15);
        assert_eq!(tree.nodes[target].value, 16);
        assert_eq!(hole.link, Some((target, Side::Right)));
        tree.check_invariants().unwrap();
    }

    #[test]
    fn unlink_one_child_root() {
        let mut tree = BinarySearchTree::new();
        tree.insert(1).unwrap();
        tree.insert(2).unwrap();
        let root = tree.root_id().unwrap();

        let (value, hole) = tree.unlink(root);
        tree.len -= 1;
        assert_eq!(value, 1);
        assert!(hole.link.is_none());
        assert_eq!(tree.root().map(|r| *r.value()), Some(2));
        tree.check_invariants().unwrap();
    }

    #[test]
    fn check_invariants_detects_broken_order() {
        let mut tree = sample();
        let node = tree.get_raw(&14).unwrap();
        tree.nodes[node].value = 100;
        let err = tree.check_invariants().unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("strictly ascending"), "{err}");
    }

    #[test]
    fn check_invariants_detects_broken_parent_link() {
        let mut tree = sample();
        let node = tree.get_raw(&16).unwrap();
        let wrong_parent = tree.get_raw(&9);
        tree.nodes[node].parent = wrong_parent;
        assert!(matches!(
            tree.check_invariants(),
            Err(TreeError::InvariantViolation { reason, .. }) if reason.contains("parent link")
        ));
    }

    #[test]
    fn traversals() {
        let tree = sample();

        let mut items = Vec::new();
        tree.preorder_for_each(|v| items.push(*v));
        assert_eq!(items, [12, 9, 15, 14, 16]);

        let mut items = Vec::new();
        tree.postorder_for_each(|v| items.push(*v));
        assert_eq!(items, [9, 14, 16, 15, 12]);

        let mut items = Vec::new();
        tree.inorder_for_each(|v| items.push(*v));
        assert_eq!(items, [9, 12, 14, 15, 16]);
    }

    #[test]
    fn clear_and_reuse() {
        let mut tree = sample();
        tree.clear();
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert_eq!(tree.height(), 0);
        tree.insert(3).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.lookup(&3), Some(&3));
    }

    #[test]
    fn export_dot_creates_directories() {
        let dir = std::env::temp_dir().join(format!("balanced_tree_dot_{}", std::process::id()));
        let path = dir.join("nested").join("tree.dot");
        let tree = sample();

        tree.export_dot(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, tree.to_dot());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn debug_lists_nodes_in_order() {
        let tree = sample();
        let out = format!("{tree:?}");
        assert!(out.starts_with("BinarySearchTree { len: 5"), "{out}");
        let pos: Vec<_> = ["value: 9", "value: 12", "value: 14", "value: 15", "value: 16"]
            .iter()
            .map(|needle| out.rfind(needle).unwrap())
            .collect();
        assert!(pos.windows(2).all(|w| w[0] < w[1]), "{out}");
    }
}
