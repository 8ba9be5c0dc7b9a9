use core::fmt;

use log::debug;

use crate::error::TreeError;
use crate::node::{Meta, NodeId, Side};
use crate::tree::{sealed, Hole, Policy, Tree};

/// Stored height of an AVL subtree. A leaf has height 1, an empty child 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Height(u32);

impl Height {
    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

#[inline]
fn height_of(meta: Option<Height>) -> u32 {
    meta.map_or(0, Height::get)
}

impl Meta for Height {
    fn leaf() -> Self {
        Height(1)
    }

    fn refresh(&mut self, left: Option<Self>, right: Option<Self>) {
        self.0 = 1 + height_of(left).max(height_of(right));
    }

    fn height(&self) -> Option<u32> {
        Some(self.0)
    }
}

/// Keeps the heights of sibling subtrees within one of each other.
#[derive(Debug, Clone, Copy, Default)]
pub struct Avl;

impl sealed::Sealed for Avl {}

impl Policy for Avl {
    type Meta = Height;
    const NAME: &'static str = "AvlTree";

    fn after_insert<T: Ord + fmt::Debug>(
        tree: &mut Tree<T, Self>,
        node: NodeId,
    ) -> Result<(), TreeError> {
        let parent = tree.parent(node);
        rebalance(tree, parent)
    }

    fn after_delete<T: Ord + fmt::Debug>(
        tree: &mut Tree<T, Self>,
        hole: Hole<Height>,
    ) -> Result<(), TreeError> {
        rebalance(tree, hole.link.map(|(parent, _)| parent))
    }

    fn verify<T: Ord + fmt::Debug>(tree: &Tree<T, Self>) -> Result<(), TreeError> {
        for node in tree.inorder_ids() {
            let left = height_of(tree.meta_of(tree.child(node, Side::Left)));
            let right = height_of(tree.meta_of(tree.child(node, Side::Right)));
            let stored = tree.meta(node).get();
            if stored != 1 + left.max(right) {
                return Err(tree.violation(
                    node,
                    format!("stored height {stored}, children have {left} and {right}"),
                ));
            }

            let bf = balance_factor(tree, node);
            if !(-1..=1).contains(&bf) {
                return Err(tree.violation(node, format!("balance factor {bf}")));
            }
        }

        Ok(())
    }
}

pub type AvlTree<T> = Tree<T, Avl>;

/// Height of the left subtree minus height of the right one.
fn balance_factor<T>(tree: &Tree<T, Avl>, node: NodeId) -> i64 {
    let height = |side| i64::from(height_of(tree.meta_of(tree.child(node, side))));
    height(Side::Left) - height(Side::Right)
}

/// Walks from `start` up to the root, refreshing heights and rotating
/// wherever a node has become unbalanced.
fn rebalance<T>(tree: &mut Tree<T, Avl>, start: Option<NodeId>) -> Result<(), TreeError>
where
    T: Ord + fmt::Debug,
{
    let mut cur = start;
    while let Some(node) = cur {
        tree.refresh(node);
        let bf = balance_factor(tree, node);
        let top = if bf > 1 {
            restore(tree, node, Side::Left)?
        } else if bf < -1 {
            restore(tree, node, Side::Right)?
        } else {
            node
        };

        cur = tree.parent(top);
    }

    Ok(())
}

/// Rebalances `node` whose `heavy` subtree is two levels taller than the
/// other one. Returns the new root of the subtree.
fn restore<T>(tree: &mut Tree<T, Avl>, node: NodeId, heavy: Side) -> Result<NodeId, TreeError>
where
    T: Ord + fmt::Debug,
{
    let child = tree
        .child(node, heavy)
        .ok_or_else(|| tree.violation(node, format!("{heavy:?} heavy without a {heavy:?} child")))?;

    // A child leaning the other way needs a double rotation. A child with
    // balance 0 only occurs after a delete and takes the single rotation.
    let child_bf = balance_factor(tree, child);
    let inner_heavy = match heavy {
        Side::Left => child_bf < 0,
        Side::Right => child_bf > 0,
    };
    if inner_heavy {
        debug!("AvlTree: {heavy:?}-{:?} case at {node:?}", !heavy);
        tree.try_rotate(child, heavy)?;
    } else {
        debug!("AvlTree: {heavy:?}-{heavy:?} case at {node:?}");
    }
    let top = tree.try_rotate(node, !heavy)?;

    for n in [node, top] {
        let bf = balance_factor(tree, n);
        if !(-1..=1).contains(&bf) {
            return Err(tree.violation(n, format!("balance factor {bf} after rotation")));
        }
    }

    Ok(top)
}
