use core::fmt;

use log::debug;

use crate::error::TreeError;
use crate::node::{Color, Meta, NodeId, Side};
use crate::tree::{sealed, Hole, Policy, Tree};

impl Meta for Color {
    fn leaf() -> Self {
        Color::Red
    }

    fn color(&self) -> Option<Color> {
        Some(*self)
    }
}

/// Red-black balancing.
///
/// Invariants checked by [`Tree::check_invariants`]:
///  * the root is black
///  * a red node has no red child
///  * every path from a node down to an empty child passes the same number
///    of black nodes
///
/// Empty children count as black.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedBlack;

impl sealed::Sealed for RedBlack {}

impl Policy for RedBlack {
    type Meta = Color;
    const NAME: &'static str = "RedBlackTree";

    fn after_insert<T: Ord + fmt::Debug>(
        tree: &mut Tree<T, Self>,
        node: NodeId,
    ) -> Result<(), TreeError> {
        insert_fixup(tree, node)
    }

    fn after_delete<T: Ord + fmt::Debug>(
        tree: &mut Tree<T, Self>,
        hole: Hole<Color>,
    ) -> Result<(), TreeError> {
        // Removing a red node never changes a black height.
        if hole.removed.is_black() {
            delete_fixup(tree, hole)?;
        }

        Ok(())
    }

    fn verify<T: Ord + fmt::Debug>(tree: &Tree<T, Self>) -> Result<(), TreeError> {
        let Some(root) = tree.root_id() else {
            return Ok(());
        };
        if tree.meta(root).is_red() {
            return Err(tree.violation(root, "root is red"));
        }

        let mut expected = None;
        for node in tree.inorder_ids() {
            let left = tree.child(node, Side::Left);
            let right = tree.child(node, Side::Right);

            if tree.meta(node).is_red()
                && (color_of(tree, left).is_red() || color_of(tree, right).is_red())
            {
                return Err(tree.violation(node, "red node has a red child"));
            }

            if left.is_none() || right.is_none() {
                // end of a path, count the black nodes back up to the root
                let mut black_count = 0;
                let mut cur = Some(node);
                while let Some(n) = cur {
                    if tree.meta(n).is_black() {
                        black_count += 1;
                    }
                    cur = tree.parent(n);
                }

                match expected {
                    None => expected = Some(black_count),
                    Some(e) if e != black_count => {
                        return Err(tree.violation(
                            node,
                            format!("black height {black_count}, other paths have {e}"),
                        ));
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(())
    }
}

pub type RedBlackTree<T> = Tree<T, RedBlack>;

/// Color of an optional node. Empty children are black.
#[inline]
fn color_of<T>(tree: &Tree<T, RedBlack>, node: Option<NodeId>) -> Color {
    tree.meta_of(node).unwrap_or(Color::Black)
}

#[inline]
fn set_color<T>(tree: &mut Tree<T, RedBlack>, node: NodeId, color: Color) {
    *tree.meta_mut(node) = color;
}

fn insert_fixup<T>(tree: &mut Tree<T, RedBlack>, new_node: NodeId) -> Result<(), TreeError>
where
    T: Ord + fmt::Debug,
{
    let mut node = new_node;
    while let Some((mut parent, _)) = tree.link_of(node) {
        if tree.meta(parent).is_black() {
            break;
        }

        // A red parent is not the root, unless the root was left red.
        let Some((grand_parent, side)) = tree.link_of(parent) else {
            break;
        };

        let uncle = tree.child(grand_parent, !side);
        if color_of(tree, uncle).is_red() {
            debug!("RedBlackTree: red uncle, recolor at {grand_parent:?}");
            set_color(tree, parent, Color::Black);
            if let Some(uncle) = uncle {
                set_color(tree, uncle, Color::Black);
            }
            set_color(tree, grand_parent, Color::Red);
            node = grand_parent;
            continue;
        }

        if tree.child(parent, !side) == Some(node) {
            // inner grandchild, make it an outer one
            debug!("RedBlackTree: inner child, rotate {side:?} at {parent:?}");
            tree.try_rotate(parent, side)?;
            node = parent;
            parent = tree
                .parent(node)
                .ok_or_else(|| tree.violation(node, "rotated node lost its parent"))?;
        }

        debug!("RedBlackTree: outer child, rotate {:?} at {grand_parent:?}", !side);
        set_color(tree, parent, Color::Black);
        set_color(tree, grand_parent, Color::Red);
        tree.try_rotate(grand_parent, !side)?;
        break;
    }

    if let Some(root) = tree.root_id() {
        set_color(tree, root, Color::Black);
    }

    Ok(())
}

/// Restores the black heights after a black node was removed from
/// `hole`. The subtree in the hole is one black short, "doubly black".
///
/// The occupant may be empty, the position is then tracked by its parent
/// and side alone.
fn delete_fixup<T>(tree: &mut Tree<T, RedBlack>, hole: Hole<Color>) -> Result<(), TreeError>
where
    T: Ord + fmt::Debug,
{
    let mut x = hole.occupant;
    let mut link = hole.link;

    while let Some((parent, side)) = link {
        if color_of(tree, x).is_red() {
            break;
        }

        let mut sibling = sibling_of(tree, parent, side)?;
        if tree.meta(sibling).is_red() {
            // case 1: red sibling, rotate it up to get a black one
            debug!("RedBlackTree: red sibling {sibling:?}");
            set_color(tree, sibling, Color::Black);
            set_color(tree, parent, Color::Red);
            tree.try_rotate(parent, side)?;
            sibling = sibling_of(tree, parent, side)?;
        }

        let near = tree.child(sibling, side);
        let mut far = tree.child(sibling, !side);
        if color_of(tree, near).is_black() && color_of(tree, far).is_black() {
            // case 2: push the missing black up to the parent
            debug!("RedBlackTree: black nephews, move up to {parent:?}");
            set_color(tree, sibling, Color::Red);
            x = Some(parent);
            link = tree.link_of(parent);
            continue;
        }

        if color_of(tree, far).is_black() {
            // case 3: red near nephew, turn it into a red far nephew
            debug!("RedBlackTree: red near nephew {near:?}");
            if let Some(near) = near {
                set_color(tree, near, Color::Black);
            }
            set_color(tree, sibling, Color::Red);
            tree.try_rotate(sibling, !side)?;
            sibling = sibling_of(tree, parent, side)?;
            far = tree.child(sibling, !side);
        }

        // case 4: red far nephew, one rotation finishes
        debug!("RedBlackTree: red far nephew, rotate {side:?} at {parent:?}");
        let far = far.ok_or_else(|| tree.violation(sibling, "missing far nephew"))?;
        let parent_color = tree.meta(parent);
        set_color(tree, sibling, parent_color);
        set_color(tree, parent, Color::Black);
        set_color(tree, far, Color::Black);
        tree.try_rotate(parent, side)?;
        x = tree.root_id();
        link = None;
    }

    if let Some(x) = x {
        set_color(tree, x, Color::Black);
    }

    Ok(())
}

fn sibling_of<T>(tree: &Tree<T, RedBlack>, parent: NodeId, side: Side) -> Result<NodeId, TreeError>
where
    T: Ord + fmt::Debug,
{
    tree.child(parent, !side)
        .ok_or_else(|| tree.violation(parent, "doubly black node has no sibling"))
}
