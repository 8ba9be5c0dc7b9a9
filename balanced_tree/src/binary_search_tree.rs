use crate::tree::{sealed, Policy, Tree};

/// Never rebalances. Shape depends entirely on insertion order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbalanced;

impl sealed::Sealed for Unbalanced {}

impl Policy for Unbalanced {
    type Meta = ();
    const NAME: &'static str = "BinarySearchTree";
}

pub type BinarySearchTree<T> = Tree<T, Unbalanced>;
