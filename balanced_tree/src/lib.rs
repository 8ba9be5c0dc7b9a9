//! Ordered sets of unique values backed by binary search trees.
//!
//! [`BinarySearchTree`], [`AvlTree`] and [`RedBlackTree`] are the same
//! [`Tree`] engine with a different [`Policy`]. The engine owns insertion,
//! lookup, deletion and rotations. A policy only decides how to rebalance
//! once the engine has changed the structure.
//!
//! ```
//! use balanced_tree::{AvlTree, TreeError};
//!
//! let mut tree = AvlTree::new();
//! for v in [10, 20, 30] {
//!     tree.insert(v)?;
//! }
//! assert_eq!(tree.root().map(|r| *r.value()), Some(20));
//! assert!(matches!(tree.insert(20), Err(TreeError::DuplicateKey(_))));
//! assert_eq!(tree.delete(&10)?, 10);
//! # Ok::<(), TreeError>(())
//! ```

#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod avl_tree;
pub mod binary_search_tree;
pub mod error;
pub mod node;
pub mod red_black_tree;
pub mod render;
pub mod tree;

pub use avl_tree::{Avl, AvlTree, Height};
pub use binary_search_tree::{BinarySearchTree, Unbalanced};
pub use error::TreeError;
pub use node::{Color, Meta, NodeId, NodeRef, Side};
pub use red_black_tree::{RedBlack, RedBlackTree};
pub use tree::{Hole, Policy, Tree};
