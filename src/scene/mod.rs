//! # Scene Module
//!
//! Scene graph implementation with hierarchical transformations.
//! Entities own their children exclusively and cache their world
//! matrix behind a dirty flag; world matrices are only recomputed
//! when an update or draw is driven through the tree.

mod entity;
mod scene;
mod transform;

pub use entity::{draw_subtree, Entity};
pub use scene::Scene;
pub use transform::Transform;
