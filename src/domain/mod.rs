//! Domain layer: the node tree and its models
//!
//! This layer is independent of any view technology (no I/O, no rendering);
//! it emits notifications and enforces structural invariants.

pub mod display;
pub mod error;
pub mod model;
pub mod node;
pub mod value;

pub use display::DisplayTree;
pub use error::{DomainError, TreeResult};
pub use model::{properties, Model, ModelEvent, ModelListener};
pub use node::{Descendants, Node, NodeEvent, NodeListener};
pub use value::Value;
