//! Observer layer: the tree watcher and its view boundary

pub mod view;
pub mod watcher;

pub use view::{Element, View};
pub use watcher::TreeWatcher;
