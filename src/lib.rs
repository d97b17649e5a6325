//! treewatch: keep an external view consistent with a mutable node tree.
//!
//! A [`Node`] tree carries optional [`Model`] property bags; both notify
//! their subscribers of mutations. The [`TreeWatcher`] binds a [`View`] to a
//! root node, recursively subscribes to every reachable node and attached
//! model, and collapses any received notification into a single refresh
//! signal. Subscriptions follow tree membership: subtrees are subscribed
//! when they are attached and unsubscribed when they are pruned, so
//! notionally-detached instances can never signal a stale view.
//!
//! ```
//! # use treewatch::TreeResult;
//! # fn main() -> TreeResult<()> {
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use treewatch::{Element, Model, Node, TreeWatcher, View};
//!
//! struct CountingView(Cell<usize>);
//! impl View for CountingView {
//!     fn refresh(&self) {
//!         self.0.set(self.0.get() + 1);
//!     }
//! }
//!
//! let sheet = Node::new("sheet");
//! let sprite = Node::new("sprite");
//! let model = Model::new();
//! model.set_property("name", "player");
//! sprite.set_model(Some(model));
//!
//! let watcher = TreeWatcher::new();
//! let view = Rc::new(CountingView(Cell::new(0)));
//! watcher.bind(view.clone(), Element::Node(sheet.clone()));
//!
//! sheet.add_child(&sprite)?;
//! assert_eq!(view.0.get(), 1); // structural change
//!
//! sprite.model().unwrap().set_property("name", "enemy");
//! assert_eq!(view.0.get(), 2); // property change on a subscribed model
//!
//! assert_eq!(
//!     watcher.display_text(&Element::Node(sprite.clone())),
//!     Some("enemy".to_string())
//! );
//! # Ok(())
//! # }
//! ```

pub mod domain;
pub mod observer;
pub mod util;

pub use domain::{
    properties, Descendants, DisplayTree, DomainError, Model, ModelEvent, ModelListener, Node,
    NodeEvent, NodeListener, TreeResult, Value,
};
pub use observer::{Element, TreeWatcher, View};
