//! The tree watcher: keeps a view consistent with a mutable node tree.
//!
//! The watcher binds to a root node, subscribes to the root, every
//! descendant, and every attached model, and collapses any received
//! notification into a single refresh signal pushed to the view. As the
//! tree's shape changes, subscriptions follow tree membership: whatever
//! becomes reachable from the bound root is subscribed, whatever leaves the
//! tree is unsubscribed. At any point the subscription set equals exactly
//! the set of nodes reachable from the bound root plus their attached
//! models.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, instrument};

use crate::domain::model::{properties, Model, ModelEvent, ModelListener};
use crate::domain::node::{Node, NodeEvent, NodeListener};
use crate::observer::view::{Element, View};

/// The current binding, replaced atomically on rebind.
struct Binding {
    view: Rc<dyn View>,
    root: Option<Node>,
}

/// Listener half of the watcher.
///
/// Lives behind its own `Rc` so it can register itself in node and model
/// listener registries; the registries hold it weakly, the watcher keeps it
/// alive. Beyond the binding it holds no mutable state.
struct Relay {
    binding: RefCell<Option<Binding>>,
    self_ref: Weak<Relay>,
}

impl Relay {
    fn node_listener(relay: &Rc<Relay>) -> Rc<dyn NodeListener> {
        relay.clone()
    }

    fn model_listener(relay: &Rc<Relay>) -> Rc<dyn ModelListener> {
        relay.clone()
    }

    /// Subscribe to `node`, to its model if present, then recursively to
    /// every current child.
    ///
    /// Applied to whole subtrees in one call: children arrive in bulk when a
    /// pre-built subtree is attached, and a shallow subscribe would silently
    /// miss deeper notifications. Registry addition is identity-guarded, so
    /// repeated application cannot produce duplicate refresh signals.
    #[instrument(level = "trace", skip_all, fields(node = %node.name()))]
    fn listen(relay: &Rc<Relay>, node: &Node) {
        node.add_listener(&Relay::node_listener(relay));

        if let Some(model) = node.model() {
            model.add_listener(&Relay::model_listener(relay));
        }

        // children() is a snapshot taken at call time; the traversal never
        // iterates a sequence that mutates under it.
        for child in node.children() {
            Relay::listen(relay, &child);
        }
    }

    /// Exact mirror of [`Relay::listen`]. Callers must run it while the
    /// subtree's children sequence is still intact, since the traversal
    /// walks the children to find what to unsubscribe.
    #[instrument(level = "trace", skip_all, fields(node = %node.name()))]
    fn ignore(relay: &Rc<Relay>, node: &Node) {
        node.remove_listener(&Relay::node_listener(relay));

        if let Some(model) = node.model() {
            model.remove_listener(&Relay::model_listener(relay));
        }

        for child in node.children() {
            Relay::ignore(relay, &child);
        }
    }

    /// Pure signal to the view, decoupled from subscription bookkeeping.
    fn refresh(&self) {
        let view = self.binding.borrow().as_ref().map(|b| Rc::clone(&b.view));
        if let Some(view) = view {
            view.refresh();
        }
    }
}

impl NodeListener for Relay {
    fn node_changed(&self, _source: &Node, event: &NodeEvent) {
        let Some(relay) = self.self_ref.upgrade() else {
            return;
        };
        match event {
            NodeEvent::NameChanged { .. } => {}
            NodeEvent::ParentChanged { .. } => self.refresh(),
            NodeEvent::ChildAdded(child) => {
                Relay::listen(&relay, child);
                self.refresh();
            }
            NodeEvent::ChildRemoved(child) => {
                Relay::ignore(&relay, child);
                self.refresh();
            }
            NodeEvent::ChildrenRemoved(children) => {
                for child in children {
                    Relay::ignore(&relay, child);
                }
                self.refresh();
            }
            NodeEvent::ModelChanged { old, new } => {
                if let Some(old) = old {
                    old.remove_listener(&Relay::model_listener(&relay));
                }
                if let Some(new) = new {
                    new.add_listener(&Relay::model_listener(&relay));
                }
                self.refresh();
            }
        }
    }
}

impl ModelListener for Relay {
    fn model_changed(&self, _source: &Model, _event: &ModelEvent) {
        // No filtering by key; any property change refreshes the whole
        // bound view.
        self.refresh();
    }
}

/// Keeps a view consistent with the tree below a bound root node.
///
/// Single-threaded and synchronous: every reaction (subscription
/// bookkeeping, refresh signal) completes before the mutating call returns.
pub struct TreeWatcher {
    relay: Rc<Relay>,
}

impl Default for TreeWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeWatcher {
    pub fn new() -> Self {
        let relay = Rc::new_cyclic(|weak| Relay {
            binding: RefCell::new(None),
            self_ref: weak.clone(),
        });
        Self { relay }
    }

    /// Bind a view and an input.
    ///
    /// Releases the previous binding's subscriptions first, then stores the
    /// new binding and, when the input is a node, recursively subscribes to
    /// its subtree. A non-node input leaves the watcher bound to the view
    /// with nothing observed.
    #[instrument(level = "debug", skip_all)]
    pub fn bind(&self, view: Rc<dyn View>, input: Element) {
        self.release_current();

        let root = match input {
            Element::Node(node) => {
                Relay::listen(&self.relay, &node);
                Some(node)
            }
            Element::Absent => None,
        };
        debug!(observing = root.is_some(), "binding replaced");

        *self.relay.binding.borrow_mut() = Some(Binding { view, root });
    }

    /// Drop the current binding, releasing its subscriptions.
    pub fn unbind(&self) {
        self.release_current();
        *self.relay.binding.borrow_mut() = None;
    }

    /// No-op. Subscriptions are tied to tree membership, not to the
    /// watcher's or the view's lifetime; they are released by tree mutation
    /// or [`TreeWatcher::unbind`].
    pub fn dispose(&self) {}

    fn release_current(&self) {
        let old_root = self
            .relay
            .binding
            .borrow()
            .as_ref()
            .and_then(|b| b.root.clone());
        if let Some(root) = old_root {
            Relay::ignore(&self.relay, &root);
        }
    }

    // --- pull side ------------------------------------------------------

    /// Children of an element; empty when the element is not a node.
    pub fn children_of(&self, element: &Element) -> Vec<Node> {
        match element.as_node() {
            Some(node) => node.children(),
            None => Vec::new(),
        }
    }

    /// Parent of an element; absent when the element is not a node or is a
    /// tree root.
    pub fn parent_of(&self, element: &Element) -> Option<Node> {
        element.as_node().and_then(Node::parent)
    }

    /// Whether the element can be expanded. Delegates to the node's own
    /// branch/leaf classification; false for anything that is not a node.
    pub fn is_branch(&self, element: &Element) -> bool {
        element.as_node().map(Node::is_branch).unwrap_or(false)
    }

    /// The view's top-level elements: the input's children, not the input
    /// itself.
    pub fn elements_of(&self, input: &Element) -> Vec<Node> {
        self.children_of(input)
    }

    /// The attached model's name property rendered as text; absent for
    /// model-less nodes and non-node elements. Icon resolution is owned by
    /// the view layer, not by the watcher.
    pub fn display_text(&self, element: &Element) -> Option<String> {
        element
            .as_node()
            .and_then(Node::model)
            .and_then(|model| model.property(properties::NAME))
            .map(|value| value.to_string())
    }
}
