//! Tree element with parent/children structure and an optional attached model.
//!
//! Nodes are created detached, attached via [`Node::add_child`], and may
//! later be detached again and discarded or re-attached elsewhere. A node
//! exclusively owns its children; the parent link is a weak back-reference.
//! The attached model's lifetime is not owned, only associated.
//!
//! Every structural mutation emits exactly one structural event to the
//! node's subscribers, after the mutation is visible and with no interior
//! borrow held, so listeners are free to walk the tree from their callback.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::instrument;

use crate::domain::error::{DomainError, TreeResult};
use crate::domain::model::Model;

/// Notification emitted by a node to its subscribers.
#[derive(Debug, Clone)]
pub enum NodeEvent {
    NameChanged {
        old: String,
        new: String,
    },
    ParentChanged {
        old: Option<Node>,
        new: Option<Node>,
    },
    ChildAdded(Node),
    ChildRemoved(Node),
    /// Bulk removal. Carries the removed children so subscribers can walk
    /// each detached subtree.
    ChildrenRemoved(Vec<Node>),
    ModelChanged {
        old: Option<Model>,
        new: Option<Model>,
    },
}

/// Receives node notifications.
pub trait NodeListener {
    fn node_changed(&self, source: &Node, event: &NodeEvent);
}

struct NodeInner {
    name: String,
    parent: Weak<RefCell<NodeInner>>,
    children: Vec<Node>,
    model: Option<Model>,
    listeners: Vec<Weak<dyn NodeListener>>,
}

/// Handle to a shared tree node. Clones refer to the same node; identity is
/// pointer identity.
#[derive(Clone)]
pub struct Node {
    inner: Rc<RefCell<NodeInner>>,
}

impl Node {
    /// Create a detached node: no parent, no children, no model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(NodeInner {
                name: name.into(),
                parent: Weak::new(),
                children: Vec::new(),
                model: None,
                listeners: Vec::new(),
            })),
        }
    }

    /// Do the two handles refer to the same node?
    pub fn ptr_eq(a: &Node, b: &Node) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        let new = name.into();
        let old = {
            let mut inner = self.inner.borrow_mut();
            std::mem::replace(&mut inner.name, new.clone())
        };
        self.emit(&NodeEvent::NameChanged { old, new });
    }

    pub fn parent(&self) -> Option<Node> {
        self.inner.borrow().parent.upgrade().map(|inner| Node { inner })
    }

    /// Snapshot of the ordered child sequence.
    pub fn children(&self) -> Vec<Node> {
        self.inner.borrow().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.inner.borrow().children.len()
    }

    /// Branch/leaf classification: a node with children is a branch.
    pub fn is_branch(&self) -> bool {
        !self.inner.borrow().children.is_empty()
    }

    pub fn model(&self) -> Option<Model> {
        self.inner.borrow().model.clone()
    }

    /// (Re)assign the attached model. Emits `ModelChanged` with the previous
    /// and the new association.
    pub fn set_model(&self, model: Option<Model>) {
        let old = {
            let mut inner = self.inner.borrow_mut();
            std::mem::replace(&mut inner.model, model.clone())
        };
        self.emit(&NodeEvent::ModelChanged { old, new: model });
    }

    /// Attach a detached node (possibly the root of a pre-built subtree) as
    /// the last child.
    ///
    /// Fails with [`DomainError::ChildCycle`] when the child is this node or
    /// one of its ancestors, and with [`DomainError::AlreadyAttached`] when
    /// the child already has a parent; re-attachment is expressed as
    /// `remove_child` followed by `add_child`.
    #[instrument(level = "trace", skip_all, fields(parent = %self.name(), child = %child.name()))]
    pub fn add_child(&self, child: &Node) -> TreeResult<()> {
        if self.is_or_descends_from(child) {
            return Err(DomainError::ChildCycle { node: child.name() });
        }
        if let Some(parent) = child.parent() {
            return Err(DomainError::AlreadyAttached {
                child: child.name(),
                parent: parent.name(),
            });
        }

        child.inner.borrow_mut().parent = Rc::downgrade(&self.inner);
        self.inner.borrow_mut().children.push(child.clone());

        // The child is notified first, while nothing beyond its own
        // subscribers can hear it; the parent-side event is the one
        // observers of the tree react to.
        child.emit(&NodeEvent::ParentChanged {
            old: None,
            new: Some(self.clone()),
        });
        self.emit(&NodeEvent::ChildAdded(child.clone()));
        Ok(())
    }

    /// Detach a child. The child's own children sequence stays intact
    /// across detachment, so subscribers can walk the removed subtree from
    /// the `ChildRemoved` event.
    #[instrument(level = "trace", skip_all, fields(parent = %self.name(), child = %child.name()))]
    pub fn remove_child(&self, child: &Node) -> TreeResult<()> {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            match inner.children.iter().position(|c| Node::ptr_eq(c, child)) {
                Some(pos) => {
                    inner.children.remove(pos);
                    true
                }
                None => false,
            }
        };
        if !removed {
            return Err(DomainError::NotAChild {
                child: child.name(),
                parent: self.name(),
            });
        }

        child.inner.borrow_mut().parent = Weak::new();

        self.emit(&NodeEvent::ChildRemoved(child.clone()));
        child.emit(&NodeEvent::ParentChanged {
            old: Some(self.clone()),
            new: None,
        });
        Ok(())
    }

    /// Detach every child in one mutation. Emits a single
    /// `ChildrenRemoved` carrying the removed children, then a
    /// `ParentChanged` per child. Does nothing on a leaf.
    #[instrument(level = "trace", skip_all, fields(parent = %self.name()))]
    pub fn remove_all_children(&self) {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            std::mem::take(&mut inner.children)
        };
        if removed.is_empty() {
            return;
        }
        for child in &removed {
            child.inner.borrow_mut().parent = Weak::new();
        }

        self.emit(&NodeEvent::ChildrenRemoved(removed.clone()));
        for child in &removed {
            child.emit(&NodeEvent::ParentChanged {
                old: Some(self.clone()),
                new: None,
            });
        }
    }

    /// Register a subscriber. Registering the same listener twice is a
    /// no-op, so repeated subscription never produces duplicate
    /// notifications.
    pub fn add_listener(&self, listener: &Rc<dyn NodeListener>) {
        let mut inner = self.inner.borrow_mut();
        let registered = inner
            .listeners
            .iter()
            .any(|w| w.upgrade().is_some_and(|l| Rc::ptr_eq(&l, listener)));
        if !registered {
            inner.listeners.push(Rc::downgrade(listener));
        }
    }

    /// Unregister a subscriber. Removing an unregistered listener is a
    /// no-op. Dead registrations are pruned on the way.
    pub fn remove_listener(&self, listener: &Rc<dyn NodeListener>) {
        self.inner
            .borrow_mut()
            .listeners
            .retain(|w| w.upgrade().is_some_and(|l| !Rc::ptr_eq(&l, listener)));
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.inner
            .borrow()
            .listeners
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Pre-order traversal over the subtree rooted at this node.
    pub fn iter(&self) -> Descendants {
        Descendants {
            stack: vec![self.clone()],
        }
    }

    /// Height of the subtree: 1 for a leaf.
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(Node::depth)
            .max()
            .unwrap_or(0)
    }

    /// All leaves of the subtree, in pre-order.
    pub fn leaf_nodes(&self) -> Vec<Node> {
        self.iter().filter(|n| !n.is_branch()).collect()
    }

    fn is_or_descends_from(&self, other: &Node) -> bool {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if Node::ptr_eq(&node, other) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    fn emit(&self, event: &NodeEvent) {
        // Snapshot under the borrow, deliver outside it: listeners walk the
        // tree and mutate listener registries from their callbacks.
        let listeners: Vec<_> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for listener in listeners {
            listener.node_changed(self, event);
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Node")
            .field("name", &inner.name)
            .field("children", &inner.children.len())
            .field("model", &inner.model.is_some())
            .finish()
    }
}

/// Pre-order iterator over a subtree. Children are pushed in reverse order
/// for left-to-right traversal.
pub struct Descendants {
    stack: Vec<Node>,
}

impl Iterator for Descendants {
    type Item = Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        for child in node.children().into_iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}
