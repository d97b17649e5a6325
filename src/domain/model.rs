//! Mutable property bag attachable to a node.
//!
//! A model lives independently of any node: it is created on its own,
//! associated with at most one node at a time, and notifies its own
//! subscribers when a property is written.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::domain::value::Value;

/// Well-known property keys.
pub mod properties {
    /// Display name of the element carrying the model.
    pub const NAME: &str = "name";
}

/// Notification emitted by a model to its subscribers.
#[derive(Debug, Clone)]
pub enum ModelEvent {
    /// A property was written. Carries the previous and the new value.
    PropertyChanged {
        key: String,
        old: Option<Value>,
        new: Value,
    },
}

/// Receives model notifications.
pub trait ModelListener {
    fn model_changed(&self, source: &Model, event: &ModelEvent);
}

#[derive(Default)]
struct ModelInner {
    properties: BTreeMap<String, Value>,
    listeners: Vec<Weak<dyn ModelListener>>,
}

/// Handle to a shared model instance. Clones refer to the same property bag;
/// identity is pointer identity.
#[derive(Clone, Default)]
pub struct Model {
    inner: Rc<RefCell<ModelInner>>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Do the two handles refer to the same instance?
    pub fn ptr_eq(a: &Model, b: &Model) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    pub fn property(&self, key: &str) -> Option<Value> {
        self.inner.borrow().properties.get(key).cloned()
    }

    /// Write a property.
    ///
    /// Every write notifies all current subscribers exactly once, after the
    /// new value is visible to readers. Writes that store the value already
    /// present still notify.
    pub fn set_property(&self, key: &str, value: impl Into<Value>) {
        let new = value.into();
        let old = {
            let mut inner = self.inner.borrow_mut();
            inner.properties.insert(key.to_string(), new.clone())
        };
        trace!(key, "property written");
        self.emit(&ModelEvent::PropertyChanged {
            key: key.to_string(),
            old,
            new,
        });
    }

    /// Register a subscriber. Registering the same listener twice is a
    /// no-op, so repeated subscription never produces duplicate
    /// notifications.
    pub fn add_listener(&self, listener: &Rc<dyn ModelListener>) {
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
    pub fn remove_listener(&self, listener: &Rc<dyn ModelListener>) {
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

    fn emit(&self, event: &ModelEvent) {
        // Snapshot under the borrow, deliver outside it: listeners may
        // re-enter the read API.
        let listeners: Vec<_> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for listener in listeners {
            listener.model_changed(self, event);
        }
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Model")
            .field("properties", &inner.properties)
            .finish()
    }
}
