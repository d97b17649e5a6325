//! Consumer boundary: what the watcher needs from a view and what views
//! hand back to it.

use crate::domain::node::Node;

/// Receives the watcher's sole output signal.
///
/// Refresh is fire-and-forget: the watcher never waits for re-rendering and
/// never accepts refresh requests from elsewhere.
pub trait View {
    fn refresh(&self);
}

/// An element as a view tracks it.
///
/// Views can hold entries that are not part of the node tree (placeholders,
/// stale handles). Those are [`Element::Absent`], and every pull accessor
/// degrades to an empty or absent result for them instead of failing.
#[derive(Debug, Clone, Default)]
pub enum Element {
    Node(Node),
    #[default]
    Absent,
}

impl Element {
    /// The node behind this element, if it is one.
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Element::Node(node) => Some(node),
            Element::Absent => None,
        }
    }
}

impl From<Node> for Element {
    fn from(node: Node) -> Self {
        Element::Node(node)
    }
}

impl From<Option<Node>> for Element {
    fn from(node: Option<Node>) -> Self {
        node.map(Element::Node).unwrap_or(Element::Absent)
    }
}
