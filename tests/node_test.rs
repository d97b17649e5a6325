//! Tests for the node tree structure and its notifications

use std::cell::RefCell;
use std::rc::Rc;

use treewatch::{DomainError, Model, Node, NodeEvent, NodeListener};

/// Records a short tag per received event.
#[derive(Default)]
struct Recorder {
    events: RefCell<Vec<String>>,
}

impl Recorder {
    fn tags(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}

impl NodeListener for Recorder {
    fn node_changed(&self, _source: &Node, event: &NodeEvent) {
        let tag = match event {
            NodeEvent::NameChanged { .. } => "name".to_string(),
            NodeEvent::ParentChanged { .. } => "parent".to_string(),
            NodeEvent::ChildAdded(child) => format!("added:{}", child.name()),
            NodeEvent::ChildRemoved(child) => format!("removed:{}", child.name()),
            NodeEvent::ChildrenRemoved(children) => format!("cleared:{}", children.len()),
            NodeEvent::ModelChanged { .. } => "model".to_string(),
        };
        self.events.borrow_mut().push(tag);
    }
}

fn recorder_on(node: &Node) -> Rc<Recorder> {
    let recorder = Rc::new(Recorder::default());
    let listener: Rc<dyn NodeListener> = recorder.clone();
    node.add_listener(&listener);
    recorder
}

// ============================================================
// Structure Tests
// ============================================================

#[test]
fn given_new_node_when_inspecting_then_it_is_fully_detached() {
    let node = Node::new("sprite");

    assert_eq!(node.name(), "sprite");
    assert!(node.parent().is_none());
    assert!(node.children().is_empty());
    assert!(node.model().is_none());
    assert!(!node.is_branch());
}

#[test]
fn given_parent_when_adding_children_then_sequence_is_ordered() {
    let root = Node::new("root");
    let first = Node::new("first");
    let second = Node::new("second");

    root.add_child(&first).unwrap();
    root.add_child(&second).unwrap();

    let children = root.children();
    assert_eq!(root.child_count(), 2);
    assert_eq!(children[0].name(), "first");
    assert_eq!(children[1].name(), "second");
    assert!(Node::ptr_eq(&first.parent().unwrap(), &root));
    assert!(root.is_branch());
    assert!(!first.is_branch());
}

#[test]
fn given_node_when_adding_itself_then_reports_cycle() {
    let node = Node::new("loop");

    let result = node.add_child(&node);

    assert!(matches!(result, Err(DomainError::ChildCycle { .. })));
    assert!(node.children().is_empty());
}

#[test]
fn given_descendant_when_adding_its_ancestor_then_reports_cycle() {
    let root = Node::new("root");
    let child = Node::new("child");
    let grandchild = Node::new("grandchild");
    root.add_child(&child).unwrap();
    child.add_child(&grandchild).unwrap();

    let result = grandchild.add_child(&root);

    assert!(matches!(result, Err(DomainError::ChildCycle { .. })));
    assert!(root.parent().is_none());
}

#[test]
fn given_attached_child_when_adding_to_second_parent_then_refuses() {
    let first_parent = Node::new("first");
    let second_parent = Node::new("second");
    let child = Node::new("child");
    first_parent.add_child(&child).unwrap();

    let result = second_parent.add_child(&child);

    assert!(matches!(result, Err(DomainError::AlreadyAttached { .. })));
    assert!(Node::ptr_eq(&child.parent().unwrap(), &first_parent));
    assert!(second_parent.children().is_empty());
}

#[test]
fn given_parent_when_removing_child_then_subtree_stays_intact() {
    let root = Node::new("root");
    let child = Node::new("child");
    let grandchild = Node::new("grandchild");
    root.add_child(&child).unwrap();
    child.add_child(&grandchild).unwrap();

    root.remove_child(&child).unwrap();

    assert!(child.parent().is_none());
    assert!(root.children().is_empty());
    // Detachment severs the parent link only; the removed subtree keeps its
    // own shape and can be re-attached elsewhere.
    assert_eq!(child.children().len(), 1);
    assert!(Node::ptr_eq(&child.children()[0], &grandchild));
}

#[test]
fn given_detached_subtree_when_reattaching_then_it_joins_the_new_parent() {
    let old_parent = Node::new("old");
    let new_parent = Node::new("new");
    let child = Node::new("child");
    old_parent.add_child(&child).unwrap();

    old_parent.remove_child(&child).unwrap();
    new_parent.add_child(&child).unwrap();

    assert!(Node::ptr_eq(&child.parent().unwrap(), &new_parent));
    assert!(old_parent.children().is_empty());
}

#[test]
fn given_stranger_when_removing_then_reports_not_a_child() {
    let root = Node::new("root");
    let stranger = Node::new("stranger");

    let result = root.remove_child(&stranger);

    assert!(matches!(result, Err(DomainError::NotAChild { .. })));
}

#[test]
fn given_parent_when_removing_all_children_then_every_child_is_detached() {
    let root = Node::new("root");
    let first = Node::new("first");
    let second = Node::new("second");
    root.add_child(&first).unwrap();
    root.add_child(&second).unwrap();

    root.remove_all_children();

    assert!(root.children().is_empty());
    assert!(first.parent().is_none());
    assert!(second.parent().is_none());
}

// ============================================================
// Traversal Tests
// ============================================================

// root
// ├── a
// │   └── c
// └── b
#[test]
fn given_subtree_when_iterating_then_preorder_left_to_right() {
    let root = Node::new("root");
    let a = Node::new("a");
    let b = Node::new("b");
    let c = Node::new("c");
    root.add_child(&a).unwrap();
    root.add_child(&b).unwrap();
    a.add_child(&c).unwrap();

    let names: Vec<String> = root.iter().map(|n| n.name()).collect();

    assert_eq!(names, vec!["root", "a", "c", "b"]);
}

#[test]
fn given_tree_when_measuring_depth_then_counts_levels() {
    let root = Node::new("root");
    let child = Node::new("child");
    let grandchild = Node::new("grandchild");

    assert_eq!(root.depth(), 1);

    root.add_child(&child).unwrap();
    child.add_child(&grandchild).unwrap();

    assert_eq!(root.depth(), 3);
}

#[test]
fn given_tree_when_collecting_leaves_then_branches_are_excluded() {
    let root = Node::new("root");
    let branch = Node::new("branch");
    let leaf1 = Node::new("leaf1");
    let leaf2 = Node::new("leaf2");
    root.add_child(&branch).unwrap();
    branch.add_child(&leaf1).unwrap();
    root.add_child(&leaf2).unwrap();

    let leaves: Vec<String> = root.leaf_nodes().iter().map(|n| n.name()).collect();

    assert_eq!(leaves, vec!["leaf1", "leaf2"]);
}

// ============================================================
// Notification Tests
// ============================================================

#[test]
fn given_listener_when_adding_child_then_emits_single_child_added() {
    let root = Node::new("root");
    let recorder = recorder_on(&root);

    root.add_child(&Node::new("child")).unwrap();

    assert_eq!(recorder.tags(), vec!["added:child"]);
}

#[test]
fn given_listener_when_removing_child_then_emits_single_child_removed() {
    let root = Node::new("root");
    let child = Node::new("child");
    root.add_child(&child).unwrap();
    let recorder = recorder_on(&root);

    root.remove_child(&child).unwrap();

    assert_eq!(recorder.tags(), vec!["removed:child"]);
}

#[test]
fn given_listener_when_clearing_children_then_event_carries_removed_set() {
    let root = Node::new("root");
    root.add_child(&Node::new("first")).unwrap();
    root.add_child(&Node::new("second")).unwrap();
    let recorder = recorder_on(&root);

    root.remove_all_children();

    assert_eq!(recorder.tags(), vec!["cleared:2"]);
}

#[test]
fn given_leaf_when_clearing_children_then_no_event() {
    let leaf = Node::new("leaf");
    let recorder = recorder_on(&leaf);

    leaf.remove_all_children();

    assert!(recorder.tags().is_empty());
}

#[test]
fn given_listener_when_renaming_then_emits_name_changed() {
    let node = Node::new("before");
    let recorder = recorder_on(&node);

    node.set_name("after");

    assert_eq!(node.name(), "after");
    assert_eq!(recorder.tags(), vec!["name"]);
}

#[test]
fn given_listener_when_reassigning_model_then_emits_model_changed() {
    let node = Node::new("node");
    node.set_model(Some(Model::new()));
    let recorder = recorder_on(&node);

    node.set_model(Some(Model::new()));
    node.set_model(None);

    assert_eq!(recorder.tags(), vec!["model", "model"]);
    assert!(node.model().is_none());
}

#[test]
fn given_listener_registered_twice_then_notified_once() {
    let root = Node::new("root");
    let recorder = Rc::new(Recorder::default());
    let listener: Rc<dyn NodeListener> = recorder.clone();
    root.add_listener(&listener);
    root.add_listener(&listener);

    assert_eq!(root.listener_count(), 1);

    root.add_child(&Node::new("child")).unwrap();

    assert_eq!(recorder.tags().len(), 1);
}

#[test]
fn given_removed_listener_when_mutating_then_silence() {
    let root = Node::new("root");
    let recorder = Rc::new(Recorder::default());
    let listener: Rc<dyn NodeListener> = recorder.clone();
    root.add_listener(&listener);
    root.remove_listener(&listener);

    root.add_child(&Node::new("child")).unwrap();

    assert!(recorder.tags().is_empty());
    assert_eq!(root.listener_count(), 0);
}

#[test]
fn given_dropped_listener_when_mutating_then_registration_expires() {
    let root = Node::new("root");
    {
        let recorder = Rc::new(Recorder::default());
        let listener: Rc<dyn NodeListener> = recorder.clone();
        root.add_listener(&listener);
    }

    assert_eq!(root.listener_count(), 0);
    root.add_child(&Node::new("child")).unwrap();
}
