//! ASCII rendering of a node hierarchy.

use termtree::Tree;

use crate::domain::model::properties;
use crate::domain::node::Node;

/// Renders a subtree as a [`termtree`] hierarchy.
pub trait DisplayTree {
    fn to_display_tree(&self) -> Tree<String>;
}

impl DisplayTree for Node {
    fn to_display_tree(&self) -> Tree<String> {
        // Label by the model's name when one is attached, falling back to
        // the node's own name.
        let label = self
            .model()
            .and_then(|m| m.property(properties::NAME))
            .map(|v| v.to_string())
            .unwrap_or_else(|| self.name());

        let leaves: Vec<_> = self
            .children()
            .iter()
            .map(|child| child.to_display_tree())
            .collect();

        Tree::new(label).with_leaves(leaves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Model;

    // sheet
    // ├── group
    // │   └── sprite1
    // └── sprite2
    #[test]
    fn test_display_tree_renders_hierarchy() {
        let sheet = Node::new("sheet");
        let group = Node::new("group");
        let sprite1 = Node::new("sprite1");
        let sprite2 = Node::new("sprite2");

        group.add_child(&sprite1).unwrap();
        sheet.add_child(&group).unwrap();
        sheet.add_child(&sprite2).unwrap();

        let rendered = sheet.to_display_tree().to_string();
        assert!(rendered.starts_with("sheet"));
        assert!(rendered.contains("├── group"));
        assert!(rendered.contains("│   └── sprite1"));
        assert!(rendered.contains("└── sprite2"));
    }

    #[test]
    fn test_display_tree_prefers_model_name() {
        let node = Node::new("node-7");
        let model = Model::new();
        model.set_property(properties::NAME, "walk_cycle");
        node.set_model(Some(model));

        let rendered = node.to_display_tree().to_string();
        assert!(rendered.starts_with("walk_cycle"));
    }
}
