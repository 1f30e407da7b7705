//! Diagnostic tree dumps of a scene hierarchy.
//!
//! [`dump`] renders the hierarchy as connected text, one node per line:
//!
//! ```text
//! root [Group]
//!   ├─hull [Mesh]
//!   └─arm [Group]
//!     └─claw [Mesh]
//! ```
//!
//! The function is pure: it never mutates the graph, touches no rendering
//! state, and produces identical output for an identical graph.

/// Read-only view of a node for inspection.
///
/// Implemented by [`SceneNode`](crate::SceneNode); applications with their own
/// hierarchy can implement it to reuse [`dump`].
pub trait Inspect {
    /// Display name, if the node has one.
    fn name(&self) -> Option<&str>;

    /// Short type tag, e.g. `"Mesh"`.
    fn type_tag(&self) -> &str;

    /// Children in insertion order.
    fn children(&self) -> Vec<&dyn Inspect>;
}

/// Placeholder printed for unnamed nodes.
const NO_NAME: &str = "*no-name*";

/// Render `node` and everything below it as a textual tree.
///
/// Pre-order depth-first; child order is the node's own order, not sorted.
/// The glyph before each entry marks whether it is the last sibling at its
/// depth, so the lines join up into a connected tree.
pub fn dump(node: &dyn Inspect) -> Vec<String> {
    let mut lines = Vec::new();
    dump_into(node, &mut lines, true, "");
    lines
}

fn dump_into(node: &dyn Inspect, lines: &mut Vec<String>, is_last: bool, prefix: &str) {
    // The root carries no branch glyph; everything below it does.
    let glyph = if prefix.is_empty() {
        ""
    } else if is_last {
        "└─"
    } else {
        "├─"
    };
    lines.push(format!(
        "{}{}{} [{}]",
        prefix,
        glyph,
        node.name().unwrap_or(NO_NAME),
        node.type_tag()
    ));

    let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    let children = node.children();
    let last = children.len().wrapping_sub(1);
    for (i, child) in children.into_iter().enumerate() {
        dump_into(child, lines, i == last, &child_prefix);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{NodeKind, SceneNode};

    fn sample() -> SceneNode {
        // A(root) -> [B, C -> [D]]
        SceneNode::group("A")
            .with_child(SceneNode::new(NodeKind::Mesh).named("B"))
            .with_child(
                SceneNode::group("C").with_child(SceneNode::new(NodeKind::Mesh).named("D")),
            )
    }

    #[test]
    fn shape_and_glyphs() {
        let lines = dump(&sample());
        assert_eq!(
            lines,
            vec![
                "A [Group]",
                "  ├─B [Mesh]",
                "  └─C [Group]",
                "    └─D [Mesh]",
            ]
        );
    }

    #[test]
    fn deterministic_and_restartable() {
        let graph = sample();
        assert_eq!(dump(&graph), dump(&graph));
    }

    #[test]
    fn unnamed_nodes_get_a_placeholder() {
        let root = SceneNode::group("root").with_child(SceneNode::new(NodeKind::Light));
        let lines = dump(&root);
        assert_eq!(lines[1], "  └─*no-name* [Light]");
    }

    #[test]
    fn child_order_is_insertion_order() {
        let root = SceneNode::group("root")
            .with_child(SceneNode::group("zebra"))
            .with_child(SceneNode::group("aardvark"));
        let lines = dump(&root);
        assert!(lines[1].contains("zebra"));
        assert!(lines[2].contains("aardvark"));
    }
}
