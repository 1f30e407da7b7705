//! Prints a scene hierarchy as a connected tree, no window required.
//!
//! ```text
//! cargo run --example inspect_tree
//! ```

use glint::{NodeKind, SceneNode, dump};

fn main() {
    let rig = SceneNode::group("rig")
        .with_child(
            SceneNode::group("torso")
                .with_child(SceneNode::new(NodeKind::Mesh).named("hull"))
                .with_child(
                    SceneNode::group("arm")
                        .with_child(SceneNode::new(NodeKind::Mesh).named("claw")),
                ),
        )
        .with_child(SceneNode::new(NodeKind::Light).named("key"))
        .with_child(SceneNode::new(NodeKind::Light))
        .with_child(SceneNode::new(NodeKind::Camera).named("main"));

    for line in dump(&rig) {
        println!("{line}");
    }
}
