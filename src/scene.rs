//! A minimal scene graph: named, typed nodes with transforms and children.
//!
//! The graph is owned by the application. The core only reads it — the pass
//! chain sees it immutably at render time, and the update hook is the single
//! place it gets mutated each tick.

use glam::{Mat4, Quat, Vec3};

use crate::inspect::Inspect;

/// Type tag for a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Group,
    Mesh,
    Light,
    Camera,
}

impl NodeKind {
    /// Tag as printed by the inspector.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Group => "Group",
            NodeKind::Mesh => "Mesh",
            NodeKind::Light => "Light",
            NodeKind::Camera => "Camera",
        }
    }
}

/// Position, rotation, and scale of a node.
#[derive(Clone, Copy, Debug)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.translation = Vec3::new(x, y, z);
        self
    }

    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn scaled(mut self, factor: f32) -> Self {
        self.scale = Vec3::splat(factor);
        self
    }

    /// Model matrix for this transform.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// One node of the scene hierarchy.
///
/// Children keep insertion order; traversal utilities (like the inspector)
/// follow that order exactly.
pub struct SceneNode {
    /// Optional display name; the inspector prints `*no-name*` when absent.
    pub name: Option<String>,
    pub kind: NodeKind,
    pub transform: Transform,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            name: None,
            kind,
            transform: Transform::default(),
            children: Vec::new(),
        }
    }

    /// Shorthand for a named group node.
    pub fn group(name: impl Into<String>) -> Self {
        Self::new(NodeKind::Group).named(name)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Append a child, keeping insertion order.
    pub fn add_child(&mut self, child: SceneNode) -> &mut SceneNode {
        self.children.push(child);
        self.children.last_mut().unwrap()
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first search by name, this node included.
    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        if self.name.as_deref() == Some(name) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Mutable depth-first search by name.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        if self.name.as_deref() == Some(name) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(name))
    }
}

impl Inspect for SceneNode {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn type_tag(&self) -> &str {
        self.kind.as_str()
    }

    fn children(&self) -> Vec<&dyn Inspect> {
        self.children.iter().map(|c| c as &dyn Inspect).collect()
    }
}
