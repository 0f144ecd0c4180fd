//! Scene model and appearance-variant grouping
//!
//! A scene is an ordered collection of named nodes — meshes, or one group
//! per character race holding that race's appearance-variant meshes — plus
//! side metadata such as the zone object-placement table. Order follows the
//! fragment table, keeping output deterministic.

use serde::Serialize;

use crate::mesh::MeshNode;

/// An assembled scene for one export
#[derive(Debug, Default)]
pub struct Scene {
    /// Root nodes, in assembly order
    pub nodes: Vec<SceneNode>,
    /// Zone object placements, attached as scene-level metadata
    pub placements: Vec<ObjectPlacement>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root node
    pub fn add(&mut self, node: SceneNode) {
        self.nodes.push(node);
    }

    /// Count mesh nodes across groups
    pub fn mesh_count(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| match &n.kind {
                SceneNodeKind::Mesh(_) => 1,
                SceneNodeKind::Group(children) => children.len(),
            })
            .sum()
    }
}

/// A named scene node
#[derive(Debug)]
pub struct SceneNode {
    pub name: String,
    pub kind: SceneNodeKind,
    /// Appearance-variant tag ("helm"), metadata only — never used for
    /// grouping
    pub variant: Option<String>,
}

impl SceneNode {
    /// Wrap a mesh as an unadorned node
    pub fn mesh(mesh: MeshNode) -> Self {
        Self {
            name: mesh.name.clone(),
            kind: SceneNodeKind::Mesh(mesh),
            variant: None,
        }
    }

    /// Wrap a mesh with a variant tag
    pub fn variant_mesh(mesh: MeshNode, variant: String) -> Self {
        Self {
            name: mesh.name.clone(),
            kind: SceneNodeKind::Mesh(mesh),
            variant: Some(variant),
        }
    }

    /// A named group of meshes (one per character race)
    pub fn group(name: impl Into<String>, children: Vec<SceneNode>) -> Self {
        Self {
            name: name.into(),
            kind: SceneNodeKind::Group(children),
            variant: None,
        }
    }
}

#[derive(Debug)]
pub enum SceneNodeKind {
    Mesh(MeshNode),
    Group(Vec<SceneNode>),
}

/// Placement of a named model inside a zone
#[derive(Debug, Clone, Serialize)]
pub struct ObjectPlacement {
    pub name: String,
    pub position: [f32; 3],
    pub scale: [f32; 3],
    pub rot: [f32; 3],
}

/// Source angular unit: 512 steps per full 360° turn
pub const ROTATION_STEPS_PER_TURN: f32 = 512.0 / 360.0;

/// Convert a placement rotation from source angular units to radians
pub fn placement_radians(raw: f32) -> f32 {
    (raw / ROTATION_STEPS_PER_TURN).to_radians()
}

/// Derive the helm variant tag from a mesh name
///
/// The tag comes from the window after the three-character race code, up
/// to (excluding) the first underscore: an empty window is the base
/// appearance, a window containing `HE` is a helm variant used verbatim,
/// and anything else is a body variant prefixed `BO`.
pub fn helm_tag(mesh_name: &str) -> String {
    let window = match mesh_name.find('_') {
        // Names are expected ASCII; a stray multi-byte prefix falls back
        // to the base appearance rather than splitting a character.
        Some(underscore) if underscore > 3 => mesh_name.get(3..underscore).unwrap_or(""),
        _ => "",
    };
    if window.is_empty() {
        "BASE".to_string()
    } else if window.contains("HE") {
        window.to_string()
    } else {
        format!("BO{window}")
    }
}
