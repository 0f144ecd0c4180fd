//! reliquary-scene
//!
//! Turns resolved fragment graphs into renderable scenes: mesh assembly
//! with per-unit material/image caches, skeleton world-transform
//! propagation, and the zone/object/character scene models consumed by the
//! GLB exporter.

mod cache;
mod mesh;
mod scene;
mod skeleton;

pub use cache::{ImageAsset, ImageCache, MaterialAsset, MaterialCache, UnitCaches};
pub use mesh::{assemble_mesh, MeshNode, VertexSkin};
pub use scene::{
    helm_tag, placement_radians, ObjectPlacement, Scene, SceneNode, SceneNodeKind,
    ROTATION_STEPS_PER_TURN,
};
pub use skeleton::{walk_skeleton, BoneTransform, SkeletonPose};
