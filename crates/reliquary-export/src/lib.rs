//! reliquary-export
//!
//! glTF 2.0 output for assembled scenes: the GLB container writer, the
//! model-spec deriver that re-parses exported containers, and the aggregate
//! index files written after a conversion run.

pub mod glb;
pub mod gltf;
pub mod index;
pub mod spec;

pub use glb::{GlbExportOptions, GlbExporter};
pub use index::{write_indices, CHARACTER_DIR, ITEM_DIR};
pub use spec::{derive_model_spec, read_scene_document, ImageSpec, ModelSpec};
