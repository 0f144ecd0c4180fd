//! reliquary-fragments
//!
//! Data model for WLD-style fragment tables: a table of typed records that
//! cross-reference each other by integer index. Fragments describe meshes,
//! materials, textures, skeletal rigs, and object placements; the archive
//! decoder that produces the table lives outside this workspace.
//!
//! All cross-references are weak handles resolved through
//! [`FragmentTable::lookup`] and its typed accessors. Nothing in the graph
//! owns anything else, which keeps the loosely-typed reference structure of
//! the source format free of lifetime hazards.

mod fragment;
mod table;

pub use fragment::{
    BoneEntry, Fragment, MaterialFragment, MeshFragment, MeshRefFragment,
    ObjectLocationFragment, SkeletonPieceRefFragment, SkeletonPieceTrackFragment,
    SkeletonTrackFragment, SkeletonTrackRefFragment, SkinRun, StaticModelRefFragment,
    TextureFragment,
};
pub use table::FragmentTable;
