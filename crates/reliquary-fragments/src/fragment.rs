//! Fragment variants
//!
//! One enum variant per fragment type tag found in the source tables. The
//! decoder emits exactly these shapes; everything downstream matches on the
//! enum, so an unhandled tag is a compile error rather than a runtime
//! surprise.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A typed record in the fragment table
///
/// Cross-references (`u32` fields and entries) are indices into the owning
/// [`crate::FragmentTable`], never resolved eagerly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Fragment {
    /// Triangle mesh geometry
    Mesh(MeshFragment),
    /// Indirection to a mesh fragment
    MeshRef(MeshRefFragment),
    /// Named model root referencing meshes or a skeleton
    StaticModelRef(StaticModelRefFragment),
    /// Indirection to a skeleton track
    SkeletonTrackRef(SkeletonTrackRefFragment),
    /// Skeleton definition: ordered bone entry list
    SkeletonTrack(SkeletonTrackFragment),
    /// Indirection from a bone entry to its piece track
    SkeletonPieceRef(SkeletonPieceRefFragment),
    /// Fixed-point shift/rotation data for one bone
    SkeletonPieceTrack(SkeletonPieceTrackFragment),
    /// Material definition referencing a texture
    Material(MaterialFragment),
    /// Texture image reference
    Texture(TextureFragment),
    /// Placement of a named model inside a zone
    ObjectLocation(ObjectLocationFragment),
}

impl Fragment {
    /// Human-readable type tag, used in mismatch diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Fragment::Mesh(_) => "Mesh",
            Fragment::MeshRef(_) => "MeshRef",
            Fragment::StaticModelRef(_) => "StaticModelRef",
            Fragment::SkeletonTrackRef(_) => "SkeletonTrackRef",
            Fragment::SkeletonTrack(_) => "SkeletonTrack",
            Fragment::SkeletonPieceRef(_) => "SkeletonPieceRef",
            Fragment::SkeletonPieceTrack(_) => "SkeletonPieceTrack",
            Fragment::Material(_) => "Material",
            Fragment::Texture(_) => "Texture",
            Fragment::ObjectLocation(_) => "ObjectLocation",
        }
    }
}

/// Triangle mesh fragment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshFragment {
    /// Mesh name (carries race code / part / variant encoding)
    pub name: String,
    /// Vertex positions
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals (empty or one per position)
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates (empty or one per position)
    pub uvs: Vec<[f32; 2]>,
    /// Triangle vertex indices
    pub faces: Vec<[u32; 3]>,
    /// Material fragment index, if the mesh is textured
    pub material: Option<u32>,
    /// Run-length vertex-to-bone bindings for skinned meshes:
    /// `count` consecutive vertices bound to bone entry `bone`
    pub skin_runs: Vec<SkinRun>,
}

/// One run of consecutive vertices bound to a single bone entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SkinRun {
    pub count: u16,
    pub bone: u16,
}

/// Mesh indirection fragment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshRefFragment {
    /// Index of the referenced `Mesh` fragment
    pub mesh: u32,
}

/// Named model root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticModelRefFragment {
    /// Model name; characters before the first underscore are the race code
    pub name: String,
    /// Referenced mesh or skeleton fragments, in source order
    pub mesh_references: Vec<u32>,
}

/// Skeleton indirection fragment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkeletonTrackRefFragment {
    /// Index of the referenced `SkeletonTrack` fragment
    pub skeleton_track: u32,
}

/// Skeleton definition fragment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkeletonTrackFragment {
    /// Skeleton name; characters before the first underscore name the root
    pub name: String,
    /// Bone entries; entry 0 is the traversal root
    pub entries: Vec<BoneEntry>,
}

/// One bone entry in a skeleton track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoneEntry {
    /// Index of the `SkeletonPieceRef` fragment carrying this bone's data
    pub piece_ref: u32,
    /// Child bone entry indices, in source order
    pub children: SmallVec<[u32; 8]>,
}

/// Bone piece indirection fragment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkeletonPieceRefFragment {
    /// Index of the referenced `SkeletonPieceTrack` fragment
    pub piece_track: u32,
}

/// Fixed-point bone transform fragment
///
/// Shift and rotation are integer triples over a shared denominator. The
/// rotation triple is a fraction of a quarter turn per axis, not radians.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkeletonPieceTrackFragment {
    pub name: String,
    pub shift_x: i16,
    pub shift_y: i16,
    pub shift_z: i16,
    pub shift_denominator: i16,
    pub rotate_x: i16,
    pub rotate_y: i16,
    pub rotate_z: i16,
    pub rotate_denominator: i16,
}

/// Material fragment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialFragment {
    pub name: String,
    /// Index of the `Texture` fragment, if any
    pub texture: Option<u32>,
}

/// Texture fragment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextureFragment {
    pub name: String,
    /// Image file basename written by the texture extractor
    pub file: String,
}

/// Object placement fragment
///
/// Rotations are stored in the source's angular unit of 512 per full turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectLocationFragment {
    /// Name of the placed model (matches a `StaticModelRef` name)
    pub model_ref: String,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub rot_x: f32,
    pub rot_y: f32,
    pub rot_z: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}
