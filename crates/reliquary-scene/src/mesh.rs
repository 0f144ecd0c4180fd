//! Mesh assembly
//!
//! Builds a renderable mesh node from a mesh fragment. Materials and images
//! resolve through the unit caches so that every mesh referencing the same
//! source fragment shares one instance. A missing material or image only
//! costs the mesh its appearance; inconsistent geometry arrays abort the
//! mesh (not the unit) with `DataCorruption`.

use std::sync::Arc;

use reliquary_core::{Error, Result};
use reliquary_fragments::{BoneEntry, FragmentTable, MeshFragment};
use tracing::warn;

use crate::cache::{ImageAsset, MaterialAsset, UnitCaches};
use crate::skeleton::SkeletonPose;

/// Single-influence skin binding for one vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexSkin {
    /// Bone entry index
    pub joint: u16,
    /// Influence weight (always 1.0 for this format)
    pub weight: f32,
}

/// A renderable mesh node
#[derive(Debug, Clone)]
pub struct MeshNode {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub faces: Vec<[u32; 3]>,
    /// Shared material instance from the unit's material cache
    pub material: Option<Arc<MaterialAsset>>,
    /// One entry per vertex when assembled against a skeleton
    pub skin: Option<Vec<VertexSkin>>,
}

/// Assemble a mesh node from a mesh fragment
///
/// When `skeleton` is supplied the fragment's run-length bone bindings are
/// expanded to per-vertex joints, and each vertex is moved into world space
/// by its bone's rotation-then-shift frame.
pub fn assemble_mesh(
    fragment: &MeshFragment,
    table: &FragmentTable,
    caches: &mut UnitCaches,
    skeleton: Option<(&[BoneEntry], &SkeletonPose)>,
) -> Result<MeshNode> {
    let vertex_count = fragment.positions.len();

    if !fragment.normals.is_empty() && fragment.normals.len() != vertex_count {
        return Err(Error::corrupt(format!(
            "mesh {}: {} normals for {} vertices",
            fragment.name,
            fragment.normals.len(),
            vertex_count
        )));
    }
    if !fragment.uvs.is_empty() && fragment.uvs.len() != vertex_count {
        return Err(Error::corrupt(format!(
            "mesh {}: {} uvs for {} vertices",
            fragment.name,
            fragment.uvs.len(),
            vertex_count
        )));
    }
    for face in &fragment.faces {
        if face.iter().any(|&i| i as usize >= vertex_count) {
            return Err(Error::corrupt(format!(
                "mesh {}: face index {:?} out of range ({vertex_count} vertices)",
                fragment.name, face
            )));
        }
    }

    let mut positions = fragment.positions.clone();
    let mut skin = None;

    if let Some((entries, pose)) = skeleton {
        if !fragment.skin_runs.is_empty() {
            skin = Some(expand_skin(fragment, entries, pose, &mut positions)?);
        }
    }

    let material = fragment
        .material
        .and_then(|index| resolve_material(index, table, caches));

    Ok(MeshNode {
        name: fragment.name.clone(),
        positions,
        normals: fragment.normals.clone(),
        uvs: fragment.uvs.clone(),
        faces: fragment.faces.clone(),
        material,
        skin,
    })
}

/// Expand run-length bindings and bake bone world transforms into positions
fn expand_skin(
    fragment: &MeshFragment,
    entries: &[BoneEntry],
    pose: &SkeletonPose,
    positions: &mut [[f32; 3]],
) -> Result<Vec<VertexSkin>> {
    let total: usize = fragment.skin_runs.iter().map(|r| r.count as usize).sum();
    if total != positions.len() {
        return Err(Error::corrupt(format!(
            "mesh {}: skin runs cover {total} of {} vertices",
            fragment.name,
            positions.len()
        )));
    }

    let mut skin = Vec::with_capacity(positions.len());
    let mut cursor = 0usize;
    for run in &fragment.skin_runs {
        if run.bone as usize >= entries.len() {
            return Err(Error::corrupt(format!(
                "mesh {}: skin run bone {} out of range ({} entries)",
                fragment.name,
                run.bone,
                entries.len()
            )));
        }
        let bone = pose.get(run.bone as usize).ok_or_else(|| {
            Error::corrupt(format!(
                "mesh {}: bone entry {} was not reached by traversal",
                fragment.name, run.bone
            ))
        })?;

        for _ in 0..run.count {
            let world = bone.rot.apply(positions[cursor].into()).add(bone.shift);
            positions[cursor] = world.to_array();
            skin.push(VertexSkin {
                joint: run.bone,
                weight: 1.0,
            });
            cursor += 1;
        }
    }
    Ok(skin)
}

/// Resolve a material fragment through the unit cache
///
/// A dangling or mistyped reference degrades to `None` so the mesh still
/// exports, matching the renderer's tolerance for missing appearance data.
fn resolve_material(
    index: u32,
    table: &FragmentTable,
    caches: &mut UnitCaches,
) -> Option<Arc<MaterialAsset>> {
    if let Some(cached) = caches.materials.get(&index) {
        return Some(Arc::clone(cached));
    }

    let fragment = match table.material(index) {
        Ok(f) => f,
        Err(err) => {
            warn!(index, %err, "material unresolved, emitting mesh without it");
            return None;
        }
    };

    let image = fragment
        .texture
        .and_then(|texture| resolve_image(texture, table, caches));

    let asset = Arc::new(MaterialAsset {
        name: fragment.name.clone(),
        image,
    });
    caches.materials.insert(index, Arc::clone(&asset));
    Some(asset)
}

fn resolve_image(index: u32, table: &FragmentTable, caches: &mut UnitCaches) -> Option<Arc<ImageAsset>> {
    if let Some(cached) = caches.images.get(&index) {
        return Some(Arc::clone(cached));
    }

    let fragment = match table.texture(index) {
        Ok(f) => f,
        Err(err) => {
            warn!(index, %err, "texture unresolved, emitting material without image");
            return None;
        }
    };

    let asset = Arc::new(ImageAsset {
        name: fragment.name.clone(),
        file: fragment.file.clone(),
    });
    caches.images.insert(index, Arc::clone(&asset));
    Some(asset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reliquary_fragments::{
        Fragment, MaterialFragment, SkinRun, TextureFragment,
    };

    fn quad(name: &str, material: Option<u32>) -> MeshFragment {
        MeshFragment {
            name: name.into(),
            positions: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [1.0, 1.0, 0.0],
            ],
            normals: vec![[0.0, 0.0, 1.0]; 4],
            uvs: vec![[0.0, 0.0]; 4],
            faces: vec![[0, 1, 2], [1, 3, 2]],
            material,
            skin_runs: Vec::new(),
        }
    }

    fn table_with_material() -> FragmentTable {
        let mut table = FragmentTable::new();
        table.push(Fragment::Texture(TextureFragment {
            name: "BARHE0001".into(),
            file: "barhe0001.png".into(),
        }));
        table.push(Fragment::Material(MaterialFragment {
            name: "BARHE0001_MDF".into(),
            texture: Some(0),
        }));
        table
    }

    #[test]
    fn test_assembles_plain_mesh() {
        let table = FragmentTable::new();
        let mut caches = UnitCaches::new();
        let node = assemble_mesh(&quad("plain", None), &table, &mut caches, None).unwrap();
        assert_eq!(node.positions.len(), 4);
        assert_eq!(node.faces.len(), 2);
        assert!(node.material.is_none());
        assert!(node.skin.is_none());
    }

    #[test]
    fn test_material_resolved_through_cache_identity() {
        let table = table_with_material();
        let mut caches = UnitCaches::new();

        let a = assemble_mesh(&quad("a", Some(1)), &table, &mut caches, None).unwrap();
        let b = assemble_mesh(&quad("b", Some(1)), &table, &mut caches, None).unwrap();

        let (ma, mb) = (a.material.unwrap(), b.material.unwrap());
        assert!(Arc::ptr_eq(&ma, &mb));
        assert_eq!(ma.image.as_ref().unwrap().file, "barhe0001.png");
    }

    #[test]
    fn test_fresh_unit_gets_fresh_instances() {
        let table = table_with_material();

        let mut first_unit = UnitCaches::new();
        let a = assemble_mesh(&quad("a", Some(1)), &table, &mut first_unit, None).unwrap();

        let mut second_unit = UnitCaches::new();
        let b = assemble_mesh(&quad("b", Some(1)), &table, &mut second_unit, None).unwrap();

        assert!(!Arc::ptr_eq(&a.material.unwrap(), &b.material.unwrap()));
    }

    #[test]
    fn test_missing_material_degrades_to_none() {
        let table = FragmentTable::new();
        let mut caches = UnitCaches::new();
        let node = assemble_mesh(&quad("m", Some(42)), &table, &mut caches, None).unwrap();
        assert!(node.material.is_none());
    }

    #[test]
    fn test_inconsistent_normals_are_corrupt() {
        let mut fragment = quad("bad", None);
        fragment.normals.pop();
        let table = FragmentTable::new();
        let mut caches = UnitCaches::new();
        let err = assemble_mesh(&fragment, &table, &mut caches, None).unwrap_err();
        assert!(matches!(err, Error::DataCorruption { .. }));
    }

    #[test]
    fn test_face_index_out_of_range_is_corrupt() {
        let mut fragment = quad("bad", None);
        fragment.faces.push([0, 1, 9]);
        let table = FragmentTable::new();
        let mut caches = UnitCaches::new();
        let err = assemble_mesh(&fragment, &table, &mut caches, None).unwrap_err();
        assert!(matches!(err, Error::DataCorruption { .. }));
    }

    #[test]
    fn test_skin_run_mismatch_is_corrupt() {
        let mut fragment = quad("skinned", None);
        fragment.skin_runs = vec![SkinRun { count: 3, bone: 0 }];

        // One root bone covering too few vertices.
        let mut table = FragmentTable::new();
        let track = table.push(Fragment::SkeletonPieceTrack(
            reliquary_fragments::SkeletonPieceTrackFragment {
                name: "root".into(),
                shift_x: 0,
                shift_y: 0,
                shift_z: 0,
                shift_denominator: 1,
                rotate_x: 0,
                rotate_y: 0,
                rotate_z: 0,
                rotate_denominator: 1,
            },
        ));
        let piece_ref = table.push(Fragment::SkeletonPieceRef(
            reliquary_fragments::SkeletonPieceRefFragment { piece_track: track },
        ));
        let entries = vec![BoneEntry {
            piece_ref,
            children: Default::default(),
        }];
        let pose = crate::skeleton::walk_skeleton(&table, &entries).unwrap();

        let mut caches = UnitCaches::new();
        let err = assemble_mesh(&fragment, &table, &mut caches, Some((&entries, &pose)))
            .unwrap_err();
        assert!(matches!(err, Error::DataCorruption { .. }));
    }

    #[test]
    fn test_skinned_vertices_follow_bone_shift() {
        let mut fragment = quad("skinned", None);
        fragment.skin_runs = vec![SkinRun { count: 4, bone: 0 }];

        let mut table = FragmentTable::new();
        let track = table.push(Fragment::SkeletonPieceTrack(
            reliquary_fragments::SkeletonPieceTrackFragment {
                name: "root".into(),
                shift_x: 10,
                shift_y: 0,
                shift_z: 0,
                shift_denominator: 1,
                rotate_x: 0,
                rotate_y: 0,
                rotate_z: 0,
                rotate_denominator: 1,
            },
        ));
        let piece_ref = table.push(Fragment::SkeletonPieceRef(
            reliquary_fragments::SkeletonPieceRefFragment { piece_track: track },
        ));
        let entries = vec![BoneEntry {
            piece_ref,
            children: Default::default(),
        }];
        let pose = crate::skeleton::walk_skeleton(&table, &entries).unwrap();

        let mut caches = UnitCaches::new();
        let node =
            assemble_mesh(&fragment, &table, &mut caches, Some((&entries, &pose))).unwrap();

        assert_eq!(node.positions[0], [10.0, 0.0, 0.0]);
        let skin = node.skin.unwrap();
        assert_eq!(skin.len(), 4);
        assert_eq!(skin[0], VertexSkin { joint: 0, weight: 1.0 });
    }

    #[test]
    fn test_skinned_vertices_rotate_before_shifting() {
        let mut fragment = quad("skinned", None);
        fragment.skin_runs = vec![SkinRun { count: 4, bone: 0 }];

        // Quarter turn about Z, then a shift along X.
        let mut table = FragmentTable::new();
        let track = table.push(Fragment::SkeletonPieceTrack(
            reliquary_fragments::SkeletonPieceTrackFragment {
                name: "root".into(),
                shift_x: 10,
                shift_y: 0,
                shift_z: 0,
                shift_denominator: 1,
                rotate_x: 0,
                rotate_y: 0,
                rotate_z: 1,
                rotate_denominator: 1,
            },
        ));
        let piece_ref = table.push(Fragment::SkeletonPieceRef(
            reliquary_fragments::SkeletonPieceRefFragment { piece_track: track },
        ));
        let entries = vec![BoneEntry {
            piece_ref,
            children: Default::default(),
        }];
        let pose = crate::skeleton::walk_skeleton(&table, &entries).unwrap();

        let mut caches = UnitCaches::new();
        let node =
            assemble_mesh(&fragment, &table, &mut caches, Some((&entries, &pose))).unwrap();

        // Vertex (1,0,0) rotates onto +Y first, then the shift applies:
        // shifting first would land on (0,11,0) instead.
        let [x, y, z] = node.positions[1];
        assert!((x - 10.0).abs() < 1e-5);
        assert!((y - 1.0).abs() < 1e-5);
        assert!(z.abs() < 1e-5);
    }
}
