//! Scene builders
//!
//! Turn one unit's fragment table into the scenes the exporter writes. Each
//! builder walks the table in order, so output is deterministic for a given
//! archive.

use reliquary_core::Result;
use reliquary_fragments::{Fragment, FragmentTable, MeshFragment, StaticModelRefFragment};
use reliquary_fragments::BoneEntry;
use reliquary_scene::{
    assemble_mesh, helm_tag, placement_radians, walk_skeleton, ObjectPlacement, Scene, SceneNode,
    SkeletonPose, UnitCaches,
};
use tracing::warn;

/// Build one scene per character model in the table
///
/// Each `StaticModelRef` names a race (the code before the first
/// underscore). A skeleton reference pulls in every mesh belonging to the
/// race, posed by the skeleton walk and grouped under one node; a plain mesh
/// reference yields a single-mesh scene. Models whose reference resolves to
/// neither are skipped.
pub fn character_scenes(
    table: &FragmentTable,
    caches: &mut UnitCaches,
) -> Result<Vec<(String, Scene)>> {
    let mut scenes = Vec::new();

    for (index, fragment) in table.iter() {
        let Fragment::StaticModelRef(model) = fragment else {
            continue;
        };
        let race = race_code(&model.name);
        let Some(&reference) = model.mesh_references.first() else {
            warn!(model = %model.name, index, "model has no references, skipping");
            continue;
        };

        if let Ok(track_ref) = table.skeleton_track_ref(reference) {
            let track = table.skeleton_track(track_ref.skeleton_track)?;
            let pose = walk_skeleton(table, &track.entries)?;
            let root_name = race_code(&track.name);
            let group = collect_race_meshes(table, caches, race, root_name, &track.entries, &pose)?;
            scenes.push((race.to_string(), group));
        } else if let Ok(mesh_ref) = table.mesh_ref(reference) {
            match table.mesh(mesh_ref.mesh) {
                Ok(mesh) => match assemble_mesh(mesh, table, caches, None) {
                    Ok(node) => {
                        let mut scene = Scene::new();
                        scene.add(SceneNode::mesh(node));
                        scenes.push((race.to_string(), scene));
                    }
                    Err(e) if e.is_mesh_local() => {
                        warn!(mesh = %mesh.name, error = %e, "skipping corrupt mesh");
                    }
                    Err(e) => return Err(e),
                },
                Err(e) if e.is_not_found() => {
                    warn!(model = %model.name, "dangling mesh reference, skipping");
                }
                Err(e) => return Err(e),
            }
        } else {
            warn!(model = %model.name, reference, "unresolvable model reference, skipping");
        }
    }
    Ok(scenes)
}

/// Collect every mesh belonging to a race into one posed group
fn collect_race_meshes(
    table: &FragmentTable,
    caches: &mut UnitCaches,
    race: &str,
    root_name: &str,
    entries: &[BoneEntry],
    pose: &SkeletonPose,
) -> Result<Scene> {
    let mut children = Vec::new();
    for (_, fragment) in table.iter() {
        let Fragment::Mesh(mesh) = fragment else {
            continue;
        };
        if !mesh.name.contains(race) && !mesh.name.contains(root_name) {
            continue;
        }
        match assemble_mesh(mesh, table, caches, Some((entries, pose))) {
            Ok(node) => {
                let tag = helm_tag(&mesh.name);
                children.push(SceneNode::variant_mesh(node, tag));
            }
            Err(e) if e.is_mesh_local() => {
                warn!(mesh = %mesh.name, error = %e, "skipping corrupt mesh");
            }
            Err(e) => return Err(e),
        }
    }

    let mut scene = Scene::new();
    scene.add(SceneNode::group(race, children));
    Ok(scene)
}

/// Build the zone scene: every mesh fragment, plus the companion table's
/// object placements as scene metadata
pub fn zone_scene(
    table: &FragmentTable,
    objects: Option<&FragmentTable>,
    caches: &mut UnitCaches,
) -> Result<Scene> {
    let mut scene = Scene::new();

    for (_, fragment) in table.iter() {
        let Fragment::Mesh(mesh) = fragment else {
            continue;
        };
        match assemble_mesh(mesh, table, caches, None) {
            Ok(node) => scene.add(SceneNode::mesh(node)),
            Err(e) if e.is_mesh_local() => {
                warn!(mesh = %mesh.name, error = %e, "skipping corrupt mesh");
            }
            Err(e) => return Err(e),
        }
    }

    if let Some(objects) = objects {
        for (_, fragment) in objects.iter() {
            let Fragment::ObjectLocation(location) = fragment else {
                continue;
            };
            scene.placements.push(ObjectPlacement {
                name: location.model_ref.clone(),
                position: [location.x, location.y, location.z],
                scale: [location.scale_x, location.scale_x, location.scale_y],
                rot: [
                    placement_radians(location.rot_x),
                    placement_radians(location.rot_y),
                    placement_radians(location.rot_z),
                ],
            });
        }
    }
    Ok(scene)
}

/// Build the object scene: one node per placeable model
///
/// Nodes take the model ref's name so zone placements can find them.
/// Unresolvable references are skipped.
pub fn object_scene(table: &FragmentTable, caches: &mut UnitCaches) -> Result<Scene> {
    let mut scene = Scene::new();

    for (_, fragment) in table.iter() {
        let Fragment::StaticModelRef(model) = fragment else {
            continue;
        };
        match resolve_object_mesh(table, model) {
            Some(mesh) => match assemble_mesh(mesh, table, caches, None) {
                Ok(node) => {
                    let mut node = SceneNode::mesh(node);
                    node.name = model.name.clone();
                    scene.add(node);
                }
                Err(e) if e.is_mesh_local() => {
                    warn!(mesh = %mesh.name, error = %e, "skipping corrupt mesh");
                }
                Err(e) => return Err(e),
            },
            None => {
                warn!(model = %model.name, "unresolvable model reference, skipping");
            }
        }
    }
    Ok(scene)
}

fn resolve_object_mesh<'a>(
    table: &'a FragmentTable,
    model: &StaticModelRefFragment,
) -> Option<&'a MeshFragment> {
    let reference = *model.mesh_references.first()?;
    let mesh_ref = table.mesh_ref(reference).ok()?;
    table.mesh(mesh_ref.mesh).ok()
}

/// Characters before the first underscore
fn race_code(name: &str) -> &str {
    name.split('_').next().unwrap_or(name)
}
