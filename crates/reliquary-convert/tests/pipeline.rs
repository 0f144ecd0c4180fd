//! End-to-end pipeline tests over an in-memory archive set

use reliquary_convert::{run_units, ConversionUnit, RunSummary};
use reliquary_export::read_scene_document;
use reliquary_fragments::{
    Fragment, FragmentTable, MaterialFragment, MeshFragment, MeshRefFragment,
    ObjectLocationFragment, StaticModelRefFragment, TextureFragment,
};

fn triangle_mesh(name: &str, material: Option<u32>) -> MeshFragment {
    MeshFragment {
        name: name.to_string(),
        positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        normals: vec![[0.0, 0.0, 1.0]; 3],
        uvs: vec![[0.0, 0.0]; 3],
        faces: vec![[0, 1, 2]],
        material,
        skin_runs: Vec::new(),
    }
}

fn zone_unit(name: &str) -> ConversionUnit {
    let mut table = FragmentTable::new();
    let texture = table.push(Fragment::Texture(TextureFragment {
        name: "GRASS".to_string(),
        file: "grass.png".to_string(),
    }));
    let material = table.push(Fragment::Material(MaterialFragment {
        name: "GRASS_MDF".to_string(),
        texture: Some(texture),
    }));
    table.push(Fragment::Mesh(triangle_mesh("R1_DMSPRITEDEF", Some(material))));

    let mut objects = FragmentTable::new();
    objects.push(Fragment::ObjectLocation(ObjectLocationFragment {
        model_ref: "TORCH_ACTORDEF".to_string(),
        x: 0.0,
        y: 0.0,
        z: 0.0,
        rot_x: 0.0,
        rot_y: 256.0,
        rot_z: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
    }));

    let mut unit = ConversionUnit::new(name, table);
    unit.objects = Some(objects);
    unit
}

fn character_unit(name: &str) -> ConversionUnit {
    let mut table = FragmentTable::new();
    let mesh = table.push(Fragment::Mesh(triangle_mesh("IT001_DMSPRITEDEF", None)));
    let mesh_ref = table.push(Fragment::MeshRef(MeshRefFragment { mesh }));
    table.push(Fragment::StaticModelRef(StaticModelRefFragment {
        name: "IT001_ACTORDEF".to_string(),
        mesh_references: vec![mesh_ref],
    }));
    ConversionUnit::new(name, table)
}

#[test]
fn test_run_writes_tree_and_indices() {
    let out = tempfile::tempdir().unwrap();
    let units = vec![zone_unit("qeynos"), character_unit("global_chr")];

    let summary = run_units(&units, out.path()).unwrap();
    assert_eq!(
        summary,
        RunSummary {
            converted: 2,
            failed: 0
        }
    );

    // The zone GLB re-parses through the deriver's header path and carries
    // its placements as scene extras.
    let buffer = std::fs::read(out.path().join("qeynos/qeynos.glb")).unwrap();
    let doc = read_scene_document(&buffer).unwrap();
    assert_eq!(doc.meshes.len(), 1);
    assert_eq!(doc.images[0].uri.as_deref(), Some("grass.png"));
    let extras = doc.scenes[0].extras.as_ref().unwrap();
    assert_eq!(extras["objectLocations"][0]["name"], "TORCH_ACTORDEF");

    assert!(out.path().join("characters/IT001.glb").is_file());
    assert!(out.path().join("characters/IT001.json").is_file());

    let races: serde_json::Value = serde_json::from_slice(
        &std::fs::read(out.path().join("characters/races.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(races["races"], serde_json::json!(["IT001"]));
    let zones: serde_json::Value =
        serde_json::from_slice(&std::fs::read(out.path().join("zones.json")).unwrap()).unwrap();
    assert_eq!(zones["zones"], serde_json::json!(["qeynos"]));
}

#[test]
fn test_empty_unit_fails_without_sinking_the_run() {
    let out = tempfile::tempdir().unwrap();
    // No mesh fragments at all: export reports the unit empty.
    let empty = ConversionUnit::new("void", FragmentTable::new());
    let units = vec![empty, zone_unit("qeynos")];

    let summary = run_units(&units, out.path()).unwrap();
    assert_eq!(summary.converted, 1);
    assert_eq!(summary.failed, 1);
    assert!(out.path().join("qeynos/qeynos.glb").is_file());
}

#[test]
fn test_equipment_models_land_in_items() {
    let out = tempfile::tempdir().unwrap();
    let units = vec![character_unit("gequip")];

    run_units(&units, out.path()).unwrap();

    assert!(out.path().join("items/IT001.glb").is_file());
    let items: serde_json::Value =
        serde_json::from_slice(&std::fs::read(out.path().join("items/items.json")).unwrap())
            .unwrap();
    assert_eq!(items["items"], serde_json::json!(["IT001"]));
}
