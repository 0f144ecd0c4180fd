//! Aggregate index output
//!
//! After a conversion run the output tree holds one directory per zone plus
//! `characters/` and `items/` directories of GLB models. The index files
//! (`zones.json`, `races.json`, `items.json`) list what is available so a
//! viewer can enumerate content without walking the tree.

use std::fs;
use std::path::Path;

use reliquary_core::Result;
use serde::Serialize;
use tracing::info;

/// Directory of character GLB exports under the output root
pub const CHARACTER_DIR: &str = "characters";
/// Directory of item GLB exports under the output root
pub const ITEM_DIR: &str = "items";

#[derive(Serialize)]
struct ZoneIndex {
    zones: Vec<String>,
}

#[derive(Serialize)]
struct RaceIndex {
    races: Vec<String>,
}

#[derive(Serialize)]
struct ItemIndex {
    items: Vec<String>,
}

/// Write the aggregate index files
///
/// `zones.json` lands at the output root; `races.json` and `items.json`
/// sit inside the directories they describe.
pub fn write_indices(root: &Path) -> Result<()> {
    let character_dir = root.join(CHARACTER_DIR);
    let item_dir = root.join(ITEM_DIR);

    let zones = list_zone_dirs(root)?;
    let races = list_glb_stems(&character_dir)?;
    let items = list_glb_stems(&item_dir)?;
    info!(
        zones = zones.len(),
        races = races.len(),
        items = items.len(),
        "writing aggregate indices"
    );

    write_json(&root.join("zones.json"), &ZoneIndex { zones })?;
    fs::create_dir_all(&character_dir)?;
    write_json(&character_dir.join("races.json"), &RaceIndex { races })?;
    fs::create_dir_all(&item_dir)?;
    write_json(&item_dir.join("items.json"), &ItemIndex { items })?;
    Ok(())
}

/// Zone subdirectories of the output root, sorted
///
/// The character and item directories and dotfiles are not zones.
fn list_zone_dirs(root: &Path) -> Result<Vec<String>> {
    let mut zones = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == CHARACTER_DIR || name == ITEM_DIR || name.starts_with('.') {
            continue;
        }
        zones.push(name);
    }
    zones.sort();
    Ok(zones)
}

/// Basenames (without extension) of the GLB files in a directory, sorted
///
/// A missing directory yields an empty list; a run may hold no characters
/// or no items.
fn list_glb_stems(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut stems = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("glb") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            stems.push(stem.to_string());
        }
    }
    stems.sort();
    Ok(stems)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_list_expected_names() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path();

        fs::create_dir(path.join("qeynos")).unwrap();
        fs::create_dir(path.join("freport")).unwrap();
        fs::create_dir(path.join(CHARACTER_DIR)).unwrap();
        fs::create_dir(path.join(ITEM_DIR)).unwrap();
        fs::create_dir(path.join(".cache")).unwrap();
        fs::write(path.join(CHARACTER_DIR).join("bar.glb"), b"").unwrap();
        fs::write(path.join(CHARACTER_DIR).join("bar.json"), b"{}").unwrap();
        fs::write(path.join(ITEM_DIR).join("it001_obj.glb"), b"").unwrap();

        write_indices(path).unwrap();

        let zones: serde_json::Value =
            serde_json::from_slice(&fs::read(path.join("zones.json")).unwrap()).unwrap();
        assert_eq!(zones["zones"], serde_json::json!(["freport", "qeynos"]));

        let races: serde_json::Value = serde_json::from_slice(
            &fs::read(path.join(CHARACTER_DIR).join("races.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(races["races"], serde_json::json!(["bar"]));

        let items: serde_json::Value =
            serde_json::from_slice(&fs::read(path.join(ITEM_DIR).join("items.json")).unwrap())
                .unwrap();
        assert_eq!(items["items"], serde_json::json!(["it001_obj"]));
    }

    #[test]
    fn test_missing_model_dirs_yield_empty_lists() {
        let root = tempfile::tempdir().unwrap();
        write_indices(root.path()).unwrap();

        let races: serde_json::Value = serde_json::from_slice(
            &fs::read(root.path().join(CHARACTER_DIR).join("races.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(races["races"], serde_json::json!([]));
    }
}
