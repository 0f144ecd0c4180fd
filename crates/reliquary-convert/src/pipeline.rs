//! Conversion pipeline
//!
//! Drives units through scene building, GLB export, and model spec
//! derivation, writing the output tree the aggregate indices describe.
//! Units run strictly sequentially; a unit failure is contained at the unit
//! boundary so one corrupt archive cannot sink a whole run.

use std::fs;
use std::path::Path;

use reliquary_core::Result;
use reliquary_export::{
    derive_model_spec, write_indices, GlbExportOptions, GlbExporter, CHARACTER_DIR, ITEM_DIR,
};
use reliquary_scene::{Scene, UnitCaches};
use tracing::{error, info, warn};

use crate::build::{character_scenes, object_scene, zone_scene};
use crate::unit::{ConversionUnit, UnitKind};

/// Outcome of a full conversion run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Units that produced their outputs
    pub converted: usize,
    /// Units abandoned at the unit boundary
    pub failed: usize,
}

/// Convert every unit in order, then write the aggregate indices
///
/// A unit failure is logged and the next unit proceeds; only a fatal error
/// (an unknown unit type) aborts the run.
pub fn run_units(units: &[ConversionUnit], output_root: &Path) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for unit in units {
        info!(unit = %unit.name, kind = ?unit.kind, "converting unit");
        match convert_unit(unit, output_root) {
            Ok(()) => {
                info!(unit = %unit.name, "unit complete");
                summary.converted += 1;
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                error!(unit = %unit.name, error = %e, "unit failed");
                summary.failed += 1;
            }
        }
    }

    write_indices(output_root)?;
    Ok(summary)
}

/// Convert a single unit, writing its outputs under the output root
pub fn convert_unit(unit: &ConversionUnit, output_root: &Path) -> Result<()> {
    // Caches never outlive their unit; sharing them across archives would
    // alias unrelated fragment indices.
    let mut caches = UnitCaches::new();

    match unit.kind {
        UnitKind::Zone => {
            let scene = zone_scene(&unit.table, unit.objects.as_ref(), &mut caches)?;
            // Export before touching the tree; a failed unit must not leave
            // an empty zone directory behind for the index walk.
            let buffer = export_glb(&scene)?;
            let dir = output_root.join(unit.base_name());
            fs::create_dir_all(&dir)?;
            fs::write(dir.join(format!("{}.glb", unit.name)), buffer)?;
            Ok(())
        }
        UnitKind::Object => {
            let scene = object_scene(&unit.table, &mut caches)?;
            let buffer = export_glb(&scene)?;
            let dir = output_root.join(unit.base_name());
            fs::create_dir_all(&dir)?;
            fs::write(dir.join(format!("{}.glb", unit.name)), buffer)?;
            Ok(())
        }
        UnitKind::Character => {
            let dir = if unit.is_equipment() {
                output_root.join(ITEM_DIR)
            } else {
                output_root.join(CHARACTER_DIR)
            };
            fs::create_dir_all(&dir)?;

            for (race, scene) in character_scenes(&unit.table, &mut caches)? {
                let buffer = export_glb(&scene)?;
                fs::write(dir.join(format!("{race}.glb")), &buffer)?;

                // The geometry is already on disk; a spec derivation failure
                // only costs the metadata file.
                match derive_model_spec(&buffer, &race, &unit.texture_files) {
                    Ok(spec) => {
                        let text = serde_json::to_string_pretty(&spec)?;
                        fs::write(dir.join(format!("{race}.json")), text)?;
                    }
                    Err(e) => {
                        warn!(race = %race, error = %e, "model spec derivation failed");
                    }
                }
            }
            Ok(())
        }
    }
}

fn export_glb(scene: &Scene) -> Result<Vec<u8>> {
    let mut exporter = GlbExporter::new(GlbExportOptions::default());
    exporter.export_scene(scene)
}
