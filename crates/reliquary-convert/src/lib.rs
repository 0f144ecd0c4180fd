//! reliquary-convert
//!
//! The per-unit conversion pipeline: classify a decoded archive, build its
//! scenes, export GLB containers, derive model specs, and write the
//! aggregate indices once every unit has run.

mod build;
mod pipeline;
mod unit;

pub use build::{character_scenes, object_scene, zone_scene};
pub use pipeline::{convert_unit, run_units, RunSummary};
pub use unit::{ConversionUnit, UnitKind};
