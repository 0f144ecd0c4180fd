//! Conversion unit classification

use reliquary_core::{Error, Result};
use reliquary_fragments::FragmentTable;

/// What kind of content a source archive holds
///
/// The kind decides which scene builder runs and where outputs land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// Zone geometry plus a companion object-placement table
    Zone,
    /// Placeable object models (`*_obj`, equipment archives)
    Object,
    /// Character models, one or more races per archive
    Character,
}

impl UnitKind {
    /// Classify an archive by its file name
    ///
    /// `_chr` and equipment archives hold characters, `_obj` holds
    /// placeable objects, anything else is zone geometry.
    pub fn from_file_name(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        if name.contains("_chr") || name.contains("equip") {
            UnitKind::Character
        } else if name.contains("_obj") {
            UnitKind::Object
        } else {
            UnitKind::Zone
        }
    }

    /// Parse an explicit kind tag
    ///
    /// Unlike file-name classification, a tag the caller spells out has no
    /// fallback; an unrecognized one is fatal.
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            "zone" => Ok(UnitKind::Zone),
            "object" => Ok(UnitKind::Object),
            "character" => Ok(UnitKind::Character),
            other => Err(Error::UnknownUnitType { kind: other.to_string() }),
        }
    }
}

/// One source archive, decoded into fragment tables and ready to convert
#[derive(Debug)]
pub struct ConversionUnit {
    /// Archive name without extension, e.g. `qeynos` or `global_chr`
    pub name: String,
    pub kind: UnitKind,
    /// The archive's fragment table
    pub table: FragmentTable,
    /// Companion object-placement table (zones only)
    pub objects: Option<FragmentTable>,
    /// Basenames of the texture files the extractor wrote for this unit
    pub texture_files: Vec<String>,
}

impl ConversionUnit {
    /// A unit classified from its archive file name
    pub fn new(name: impl Into<String>, table: FragmentTable) -> Self {
        let name = name.into();
        let kind = UnitKind::from_file_name(&name);
        Self {
            name,
            kind,
            table,
            objects: None,
            texture_files: Vec::new(),
        }
    }

    /// Short name with the kind suffix stripped, used for output directories
    pub fn base_name(&self) -> &str {
        self.name
            .strip_suffix("_obj")
            .or_else(|| self.name.strip_suffix("_chr"))
            .unwrap_or(&self.name)
    }

    /// Equipment archives route their models to the item directory
    pub fn is_equipment(&self) -> bool {
        self.name.to_ascii_lowercase().contains("equip")
    }
}
