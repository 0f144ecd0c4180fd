//! Per-unit material and image caches
//!
//! Both caches are keyed by source fragment index, so the same fragment
//! always resolves to the identical `Arc` within one conversion unit. The
//! caches are created with the unit and dropped with it; nothing is shared
//! across units.

use std::collections::HashMap;
use std::sync::Arc;

/// A resolved texture image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// Image name from the texture fragment
    pub name: String,
    /// File basename written by the texture extractor, referenced by URI
    pub file: String,
}

/// A resolved material
#[derive(Debug, Clone)]
pub struct MaterialAsset {
    /// Material name from the material fragment
    pub name: String,
    /// Base color image, shared through the image cache
    pub image: Option<Arc<ImageAsset>>,
}

/// Cache of constructed materials, keyed by material fragment index
pub type MaterialCache = HashMap<u32, Arc<MaterialAsset>>;

/// Cache of constructed images, keyed by texture fragment index
pub type ImageCache = HashMap<u32, Arc<ImageAsset>>;

/// Both caches for one conversion unit
#[derive(Debug, Default)]
pub struct UnitCaches {
    pub materials: MaterialCache,
    pub images: ImageCache,
}

impl UnitCaches {
    pub fn new() -> Self {
        Self::default()
    }
}
