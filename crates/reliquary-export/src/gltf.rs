//! glTF 2.0 document structures
//!
//! Serde model of the subset of glTF this exporter emits and the model-spec
//! deriver reads back. Field names follow the glTF JSON schema (camelCase
//! renames where Rust naming differs).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// glTF 2.0 root structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Gltf {
    pub asset: Asset,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub scene: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub scenes: Vec<Scene>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub nodes: Vec<Node>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub meshes: Vec<Mesh>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub materials: Vec<Material>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub textures: Vec<Texture>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub images: Vec<Image>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub accessors: Vec<Accessor>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        default,
        rename = "bufferViews"
    )]
    pub buffer_views: Vec<BufferView>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub buffers: Vec<Buffer>,
}

/// glTF asset metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Asset {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub generator: Option<String>,
}

/// glTF scene
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    pub nodes: Vec<usize>,
    /// Scene-level metadata (zone object placements)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub extras: Option<Value>,
}

/// glTF node
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Node {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mesh: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<usize>,
    /// Node-level metadata (helm variant tag)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub extras: Option<Value>,
}

/// glTF mesh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

/// glTF mesh primitive
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Primitive {
    pub attributes: std::collections::BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub indices: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub material: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mode: Option<u32>,
}

/// glTF material
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Material {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        rename = "pbrMetallicRoughness"
    )]
    pub pbr_metallic_roughness: Option<PbrMetallicRoughness>,
}

/// PBR metallic roughness material
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PbrMetallicRoughness {
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        rename = "baseColorTexture"
    )]
    pub base_color_texture: Option<TextureRef>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        rename = "baseColorFactor"
    )]
    pub base_color_factor: Option<[f32; 4]>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        rename = "metallicFactor"
    )]
    pub metallic_factor: Option<f32>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        rename = "roughnessFactor"
    )]
    pub roughness_factor: Option<f32>,
}

/// Reference from a material to a texture slot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextureRef {
    pub index: usize,
}

/// glTF texture (binds an image source)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Texture {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source: Option<usize>,
}

/// glTF image, referenced by URI (images are never embedded)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Image {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub uri: Option<String>,
}

/// glTF accessor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Accessor {
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        rename = "bufferView"
    )]
    pub buffer_view: Option<usize>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        rename = "byteOffset"
    )]
    pub byte_offset: Option<usize>,
    #[serde(rename = "componentType")]
    pub component_type: u32,
    pub count: usize,
    #[serde(rename = "type")]
    pub accessor_type: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub max: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub min: Option<Vec<f32>>,
}

/// glTF buffer view
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BufferView {
    pub buffer: usize,
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        rename = "byteOffset"
    )]
    pub byte_offset: Option<usize>,
    #[serde(rename = "byteLength")]
    pub byte_length: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target: Option<u32>,
}

/// glTF buffer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Buffer {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub uri: Option<String>,
    #[serde(rename = "byteLength")]
    pub byte_length: usize,
}

// glTF component type constants
pub const COMPONENT_TYPE_UNSIGNED_SHORT: u32 = 5123;
pub const COMPONENT_TYPE_UNSIGNED_INT: u32 = 5125;
pub const COMPONENT_TYPE_FLOAT: u32 = 5126;

// glTF buffer view target constants
pub const TARGET_ARRAY_BUFFER: u32 = 34962;
pub const TARGET_ELEMENT_ARRAY_BUFFER: u32 = 34963;

// glTF primitive mode constants
pub const MODE_TRIANGLES: u32 = 4;
