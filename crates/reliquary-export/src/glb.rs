//! GLB (binary glTF) scene exporter
//!
//! Serializes an assembled scene into a single GLB buffer: a 12-byte
//! header, a length-prefixed JSON chunk describing the scene, and a padded
//! BIN chunk holding vertex data. Images are referenced by URI; the texture
//! extractor writes the files themselves.

use std::collections::HashMap;
use std::sync::Arc;

use reliquary_core::{Error, Result};
use reliquary_scene::{MeshNode, Scene, SceneNode, SceneNodeKind};
use serde_json::json;

use crate::gltf::*;

/// GLB magic bytes
pub const GLB_MAGIC: &[u8; 4] = b"glTF";
/// GLB container version
pub const GLB_VERSION: u32 = 2;
/// JSON chunk type tag
pub const CHUNK_JSON: u32 = 0x4E4F_534A;
/// BIN chunk type tag
pub const CHUNK_BIN: u32 = 0x004E_4942;

/// GLB export options
#[derive(Debug, Clone)]
pub struct GlbExportOptions {
    /// Embed image bytes into the container (unsupported; textures are
    /// written separately by the extractor)
    pub embed_images: bool,
    /// Produce a binary container rather than a bare JSON document
    pub binary: bool,
}

impl Default for GlbExportOptions {
    fn default() -> Self {
        Self {
            embed_images: false,
            binary: true,
        }
    }
}

/// GLB exporter
///
/// One exporter handles one scene at a time; accessor and buffer state is
/// reset per export.
pub struct GlbExporter {
    options: GlbExportOptions,
    binary_data: Vec<u8>,
    accessors: Vec<Accessor>,
    buffer_views: Vec<BufferView>,
}

impl GlbExporter {
    /// Create a new exporter
    pub fn new(options: GlbExportOptions) -> Self {
        Self {
            options,
            binary_data: Vec::new(),
            accessors: Vec::new(),
            buffer_views: Vec::new(),
        }
    }

    /// Export a scene to a GLB buffer (or JSON bytes when `binary` is off)
    ///
    /// Fails with [`Error::ExportEmpty`] when the scene holds no mesh node.
    pub fn export_scene(&mut self, scene: &Scene) -> Result<Vec<u8>> {
        if self.options.embed_images {
            return Err(Error::Unsupported {
                message: "image embedding is not supported; textures are external files".into(),
            });
        }

        let document = self.build_document(scene)?;
        let text = serde_json::to_string(&document)?;

        if !self.options.binary {
            return Ok(text.into_bytes());
        }
        Ok(self.wrap_container(text.into_bytes()))
    }

    /// Build the glTF document for a scene
    fn build_document(&mut self, scene: &Scene) -> Result<Gltf> {
        self.binary_data.clear();
        self.accessors.clear();
        self.buffer_views.clear();

        if scene.mesh_count() == 0 {
            return Err(Error::ExportEmpty);
        }

        let mut doc = Gltf {
            asset: Asset {
                version: "2.0".to_string(),
                generator: Some("reliquary GLB exporter".to_string()),
            },
            ..Default::default()
        };
        let mut dedupe = AssetIndices::default();

        let mut roots = Vec::new();
        for node in &scene.nodes {
            let index = self.add_node(node, &mut doc, &mut dedupe)?;
            roots.push(index);
        }

        let extras = if scene.placements.is_empty() {
            None
        } else {
            Some(json!({ "objectLocations": scene.placements }))
        };

        doc.scene = Some(0);
        doc.scenes = vec![crate::gltf::Scene {
            name: None,
            nodes: roots,
            extras,
        }];
        doc.accessors = std::mem::take(&mut self.accessors);
        doc.buffer_views = std::mem::take(&mut self.buffer_views);
        doc.buffers = vec![Buffer {
            uri: None,
            byte_length: self.binary_data.len(),
        }];
        Ok(doc)
    }

    /// Add a scene node (mesh or group), returning its node index
    fn add_node(
        &mut self,
        node: &SceneNode,
        doc: &mut Gltf,
        dedupe: &mut AssetIndices,
    ) -> Result<usize> {
        match &node.kind {
            SceneNodeKind::Mesh(mesh) => {
                let mesh_index = self.add_mesh(mesh, doc, dedupe)?;
                let extras = node.variant.as_ref().map(|helm| json!({ "helm": helm }));
                doc.nodes.push(Node {
                    name: Some(node.name.clone()),
                    mesh: Some(mesh_index),
                    children: Vec::new(),
                    extras,
                });
                Ok(doc.nodes.len() - 1)
            }
            SceneNodeKind::Group(children) => {
                let mut child_indices = Vec::with_capacity(children.len());
                for child in children {
                    child_indices.push(self.add_node(child, doc, dedupe)?);
                }
                doc.nodes.push(Node {
                    name: Some(node.name.clone()),
                    mesh: None,
                    children: child_indices,
                    extras: None,
                });
                Ok(doc.nodes.len() - 1)
            }
        }
    }

    /// Add a mesh with one primitive, returning its mesh index
    fn add_mesh(
        &mut self,
        mesh: &MeshNode,
        doc: &mut Gltf,
        dedupe: &mut AssetIndices,
    ) -> Result<usize> {
        let mut attributes = std::collections::BTreeMap::new();

        let position_accessor = self.add_positions(&mesh.positions);
        attributes.insert("POSITION".to_string(), position_accessor);

        if !mesh.normals.is_empty() {
            let normal_accessor = self.add_vec3s(&mesh.normals);
            attributes.insert("NORMAL".to_string(), normal_accessor);
        }
        if !mesh.uvs.is_empty() {
            let uv_accessor = self.add_vec2s(&mesh.uvs);
            attributes.insert("TEXCOORD_0".to_string(), uv_accessor);
        }
        if let Some(skin) = &mesh.skin {
            let (joints, weights) = self.add_skin(skin);
            attributes.insert("JOINTS_0".to_string(), joints);
            attributes.insert("WEIGHTS_0".to_string(), weights);
        }

        let indices_accessor = self.add_indices(&mesh.faces);
        let material = mesh
            .material
            .as_ref()
            .map(|m| Self::add_material(m, doc, dedupe));

        doc.meshes.push(Mesh {
            name: Some(mesh.name.clone()),
            primitives: vec![Primitive {
                attributes,
                indices: Some(indices_accessor),
                material,
                mode: Some(MODE_TRIANGLES),
            }],
        });
        Ok(doc.meshes.len() - 1)
    }

    /// Add a material, deduplicated by cache identity
    fn add_material(
        material: &Arc<reliquary_scene::MaterialAsset>,
        doc: &mut Gltf,
        dedupe: &mut AssetIndices,
    ) -> usize {
        let key = Arc::as_ptr(material) as usize;
        if let Some(&index) = dedupe.materials.get(&key) {
            return index;
        }

        let base_color_texture = material.image.as_ref().map(|image| {
            let image_key = Arc::as_ptr(image) as usize;
            let image_index = *dedupe.images.entry(image_key).or_insert_with(|| {
                doc.images.push(Image {
                    name: Some(image.name.clone()),
                    uri: Some(image.file.clone()),
                });
                doc.images.len() - 1
            });
            doc.textures.push(Texture {
                source: Some(image_index),
            });
            TextureRef {
                index: doc.textures.len() - 1,
            }
        });

        doc.materials.push(Material {
            name: Some(material.name.clone()),
            pbr_metallic_roughness: Some(PbrMetallicRoughness {
                base_color_texture,
                base_color_factor: None,
                metallic_factor: Some(0.0),
                roughness_factor: Some(1.0),
            }),
        });
        let index = doc.materials.len() - 1;
        dedupe.materials.insert(key, index);
        index
    }

    /// Add position data with min/max bounds
    fn add_positions(&mut self, positions: &[[f32; 3]]) -> usize {
        let offset = self.binary_data.len();
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];

        for position in positions {
            for i in 0..3 {
                self.binary_data.extend_from_slice(&position[i].to_le_bytes());
                min[i] = min[i].min(position[i]);
                max[i] = max[i].max(position[i]);
            }
        }

        self.add_accessor(
            offset,
            positions.len(),
            "VEC3",
            COMPONENT_TYPE_FLOAT,
            Some(min.to_vec()),
            Some(max.to_vec()),
            Some(TARGET_ARRAY_BUFFER),
        )
    }

    fn add_vec3s(&mut self, values: &[[f32; 3]]) -> usize {
        let offset = self.binary_data.len();
        for value in values {
            for component in value {
                self.binary_data.extend_from_slice(&component.to_le_bytes());
            }
        }
        self.add_accessor(
            offset,
            values.len(),
            "VEC3",
            COMPONENT_TYPE_FLOAT,
            None,
            None,
            Some(TARGET_ARRAY_BUFFER),
        )
    }

    fn add_vec2s(&mut self, values: &[[f32; 2]]) -> usize {
        let offset = self.binary_data.len();
        for value in values {
            for component in value {
                self.binary_data.extend_from_slice(&component.to_le_bytes());
            }
        }
        self.add_accessor(
            offset,
            values.len(),
            "VEC2",
            COMPONENT_TYPE_FLOAT,
            None,
            None,
            Some(TARGET_ARRAY_BUFFER),
        )
    }

    /// Add single-influence joint and weight attributes (VEC4 per glTF)
    fn add_skin(&mut self, skin: &[reliquary_scene::VertexSkin]) -> (usize, usize) {
        let joints_offset = self.binary_data.len();
        for vertex in skin {
            self.binary_data.extend_from_slice(&vertex.joint.to_le_bytes());
            self.binary_data.extend_from_slice(&[0u8; 6]);
        }
        let joints = self.add_accessor(
            joints_offset,
            skin.len(),
            "VEC4",
            COMPONENT_TYPE_UNSIGNED_SHORT,
            None,
            None,
            Some(TARGET_ARRAY_BUFFER),
        );

        let weights_offset = self.binary_data.len();
        for vertex in skin {
            self.binary_data.extend_from_slice(&vertex.weight.to_le_bytes());
            self.binary_data.extend_from_slice(&0f32.to_le_bytes());
            self.binary_data.extend_from_slice(&0f32.to_le_bytes());
            self.binary_data.extend_from_slice(&0f32.to_le_bytes());
        }
        let weights = self.add_accessor(
            weights_offset,
            skin.len(),
            "VEC4",
            COMPONENT_TYPE_FLOAT,
            None,
            None,
            Some(TARGET_ARRAY_BUFFER),
        );
        (joints, weights)
    }

    /// Add index data
    fn add_indices(&mut self, faces: &[[u32; 3]]) -> usize {
        let offset = self.binary_data.len();
        for face in faces {
            for &index in face {
                self.binary_data.extend_from_slice(&index.to_le_bytes());
            }
        }
        self.add_accessor(
            offset,
            faces.len() * 3,
            "SCALAR",
            COMPONENT_TYPE_UNSIGNED_INT,
            None,
            None,
            Some(TARGET_ELEMENT_ARRAY_BUFFER),
        )
    }

    /// Add accessor and buffer view for the bytes appended since `offset`
    #[allow(clippy::too_many_arguments)]
    fn add_accessor(
        &mut self,
        offset: usize,
        count: usize,
        accessor_type: &str,
        component_type: u32,
        min: Option<Vec<f32>>,
        max: Option<Vec<f32>>,
        target: Option<u32>,
    ) -> usize {
        let byte_length = self.binary_data.len() - offset;

        // Keep every view 4-byte aligned for the next one.
        while self.binary_data.len() % 4 != 0 {
            self.binary_data.push(0);
        }

        let buffer_view_index = self.buffer_views.len();
        self.buffer_views.push(BufferView {
            buffer: 0,
            byte_offset: Some(offset),
            byte_length,
            target,
        });

        let accessor_index = self.accessors.len();
        self.accessors.push(Accessor {
            buffer_view: Some(buffer_view_index),
            byte_offset: None,
            component_type,
            count,
            accessor_type: accessor_type.to_string(),
            max,
            min,
        });
        accessor_index
    }

    /// Wrap the JSON document and binary payload into a GLB container
    fn wrap_container(&self, mut json_bytes: Vec<u8>) -> Vec<u8> {
        // Chunks are padded to 4 bytes: spaces for JSON, zeros for BIN.
        while json_bytes.len() % 4 != 0 {
            json_bytes.push(0x20);
        }
        let mut bin = self.binary_data.clone();
        while bin.len() % 4 != 0 {
            bin.push(0);
        }

        let total = 12 + 8 + json_bytes.len() + 8 + bin.len();
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(GLB_MAGIC);
        out.extend_from_slice(&GLB_VERSION.to_le_bytes());
        out.extend_from_slice(&(total as u32).to_le_bytes());

        out.extend_from_slice(&(json_bytes.len() as u32).to_le_bytes());
        out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
        out.extend_from_slice(&json_bytes);

        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
        out.extend_from_slice(&bin);
        out
    }
}

/// Per-export dedupe maps keyed by cache instance identity
#[derive(Default)]
struct AssetIndices {
    materials: HashMap<usize, usize>,
    images: HashMap<usize, usize>,
}
