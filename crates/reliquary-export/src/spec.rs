//! Model spec derivation
//!
//! Re-parses an exported GLB container and derives the per-race appearance
//! metadata (`ModelSpec`) from its node names, material/texture chains and
//! the texture files already written for the unit. The derived record drives
//! texture and face variant selection in viewers.

use std::collections::BTreeMap;
use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use reliquary_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::glb::{CHUNK_JSON, GLB_MAGIC, GLB_VERSION};
use crate::gltf::Gltf;

/// Per-image variant metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSpec {
    /// Highest face variant seen among matching head textures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_face: Option<u32>,
    /// Highest texture variant seen among matching files
    pub max_texture: u32,
}

/// Derived per-race appearance record, persisted as `<race>.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSpec {
    /// Highest face variant of the first race-specific head image
    pub max_face: u32,
    /// Highest helm variant among `..HE..` nodes
    pub max_helm: u32,
    /// Highest texture variant of the first race-specific body image
    pub max_texture: u32,
    /// Body texture slot count (body image variants plus the shared base slots)
    pub max_body_texture: u32,
    /// Highest numbered body mesh variant
    pub max_body: u32,
    /// Per-image variant metadata, keyed by lowercased image stem
    pub image_specs: BTreeMap<String, ImageSpec>,
}

/// Body texture slots shared by every race before race-specific ones begin
const SHARED_BODY_SLOTS: u32 = 6;

/// Parse the glTF document out of a GLB container
///
/// Validates the 12-byte header and the leading JSON chunk; any
/// nonconformity is a [`Error::FormatError`].
pub fn read_scene_document(buffer: &[u8]) -> Result<Gltf> {
    if buffer.len() < 20 {
        return Err(Error::format("GLB buffer too short for header"));
    }
    if &buffer[0..4] != GLB_MAGIC {
        return Err(Error::format("bad GLB magic"));
    }

    let mut cursor = Cursor::new(&buffer[4..20]);
    let version = cursor.read_u32::<LittleEndian>()?;
    if version != GLB_VERSION {
        return Err(Error::format(format!("unsupported GLB version {version}")));
    }
    let _total = cursor.read_u32::<LittleEndian>()?;
    let json_length = cursor.read_u32::<LittleEndian>()? as usize;
    let chunk_type = cursor.read_u32::<LittleEndian>()?;
    if chunk_type != CHUNK_JSON {
        return Err(Error::format("first GLB chunk is not JSON"));
    }
    let end = 20usize
        .checked_add(json_length)
        .filter(|&end| end <= buffer.len())
        .ok_or_else(|| Error::format("JSON chunk length exceeds buffer"))?;

    let text = std::str::from_utf8(&buffer[20..end])
        .map_err(|_| Error::format("JSON chunk is not UTF-8"))?;
    serde_json::from_str(text.trim_end_matches(['\0', ' ']))
        .map_err(|e| Error::format(format!("GLB JSON chunk: {e}")))
}

/// Derive the model spec for one exported race
///
/// `texture_files` are the basenames (with extension) of the texture files
/// the extractor wrote alongside the container.
pub fn derive_model_spec(buffer: &[u8], race: &str, texture_files: &[String]) -> Result<ModelSpec> {
    let document = read_scene_document(buffer)?;
    let race = race.to_ascii_lowercase();
    let files: Vec<String> = texture_files.iter().map(|f| stem(f)).collect();

    let mut spec = ModelSpec::default();
    let mut body_image: Option<String> = None;
    let mut texture_seeded = false;
    let mut face_seeded = false;

    for node in &document.nodes {
        let Some(name) = node.name.as_deref() else {
            continue;
        };
        let bytes = name.as_bytes();

        if matches!(bytes.get(3..5), Some(w) if w.eq_ignore_ascii_case(b"HE")) {
            if let Some(helm) = parse_digits(bytes.get(6..8)) {
                spec.max_helm = spec.max_helm.max(helm);
            }
        } else if bytes.get(3) == Some(&b'0') {
            if let Some(body) = parse_digits(bytes.get(3..5)) {
                if body > spec.max_body {
                    spec.max_body = body;
                    if let Some(image) = base_color_stem(&document, node) {
                        body_image = Some(image);
                    }
                }
            }
        }
    }

    for image in &document.images {
        let Some(uri) = image.uri.as_deref() else {
            continue;
        };
        let candidate = stem(uri);
        let image_spec = match_candidate(&candidate, &race, &files);

        let race_specific = candidate.contains(&race);
        let head = candidate.as_bytes().get(3..5) == Some(b"he");
        if race_specific {
            if head {
                if !face_seeded {
                    spec.max_face = image_spec.max_face.unwrap_or(0);
                    face_seeded = true;
                }
            } else if !texture_seeded {
                spec.max_texture = image_spec.max_texture;
                texture_seeded = true;
            }
        }
        spec.image_specs.entry(candidate).or_insert(image_spec);
    }

    spec.max_body_texture = body_image
        .and_then(|name| spec.image_specs.get(&name))
        .map(|s| s.max_texture + SHARED_BODY_SLOTS)
        .unwrap_or(0);
    Ok(spec)
}

/// Variant metadata for one candidate image against the on-disk files
fn match_candidate(candidate: &str, race: &str, files: &[String]) -> ImageSpec {
    let race_specific = candidate.contains(race);
    let alpha = candidate.contains("alpha");
    let prefix_len = if race_specific { 5 } else { 3 };
    let head = candidate.as_bytes().get(3..5) == Some(b"he");

    let Some(prefix) = candidate.get(..prefix_len) else {
        return ImageSpec::default();
    };
    let variant = variant_digit(candidate, alpha);

    let mut spec = ImageSpec::default();
    for file in files {
        if !file.starts_with(prefix)
            || file.contains("alpha") != alpha
            || variant_digit(file, alpha) != variant
        {
            continue;
        }
        if let Some(texture) = texture_number(file, prefix_len) {
            spec.max_texture = spec.max_texture.max(texture);
        }
        if head {
            if let Some(face) = parse_digits(file.as_bytes().get(prefix_len + 2..prefix_len + 3)) {
                spec.max_face = Some(spec.max_face.unwrap_or(0).max(face));
            }
        }
    }
    spec
}

/// Lowercased basename with the extension stripped
fn stem(file: &str) -> String {
    let file = file.rsplit(['/', '\\']).next().unwrap_or(file);
    let stem = file.rsplit_once('.').map_or(file, |(s, _)| s);
    stem.to_ascii_lowercase()
}

/// The variant digit: last stem character, or for alpha files the character
/// just before the `alpha` suffix.
fn variant_digit(stem: &str, alpha: bool) -> Option<char> {
    if alpha {
        stem.strip_suffix("alpha")?.chars().last()
    } else {
        stem.chars().last()
    }
}

/// Texture number between the prefix and the variant digit
///
/// The digit run after the prefix ends with the variant digit, which is
/// stripped before parsing. A run that empties out parses as 0.
fn texture_number(stem: &str, offset: usize) -> Option<u32> {
    let tail = stem.get(offset..)?;
    let mut digits: String = tail.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.pop();
    if digits.is_empty() {
        return Some(0);
    }
    digits.parse().ok()
}

fn parse_digits(window: Option<&[u8]>) -> Option<u32> {
    std::str::from_utf8(window?).ok()?.parse().ok()
}

/// Follow a node's first primitive to its base-color image stem
fn base_color_stem(document: &Gltf, node: &crate::gltf::Node) -> Option<String> {
    let mesh = document.meshes.get(node.mesh?)?;
    let material_index = mesh.primitives.first()?.material?;
    let material = document.materials.get(material_index)?;
    let texture_index = material
        .pbr_metallic_roughness
        .as_ref()?
        .base_color_texture
        .as_ref()?
        .index;
    let image_index = document.textures.get(texture_index)?.source?;
    let uri = document.images.get(image_index)?.uri.as_deref()?;
    Some(stem(uri))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(json: &str) -> Vec<u8> {
        let mut body = json.as_bytes().to_vec();
        while body.len() % 4 != 0 {
            body.push(b' ');
        }
        let mut out = Vec::new();
        out.extend_from_slice(GLB_MAGIC);
        out.extend_from_slice(&GLB_VERSION.to_le_bytes());
        out.extend_from_slice(&((20 + body.len()) as u32).to_le_bytes());
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
        out.extend_from_slice(&body);
        out
    }

    #[test]
    fn test_read_rejects_bad_magic() {
        let mut buffer = wrap(r#"{"asset":{"version":"2.0"}}"#);
        buffer[0] = b'x';
        assert!(matches!(
            read_scene_document(&buffer),
            Err(Error::FormatError { .. })
        ));
    }

    #[test]
    fn test_read_rejects_bad_version() {
        let mut buffer = wrap(r#"{"asset":{"version":"2.0"}}"#);
        buffer[4] = 1;
        assert!(matches!(
            read_scene_document(&buffer),
            Err(Error::FormatError { .. })
        ));
    }

    #[test]
    fn test_read_rejects_truncated_chunk() {
        let mut buffer = wrap(r#"{"asset":{"version":"2.0"}}"#);
        // Claim more JSON than the buffer holds.
        buffer[12..16].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            read_scene_document(&buffer),
            Err(Error::FormatError { .. })
        ));
    }

    #[test]
    fn test_read_rejects_zero_length_chunk() {
        let mut buffer = wrap(r#"{"asset":{"version":"2.0"}}"#);
        buffer[12..16].copy_from_slice(&0u32.to_le_bytes());
        assert!(matches!(
            read_scene_document(&buffer),
            Err(Error::FormatError { .. })
        ));
    }

    #[test]
    fn test_read_accepts_chunk_spanning_remainder() {
        let buffer = wrap(r#"{"asset":{"version":"2.0"}}"#);
        let doc = read_scene_document(&buffer).unwrap();
        assert_eq!(doc.asset.version, "2.0");
    }

    #[test]
    fn test_derive_tracks_helm_and_body() {
        let json = r#"{
            "asset": {"version": "2.0"},
            "nodes": [
                {"name": "BARHE001_DMSPRITEDEF"},
                {"name": "BARHE002_DMSPRITEDEF"},
                {"name": "BAR01_DMSPRITEDEF", "mesh": 0},
                {"name": "BAR02_DMSPRITEDEF", "mesh": 1}
            ],
            "meshes": [
                {"primitives": [{"attributes": {}, "material": 0}]},
                {"primitives": [{"attributes": {}, "material": 1}]}
            ],
            "materials": [
                {"pbrMetallicRoughness": {"baseColorTexture": {"index": 0}}},
                {"pbrMetallicRoughness": {"baseColorTexture": {"index": 1}}}
            ],
            "textures": [{"source": 0}, {"source": 1}],
            "images": [
                {"uri": "bar0001.png"},
                {"uri": "bar0002.png"}
            ]
        }"#;
        let files = vec![
            "bar0001.png".to_string(),
            "bar0011.png".to_string(),
            "bar0002.png".to_string(),
            "bar0012.png".to_string(),
            "bar0022.png".to_string(),
        ];
        let spec = derive_model_spec(&wrap(json), "bar", &files).unwrap();

        // Helm variants come from node names, body from the numbered meshes.
        assert_eq!(spec.max_helm, 2);
        assert_eq!(spec.max_body, 2);
        // bar0001 matches bar0011 (same piece digit 1): textures 0 and 1.
        assert_eq!(spec.image_specs["bar0001"].max_texture, 1);
        // bar0002 matches bar0012 and bar0022: textures up to 2.
        assert_eq!(spec.image_specs["bar0002"].max_texture, 2);
        // Seeded by the first race-specific non-head image, bar0001.
        assert_eq!(spec.max_texture, 1);
        // Body mesh BAR02 recorded bar0002, plus the shared slots.
        assert_eq!(spec.max_body_texture, 2 + SHARED_BODY_SLOTS);
    }

    #[test]
    fn test_derive_head_image_gets_max_face() {
        let json = r#"{
            "asset": {"version": "2.0"},
            "images": [{"uri": "barhe0001.png"}]
        }"#;
        let files = vec![
            "barhe0001.png".to_string(),
            "barhe0011.png".to_string(),
            "barhe0021.png".to_string(),
        ];
        let spec = derive_model_spec(&wrap(json), "bar", &files).unwrap();
        assert_eq!(spec.image_specs["barhe0001"].max_face, Some(2));
        assert_eq!(spec.max_face, 2);
    }

    #[test]
    fn test_derive_alpha_files_match_separately() {
        let json = r#"{
            "asset": {"version": "2.0"},
            "images": [{"uri": "clk1alpha.png"}]
        }"#;
        let files = vec![
            "clk1alpha.png".to_string(),
            "clk21alpha.png".to_string(),
            "clk21.png".to_string(),
        ];
        let spec = derive_model_spec(&wrap(json), "bar", &files).unwrap();
        // Shared (non-race) prefix is 3 chars; the alpha variant digit sits
        // before the suffix, and plain files never match an alpha candidate.
        assert_eq!(spec.image_specs["clk1alpha"].max_texture, 2);
    }

    #[test]
    fn test_serialized_shape_is_camel_case() {
        let spec = ModelSpec {
            max_face: 2,
            max_helm: 1,
            max_texture: 3,
            max_body_texture: 9,
            max_body: 2,
            image_specs: BTreeMap::new(),
        };
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["maxFace"], 2);
        assert_eq!(value["maxBodyTexture"], 9);
        assert!(value.get("max_face").is_none());
    }
}
