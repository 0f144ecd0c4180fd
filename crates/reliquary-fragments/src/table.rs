//! Fragment table arena and typed graph resolver
//!
//! The table is immutable for the duration of one conversion unit and
//! iterates in insertion order, which downstream scene assembly relies on
//! for deterministic output.

use reliquary_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::fragment::*;

/// Index-addressed arena of fragments
///
/// Indices are dense and assigned in insertion order; `lookup` resolves a
/// weak handle, and the typed accessors additionally check the type tag.
/// Serializes transparently as the fragment array, the shape the archive
/// decoder emits.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FragmentTable {
    entries: Vec<Fragment>,
}

impl FragmentTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment, returning its index
    pub fn push(&mut self, fragment: Fragment) -> u32 {
        let index = self.entries.len() as u32;
        self.entries.push(fragment);
        index
    }

    /// Number of fragments in the table
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a fragment index
    pub fn lookup(&self, index: u32) -> Result<&Fragment> {
        self.entries
            .get(index as usize)
            .ok_or(Error::NotFound { index })
    }

    /// Iterate fragments with their indices, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Fragment)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, f)| (i as u32, f))
    }

    /// Scan the table for fragments matching a predicate, preserving order
    pub fn scan<'a, P>(&'a self, mut predicate: P) -> impl Iterator<Item = (u32, &'a Fragment)>
    where
        P: FnMut(&Fragment) -> bool + 'a,
    {
        self.iter().filter(move |(_, f)| predicate(f))
    }

    // Typed accessors. Each checks the tag before exposing variant fields.

    pub fn mesh(&self, index: u32) -> Result<&MeshFragment> {
        match self.lookup(index)? {
            Fragment::Mesh(m) => Ok(m),
            other => Err(mismatch(index, "Mesh", other)),
        }
    }

    pub fn mesh_ref(&self, index: u32) -> Result<&MeshRefFragment> {
        match self.lookup(index)? {
            Fragment::MeshRef(m) => Ok(m),
            other => Err(mismatch(index, "MeshRef", other)),
        }
    }

    pub fn static_model_ref(&self, index: u32) -> Result<&StaticModelRefFragment> {
        match self.lookup(index)? {
            Fragment::StaticModelRef(m) => Ok(m),
            other => Err(mismatch(index, "StaticModelRef", other)),
        }
    }

    pub fn skeleton_track_ref(&self, index: u32) -> Result<&SkeletonTrackRefFragment> {
        match self.lookup(index)? {
            Fragment::SkeletonTrackRef(s) => Ok(s),
            other => Err(mismatch(index, "SkeletonTrackRef", other)),
        }
    }

    pub fn skeleton_track(&self, index: u32) -> Result<&SkeletonTrackFragment> {
        match self.lookup(index)? {
            Fragment::SkeletonTrack(s) => Ok(s),
            other => Err(mismatch(index, "SkeletonTrack", other)),
        }
    }

    pub fn skeleton_piece_ref(&self, index: u32) -> Result<&SkeletonPieceRefFragment> {
        match self.lookup(index)? {
            Fragment::SkeletonPieceRef(s) => Ok(s),
            other => Err(mismatch(index, "SkeletonPieceRef", other)),
        }
    }

    pub fn skeleton_piece_track(&self, index: u32) -> Result<&SkeletonPieceTrackFragment> {
        match self.lookup(index)? {
            Fragment::SkeletonPieceTrack(s) => Ok(s),
            other => Err(mismatch(index, "SkeletonPieceTrack", other)),
        }
    }

    pub fn material(&self, index: u32) -> Result<&MaterialFragment> {
        match self.lookup(index)? {
            Fragment::Material(m) => Ok(m),
            other => Err(mismatch(index, "Material", other)),
        }
    }

    pub fn texture(&self, index: u32) -> Result<&TextureFragment> {
        match self.lookup(index)? {
            Fragment::Texture(t) => Ok(t),
            other => Err(mismatch(index, "Texture", other)),
        }
    }
}

fn mismatch(index: u32, expected: &'static str, found: &Fragment) -> Error {
    Error::TypeMismatch {
        index,
        expected,
        found: found.type_name(),
    }
}

impl FromIterator<Fragment> for FragmentTable {
    fn from_iter<T: IntoIterator<Item = Fragment>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_table() -> FragmentTable {
        let mut table = FragmentTable::new();
        table.push(Fragment::Mesh(MeshFragment {
            name: "BAR_DMSPRITEDEF".into(),
            ..Default::default()
        }));
        table.push(Fragment::MeshRef(MeshRefFragment { mesh: 0 }));
        table.push(Fragment::Texture(TextureFragment {
            name: "BARHE0001".into(),
            file: "barhe0001.png".into(),
        }));
        table
    }

    #[test]
    fn test_lookup_missing_index() {
        let table = make_table();
        let err = table.lookup(99).unwrap_err();
        assert!(matches!(err, Error::NotFound { index: 99 }));
    }

    #[test]
    fn test_typed_accessor_mismatch() {
        let table = make_table();
        let err = table.mesh(1).unwrap_err();
        match err {
            Error::TypeMismatch {
                index,
                expected,
                found,
            } => {
                assert_eq!(index, 1);
                assert_eq!(expected, "Mesh");
                assert_eq!(found, "MeshRef");
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_typed_accessor_hit() {
        let table = make_table();
        assert_eq!(table.mesh(0).unwrap().name, "BAR_DMSPRITEDEF");
        assert_eq!(table.mesh_ref(1).unwrap().mesh, 0);
    }

    #[test]
    fn test_scan_preserves_insertion_order() {
        let mut table = make_table();
        table.push(Fragment::Mesh(MeshFragment {
            name: "second".into(),
            ..Default::default()
        }));

        let meshes: Vec<u32> = table
            .scan(|f| matches!(f, Fragment::Mesh(_)))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(meshes, vec![0, 3]);
    }
}
