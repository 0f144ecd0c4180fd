//! Skeleton transform propagation
//!
//! Walks the bone entry list depth-first from the root, computing a
//! world-space shift and rotation for every reachable bone. Shifts compose
//! normally (rotate by the parent frame, then translate), but rotations
//! compose by adding Euler angle vectors in Y-X-Z order. That additive rule
//! is not a proper rotation composition; the source renderer behaves this
//! way and exported geometry must match it bit-for-bit, so do not "fix" it.

use reliquary_core::{Error, Euler, Result, Vec3};
use reliquary_fragments::{BoneEntry, FragmentTable};

use std::f32::consts::FRAC_PI_2;

/// World-space transform of one bone, valid once its traversal step ran
#[derive(Debug, Clone)]
pub struct BoneTransform {
    /// Piece track name
    pub name: String,
    /// World-space shift
    pub shift: Vec3,
    /// World-space rotation (Y-X-Z Euler)
    pub rot: Euler,
}

/// Write-once world transforms, indexed like the bone entry list
#[derive(Debug, Default)]
pub struct SkeletonPose {
    bones: Vec<Option<BoneTransform>>,
}

impl SkeletonPose {
    /// Transform of a bone entry, if traversal reached it
    pub fn get(&self, entry: usize) -> Option<&BoneTransform> {
        self.bones.get(entry).and_then(|b| b.as_ref())
    }

    /// Number of entries traversal actually visited
    pub fn visited_count(&self) -> usize {
        self.bones.iter().filter(|b| b.is_some()).count()
    }
}

/// Walk a skeleton from its root entry, producing world transforms
///
/// `entries[0]` is the root and starts from the identity frame. A bone
/// entry reached twice means the hierarchy is malformed and fails with
/// [`Error::CycleDetected`] instead of recursing unboundedly.
pub fn walk_skeleton(table: &FragmentTable, entries: &[BoneEntry]) -> Result<SkeletonPose> {
    let mut pose = SkeletonPose {
        bones: vec![None; entries.len()],
    };
    if entries.is_empty() {
        return Ok(pose);
    }
    walk_entry(table, entries, 0, Vec3::ZERO, Euler::IDENTITY, &mut pose)?;
    Ok(pose)
}

fn walk_entry(
    table: &FragmentTable,
    entries: &[BoneEntry],
    entry: u32,
    parent_shift: Vec3,
    parent_rot: Euler,
    pose: &mut SkeletonPose,
) -> Result<()> {
    let bone = entries.get(entry as usize).ok_or_else(|| {
        Error::corrupt(format!("bone entry {entry} out of range ({})", entries.len()))
    })?;
    if pose.bones[entry as usize].is_some() {
        return Err(Error::CycleDetected { entry });
    }

    let piece_ref = table.skeleton_piece_ref(bone.piece_ref)?;
    let piece = table.skeleton_piece_track(piece_ref.piece_track)?;

    let raw_shift = Vec3::from_fixed(
        piece.shift_x,
        piece.shift_y,
        piece.shift_z,
        piece.shift_denominator as f32,
    );
    let shift = parent_rot.apply(raw_shift).add(parent_shift);

    // Rotation triples are fractions of a quarter turn per axis. The child
    // vector is added to the parent rotation re-expressed as a vector.
    let raw_rot = Vec3::from_fixed(
        piece.rotate_x,
        piece.rotate_y,
        piece.rotate_z,
        piece.rotate_denominator as f32,
    )
    .scale(FRAC_PI_2);
    let rot = Euler::from_vector(raw_rot.add(parent_rot.to_vector()));

    pose.bones[entry as usize] = Some(BoneTransform {
        name: piece.name.clone(),
        shift,
        rot,
    });

    for &child in &bone.children {
        walk_entry(table, entries, child, shift, rot, pose)?;
    }
    Ok(())
}
