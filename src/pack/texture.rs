use image::{Rgba, Rgba32FImage, RgbaImage};

use crate::convention::CoordConvention;
use crate::foundation::core::SnapshotSet;
use crate::pack::partition::GroupPartition;

/// The two pixel grids of one per-frame bake: offsets as unrestricted float,
/// normals normalized to [0,1]. Width is the active vertex count, height the
/// frame count.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameGrids {
    pub offsets: Rgba32FImage,
    pub normals: RgbaImage,
}

/// Packs per-frame, per-vertex offsets and normals into the two grids.
///
/// Row assignment is reverse chronological: the snapshot processed last in
/// sequence lands on row 0, so the decode shader addresses time as
/// "rows from the end". The reversal is an explicit contract with the
/// external decoder, mirrored by the deviation scan.
pub fn pack_frames(
    set: &SnapshotSet,
    scale: u32,
    partition: &GroupPartition,
    convention: CoordConvention,
) -> FrameGrids {
    let width = partition.active_count();
    let height = set.len() as u32;
    let base = set.base();
    let scale = scale as f32;

    let mut offsets = Rgba32FImage::new(width, height);
    let mut normals = RgbaImage::new(width, height);

    for (row, snap) in set.snapshots.iter().rev().enumerate() {
        let row = row as u32;
        for sample in &snap.samples {
            let Some(col) = partition.column(sample.index) else {
                continue;
            };
            let delta = sample.position - base.samples[sample.index.as_usize()].position;
            let d = convention.remap(delta) * scale;
            offsets.put_pixel(col, row, Rgba([d.x, d.y, d.z, 1.0]));

            let n = convention.remap(sample.normal);
            normals.put_pixel(col, row, Rgba([unorm(n.x), unorm(n.y), unorm(n.z), 255]));
        }
    }

    FrameGrids { offsets, normals }
}

/// [-1,1] component to an 8-bit [0,1] channel via `(c + 1) * 0.5`.
fn unorm(c: f32) -> u8 {
    (((c + 1.0) * 0.5).clamp(0.0, 1.0) * 255.0).round() as u8
}
