use glam::Vec3;

use crate::foundation::error::{VatError, VatResult};

/// Hard ceiling on merged vertex count per encode pass.
pub const MAX_VERTICES: u32 = 8192;
/// Hard ceiling on sampled frame count per encode pass.
pub const MAX_FRAMES: u32 = 8192;
/// Hard ceiling on shape keys packed per encode pass.
pub const MAX_SHAPE_KEYS: u8 = 4;
/// Hardware ceiling on UV layers per mesh.
pub const MAX_UV_LAYERS: u8 = 8;

/// Opaque per-vertex handle, bound by the mesh collaborator at snapshot
/// collection time. The same handle addresses the same logical vertex in
/// every snapshot of one pass.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct VertexIndex(pub u32);

impl VertexIndex {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// One vertex of one snapshot: world-space position and vertex normal.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VertexSample {
    pub index: VertexIndex,
    pub position: Vec3,
    pub normal: Vec3,
}

/// One frame or one shape key: every vertex, ordered by handle.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Snapshot {
    pub samples: Vec<VertexSample>,
}

impl Snapshot {
    pub fn vertex_count(&self) -> u32 {
        self.samples.len() as u32
    }
}

/// Ordered snapshot sequence for one encode pass. The snapshot at position 0
/// is the base reference: it only ever acts as the subtrahend of a delta,
/// never as a delta source.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SnapshotSet {
    pub snapshots: Vec<Snapshot>,
}

impl SnapshotSet {
    pub fn validate(&self) -> VatResult<()> {
        if self.snapshots.len() < 2 {
            return Err(VatError::precondition(
                "at least two snapshots are required (base plus one deformed)",
            ));
        }
        let base_count = self.base().samples.len();
        for (s, snap) in self.snapshots.iter().enumerate() {
            if snap.samples.len() != base_count {
                return Err(VatError::precondition(format!(
                    "snapshot {s} has {} vertices, base has {base_count}",
                    snap.samples.len()
                )));
            }
            for (i, sample) in snap.samples.iter().enumerate() {
                if sample.index.as_usize() != i {
                    return Err(VatError::precondition(format!(
                        "snapshot {s} breaks stable vertex indexing at position {i}"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn base(&self) -> &Snapshot {
        &self.snapshots[0]
    }

    pub fn base_position(&self, index: VertexIndex) -> Vec3 {
        self.base().samples[index.as_usize()].position
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn vertex_count(&self) -> u32 {
        self.base().vertex_count()
    }
}

/// Per-loop vertex handles. Everything emitted per mesh loop (UVs, color
/// attributes) is fanned out from per-vertex values through this map.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LoopMap {
    pub loops: Vec<VertexIndex>,
}

impl LoopMap {
    pub fn len(&self) -> usize {
        self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    pub fn validate(&self, vertex_count: u32) -> VatResult<()> {
        for (i, v) in self.loops.iter().enumerate() {
            if v.0 >= vertex_count {
                return Err(VatError::precondition(format!(
                    "loop {i} references vertex {} outside mesh of {vertex_count} vertices",
                    v.0
                )));
            }
        }
        Ok(())
    }
}

/// Descriptor of one source object, as merged by the mesh collaborator.
/// Modifier tags are the collaborator's modifier-stack names and feed the
/// deform-only allow-list gate.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SourceObject {
    pub name: String,
    pub vertex_count: u32,
    #[serde(default)]
    pub modifiers: Vec<String>,
}

/// Upstream scene unit configuration, checked by the shape-key scheme.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneUnits {
    pub system: UnitSystem,
    pub scale_length: f64,
}

impl SceneUnits {
    /// The shape-key packing contract assumes metric units at 0.01 scale
    /// (compared after rounding to two decimals, as upstream displays it).
    pub fn validate_metric_centimeters(&self) -> VatResult<()> {
        let rounded = (self.scale_length * 100.0).round() / 100.0;
        if self.system != UnitSystem::Metric || rounded != 0.01 {
            return Err(VatError::precondition(
                "scene units must be metric with a unit scale of 0.01",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum UnitSystem {
    Metric,
    Imperial,
    None,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(i: u32, p: Vec3) -> VertexSample {
        VertexSample {
            index: VertexIndex(i),
            position: p,
            normal: Vec3::Z,
        }
    }

    fn set_of(positions: &[&[Vec3]]) -> SnapshotSet {
        SnapshotSet {
            snapshots: positions
                .iter()
                .map(|snap| Snapshot {
                    samples: snap
                        .iter()
                        .enumerate()
                        .map(|(i, &p)| sample(i as u32, p))
                        .collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn snapshot_set_requires_base_plus_one() {
        let set = set_of(&[&[Vec3::ZERO]]);
        assert!(matches!(
            set.validate(),
            Err(VatError::Precondition(_))
        ));

        let set = set_of(&[&[Vec3::ZERO], &[Vec3::X]]);
        set.validate().unwrap();
    }

    #[test]
    fn snapshot_set_rejects_mismatched_vertex_counts() {
        let set = set_of(&[&[Vec3::ZERO, Vec3::X], &[Vec3::ZERO]]);
        assert!(set.validate().is_err());
    }

    #[test]
    fn snapshot_set_rejects_reordered_handles() {
        let mut set = set_of(&[&[Vec3::ZERO, Vec3::X], &[Vec3::ZERO, Vec3::X]]);
        set.snapshots[1].samples.swap(0, 1);
        assert!(set.validate().is_err());
    }

    #[test]
    fn loop_map_bounds_checked() {
        let loops = LoopMap {
            loops: vec![VertexIndex(0), VertexIndex(2)],
        };
        assert!(loops.validate(3).is_ok());
        assert!(loops.validate(2).is_err());
    }

    #[test]
    fn scene_units_gate() {
        let ok = SceneUnits {
            system: UnitSystem::Metric,
            scale_length: 0.01,
        };
        ok.validate_metric_centimeters().unwrap();

        // Rounded to two decimals before comparison.
        let near = SceneUnits {
            system: UnitSystem::Metric,
            scale_length: 0.010_04,
        };
        near.validate_metric_centimeters().unwrap();

        let imperial = SceneUnits {
            system: UnitSystem::Imperial,
            scale_length: 0.01,
        };
        assert!(imperial.validate_metric_centimeters().is_err());

        let meters = SceneUnits {
            system: UnitSystem::Metric,
            scale_length: 1.0,
        };
        assert!(meters.validate_metric_centimeters().is_err());
    }
}
