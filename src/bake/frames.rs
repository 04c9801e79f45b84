use std::collections::{BTreeMap, BTreeSet};

use image::{Rgba32FImage, RgbaImage};

use crate::analyze::deviation::max_deviation;
use crate::analyze::scale::{TargetUnit, resolve_scale};
use crate::bake::BakeReport;
use crate::convention::CoordConvention;
use crate::foundation::core::{
    LoopMap, MAX_FRAMES, MAX_VERTICES, SnapshotSet, SourceObject, VertexIndex,
};
use crate::foundation::error::{VatError, VatResult};
use crate::output::{
    Resource, ResourceStore, UvLayer, normal_texture_name, offset_texture_name,
};
use crate::pack::partition::GroupPartition;
use crate::pack::texture::pack_frames;

/// Modifier types the mesh collaborator may leave on a source object:
/// pure deformers only, since anything topology-changing would break the
/// stable vertex indexing the codec relies on.
pub const ALLOWED_MODIFIERS: [&str; 16] = [
    "ARMATURE",
    "CAST",
    "CURVE",
    "DISPLACE",
    "HOOK",
    "LAPLACIANDEFORM",
    "LATTICE",
    "MESH_DEFORM",
    "SHRINKWRAP",
    "SIMPLE_DEFORM",
    "SMOOTH",
    "CORRECTIVE_SMOOTH",
    "LAPLACIANSMOOTH",
    "SURFACE_DEFORM",
    "WARP",
    "WAVE",
];

/// Per-invocation configuration for the per-frame scheme. No field survives
/// the invocation; repeated calls with equal config and input are
/// idempotent.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameBakeConfig {
    /// Name embedded in the emitted texture names.
    pub name: String,
    pub unit: TargetUnit,
    pub convention: CoordConvention,
    /// Optional vertex-group restriction; an unknown name means no
    /// restriction.
    #[serde(default)]
    pub vertex_group: Option<String>,
}

/// Everything the mesh-evaluation collaborator hands over for one pass:
/// ordered frame snapshots (snapshot 0 is the rest pose), the merged loop
/// map, per-object descriptors in merge order, and resolved vertex-group
/// membership.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameBakeInput {
    pub objects: Vec<SourceObject>,
    pub loops: LoopMap,
    pub snapshots: SnapshotSet,
    #[serde(default)]
    pub groups: BTreeMap<String, BTreeSet<VertexIndex>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameBakeOutput {
    pub offset_name: String,
    pub offsets: Rgba32FImage,
    pub normal_name: String,
    pub normals: RgbaImage,
    pub anim_uv: UvLayer,
    pub report: BakeReport,
}

impl FrameBakeOutput {
    /// Hands every emitted resource to the store by name, overwriting any
    /// previous bake's output in place.
    pub fn commit(&self, store: &mut ResourceStore) {
        store.insert(&self.offset_name, Resource::OffsetTexture(self.offsets.clone()));
        store.insert(&self.normal_name, Resource::NormalTexture(self.normals.clone()));
        store.insert(&self.anim_uv.name, Resource::UvLayer(self.anim_uv.clone()));
    }
}

/// Encodes per-frame vertex offsets and normals into the two pixel grids
/// plus the UV addressing side-channel. Validation runs in full before any
/// output is built.
#[tracing::instrument(skip(cfg, input), fields(name = %cfg.name))]
pub fn bake_frames(cfg: &FrameBakeConfig, input: &FrameBakeInput) -> VatResult<FrameBakeOutput> {
    input.snapshots.validate()?;
    let vertex_count = input.snapshots.vertex_count();
    input.loops.validate(vertex_count)?;

    for object in &input.objects {
        for modifier in &object.modifiers {
            if !ALLOWED_MODIFIERS.contains(&modifier.as_str()) {
                return Err(VatError::precondition(format!(
                    "objects with {modifier} modifiers are not allowed (object '{}')",
                    object.name
                )));
            }
        }
    }
    let merged: u32 = input.objects.iter().map(|o| o.vertex_count).sum();
    if !input.objects.is_empty() && merged != vertex_count {
        return Err(VatError::precondition(format!(
            "object descriptors sum to {merged} vertices, snapshots carry {vertex_count}"
        )));
    }

    if vertex_count > MAX_VERTICES {
        return Err(VatError::capacity(format!(
            "vertex count of {vertex_count} exceeds limit of {MAX_VERTICES}"
        )));
    }
    let frame_count = input.snapshots.len() as u32;
    if frame_count > MAX_FRAMES {
        return Err(VatError::capacity(format!(
            "frame count of {frame_count} exceeds limit of {MAX_FRAMES}"
        )));
    }

    let max_dev = max_deviation(&input.snapshots);
    let scale = resolve_scale(max_dev, cfg.unit);
    tracing::debug!(max_dev, scale, "resolved quantization scale");

    let members = cfg
        .vertex_group
        .as_deref()
        .and_then(|name| input.groups.get(name));
    let partition = GroupPartition::from_members(vertex_count, members);

    let anim_uv = partition.uv_layer(&input.loops);
    let grids = pack_frames(&input.snapshots, scale, &partition, cfg.convention);

    Ok(FrameBakeOutput {
        offset_name: offset_texture_name(&cfg.name, scale),
        offsets: grids.offsets,
        normal_name: normal_texture_name(&cfg.name),
        normals: grids.normals,
        anim_uv,
        report: BakeReport {
            max_deviation: max_dev,
            scale_factor: scale,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::{Snapshot, VertexSample};
    use glam::Vec3;

    fn simple_input() -> FrameBakeInput {
        let frame = |dx: f32| Snapshot {
            samples: (0..2)
                .map(|i| VertexSample {
                    index: VertexIndex(i),
                    position: Vec3::new(i as f32 + dx, 0.0, 0.0),
                    normal: Vec3::Z,
                })
                .collect(),
        };
        FrameBakeInput {
            objects: vec![SourceObject {
                name: "Cube".into(),
                vertex_count: 2,
                modifiers: vec!["ARMATURE".into()],
            }],
            loops: LoopMap {
                loops: vec![VertexIndex(0), VertexIndex(1)],
            },
            snapshots: SnapshotSet {
                snapshots: vec![frame(0.0), frame(0.02)],
            },
            groups: BTreeMap::new(),
        }
    }

    fn cfg() -> FrameBakeConfig {
        FrameBakeConfig {
            name: "Cube".into(),
            unit: TargetUnit::Cm,
            convention: CoordConvention::Native,
            vertex_group: None,
        }
    }

    #[test]
    fn disallowed_modifier_fails_fast() {
        let mut input = simple_input();
        input.objects[0].modifiers.push("SUBSURF".into());
        let err = bake_frames(&cfg(), &input).unwrap_err();
        assert!(matches!(err, VatError::Precondition(_)));
        assert!(err.to_string().contains("SUBSURF"));
    }

    #[test]
    fn object_descriptor_mismatch_fails_fast() {
        let mut input = simple_input();
        input.objects[0].vertex_count = 3;
        assert!(matches!(
            bake_frames(&cfg(), &input).unwrap_err(),
            VatError::Precondition(_)
        ));
    }

    #[test]
    fn scale_lands_in_the_offset_texture_name() {
        let out = bake_frames(&cfg(), &simple_input()).unwrap();
        // 0.02 m deviation at CM target: scale 2.
        assert_eq!(out.report.scale_factor, 2);
        assert_eq!(out.offset_name, "T_Cube_Scale2_O");
        assert_eq!(out.normal_name, "T_Cube_N");
    }

    #[test]
    fn unknown_group_name_means_no_restriction() {
        let mut c = cfg();
        c.vertex_group = Some("no_such_group".into());
        let out = bake_frames(&c, &simple_input()).unwrap();
        assert_eq!(out.offsets.width(), 2);
    }

    #[test]
    fn commit_overwrites_previous_pass() {
        let out = bake_frames(&cfg(), &simple_input()).unwrap();
        let mut store = ResourceStore::new();
        out.commit(&mut store);
        out.commit(&mut store);
        assert_eq!(store.len(), 3);
        assert!(store.get("T_Cube_Scale2_O").is_some());
        let names: Vec<_> = store.names().collect();
        assert_eq!(names, ["T_Cube_N", "T_Cube_Scale2_O", "vertex_anim"]);
    }
}
