use crate::analyze::deviation::max_deviation;
use crate::analyze::scale::{TargetUnit, resolve_scale};
use crate::bake::BakeReport;
use crate::convention::CoordConvention;
use crate::foundation::core::{LoopMap, SceneUnits, SnapshotSet};
use crate::foundation::error::{VatError, VatResult};
use crate::output::{ColorAttribute, Resource, ResourceStore, UvLayer};
use crate::pack::channels::{ChannelLayout, pack_normals, pack_offsets, shape_key_deltas};

/// Per-invocation configuration for the shape-key scheme.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShapeKeyBakeConfig {
    /// Shape keys to pack, 1..=4, taken in order after the base key.
    pub num_shape_keys: u8,
    /// First UV stack slot to occupy, 0..=7.
    pub start_layer: u8,
    /// Also bake one key's normals into the `normals` color attribute.
    #[serde(default)]
    pub bake_normal: bool,
    /// 1-based ordinal of the normal-bake source key.
    #[serde(default = "default_normal_shape_key")]
    pub normal_shape_key: u8,
    pub unit: TargetUnit,
    pub convention: CoordConvention,
    /// Upstream unit configuration; the UV values carry no scale factor, so
    /// the packing range is only meaningful at metric 0.01.
    pub scene_units: SceneUnits,
}

fn default_normal_shape_key() -> u8 {
    1
}

/// Snapshot 0 is the base key; snapshots 1..=N are the shape keys in key
/// order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShapeKeyBakeInput {
    pub loops: LoopMap,
    pub snapshots: SnapshotSet,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShapeKeyBakeOutput {
    pub uv_layers: Vec<UvLayer>,
    pub normals: Option<ColorAttribute>,
    pub report: BakeReport,
}

impl ShapeKeyBakeOutput {
    pub fn commit(&self, store: &mut ResourceStore) {
        for layer in &self.uv_layers {
            store.insert(&layer.name, Resource::UvLayer(layer.clone()));
        }
        if let Some(normals) = &self.normals {
            store.insert(&normals.name, Resource::ColorAttribute(normals.clone()));
        }
    }
}

/// Encodes up to four shape keys' vertex deltas into UV layers, optionally
/// baking one key's normals into a color attribute. All gates (units, key
/// availability, layer capacity, normal ordinal) run before anything is
/// packed.
#[tracing::instrument(skip(cfg, input), fields(keys = cfg.num_shape_keys, start = cfg.start_layer))]
pub fn bake_shape_keys(
    cfg: &ShapeKeyBakeConfig,
    input: &ShapeKeyBakeInput,
) -> VatResult<ShapeKeyBakeOutput> {
    cfg.scene_units.validate_metric_centimeters()?;
    input.snapshots.validate()?;
    input.loops.validate(input.snapshots.vertex_count())?;

    let layout = ChannelLayout::plan(cfg.num_shape_keys, cfg.start_layer)?;
    if input.snapshots.len() < 1 + usize::from(cfg.num_shape_keys) {
        return Err(VatError::precondition(format!(
            "object needs additional shape keys ({} packed, {} present past the base)",
            cfg.num_shape_keys,
            input.snapshots.len() - 1
        )));
    }

    let normals = cfg
        .bake_normal
        .then(|| pack_normals(&input.snapshots, cfg.normal_shape_key, &input.loops))
        .transpose()?;

    let max_dev = max_deviation(&input.snapshots);
    let scale = resolve_scale(max_dev, cfg.unit);
    tracing::debug!(max_dev, scale, "resolved quantization scale");

    let deltas = shape_key_deltas(&input.snapshots, cfg.num_shape_keys, cfg.convention);
    let uv_layers = pack_offsets(&layout, &deltas, &input.loops);

    Ok(ShapeKeyBakeOutput {
        uv_layers,
        normals,
        report: BakeReport {
            max_deviation: max_dev,
            scale_factor: scale,
        },
    })
}
