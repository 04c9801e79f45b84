use crate::convention::CoordConvention;
use crate::foundation::core::{LoopMap, SnapshotSet, MAX_SHAPE_KEYS, MAX_UV_LAYERS};
use crate::foundation::error::{VatError, VatResult};
use crate::output::{ColorAttribute, UvLayer};

/// Name of the color attribute the normal bake writes into.
pub const NORMALS_ATTRIBUTE: &str = "normals";

/// The packed V component rides on a constant 1.0 bias; the decode shader
/// subtracts it back out. Part of the fixed shader contract.
pub const MORPH_V_BIAS: f32 = 1.0;

const AXES: [char; 3] = ['X', 'Y', 'Z'];

/// UV layers needed to carry `3 * num_shape_keys` scalar channels at two
/// channels per layer: {2, 3, 5, 6} for 1..=4 shape keys.
pub fn layers_needed(num_shape_keys: u8) -> u8 {
    (3 * u16::from(num_shape_keys)).div_ceil(2) as u8
}

/// Sign multiplier for a global channel position (0-based across all shape
/// keys). Flips every three channels, i.e. per shape-key ordinal. The
/// downstream shader decode bakes this exact alternation in; reproduce it,
/// do not simplify it.
pub fn channel_sign(channel: u32) -> f32 {
    if (channel / 3) % 2 == 1 { -1.0 } else { 1.0 }
}

/// One scalar channel's identity: which shape key, which axis, which sign.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelSlot {
    /// 1-based shape-key ordinal.
    pub shape_key: u8,
    /// 0 = X, 1 = Y, 2 = Z (after coordinate remap).
    pub axis: u8,
    pub sign: f32,
}

impl ChannelSlot {
    fn for_channel(channel: u32) -> Self {
        Self {
            shape_key: (channel / 3 + 1) as u8,
            axis: (channel % 3) as u8,
            sign: channel_sign(channel),
        }
    }

    /// Global channel position this slot was derived from.
    pub fn channel(self) -> u32 {
        u32::from(self.shape_key - 1) * 3 + u32::from(self.axis)
    }

    fn label(self) -> String {
        format!("{}{}", self.shape_key, AXES[self.axis as usize])
    }
}

/// One planned UV layer: stack slot, deterministic name, and the one or two
/// channels packed into its U/V components. A `None` V marks the trailing
/// single-component layer of an odd channel count.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerPlan {
    pub slot: u8,
    pub name: String,
    pub u: ChannelSlot,
    pub v: Option<ChannelSlot>,
}

/// Deterministic channel-to-layer assignment for one encode pass.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelLayout {
    pub layers: Vec<LayerPlan>,
    num_shape_keys: u8,
}

impl ChannelLayout {
    /// Plans the layer assignment, failing with a capacity error before
    /// anything is written if the mesh's 8 UV layers cannot hold it.
    pub fn plan(num_shape_keys: u8, start_layer: u8) -> VatResult<Self> {
        if num_shape_keys == 0 || num_shape_keys > MAX_SHAPE_KEYS {
            return Err(VatError::capacity(format!(
                "shape-key count of {num_shape_keys} is outside 1..={MAX_SHAPE_KEYS}"
            )));
        }
        if start_layer >= MAX_UV_LAYERS {
            return Err(VatError::capacity(format!(
                "start UV layer {start_layer} is outside 0..={}",
                MAX_UV_LAYERS - 1
            )));
        }
        let needed = layers_needed(num_shape_keys);
        let total = start_layer + needed;
        if total > MAX_UV_LAYERS {
            return Err(VatError::capacity(format!(
                "{num_shape_keys} shape keys starting at UV layer {start_layer} need {total} layers, limit is {MAX_UV_LAYERS}"
            )));
        }

        let total_channels = u32::from(num_shape_keys) * 3;
        let mut layers = Vec::with_capacity(needed as usize);
        for i in 0..u32::from(needed) {
            let u = ChannelSlot::for_channel(i * 2);
            let v = (i * 2 + 1 < total_channels).then(|| ChannelSlot::for_channel(i * 2 + 1));
            let name = match v {
                Some(v) => format!("Morph {} {}", u.label(), v.label()),
                None => format!("Morph {}", u.label()),
            };
            layers.push(LayerPlan {
                slot: start_layer + i as u8,
                name,
                u,
                v,
            });
        }
        Ok(Self {
            layers,
            num_shape_keys,
        })
    }

    pub fn num_shape_keys(&self) -> u8 {
        self.num_shape_keys
    }
}

/// Per-channel, per-vertex scalar deltas: channel `(k-1)*3 + axis` holds
/// shape key `k`'s remapped axis component for every vertex.
#[derive(Clone, Debug)]
pub struct ShapeKeyDeltas {
    channels: Vec<Vec<f32>>,
}

impl ShapeKeyDeltas {
    pub fn channel(&self, channel: u32) -> &[f32] {
        &self.channels[channel as usize]
    }

    pub fn channel_count(&self) -> u32 {
        self.channels.len() as u32
    }
}

/// Computes every shape key's per-vertex deltas against the base key,
/// remapped into the target convention.
pub fn shape_key_deltas(
    set: &SnapshotSet,
    num_shape_keys: u8,
    convention: CoordConvention,
) -> ShapeKeyDeltas {
    let vertex_count = set.vertex_count() as usize;
    let base = set.base();
    let mut channels: Vec<Vec<f32>> = (0..usize::from(num_shape_keys) * 3)
        .map(|_| Vec::with_capacity(vertex_count))
        .collect();
    for k in 1..=usize::from(num_shape_keys) {
        let key = &set.snapshots[k];
        for sample in &key.samples {
            let delta = sample.position - base.samples[sample.index.as_usize()].position;
            let d = convention.remap(delta);
            channels[(k - 1) * 3].push(d.x);
            channels[(k - 1) * 3 + 1].push(d.y);
            channels[(k - 1) * 3 + 2].push(d.z);
        }
    }
    ShapeKeyDeltas { channels }
}

/// Writes the planned layers' per-loop UV coordinates.
///
/// U carries the layer's first channel, V the second on top of the fixed
/// 1.0 bias; a trailing single-component layer leaves V at the bias.
pub fn pack_offsets(layout: &ChannelLayout, deltas: &ShapeKeyDeltas, loops: &LoopMap) -> Vec<UvLayer> {
    layout
        .layers
        .iter()
        .map(|plan| {
            let u_channel = deltas.channel(plan.u.channel());
            let v_channel = plan.v.map(|v| (deltas.channel(v.channel()), v.sign));
            let data = loops
                .loops
                .iter()
                .map(|&vtx| {
                    let u = u_channel[vtx.as_usize()] * plan.u.sign;
                    let v = match v_channel {
                        Some((channel, sign)) => MORPH_V_BIAS + channel[vtx.as_usize()] * sign,
                        None => MORPH_V_BIAS,
                    };
                    [u, v]
                })
                .collect();
            UvLayer {
                name: plan.name.clone(),
                slot: Some(plan.slot),
                data,
            }
        })
        .collect()
}

/// Writes one shape key's per-vertex normals into a per-loop color
/// attribute, range-compressed to [0,1]. The Y flip matches the Native
/// axis remap.
pub fn pack_normals(set: &SnapshotSet, shape_key: u8, loops: &LoopMap) -> VatResult<ColorAttribute> {
    let ordinal = usize::from(shape_key);
    if ordinal == 0 || ordinal >= set.len() {
        return Err(VatError::index(format!(
            "shape key {shape_key} is not a valid normal-bake source (have {} keys past the base)",
            set.len() - 1
        )));
    }
    let key = &set.snapshots[ordinal];
    let data = loops
        .loops
        .iter()
        .map(|&vtx| {
            let n = key.samples[vtx.as_usize()].normal;
            [
                (n.x + 1.0) * 0.5,
                (-n.y + 1.0) * 0.5,
                (n.z + 1.0) * 0.5,
                1.0,
            ]
        })
        .collect();
    Ok(ColorAttribute {
        name: NORMALS_ATTRIBUTE.to_owned(),
        data,
    })
}
