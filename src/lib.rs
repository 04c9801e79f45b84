//! vatbake turns mesh deformation into flat, shader-readable channels.
//!
//! Given an ordered sequence of per-vertex snapshots (frames of an
//! animation, or a mesh's shape keys), the crate computes per-vertex deltas
//! against the base snapshot, remaps them between coordinate conventions,
//! derives an integer quantization scale that avoids clipping, and packs
//! the result so a vertex shader can reconstruct the deformation from
//! texture and UV lookups alone.
//!
//! # Pipeline overview
//!
//! 1. **Analyze**: scan every snapshot for the largest displacement.
//! 2. **Resolve**: turn a target unit into an integer scale factor.
//! 3. **Pack**: per-frame offsets/normals into two pixel grids
//!    ([`bake_frames`]), or shape-key deltas into UV layers
//!    ([`bake_shape_keys`]).
//!
//! The key design constraints:
//!
//! - **Deterministic**: equal config and input produce byte-identical
//!   output; emitted resources overwrite by name, so passes are idempotent.
//! - **Validate first**: every gate (preconditions, capacity ceilings,
//!   ordinal bounds) runs before any output is built. A pass either yields
//!   all of its outputs or none.
//! - **Fixed decode contracts**: row reversal, the channel sign
//!   alternation, the V bias, and the resource naming are external shader
//!   contracts, reproduced exactly.
#![forbid(unsafe_code)]

pub mod analyze;
pub mod bake;
pub mod convention;
pub mod foundation;
pub mod output;
pub mod pack;

pub use analyze::deviation::max_deviation;
pub use analyze::scale::{TargetUnit, resolve_scale};
pub use bake::BakeReport;
pub use bake::frames::{
    ALLOWED_MODIFIERS, FrameBakeConfig, FrameBakeInput, FrameBakeOutput, bake_frames,
};
pub use bake::shape_keys::{
    ShapeKeyBakeConfig, ShapeKeyBakeInput, ShapeKeyBakeOutput, bake_shape_keys,
};
pub use convention::CoordConvention;
pub use foundation::core::{
    LoopMap, MAX_FRAMES, MAX_SHAPE_KEYS, MAX_UV_LAYERS, MAX_VERTICES, SceneUnits, Snapshot,
    SnapshotSet, SourceObject, UnitSystem, VertexIndex, VertexSample,
};
pub use foundation::error::{VatError, VatResult};
pub use output::{
    ColorAttribute, Resource, ResourceStore, UvLayer, normal_texture_name, offset_texture_name,
};
pub use pack::channels::{
    ChannelLayout, ChannelSlot, LayerPlan, MORPH_V_BIAS, NORMALS_ATTRIBUTE, channel_sign,
    layers_needed, pack_normals, pack_offsets, shape_key_deltas,
};
pub use pack::partition::{ANIM_UV_LAYER, ANIM_UV_V, GroupPartition, INACTIVE_PIN_U};
pub use pack::texture::{FrameGrids, pack_frames};
