use std::collections::BTreeSet;

use crate::foundation::core::{LoopMap, VertexIndex};
use crate::output::UvLayer;

/// Shared name of the per-frame scheme's UV side-channel; the decode shader
/// addresses texel columns through it on every baked mesh.
pub const ANIM_UV_LAYER: &str = "vertex_anim";

/// Fixed V for the side-channel layer (mid-value of an 8-bit channel).
pub const ANIM_UV_V: f32 = 128.0 / 255.0;

/// Inactive vertices are pinned here; active texel centers start at
/// `0.5 / active_count`, so shaders exclude pinned vertices with a
/// near-zero threshold.
pub const INACTIVE_PIN_U: f32 = 0.0;

/// Per-invocation split of vertices into "active" (assigned a texel column)
/// and "inactive" (pinned, emitting no pixel data). Recomputed from group
/// membership on every pass, never cached.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupPartition {
    /// Group-local column per vertex; `None` for inactive vertices.
    columns: Vec<Option<u32>>,
    active: u32,
}

impl GroupPartition {
    /// No group restriction: every vertex is active in handle order.
    pub fn all_active(vertex_count: u32) -> Self {
        Self {
            columns: (0..vertex_count).map(Some).collect(),
            active: vertex_count,
        }
    }

    /// Restricts the active set to `members`. An absent or empty membership
    /// set (an unresolvable or empty group) falls back to all-active.
    /// Columns follow ascending handle order within the group.
    pub fn from_members(vertex_count: u32, members: Option<&BTreeSet<VertexIndex>>) -> Self {
        let members = match members {
            Some(m) if !m.is_empty() => m,
            _ => return Self::all_active(vertex_count),
        };
        let mut columns = vec![None; vertex_count as usize];
        let mut next = 0u32;
        for v in members {
            if v.0 < vertex_count {
                columns[v.as_usize()] = Some(next);
                next += 1;
            }
        }
        if next == 0 {
            return Self::all_active(vertex_count);
        }
        Self {
            columns,
            active: next,
        }
    }

    pub fn active_count(&self) -> u32 {
        self.active
    }

    pub fn vertex_count(&self) -> u32 {
        self.columns.len() as u32
    }

    pub fn is_active(&self, v: VertexIndex) -> bool {
        self.column(v).is_some()
    }

    /// Texel column for an active vertex, in group-local rank order.
    pub fn column(&self, v: VertexIndex) -> Option<u32> {
        self.columns.get(v.as_usize()).copied().flatten()
    }

    /// Horizontal texel-center coordinate for a vertex; pinned for
    /// inactive vertices.
    pub fn u_coord(&self, v: VertexIndex) -> f32 {
        match self.column(v) {
            Some(col) => (col as f32 + 0.5) / self.active as f32,
            None => INACTIVE_PIN_U,
        }
    }

    /// Builds the fixed-name UV side-channel layer for the mesh loops.
    pub fn uv_layer(&self, loops: &LoopMap) -> UvLayer {
        UvLayer {
            name: ANIM_UV_LAYER.to_owned(),
            slot: None,
            data: loops
                .loops
                .iter()
                .map(|&v| [self.u_coord(v), ANIM_UV_V])
                .collect(),
        }
    }
}
