use glam::Vec3;

use crate::foundation::error::{VatError, VatResult};

/// Axis remap between the authoring convention and the target engine
/// convention. The same table is applied to position deltas and to normals
/// (before normal range compression).
///
/// Both remaps are involutions, so decoding applies the same table again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CoordConvention {
    /// Authoring space, Y forward / Z up: `(x, -y, z)`.
    Native,
    /// Engine space, X forward / Z up: `(-y, -x, z)`.
    Engine,
}

impl CoordConvention {
    /// Parses a convention tag. Unknown tags are a configuration error,
    /// never a silent default (unlike [`crate::analyze::scale::TargetUnit::parse`]).
    pub fn parse(tag: &str) -> VatResult<Self> {
        match tag.to_ascii_uppercase().as_str() {
            "NATIVE" => Ok(Self::Native),
            "ENGINE" => Ok(Self::Engine),
            other => Err(VatError::config(format!(
                "unknown coordinate convention '{other}'"
            ))),
        }
    }

    pub fn remap(self, v: Vec3) -> Vec3 {
        match self {
            Self::Native => Vec3::new(v.x, -v.y, v.z),
            Self::Engine => Vec3::new(-v.y, -v.x, v.z),
        }
    }
}
