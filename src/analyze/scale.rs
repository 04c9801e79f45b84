/// Target linear unit for the encoded deltas. Each unit implies the largest
/// deviation the fixed-range output format can carry before clipping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TargetUnit {
    Mm,
    Cm,
    Dm,
    M,
}

impl TargetUnit {
    /// Parses a unit tag. Unknown tags fall back to centimeters; the
    /// fallback is a deliberate lenient default, in contrast to convention
    /// parsing which fails hard.
    pub fn parse(tag: &str) -> Self {
        match tag.to_ascii_uppercase().as_str() {
            "MM" => Self::Mm,
            "CM" => Self::Cm,
            "DM" => Self::Dm,
            "M" => Self::M,
            _ => Self::Cm,
        }
    }

    /// Max allowed deviation before clipping, in meters.
    pub fn max_allowed_deviation(self) -> f64 {
        match self {
            Self::Mm => 0.001,
            Self::Cm => 0.01,
            Self::Dm => 0.1,
            Self::M => 1.0,
        }
    }
}

/// Integer amplification factor for the encoded deltas.
///
/// Chosen so `max_deviation / scale <= max_allowed_deviation(unit)`; the
/// decoder divides by the same integer, which is why the factor is embedded
/// in the offset texture name.
pub fn resolve_scale(max_deviation: f64, unit: TargetUnit) -> u32 {
    if max_deviation > 0.0 {
        let factor = (max_deviation / unit.max_allowed_deviation()).ceil() as u32;
        factor.max(1)
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_table_is_pinned() {
        assert_eq!(TargetUnit::Mm.max_allowed_deviation(), 0.001);
        assert_eq!(TargetUnit::Cm.max_allowed_deviation(), 0.01);
        assert_eq!(TargetUnit::Dm.max_allowed_deviation(), 0.1);
        assert_eq!(TargetUnit::M.max_allowed_deviation(), 1.0);
    }

    #[test]
    fn unknown_unit_defaults_to_centimeters() {
        assert_eq!(TargetUnit::parse("cm"), TargetUnit::Cm);
        assert_eq!(TargetUnit::parse("FURLONG"), TargetUnit::Cm);
        assert_eq!(TargetUnit::parse(""), TargetUnit::Cm);
    }

    #[test]
    fn zero_deviation_resolves_to_one() {
        assert_eq!(resolve_scale(0.0, TargetUnit::Mm), 1);
        assert_eq!(resolve_scale(1e-9, TargetUnit::M), 1);
    }

    #[test]
    fn scaled_deviation_never_clips() {
        for unit in [TargetUnit::Mm, TargetUnit::Cm, TargetUnit::Dm, TargetUnit::M] {
            for dev in [0.0004, 0.02, 0.31, 5.7, 123.0] {
                let s = resolve_scale(dev, unit);
                assert!(s >= 1);
                assert!(dev / f64::from(s) <= unit.max_allowed_deviation() + 1e-12);
            }
        }
    }

    #[test]
    fn tightening_the_unit_is_monotonic() {
        // M -> DM -> CM -> MM never decreases the factor.
        let order = [TargetUnit::M, TargetUnit::Dm, TargetUnit::Cm, TargetUnit::Mm];
        for dev in [0.0007, 0.05, 0.999, 3.2] {
            let mut prev = 0;
            for unit in order {
                let s = resolve_scale(dev, unit);
                assert!(s >= prev, "{unit:?} decreased the scale for {dev}");
                prev = s;
            }
        }
    }
}
