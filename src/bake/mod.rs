pub mod frames;
pub mod shape_keys;

/// What the Analyzer/Resolver pair concluded for one encode pass. Both
/// orchestrators surface it so callers can sanity-check the quantization.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BakeReport {
    pub max_deviation: f64,
    pub scale_factor: u32,
}
