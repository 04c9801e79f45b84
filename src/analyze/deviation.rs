use crate::foundation::core::SnapshotSet;

/// Maximum per-vertex displacement magnitude of any non-base snapshot
/// relative to the base snapshot.
///
/// Snapshots are visited in reverse sequence order, the same order the
/// packers use for row assignment, so the whole pass traverses the data
/// uniformly. The maximum itself is order-independent.
pub fn max_deviation(set: &SnapshotSet) -> f64 {
    let base = set.base();
    let mut max = 0.0f64;
    for snap in set.snapshots[1..].iter().rev() {
        for sample in &snap.samples {
            let offset = sample.position - base.samples[sample.index.as_usize()].position;
            let len = f64::from(offset.length());
            if len > max {
                max = len;
            }
        }
    }
    max
}
