//! Splitting the exposure axis into clusters and gap bridges

use std::ops::Range;

use tracing::debug;

use crate::linearization::correction::types::SubCorrectorKind;

/// A contiguous slice of the calibration dataset assigned to one SubCorrector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubRange {
    pub kind: SubCorrectorKind,
    pub indices: Range<usize>,
}

/// Partition sorted exposure times into primary clusters and gap bridges.
///
/// A gap is any step between consecutive exposures larger than `max_gap`. Each
/// gap closes the current cluster, emits a two-frame bridge over the exposures
/// on either side of it, and starts a new cluster at the later exposure. The
/// result is in exposure order, which is also priority order. Clusters left
/// with a single exposure (two gaps in a row, or a gap next to either end)
/// carry no curve and are dropped; the adjacent bridges already cover them.
pub fn segment_exposures(exposure_times: &[f64], max_gap: f64) -> Vec<SubRange> {
    let mut ranges = Vec::new();
    if exposure_times.is_empty() {
        return ranges;
    }

    let mut cluster_start = 0;
    for i in 1..exposure_times.len() {
        if exposure_times[i] - exposure_times[i - 1] <= max_gap {
            continue;
        }

        debug!(
            "Gap of {:.3} between exposures {:.3} and {:.3}",
            exposure_times[i] - exposure_times[i - 1],
            exposure_times[i - 1],
            exposure_times[i]
        );
        push_cluster(&mut ranges, cluster_start..i);
        ranges.push(SubRange {
            kind: SubCorrectorKind::GapBridge,
            indices: i - 1..i + 1,
        });
        cluster_start = i;
    }
    push_cluster(&mut ranges, cluster_start..exposure_times.len());

    ranges
}

fn push_cluster(ranges: &mut Vec<SubRange>, indices: Range<usize>) {
    if indices.len() < 2 {
        debug!("Skipping single-exposure cluster at index {}", indices.start);
        return;
    }
    ranges.push(SubRange {
        kind: SubCorrectorKind::Primary,
        indices,
    });
}
