//! Per-bin library sizes, optionally rescaled to the sample's
//! originally recorded sequencing depth.

use crate::bins::BinLayout;
use crate::cell_dim::CellDimension;
use crate::collect::CollectedStat;
use crate::common::DVec;
use crate::error::{AggregationError, Result};
use log::info;

/// One library size per bin, plus the per-sample rescaling factors
/// that were applied (1.0 when no adjustment took place).
pub struct LibrarySizes {
    /// sum over all genes of the bin's linear-equivalent sums
    pub naive: DVec,
    /// naive sizes after depth adjustment (equal to `naive` when
    /// adjustment is off)
    pub effective: DVec,
    pub sample_adjustments: Vec<f64>,
}

impl LibrarySizes {
    pub fn num_bins(&self) -> usize {
        self.effective.len()
    }
}

/// Compute per-bin library sizes from the complete collection phase.
///
/// With `adjust` on, every bin of sample `s` is scaled by
/// `recorded_reads(s) / sum of s's naive bin sizes`, so that
/// normalization reflects the original sequencing depth rather than
/// only the reads still visible after collapsing (ambient reads,
/// masked cells, dropped categories).
pub fn compute_library_sizes(
    stat: &CollectedStat,
    layout: &BinLayout,
    dim: &CellDimension,
    adjust: bool,
) -> Result<LibrarySizes> {
    let num_bins = stat.num_bins();
    let naive = DVec::from_iterator(num_bins, stat.sum_gb.row_sum().iter().cloned());

    let mut sample_adjustments = vec![1.0; dim.num_samples()];
    if adjust {
        info!("adjusting library sizes to recorded sequencing depths");
        for (s, sample) in dim.samples().iter().enumerate() {
            let recorded =
                sample
                    .sequence_read_count
                    .ok_or_else(|| AggregationError::MissingLibrarySize {
                        sample: sample.name.clone(),
                    })?;
            let observed: f64 = layout.bins_of_sample(s).map(|b| naive[b]).sum();
            if observed == 0.0 {
                continue;
            }
            if (recorded as f64) < observed {
                return Err(AggregationError::LibrarySizeExceeded {
                    sample: sample.name.clone(),
                    observed,
                    recorded,
                });
            }
            sample_adjustments[s] = recorded as f64 / observed;
        }
    }

    let mut effective = naive.clone();
    for b in 0..num_bins {
        effective[b] *= sample_adjustments[layout.sample_of_bin(b)];
    }

    Ok(LibrarySizes {
        naive,
        effective,
        sample_adjustments,
    })
}
