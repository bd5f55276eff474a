//! Collection phase: bucket per-cell values into per-bin
//! linear-equivalent sums, one gene at a time, together with the
//! per-bin bookkeeping the output metadata needs.

use crate::annotation::{CellMask, CellTypeAssignment};
use crate::bins::BinLayout;
use crate::cell_dim::{CellDimension, ExpressionVectors};
use crate::common::Mat;
use crate::error::Result;
use crate::scale::AggregationMethod;
use log::info;

/// Accumulated sums and counters after walking all genes. Owned by the
/// pipeline: the collection phase builds it, the normalization phase
/// consumes it. No partial state escapes a failed collection.
pub struct CollectedStat {
    /// gene x bin linear-equivalent sums
    pub sum_gb: Mat,
    /// number of contributing cells per bin (included, routed to the
    /// bin, observed nonzero for at least one gene)
    pub cell_counts_b: Vec<u32>,
    /// number of design elements with at least one observed cell, per bin
    pub design_elements_b: Vec<u32>,
    /// total (cell x design element) observations per bin
    pub cells_by_design_b: Vec<u64>,
    /// masked-out cells whose destination would have been this bin
    pub masked_cells_b: Vec<u32>,
    pub method: AggregationMethod,
}

impl CollectedStat {
    pub fn num_genes(&self) -> usize {
        self.sum_gb.nrows()
    }

    pub fn num_bins(&self) -> usize {
        self.sum_gb.ncols()
    }
}

/// Walk every gene's sparse per-cell vector and accumulate per-bin
/// sums. Masked cells are skipped everywhere; unassigned cells either
/// go to the sample's unknown slot or nowhere, as encoded in `layout`.
pub fn collect_stat(
    dim: &CellDimension,
    vectors: &ExpressionVectors,
    cta: &CellTypeAssignment,
    mask: Option<&CellMask>,
    layout: &BinLayout,
    method: AggregationMethod,
) -> Result<CollectedStat> {
    let num_genes = vectors.num_genes();
    let num_bins = layout.num_bins();

    let cell_to_bin = layout.cell_to_bin(dim, cta);

    let mut sum_gb = Mat::zeros(num_genes, num_bins);
    let mut design_elements_b = vec![0u32; num_bins];
    let mut cells_by_design_b = vec![0u64; num_bins];
    let mut expressed = vec![false; dim.num_cells()];

    let excluded = |cell: usize| mask.map(|m| m.is_excluded(cell)).unwrap_or(false);

    let mut cells_in_bin = vec![0u32; num_bins];
    for (g, row) in vectors.data.row_iter().enumerate() {
        cells_in_bin.fill(0);
        for (&cell, &value) in row.col_indices().iter().zip(row.values().iter()) {
            if excluded(cell) {
                continue;
            }
            if let Some(bin) = cell_to_bin[cell] {
                // a stored 0.0 can still carry mass (log2 of one count)
                let linear = method.to_linear(value);
                sum_gb[(g, bin)] += linear;
                if linear != 0.0 {
                    expressed[cell] = true;
                    cells_in_bin[bin] += 1;
                }
            }
        }
        for (bin, &count) in cells_in_bin.iter().enumerate() {
            if count > 0 {
                design_elements_b[bin] += 1;
                cells_by_design_b[bin] += count as u64;
            }
        }
    }

    // per-bin cell counts are gene-independent: one per unique
    // contributing cell
    let mut cell_counts_b = vec![0u32; num_bins];
    let mut masked_cells_b = vec![0u32; num_bins];
    for (cell, bin) in cell_to_bin.iter().enumerate() {
        if let Some(bin) = *bin {
            if excluded(cell) {
                masked_cells_b[bin] += 1;
            } else if expressed[cell] {
                cell_counts_b[bin] += 1;
            }
        }
    }

    info!(
        "collected {} genes into {} bins ({} contributing cells)",
        num_genes,
        num_bins,
        cell_counts_b.iter().map(|&c| c as u64).sum::<u64>()
    );

    Ok(CollectedStat {
        sum_gb,
        cell_counts_b,
        design_elements_b,
        cells_by_design_b,
        masked_cells_b,
        method,
    })
}
