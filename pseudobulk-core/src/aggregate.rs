//! One-call orchestration of the three aggregation phases: collect,
//! compute library sizes, normalize and assemble.

use crate::annotation::{CellMask, CellTypeAssignment};
use crate::bins::BinLayout;
use crate::cell_dim::{CellDimension, ExpressionVectors};
use crate::collect::collect_stat;
use crate::error::{AggregationError, Result};
use crate::library_size::compute_library_sizes;
use crate::normalize::{normalize_and_assemble, AggregateOutput};
use crate::scale::AggregationMethod;
use log::info;

/// Knobs of one aggregation run.
#[derive(Debug, Clone)]
pub struct AggregateConfig {
    /// Route unassigned cells into a synthetic per-sample "unknown"
    /// bin instead of dropping their contributions.
    pub include_unknown: bool,
    /// Rescale each sample's bin library sizes to the sample's
    /// recorded sequencing read count.
    pub adjust_library_sizes: bool,
    /// Mark the output quantitation type as preferred.
    pub make_preferred: bool,
    /// Additive constant on each bin sum in the log2cpm transform.
    /// Any small positive constant keeps zero sums at a well-defined
    /// floor.
    pub sum_pseudocount: f64,
    /// Additive constant on the library size in the log2cpm transform.
    pub library_pseudocount: f64,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            include_unknown: false,
            adjust_library_sizes: false,
            make_preferred: true,
            sum_pseudocount: 0.5,
            library_pseudocount: 1.0,
        }
    }
}

/// Aggregate single-cell vectors into one pseudobulk value per
/// (sample, cell type) bin per gene, on the log2cpm scale.
///
/// All validation happens before any accumulation: dimension
/// mismatches, an unsupported input scale, and (when adjusting library
/// sizes) missing recorded read counts fail the run with nothing
/// computed. On success the returned output is immutable and complete;
/// on failure nothing partial is ever exposed.
pub fn aggregate(
    dim: &CellDimension,
    vectors: &ExpressionVectors,
    cta: &CellTypeAssignment,
    mask: Option<&CellMask>,
    config: &AggregateConfig,
) -> Result<AggregateOutput> {
    let method = AggregationMethod::from_scale(&vectors.quantitation_type.scale)?;

    let num_cells = dim.num_cells();
    if vectors.num_cells() != num_cells {
        return Err(AggregationError::InconsistentDimension {
            what: "expression vector cells",
            expected: num_cells,
            got: vectors.num_cells(),
        });
    }
    if cta.num_cells() != num_cells {
        return Err(AggregationError::InconsistentDimension {
            what: "cell type assignment",
            expected: num_cells,
            got: cta.num_cells(),
        });
    }
    if let Some(mask) = mask {
        if mask.num_cells() != num_cells {
            return Err(AggregationError::InconsistentDimension {
                what: "cell mask",
                expected: num_cells,
                got: mask.num_cells(),
            });
        }
    }
    if config.adjust_library_sizes {
        for sample in dim.samples() {
            if sample.sequence_read_count.is_none() {
                return Err(AggregationError::MissingLibrarySize {
                    sample: sample.name.clone(),
                });
            }
        }
    }

    info!(
        "aggregating {} vectors over {} cells in {} samples with scale {} using {}",
        vectors.num_genes(),
        num_cells,
        dim.num_samples(),
        vectors.quantitation_type.scale,
        method
    );

    let layout = BinLayout::new(dim, cta, config.include_unknown);
    let stat = collect_stat(dim, vectors, cta, mask, &layout, method)?;
    let lib = compute_library_sizes(&stat, &layout, dim, config.adjust_library_sizes)?;

    let new_qt = vectors
        .quantitation_type
        .aggregated_log2cpm(method, config.make_preferred);

    normalize_and_assemble(
        stat,
        &lib,
        &layout,
        dim,
        &vectors.design_elements,
        new_qt,
        config.sum_pseudocount,
        config.library_pseudocount,
    )
}
