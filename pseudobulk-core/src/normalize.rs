//! Normalization and output assembly: convert per-bin sums to the
//! common log2cpm reporting scale and package per-gene vectors with
//! per-bin metadata.

use crate::bins::{BinKey, BinLayout};
use crate::cell_dim::CellDimension;
use crate::collect::CollectedStat;
use crate::error::{AggregationError, Result};
use crate::library_size::LibrarySizes;
use crate::scale::{AggregationMethod, QuantitationType};
use log::warn;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt::Write as _;

/// Per-bin metadata emitted alongside the aggregated vectors.
#[derive(Debug, Clone, Serialize)]
pub struct BinInfo {
    pub sample: Box<str>,
    pub cell_type: Box<str>,
    /// floor of the (possibly adjusted) library size
    pub sequence_read_count: u64,
    pub library_size: f64,
    pub cell_count: u32,
    pub design_elements: u32,
    pub cells_by_design_elements: u64,
    pub masked_cells: u32,
    pub read_length: Option<u32>,
    pub is_paired: Option<bool>,
}

/// One aggregated vector per design element, addressed over the
/// ordered bin sequence; `bins[i]` in the parent output carries the
/// per-position cell counts and the rest of the bin metadata.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedVector {
    pub design_element: Box<str>,
    pub data: Vec<f64>,
}

/// Terminal, immutable result of one aggregation run.
#[derive(Debug, Clone)]
pub struct AggregateOutput {
    pub quantitation_type: QuantitationType,
    pub method: AggregationMethod,
    pub bin_keys: Vec<BinKey>,
    pub bins: Vec<BinInfo>,
    pub vectors: Vec<AggregatedVector>,
}

impl AggregateOutput {
    pub fn num_bins(&self) -> usize {
        self.bins.len()
    }

    pub fn num_vectors(&self) -> usize {
        self.vectors.len()
    }

    /// Audit-style text, one line per bin, for external logging.
    pub fn describe(&self) -> String {
        let mut out = format!(
            "{} vectors aggregated into {} bins using {}.",
            self.vectors.len(),
            self.bins.len(),
            self.method
        );
        for info in self.bins.iter() {
            write!(
                out,
                "\n\t{} [{}] cells={} design elements={} observations={}",
                info.sample,
                info.cell_type,
                info.cell_count,
                info.design_elements,
                info.cells_by_design_elements
            )
            .ok();
            if info.masked_cells > 0 {
                write!(out, " masked cells={}", info.masked_cells).ok();
            }
            write!(out, " library size={:.2}", info.library_size).ok();
        }
        out
    }
}

/// Combine the collected sums with per-bin library sizes into the
/// final log2cpm vectors. This step always applies, whatever the input
/// scale was; the aggregation method only controlled the inverse
/// transform during collection.
pub fn normalize_and_assemble(
    stat: CollectedStat,
    lib: &LibrarySizes,
    layout: &BinLayout,
    dim: &CellDimension,
    design_elements: &[Box<str>],
    quantitation_type: QuantitationType,
    sum_pseudocount: f64,
    library_pseudocount: f64,
) -> Result<AggregateOutput> {
    let num_bins = stat.num_bins();
    if num_bins == 0 || stat.cell_counts_b.iter().all(|&c| c == 0) {
        return Err(AggregationError::EmptyAggregationResult);
    }

    let empty_bins = (0..num_bins).filter(|&b| lib.effective[b] == 0.0).count();
    if empty_bins > 0 {
        warn!(
            "{} bins have a zero library size; their log2cpm values will be NaN",
            empty_bins
        );
    }

    let method = stat.method;
    let sum_gb = &stat.sum_gb;
    let vectors: Vec<AggregatedVector> = (0..stat.num_genes())
        .into_par_iter()
        .map(|g| {
            let data = (0..num_bins)
                .map(|b| {
                    let lib_b = lib.effective[b];
                    if lib_b == 0.0 {
                        f64::NAN
                    } else {
                        (1e6 * (sum_gb[(g, b)] + sum_pseudocount) / (lib_b + library_pseudocount))
                            .log2()
                    }
                })
                .collect();
            AggregatedVector {
                design_element: design_elements[g].clone(),
                data,
            }
        })
        .collect();

    let bins: Vec<BinInfo> = (0..num_bins)
        .map(|b| {
            let key = layout.key(b);
            let sample = dim.sample(layout.sample_of_bin(b));
            BinInfo {
                sample: key.sample.clone(),
                cell_type: key.cell_type.clone(),
                sequence_read_count: lib.effective[b].floor() as u64,
                library_size: lib.effective[b],
                cell_count: stat.cell_counts_b[b],
                design_elements: stat.design_elements_b[b],
                cells_by_design_elements: stat.cells_by_design_b[b],
                masked_cells: stat.masked_cells_b[b],
                read_length: sample.read_length,
                is_paired: sample.is_paired,
            }
        })
        .collect();

    Ok(AggregateOutput {
        quantitation_type,
        method,
        bin_keys: layout.keys().to_vec(),
        bins,
        vectors,
    })
}
