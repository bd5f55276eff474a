//! The cell dimension: ordered cells, each owned by one sample.
//!
//! Per-cell arrays (values, cell type codes, mask) are aligned by
//! position against this ordering and must have matching lengths.

use crate::common::CsrMat;
use crate::error::{AggregationError, Result};
use crate::scale::QuantitationType;
use serde::Serialize;

/// One sample and the sequencing metadata that gets propagated onto
/// its synthetic pseudobulk assays.
#[derive(Debug, Clone, Serialize)]
pub struct SampleInfo {
    pub name: Box<str>,
    /// Total sequencing read count originally recorded for this
    /// sample; required when adjusting library sizes.
    pub sequence_read_count: Option<u64>,
    pub read_length: Option<u32>,
    pub is_paired: Option<bool>,
}

impl SampleInfo {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            sequence_read_count: None,
            read_length: None,
            is_paired: None,
        }
    }

    pub fn with_read_count(mut self, reads: u64) -> Self {
        self.sequence_read_count = Some(reads);
        self
    }
}

/// Ordered cells with a many-to-one mapping onto samples. Cells are
/// addressed by index, never by identity.
#[derive(Debug, Clone)]
pub struct CellDimension {
    samples: Vec<SampleInfo>,
    cell_to_sample: Vec<usize>,
}

impl CellDimension {
    pub fn new(samples: Vec<SampleInfo>, cell_to_sample: Vec<usize>) -> Result<Self> {
        let num_samples = samples.len();
        if let Some(&bad) = cell_to_sample.iter().find(|&&s| s >= num_samples) {
            return Err(AggregationError::InconsistentDimension {
                what: "cell to sample mapping",
                expected: num_samples,
                got: bad,
            });
        }
        Ok(Self {
            samples,
            cell_to_sample,
        })
    }

    pub fn num_cells(&self) -> usize {
        self.cell_to_sample.len()
    }

    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn sample(&self, s: usize) -> &SampleInfo {
        &self.samples[s]
    }

    pub fn samples(&self) -> &[SampleInfo] {
        &self.samples
    }

    pub fn sample_of_cell(&self, cell: usize) -> usize {
        self.cell_to_sample[cell]
    }

    pub fn cell_to_sample(&self) -> &[usize] {
        &self.cell_to_sample
    }
}

/// Sparse per-cell expression for one quantitation type: one CSR row
/// per design element (gene), one column per cell. Absent entries are
/// implicit zeros. Read-only input to the engine.
#[derive(Debug, Clone)]
pub struct ExpressionVectors {
    pub quantitation_type: QuantitationType,
    pub design_elements: Vec<Box<str>>,
    pub data: CsrMat,
}

impl ExpressionVectors {
    pub fn new(
        quantitation_type: QuantitationType,
        design_elements: Vec<Box<str>>,
        data: CsrMat,
    ) -> Result<Self> {
        if design_elements.len() != data.nrows() {
            return Err(AggregationError::InconsistentDimension {
                what: "design element names",
                expected: data.nrows(),
                got: design_elements.len(),
            });
        }
        Ok(Self {
            quantitation_type,
            design_elements,
            data,
        })
    }

    pub fn num_genes(&self) -> usize {
        self.data.nrows()
    }

    pub fn num_cells(&self) -> usize {
        self.data.ncols()
    }
}
