//! Aggregation bins: one (sample, cell type) output unit per surviving
//! category, laid out sample-major in a deterministic order so that
//! re-running the same inputs reproduces the identical bin structure.

use crate::annotation::CellTypeAssignment;
use crate::cell_dim::CellDimension;
use log::info;
use serde::Serialize;

/// Label used for the synthetic per-sample category that captures
/// unassigned cells when `include_unknown` is on.
pub const UNKNOWN_CELL_TYPE: &str = "unknown";

/// Identity of one bin, by name. Two aggregation runs that produce the
/// same key sequence share the same dimension identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinKey {
    pub sample: Box<str>,
    pub cell_type: Box<str>,
}

/// Sample-major ordering of output bins over the surviving categories.
///
/// Categories whose factor value has been deleted upstream are omitted
/// for every sample; their cells contribute nothing anywhere. The
/// unknown slot, when present, comes after all known categories.
#[derive(Debug, Clone)]
pub struct BinLayout {
    keys: Vec<BinKey>,
    /// cell type code -> slot within a sample's block
    slot_of_code: Vec<Option<usize>>,
    unknown_slot: Option<usize>,
    num_slots: usize,
}

impl BinLayout {
    pub fn new(dim: &CellDimension, cta: &CellTypeAssignment, include_unknown: bool) -> Self {
        let mut slot_of_code = vec![None; cta.num_cell_types()];
        let mut slot_names: Vec<Box<str>> = Vec::with_capacity(cta.num_cell_types() + 1);

        for (code, cell_type) in cta.cell_types().iter().enumerate() {
            if cell_type.factor_value.is_some() {
                slot_of_code[code] = Some(slot_names.len());
                slot_names.push(cell_type.name.clone());
            } else {
                info!(
                    "cell type {} no longer maps to a factor value; dropping its bins for all samples",
                    cell_type.name
                );
            }
        }

        let unknown_slot = if include_unknown {
            slot_names.push(UNKNOWN_CELL_TYPE.into());
            Some(slot_names.len() - 1)
        } else {
            None
        };

        let num_slots = slot_names.len();
        let mut keys = Vec::with_capacity(dim.num_samples() * num_slots);
        for sample in dim.samples() {
            for name in slot_names.iter() {
                keys.push(BinKey {
                    sample: sample.name.clone(),
                    cell_type: name.clone(),
                });
            }
        }

        Self {
            keys,
            slot_of_code,
            unknown_slot,
            num_slots,
        }
    }

    pub fn num_bins(&self) -> usize {
        self.keys.len()
    }

    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    pub fn keys(&self) -> &[BinKey] {
        &self.keys
    }

    pub fn key(&self, bin: usize) -> &BinKey {
        &self.keys[bin]
    }

    pub fn sample_of_bin(&self, bin: usize) -> usize {
        bin / self.num_slots
    }

    /// Bins belonging to one sample, in layout order.
    pub fn bins_of_sample(&self, sample: usize) -> std::ops::Range<usize> {
        sample * self.num_slots..(sample + 1) * self.num_slots
    }

    /// Destination bin for every cell: `None` when the cell is
    /// unassigned (and unknowns are off) or its category was dropped.
    /// Masking is handled separately by the collector.
    pub fn cell_to_bin(&self, dim: &CellDimension, cta: &CellTypeAssignment) -> Vec<Option<usize>> {
        (0..dim.num_cells())
            .map(|cell| {
                let slot = match cta.code_of_cell(cell) {
                    Some(code) => self.slot_of_code[code],
                    None => self.unknown_slot,
                };
                slot.map(|sl| dim.sample_of_cell(cell) * self.num_slots + sl)
            })
            .collect()
    }
}
