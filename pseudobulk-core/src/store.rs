//! Persistence seam for aggregation results.
//!
//! The engine computes fully in memory; a store swaps the previously
//! persisted aggregate for the new one in a single step, so a redo
//! replaces rather than duplicates. The bin dimension keeps its
//! identity across redos when the bin structure is unchanged.

use crate::normalize::AggregateOutput;
use fnv::FnvHashMap as HashMap;
use log::info;

/// One persisted aggregate per experiment.
#[derive(Debug, Clone)]
pub struct StoredAggregate {
    pub dimension_id: u64,
    pub output: AggregateOutput,
    pub audit: Box<str>,
}

/// What a replace did, for the caller's bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceSummary {
    pub dimension_id: u64,
    /// true when the previous bin dimension identity was kept
    pub reused_dimension: bool,
    /// vectors belonging to the retired aggregate
    pub retired_vectors: usize,
}

/// Two-phase boundary between the engine and persistence: the output
/// is complete before either method is called, and a failed run never
/// reaches the store.
pub trait AggregateStore {
    /// Atomically replace the experiment's aggregated quantitation
    /// type, bin dimension and vectors with `output`.
    fn replace_aggregate(&mut self, experiment: &str, output: AggregateOutput) -> ReplaceSummary;

    /// Drop the experiment's aggregate, returning the number of
    /// removed vectors. Per-bin sparsity metadata goes with it.
    fn remove_aggregate(&mut self, experiment: &str) -> usize;
}

/// In-memory store, also used by tests as a side-effect probe.
#[derive(Debug, Default)]
pub struct MemoryStore {
    aggregates: HashMap<Box<str>, StoredAggregate>,
    next_dimension_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, experiment: &str) -> Option<&StoredAggregate> {
        self.aggregates.get(experiment)
    }

    pub fn len(&self) -> usize {
        self.aggregates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }

    fn fresh_dimension_id(&mut self) -> u64 {
        self.next_dimension_id += 1;
        self.next_dimension_id
    }
}

impl AggregateStore for MemoryStore {
    fn replace_aggregate(&mut self, experiment: &str, output: AggregateOutput) -> ReplaceSummary {
        let previous = self.aggregates.remove(experiment);
        let (dimension_id, reused_dimension, retired_vectors) = match previous {
            Some(old) if old.output.bin_keys == output.bin_keys => {
                (old.dimension_id, true, old.output.vectors.len())
            }
            Some(old) => {
                info!(
                    "bin structure changed for {}; retiring dimension {}",
                    experiment, old.dimension_id
                );
                (self.fresh_dimension_id(), false, old.output.vectors.len())
            }
            None => (self.fresh_dimension_id(), false, 0),
        };

        let audit = output.describe().into();
        self.aggregates.insert(
            experiment.into(),
            StoredAggregate {
                dimension_id,
                output,
                audit,
            },
        );

        ReplaceSummary {
            dimension_id,
            reused_dimension,
            retired_vectors,
        }
    }

    fn remove_aggregate(&mut self, experiment: &str) -> usize {
        self.aggregates
            .remove(experiment)
            .map(|old| old.output.vectors.len())
            .unwrap_or(0)
    }
}
