//! Single-cell to pseudobulk aggregation.
//!
//! Given per-cell sparse expression, a cell-to-sample dimension, a
//! cell type assignment and an optional cell mask, produce one
//! aggregated value per (sample, cell type) bin per gene on a common
//! log2cpm scale, together with per-bin metadata (library size, cell
//! count, design-element count).

pub mod aggregate;
pub mod annotation;
pub mod bins;
pub mod cell_dim;
pub mod collect;
pub mod common;
pub mod error;
pub mod library_size;
pub mod normalize;
pub mod scale;
pub mod store;

pub use aggregate::{aggregate, AggregateConfig};
pub use annotation::{CellMask, CellType, CellTypeAssignment};
pub use bins::{BinKey, BinLayout, UNKNOWN_CELL_TYPE};
pub use cell_dim::{CellDimension, ExpressionVectors, SampleInfo};
pub use error::{AggregationError, Result};
pub use normalize::{AggregateOutput, AggregatedVector, BinInfo};
pub use scale::{AggregationMethod, QuantitationType, ScaleType};
pub use store::{AggregateStore, MemoryStore, ReplaceSummary};
