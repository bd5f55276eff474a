//! Error types for pseudobulk aggregation

use thiserror::Error;

/// Failures of an aggregation run. Nothing is persisted when any of
/// these is returned; callers can match on the variant to distinguish
/// "unsupported scale" from "no data" from an upstream data error.
#[derive(Error, Debug)]
pub enum AggregationError {
    /// The input quantitation type's scale has no known inverse
    /// transform into summable linear space.
    #[error("unsupported scale type for aggregation: {scale}")]
    UnsupportedScaleType { scale: Box<str> },

    /// Every bin ended up with zero contributing cells.
    #[error("aggregation produced no bins with contributing cells")]
    EmptyAggregationResult,

    /// Positional mismatch between per-cell arrays; data error
    /// upstream, never silently truncated.
    #[error("inconsistent {what}: expected {expected} entries, got {got}")]
    InconsistentDimension {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// Library-size adjustment requires a recorded sequencing read
    /// count for every sample; checked before any aggregation work.
    #[error("sample {sample} has no recorded sequencing read count (required to adjust library sizes)")]
    MissingLibrarySize { sample: Box<str> },

    /// The reads observed in the vectors cannot exceed the recorded
    /// sequencing depth of the sample.
    #[error("observed library size of sample {sample} ({observed:.2}) exceeds its recorded read count ({recorded})")]
    LibrarySizeExceeded {
        sample: Box<str>,
        observed: f64,
        recorded: u64,
    },
}

pub type Result<T> = std::result::Result<T, AggregationError>;
