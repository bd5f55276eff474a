//! Quantitation scales and the aggregation methods they dispatch to.

use crate::error::{AggregationError, Result};
use serde::Serialize;
use std::fmt;

/// How the numeric values of a quantitation type are encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ScaleType {
    /// Raw counts (linear).
    Count,
    /// Linear amounts.
    Linear,
    /// log2-transformed values.
    Log2,
    /// log2(1 + x)-transformed values.
    Log1p,
    /// Anything else (e.g. percent); not aggregatable.
    Other(Box<str>),
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleType::Count => write!(f, "COUNT"),
            ScaleType::Linear => write!(f, "LINEAR"),
            ScaleType::Log2 => write!(f, "LOG2"),
            ScaleType::Log1p => write!(f, "LOG1P"),
            ScaleType::Other(name) => write!(f, "{}", name),
        }
    }
}

/// How per-cell values are inverted into summable linear space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMethod {
    /// Sum values as they are.
    Sum,
    /// Equivalent to `Sum` for log2-transformed data.
    LogSum,
    /// Equivalent to `Sum` for log2(1 + x)-transformed data.
    Log1pSum,
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationMethod::Sum => write!(f, "SUM"),
            AggregationMethod::LogSum => write!(f, "LOG_SUM"),
            AggregationMethod::Log1pSum => write!(f, "LOG1P_SUM"),
        }
    }
}

// serialized form matches the audit text and the QT description
impl Serialize for AggregationMethod {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl AggregationMethod {
    /// Pick the method matching the input scale, or fail with the
    /// offending scale name before any aggregation work happens.
    pub fn from_scale(scale: &ScaleType) -> Result<Self> {
        match scale {
            ScaleType::Count | ScaleType::Linear => Ok(AggregationMethod::Sum),
            ScaleType::Log2 => Ok(AggregationMethod::LogSum),
            ScaleType::Log1p => Ok(AggregationMethod::Log1pSum),
            other => Err(AggregationError::UnsupportedScaleType {
                scale: other.to_string().into(),
            }),
        }
    }

    /// Linear-equivalent contribution of one encoded value.
    pub fn to_linear(&self, value: f64) -> f64 {
        match self {
            AggregationMethod::Sum => value,
            AggregationMethod::LogSum => value.exp2(),
            AggregationMethod::Log1pSum => value.exp2() - 1.0,
        }
    }
}

/// Metadata describing one set of expression values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuantitationType {
    pub name: Box<str>,
    pub description: Box<str>,
    pub scale: ScaleType,
    pub is_preferred: bool,
}

impl QuantitationType {
    pub fn new(name: &str, description: &str, scale: ScaleType) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            scale,
            is_preferred: false,
        }
    }

    /// Derive the quantitation type of the aggregated output. The
    /// output is always on the linear-log2cpm scale, whatever the
    /// input encoding was.
    pub fn aggregated_log2cpm(&self, method: AggregationMethod, make_preferred: bool) -> Self {
        let description = if self.description.is_empty() {
            format!(
                "Expression data has been aggregated by cell type using {} \
                 and converted to log2cpm.",
                method
            )
        } else {
            format!(
                "{}\nExpression data has been aggregated by cell type using {} \
                 and converted to log2cpm.",
                self.description, method
            )
        };
        Self {
            name: format!("{} aggregated by cell type (log2cpm)", self.name).into(),
            description: description.into(),
            scale: ScaleType::Log2,
            is_preferred: make_preferred,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_dispatch_by_scale() -> anyhow::Result<()> {
        assert_eq!(
            AggregationMethod::from_scale(&ScaleType::Count)?,
            AggregationMethod::Sum
        );
        assert_eq!(
            AggregationMethod::from_scale(&ScaleType::Linear)?,
            AggregationMethod::Sum
        );
        assert_eq!(
            AggregationMethod::from_scale(&ScaleType::Log2)?,
            AggregationMethod::LogSum
        );
        assert_eq!(
            AggregationMethod::from_scale(&ScaleType::Log1p)?,
            AggregationMethod::Log1pSum
        );
        Ok(())
    }

    #[test]
    fn unsupported_scale_carries_its_name() {
        let err = AggregationMethod::from_scale(&ScaleType::Other("PERCENT".into())).unwrap_err();
        match err {
            AggregationError::UnsupportedScaleType { scale } => {
                assert_eq!(scale.as_ref(), "PERCENT")
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn inverse_transforms() {
        use approx::assert_relative_eq;
        assert_relative_eq!(AggregationMethod::Sum.to_linear(7.0), 7.0);
        assert_relative_eq!(AggregationMethod::LogSum.to_linear(3.0), 8.0);
        assert_relative_eq!(AggregationMethod::Log1pSum.to_linear(3.0), 7.0);
        assert_relative_eq!(AggregationMethod::Log1pSum.to_linear(0.0), 0.0);
    }

    #[test]
    fn aggregated_quantitation_type_naming() {
        let qt = QuantitationType::new("10x counts", "UMI counts", ScaleType::Count);
        let out = qt.aggregated_log2cpm(AggregationMethod::Sum, true);
        assert_eq!(
            out.name.as_ref(),
            "10x counts aggregated by cell type (log2cpm)"
        );
        assert!(out.description.contains("SUM"));
        assert_eq!(out.scale, ScaleType::Log2);
        assert!(out.is_preferred);
    }
}
