//! Per-cell categorical annotations: cell type assignment and the
//! optional inclusion mask.

use crate::error::{AggregationError, Result};

/// One cell type category. The `factor_value` is the experimental
/// factor value the category maps to; when a curator has deleted that
/// factor value upstream, it is `None` and the category has no valid
/// destination bin anymore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellType {
    pub name: Box<str>,
    pub factor_value: Option<Box<str>>,
}

impl CellType {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            factor_value: Some(name.into()),
        }
    }

    pub fn unmapped(name: &str) -> Self {
        Self {
            name: name.into(),
            factor_value: None,
        }
    }
}

/// Immutable mapping cell index -> cell type code; `None` means the
/// cell is unassigned. A new assignment is a new value, never an
/// in-place edit of an old one.
#[derive(Debug, Clone)]
pub struct CellTypeAssignment {
    cell_types: Vec<CellType>,
    codes: Vec<Option<usize>>,
}

impl CellTypeAssignment {
    pub fn new(cell_types: Vec<CellType>, codes: Vec<Option<usize>>) -> Result<Self> {
        let num_types = cell_types.len();
        if let Some(&Some(bad)) = codes.iter().find(|c| matches!(c, Some(k) if *k >= num_types)) {
            return Err(AggregationError::InconsistentDimension {
                what: "cell type codes",
                expected: num_types,
                got: bad,
            });
        }
        Ok(Self { cell_types, codes })
    }

    pub fn num_cell_types(&self) -> usize {
        self.cell_types.len()
    }

    pub fn num_cells(&self) -> usize {
        self.codes.len()
    }

    pub fn cell_types(&self) -> &[CellType] {
        &self.cell_types
    }

    pub fn code_of_cell(&self, cell: usize) -> Option<usize> {
        self.codes[cell]
    }

    pub fn codes(&self) -> &[Option<usize>] {
        &self.codes
    }
}

/// Per-cell boolean exclusion flag, independent of cell type. A
/// masked-out cell contributes to no sum and to no count.
#[derive(Debug, Clone)]
pub struct CellMask {
    excluded: Vec<bool>,
}

impl CellMask {
    pub fn from_excluded(excluded: Vec<bool>) -> Self {
        Self { excluded }
    }

    pub fn num_cells(&self) -> usize {
        self.excluded.len()
    }

    pub fn is_excluded(&self, cell: usize) -> bool {
        self.excluded[cell]
    }

    pub fn num_excluded(&self) -> usize {
        self.excluded.iter().filter(|&&x| x).count()
    }
}
