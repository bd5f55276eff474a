//! Assemble the engine's inputs from files on disk.

use crate::common::*;
use crate::io::*;

use fnv::FnvHashMap as HashMap;
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use pseudobulk_core::annotation::{CellMask, CellType, CellTypeAssignment};
use pseudobulk_core::cell_dim::{CellDimension, ExpressionVectors, SampleInfo};
use pseudobulk_core::scale::{QuantitationType, ScaleType};

/// Unassigned marker accepted in cell type files.
const NA: &str = "NA";

pub struct InputDataArgs {
    pub mtx_file: Box<str>,
    pub gene_file: Box<str>,
    pub cell_sample_file: Box<str>,
    pub cell_type_file: Box<str>,
    pub mask_file: Option<Box<str>>,
    pub sample_read_file: Option<Box<str>>,
    pub qt_name: Box<str>,
    pub scale: ScaleType,
}

pub struct InputData {
    pub dim: CellDimension,
    pub vectors: ExpressionVectors,
    pub cta: CellTypeAssignment,
    pub mask: Option<CellMask>,
}

/// Last word of each line: files may carry either `value` or
/// `cell<TAB>value` rows.
fn last_words(file: &str) -> anyhow::Result<Vec<Box<str>>> {
    Ok(read_lines_of_words(file)?
        .into_iter()
        .filter(|words| !words.is_empty())
        .map(|mut words| words.pop().unwrap())
        .collect())
}

pub fn read_input_data(args: InputDataArgs) -> anyhow::Result<InputData> {
    let gene_names = read_lines(args.gene_file.as_ref())?;

    // cell -> sample, in cell order; samples in first-appearance order
    let cell_samples = last_words(args.cell_sample_file.as_ref())?;
    let num_cells = cell_samples.len();

    let mut sample_index: HashMap<Box<str>, usize> = HashMap::default();
    let mut samples: Vec<SampleInfo> = vec![];
    let cell_to_sample: Vec<usize> = cell_samples
        .iter()
        .map(|name| {
            *sample_index.entry(name.clone()).or_insert_with(|| {
                samples.push(SampleInfo::new(name));
                samples.len() - 1
            })
        })
        .collect();

    if let Some(read_file) = args.sample_read_file.as_ref() {
        for words in read_lines_of_words(read_file.as_ref())? {
            if words.len() != 2 {
                return Err(anyhow::anyhow!("expected `sample<TAB>reads` rows"));
            }
            let s = *sample_index
                .get(&words[0])
                .ok_or_else(|| anyhow::anyhow!("unknown sample {} in read counts", words[0]))?;
            samples[s].sequence_read_count = Some(words[1].parse::<u64>()?);
        }
    }

    info!("{} cells across {} samples", num_cells, samples.len());
    let dim = CellDimension::new(samples, cell_to_sample)?;

    // cell -> cell type; categories sorted by name for a stable order
    let cell_type_names = last_words(args.cell_type_file.as_ref())?;
    let sorted_types: Vec<Box<str>> = cell_type_names
        .iter()
        .filter(|name| name.as_ref() != NA)
        .cloned()
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();

    let type_index: HashMap<Box<str>, usize> = sorted_types
        .iter()
        .enumerate()
        .map(|(k, name)| (name.clone(), k))
        .collect();

    let codes: Vec<Option<usize>> = cell_type_names
        .iter()
        .map(|name| type_index.get(name).copied())
        .collect();
    let cell_types: Vec<CellType> = sorted_types.iter().map(|name| CellType::new(name)).collect();

    info!("{} cell types", cell_types.len());
    let cta = CellTypeAssignment::new(cell_types, codes)?;

    // optional mask: one 0/1 per cell, nonzero excludes
    let mask = match args.mask_file.as_ref() {
        Some(mask_file) => {
            let flags = last_words(mask_file.as_ref())?
                .iter()
                .map(|w| w.parse::<u8>().map(|x| x != 0))
                .collect::<Result<Vec<bool>, _>>()?;
            Some(CellMask::from_excluded(flags))
        }
        None => None,
    };

    // expression triplets: genes x cells
    let (triplets, (nrow, ncol, _)) = read_mtx_triplets(args.mtx_file.as_ref())?;
    if nrow != gene_names.len() {
        return Err(anyhow::anyhow!(
            "mtx has {} rows but {} gene names were given",
            nrow,
            gene_names.len()
        ));
    }
    if ncol != num_cells {
        return Err(anyhow::anyhow!(
            "mtx has {} columns but {} cells were given",
            ncol,
            num_cells
        ));
    }

    let mut coo = CooMatrix::new(nrow, ncol);
    for (row, col, val) in triplets {
        coo.push(row, col, val);
    }

    let qt = QuantitationType::new(args.qt_name.as_ref(), "", args.scale);
    let vectors = ExpressionVectors::new(qt, gene_names, CsrMatrix::from(&coo))?;

    Ok(InputData {
        dim,
        vectors,
        cta,
        mask,
    })
}
