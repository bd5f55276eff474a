use crate::common::*;
use crate::input::*;
use crate::io::*;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::io::Write as _;

#[derive(Parser, Debug, Clone)]
pub struct AggregateArgs {
    /// expression data in MatrixMarket triplet format (`.mtx` or
    /// `.mtx.gz`), genes x cells
    #[arg(long, short = 'd', required = true)]
    pub mtx_file: Box<str>,

    /// gene (design element) names, one per line, matching mtx rows
    #[arg(long, short = 'g', required = true)]
    pub gene_file: Box<str>,

    /// cell-to-sample membership. Each line is either a sample name or
    /// a `cell<TAB>sample` pair, in mtx column order.
    #[arg(long, short = 's', required = true)]
    pub cell_sample_file: Box<str>,

    /// cell-to-cell-type assignment, same shape as the sample file;
    /// `NA` marks an unassigned cell
    #[arg(long, short = 't', required = true)]
    pub cell_type_file: Box<str>,

    /// optional cell mask, one 0/1 per cell (1 = exclude)
    #[arg(long, short = 'm')]
    pub mask_file: Option<Box<str>>,

    /// optional recorded sequencing depths, `sample<TAB>reads` rows;
    /// required with --adjust-library-sizes
    #[arg(long, short = 'r')]
    pub sample_read_file: Option<Box<str>>,

    /// input value scale: count, linear, log2 or log1p
    #[arg(long, default_value = "count")]
    pub scale: Box<str>,

    /// name of the input quantitation type
    #[arg(long, default_value = "single-cell counts")]
    pub qt_name: Box<str>,

    /// keep unassigned cells in a per-sample "unknown" bin instead of
    /// dropping them
    #[arg(long, default_value_t = false)]
    pub include_unknown: bool,

    /// rescale per-bin library sizes to the recorded sequencing depths
    #[arg(long, default_value_t = false)]
    pub adjust_library_sizes: bool,

    /// additive constant on each bin sum in the log2cpm transform
    #[arg(long, default_value_t = 0.5)]
    pub sum_pseudocount: f64,

    /// additive constant on the library size in the log2cpm transform
    #[arg(long, default_value_t = 1.0)]
    pub library_pseudocount: f64,

    /// mark the aggregated quantitation type as preferred
    #[arg(long, default_value_t = false)]
    pub preferred: bool,

    /// output file prefix
    #[arg(long, short, required = true)]
    pub out: Box<str>,

    /// verbosity
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Serialize)]
struct RunSummary<'a> {
    quantitation_type: &'a pseudobulk_core::scale::QuantitationType,
    method: pseudobulk_core::scale::AggregationMethod,
    num_vectors: usize,
    num_bins: usize,
    bins: &'a [pseudobulk_core::normalize::BinInfo],
}

fn parse_scale(scale: &str) -> ScaleType {
    match scale.to_ascii_lowercase().as_str() {
        "count" => ScaleType::Count,
        "linear" => ScaleType::Linear,
        "log2" => ScaleType::Log2,
        "log1p" => ScaleType::Log1p,
        other => ScaleType::Other(other.to_ascii_uppercase().into()),
    }
}

/// Run pseudobulk aggregation over files on disk.
pub fn run_aggregate(args: AggregateArgs) -> anyhow::Result<()> {
    if args.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::try_init().ok();

    let data = read_input_data(InputDataArgs {
        mtx_file: args.mtx_file,
        gene_file: args.gene_file,
        cell_sample_file: args.cell_sample_file,
        cell_type_file: args.cell_type_file,
        mask_file: args.mask_file,
        sample_read_file: args.sample_read_file,
        qt_name: args.qt_name,
        scale: parse_scale(args.scale.as_ref()),
    })?;

    let config = AggregateConfig {
        include_unknown: args.include_unknown,
        adjust_library_sizes: args.adjust_library_sizes,
        make_preferred: args.preferred,
        sum_pseudocount: args.sum_pseudocount,
        library_pseudocount: args.library_pseudocount,
    };

    let output = aggregate(
        &data.dim,
        &data.vectors,
        &data.cta,
        data.mask.as_ref(),
        &config,
    )?;

    info!("{}", output.describe());

    write_log2cpm_matrix(&output, &format!("{}.log2cpm.tsv.gz", args.out))?;
    write_bin_table(&output, &format!("{}.bins.tsv", args.out))?;

    let summary = RunSummary {
        quantitation_type: &output.quantitation_type,
        method: output.method,
        num_vectors: output.num_vectors(),
        num_bins: output.num_bins(),
        bins: &output.bins,
    };
    let mut buf = open_buf_writer(&format!("{}.summary.json", args.out))?;
    serde_json::to_writer_pretty(&mut buf, &summary)?;
    buf.flush()?;

    info!("Done");
    Ok(())
}

/// genes x bins matrix with a bin header, one gene per line
fn write_log2cpm_matrix(output: &AggregateOutput, file: &str) -> anyhow::Result<()> {
    let mut buf = open_buf_writer(file)?;

    let header: Vec<String> = output
        .bins
        .iter()
        .map(|b| format!("{}:{}", b.sample, b.cell_type))
        .collect();
    writeln!(buf, "gene\t{}", header.join("\t"))?;

    let pb = ProgressBar::new(output.num_vectors() as u64).with_style(
        ProgressStyle::with_template("Writing {bar:40} {pos}/{len} vectors ({eta})")?
            .progress_chars("##-"),
    );

    let lines: Vec<String> = output
        .vectors
        .par_iter()
        .map(|v| {
            let values: Vec<String> = v.data.iter().map(|x| format!("{:.4}", x)).collect();
            format!("{}\t{}", v.design_element, values.join("\t"))
        })
        .collect();

    for line in lines {
        writeln!(buf, "{}", line)?;
        pb.inc(1);
    }
    pb.finish_and_clear();
    buf.flush()?;
    Ok(())
}

fn write_bin_table(output: &AggregateOutput, file: &str) -> anyhow::Result<()> {
    let mut buf = open_buf_writer(file)?;
    writeln!(
        buf,
        "sample\tcell_type\tlibrary_size\tsequence_read_count\tcell_count\tdesign_elements\tcells_by_design_elements\tmasked_cells"
    )?;
    for b in output.bins.iter() {
        writeln!(
            buf,
            "{}\t{}\t{:.2}\t{}\t{}\t{}\t{}\t{}",
            b.sample,
            b.cell_type,
            b.library_size,
            b.sequence_read_count,
            b.cell_count,
            b.design_elements,
            b.cells_by_design_elements,
            b.masked_cells
        )?;
    }
    buf.flush()?;
    Ok(())
}
