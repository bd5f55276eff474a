use crate::common::*;
use crate::io::*;

use clap::Parser;
use rand::prelude::*;
use rand_distr::{Gamma, Poisson};

#[derive(Parser, Debug, Clone)]
pub struct SimulateArgs {
    /// number of genes
    #[arg(long, default_value_t = 100)]
    pub num_genes: usize,

    /// number of samples
    #[arg(long, default_value_t = 4)]
    pub num_samples: usize,

    /// number of cell types
    #[arg(long, default_value_t = 3)]
    pub num_types: usize,

    /// cells per sample
    #[arg(long, default_value_t = 50)]
    pub cells_per_sample: usize,

    /// mean reads per cell
    #[arg(long, default_value_t = 30.0)]
    pub depth: f64,

    /// fraction of cells left without a cell type
    #[arg(long, default_value_t = 0.0)]
    pub unassigned: f64,

    /// recorded sequencing depth relative to the simulated totals
    #[arg(long, default_value_t = 1.1)]
    pub read_inflation: f64,

    /// random seed
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// output file prefix
    #[arg(long, short, required = true)]
    pub out: Box<str>,

    /// verbosity
    #[arg(long, short)]
    pub verbose: bool,
}

/// Simulate Poisson counts over a samples x cell-types x genes design
/// and write them out in the formats `aggregate` reads back.
pub fn run_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    if args.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::try_init().ok();

    let mut rng = StdRng::seed_from_u64(args.seed);

    // per (gene, type) activity, shared across samples
    let gamma = Gamma::new(2.0, 1.0)?;
    let activity: Vec<Vec<f64>> = (0..args.num_genes)
        .map(|_| (0..args.num_types).map(|_| rng.sample(gamma)).collect())
        .collect();

    let num_cells = args.num_samples * args.cells_per_sample;
    let mut cell_samples = Vec::with_capacity(num_cells);
    let mut cell_types = Vec::with_capacity(num_cells);
    let mut triplets: Vec<(usize, usize, f64)> = vec![];
    let mut sample_totals = vec![0u64; args.num_samples];

    for cell in 0..num_cells {
        let s = cell / args.cells_per_sample;
        let k = cell % args.num_types;
        let unassigned = args.unassigned > 0.0 && rng.random_bool(args.unassigned);
        cell_samples.push(format!("cell_{}\ts{}", cell, s));
        cell_types.push(if unassigned {
            format!("cell_{}\tNA", cell)
        } else {
            format!("cell_{}\tT{}", cell, k)
        });

        let norm: f64 = activity.iter().map(|a| a[k]).sum();
        for (g, a) in activity.iter().enumerate() {
            let rate = args.depth * a[k] / norm;
            if rate <= 0.0 {
                continue;
            }
            let count = rng.sample(Poisson::new(rate)?);
            if count > 0.0 {
                triplets.push((g, cell, count));
                sample_totals[s] += count as u64;
            }
        }
    }

    info!(
        "simulated {} non-zero observations over {} cells",
        triplets.len(),
        num_cells
    );

    let gene_names: Vec<String> = (0..args.num_genes).map(|g| format!("g{}", g)).collect();
    let read_counts: Vec<String> = sample_totals
        .iter()
        .enumerate()
        .map(|(s, &tot)| {
            let recorded = (tot as f64 * args.read_inflation).ceil() as u64;
            format!("s{}\t{}", s, recorded)
        })
        .collect();

    write_mtx_triplets(
        &triplets,
        args.num_genes,
        num_cells,
        &format!("{}.mtx.gz", args.out),
    )?;
    write_lines(&gene_names, &format!("{}.genes.tsv", args.out))?;
    write_lines(&cell_samples, &format!("{}.samples.tsv", args.out))?;
    write_lines(&cell_types, &format!("{}.types.tsv", args.out))?;
    write_lines(&read_counts, &format!("{}.reads.tsv", args.out))?;

    info!("Done");
    Ok(())
}
