use pseudobulk_cli::io::read_lines;
use pseudobulk_cli::run_aggregate::{run_aggregate, AggregateArgs};
use pseudobulk_cli::run_simulate::{run_simulate, SimulateArgs};

const NUM_GENES: usize = 20;
const NUM_SAMPLES: usize = 3;
const NUM_TYPES: usize = 2;
const CELLS_PER_SAMPLE: usize = 15;

fn simulate_args(prefix: &str, unassigned: f64, seed: u64) -> SimulateArgs {
    SimulateArgs {
        num_genes: NUM_GENES,
        num_samples: NUM_SAMPLES,
        num_types: NUM_TYPES,
        cells_per_sample: CELLS_PER_SAMPLE,
        depth: 25.0,
        unassigned,
        read_inflation: 1.1,
        seed,
        out: prefix.into(),
        verbose: false,
    }
}

fn aggregate_args(prefix: &str) -> AggregateArgs {
    AggregateArgs {
        mtx_file: format!("{}.mtx.gz", prefix).into(),
        gene_file: format!("{}.genes.tsv", prefix).into(),
        cell_sample_file: format!("{}.samples.tsv", prefix).into(),
        cell_type_file: format!("{}.types.tsv", prefix).into(),
        mask_file: None,
        sample_read_file: None,
        qt_name: "simulated counts".into(),
        scale: "count".into(),
        include_unknown: false,
        adjust_library_sizes: false,
        sum_pseudocount: 0.5,
        library_pseudocount: 1.0,
        preferred: false,
        out: prefix.into(),
        verbose: false,
    }
}

#[test]
fn simulate_then_aggregate_round_trip() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let prefix = dir.path().join("sim").to_string_lossy().into_owned();

    run_simulate(simulate_args(&prefix, 0.0, 42))?;
    run_aggregate(aggregate_args(&prefix))?;

    // genes x bins matrix plus a header line
    let matrix = read_lines(&format!("{}.log2cpm.tsv.gz", prefix))?;
    assert_eq!(matrix.len(), NUM_GENES + 1);
    let num_bins = NUM_SAMPLES * NUM_TYPES;
    for line in matrix.iter().skip(1) {
        let words: Vec<&str> = line.split('\t').collect();
        assert_eq!(words.len(), num_bins + 1);
        for w in words.iter().skip(1) {
            let x = w.parse::<f64>()?;
            assert!(x.is_finite());
        }
    }

    let bins = read_lines(&format!("{}.bins.tsv", prefix))?;
    assert_eq!(bins.len(), num_bins + 1);

    let summary: serde_json::Value =
        serde_json::from_str(&read_lines(&format!("{}.summary.json", prefix))?.join("\n"))?;
    assert_eq!(summary["num_bins"], num_bins);
    assert_eq!(summary["num_vectors"], NUM_GENES);
    // same label as the audit text and the QT description
    assert_eq!(summary["method"], "SUM");
    let name = summary["quantitation_type"]["name"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("missing quantitation type name"))?;
    assert_eq!(name, "simulated counts aggregated by cell type (log2cpm)");
    Ok(())
}

#[test]
fn adjusted_run_with_unknown_bins() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let prefix = dir.path().join("sim").to_string_lossy().into_owned();

    run_simulate(simulate_args(&prefix, 0.2, 7))?;

    let mut args = aggregate_args(&prefix);
    args.sample_read_file = Some(format!("{}.reads.tsv", prefix).into());
    args.include_unknown = true;
    args.adjust_library_sizes = true;
    run_aggregate(args)?;

    // one extra "unknown" bin per sample
    let num_bins = NUM_SAMPLES * (NUM_TYPES + 1);
    let bins = read_lines(&format!("{}.bins.tsv", prefix))?;
    assert_eq!(bins.len(), num_bins + 1);
    assert!(bins.iter().skip(1).any(|line| line.contains("unknown")));

    let matrix = read_lines(&format!("{}.log2cpm.tsv.gz", prefix))?;
    assert_eq!(matrix.len(), NUM_GENES + 1);
    Ok(())
}

#[test]
fn adjustment_without_read_counts_is_rejected() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let prefix = dir.path().join("sim").to_string_lossy().into_owned();

    run_simulate(simulate_args(&prefix, 0.0, 11))?;

    let mut args = aggregate_args(&prefix);
    args.adjust_library_sizes = true;
    assert!(run_aggregate(args).is_err());
    Ok(())
}
