//! Small gzip-aware file IO helpers for the aggregation CLI.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Open a file for reading, gunzipping when the extension is `.gz`.
pub fn open_buf_reader(input_file: &str) -> anyhow::Result<Box<dyn BufRead>> {
    let ext = Path::new(input_file).extension().and_then(|x| x.to_str());
    let file = File::open(input_file)?;
    match ext {
        Some("gz") => Ok(Box::new(BufReader::new(GzDecoder::new(file)))),
        _ => Ok(Box::new(BufReader::new(file))),
    }
}

/// Open a file for writing, gzipping when the extension is `.gz`.
pub fn open_buf_writer(output_file: &str) -> anyhow::Result<Box<dyn Write>> {
    if let Some(parent) = Path::new(output_file).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(output_file)?;
    let ext = Path::new(output_file).extension().and_then(|x| x.to_str());
    match ext {
        Some("gz") => {
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            Ok(Box::new(BufWriter::new(encoder)))
        }
        _ => Ok(Box::new(BufWriter::new(file))),
    }
}

/// Read every line of a (possibly gzipped) file into memory.
pub fn read_lines(input_file: &str) -> anyhow::Result<Vec<Box<str>>> {
    let buf = open_buf_reader(input_file)?;
    let mut lines = vec![];
    for x in buf.lines() {
        lines.push(x?.into_boxed_str());
    }
    Ok(lines)
}

/// Read lines of whitespace- or comma-delimited words.
pub fn read_lines_of_words(input_file: &str) -> anyhow::Result<Vec<Vec<Box<str>>>> {
    Ok(read_lines(input_file)?
        .iter()
        .map(|line| {
            line.split(['\t', ',', ' '])
                .filter(|w| !w.is_empty())
                .map(Box::from)
                .collect()
        })
        .collect())
}

/// Write one line per item.
pub fn write_lines<T: std::fmt::Display>(lines: &[T], output_file: &str) -> anyhow::Result<()> {
    let mut buf = open_buf_writer(output_file)?;
    for line in lines {
        writeln!(buf, "{}", line)?;
    }
    buf.flush()?;
    Ok(())
}

/// Read a MatrixMarket coordinate file into 0-based (row, col, value)
/// triplets plus the declared (nrow, ncol, nnz) shape.
pub fn read_mtx_triplets(
    mtx_file: &str,
) -> anyhow::Result<(Vec<(usize, usize, f64)>, (usize, usize, usize))> {
    let buf = open_buf_reader(mtx_file)?;
    let mut shape: Option<(usize, usize, usize)> = None;
    let mut triplets = vec![];
    for line in buf.lines() {
        let line = line?;
        if line.starts_with('%') || line.is_empty() {
            continue;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.len() != 3 {
            return Err(anyhow::anyhow!("malformed mtx line: {}", line));
        }
        if shape.is_none() {
            shape = Some((
                words[0].parse::<usize>()?,
                words[1].parse::<usize>()?,
                words[2].parse::<usize>()?,
            ));
            continue;
        }
        let row = words[0].parse::<usize>()? - 1;
        let col = words[1].parse::<usize>()? - 1;
        let val = words[2].parse::<f64>()?;
        triplets.push((row, col, val));
    }
    let shape = shape.ok_or_else(|| anyhow::anyhow!("missing mtx header in {}", mtx_file))?;
    if triplets.len() != shape.2 {
        return Err(anyhow::anyhow!(
            "mtx {} declares {} entries but has {}",
            mtx_file,
            shape.2,
            triplets.len()
        ));
    }
    Ok((triplets, shape))
}

/// Write 0-based triplets as a 1-based MatrixMarket coordinate file.
pub fn write_mtx_triplets(
    triplets: &[(usize, usize, f64)],
    nrow: usize,
    ncol: usize,
    mtx_file: &str,
) -> anyhow::Result<()> {
    let mut buf = open_buf_writer(mtx_file)?;
    writeln!(buf, "%%MatrixMarket matrix coordinate real general")?;
    writeln!(buf, "{}\t{}\t{}", nrow, ncol, triplets.len())?;
    for (row, col, val) in triplets {
        writeln!(buf, "{}\t{}\t{}", row + 1, col + 1, val)?;
    }
    buf.flush()?;
    Ok(())
}
