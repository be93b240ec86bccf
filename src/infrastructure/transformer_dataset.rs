use std::{
    fs::{self, File},
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, anyhow};
use log::info;

use crate::{RepositoryOutputFormat, StdResult};

/// The name of the file holding one document per line.
pub const DATASET_FILENAME: &str = "dataset.txt";

/// The name of the file holding one label per line.
pub const LABELS_FILENAME: &str = "labels.txt";

/// Splits a text on whitespace and ASCII punctuation.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Builds the single-line document of a record from its name, tags and text.
pub fn document_of(record: &RepositoryOutputFormat) -> String {
    let mut tokens = tokenize(&record.repo_name_seg);
    for tag in &record.tags {
        tokens.extend(tokenize(tag));
    }
    tokens.extend(tokenize(&record.text));

    tokens.join(" ")
}

/// Rewrites a JSON array of records as one JSON object per line.
pub fn transform_document(input: &Path, output: &Path) -> StdResult<u32> {
    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file {}", input.display()))?;
    let records: Vec<RepositoryOutputFormat> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid dataset in {}", input.display()))?;

    let file = File::create(output)
        .with_context(|| format!("Failed to create output file {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    for record in &records {
        serde_json::to_writer(&mut writer, record)?;
        writeln!(writer)?;
    }
    writer.flush()?;
    info!(
        "Transformed {} records from {} to {}",
        records.len(),
        input.display(),
        output.display()
    );

    Ok(records.len() as u32)
}

/// Emits the documents and labels files of a JSON-lines dataset into a directory.
///
/// Every record must be labelled.
pub fn transform_dataset(input: &Path, output_dir: &Path) -> StdResult<u32> {
    let dataset_path = output_dir.join(DATASET_FILENAME);
    let labels_path = output_dir.join(LABELS_FILENAME);
    let reader = BufReader::new(
        File::open(input)
            .with_context(|| format!("Failed to open input file {}", input.display()))?,
    );
    let mut dataset_writer = BufWriter::new(
        File::create(&dataset_path)
            .with_context(|| format!("Failed to create {}", dataset_path.display()))?,
    );
    let mut labels_writer = BufWriter::new(
        File::create(&labels_path)
            .with_context(|| format!("Failed to create {}", labels_path.display()))?,
    );

    let mut total_records = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: RepositoryOutputFormat = serde_json::from_str(&line)
            .with_context(|| format!("Invalid record at line {}", index + 1))?;
        let label = record.sub_label.as_deref().ok_or_else(|| {
            anyhow!(
                "Missing sub_label for {} at line {}",
                record.repo_name,
                index + 1
            )
        })?;
        writeln!(dataset_writer, "{}", document_of(&record))?;
        writeln!(labels_writer, "{label}")?;
        total_records += 1;
    }
    dataset_writer.flush()?;
    labels_writer.flush()?;
    info!(
        "Emitted {total_records} documents to {} and {}",
        dataset_path.display(),
        labels_path.display()
    );

    Ok(total_records)
}
