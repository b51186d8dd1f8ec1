use std::path::Path;

use anyhow::bail;
use anyhow::Result;
use serde::Deserialize;

/// One row of a sample sheet: sample name plus one or two FASTQ paths.
#[derive(Debug, Clone, Deserialize)]
pub struct Sample {
    pub name: String,
    pub fastq_1: String,
    #[serde(default)]
    pub fastq_2: Option<String>,
}

impl Sample {
    pub fn is_paired(&self) -> bool {
        self.fastq_2.as_deref().is_some_and(|f| !f.is_empty())
    }
}

/// Read a tab-separated sample sheet with a `name  fastq_1  fastq_2` header.
/// The fastq_2 column may be missing or empty for single-end samples.
pub fn read_sample_sheet(path: &Path) -> Result<Vec<Sample>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_path(path)?;

    let mut samples = Vec::new();
    for record in reader.deserialize() {
        let sample: Sample = record?;
        if sample.name.is_empty() {
            bail!("Sample sheet {} contains a row with an empty name", path.display());
        }
        samples.push(sample);
    }
    if samples.is_empty() {
        bail!("Sample sheet {} contains no samples", path.display());
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reads_paired_and_single_end_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.tsv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "name\tfastq_1\tfastq_2").unwrap();
        writeln!(f, "s1\ts1_R1.fq.gz\ts1_R2.fq.gz").unwrap();
        writeln!(f, "s2\ts2.fq.gz").unwrap();

        let samples = read_sample_sheet(&path).unwrap();
        assert_eq!(samples.len(), 2);
        assert!(samples[0].is_paired());
        assert!(!samples[1].is_paired());
        assert_eq!(samples[1].name, "s2");
    }

    #[test]
    fn test_empty_sheet_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.tsv");
        std::fs::write(&path, "name\tfastq_1\tfastq_2\n").unwrap();
        assert!(read_sample_sheet(&path).is_err());
    }
}
