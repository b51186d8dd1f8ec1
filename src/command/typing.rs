use std::path::PathBuf;

use anyhow::bail;
use anyhow::Result;
use clap::Args;
use log::info;
use walkdir::WalkDir;

use crate::pipeline::ok_target;
use crate::pipeline::MakefilePipeline;
use crate::utils;

pub const DEFAULT_MAKEFILE: &str = "typing.mk";
pub const DEFAULT_CPUS: &str = "4";

#[derive(Args)]
pub struct TypingCMD {
    // Directory of assembled genomes (.fa / .fasta)
    #[arg(short = 'i', value_parser = clap::value_parser!(PathBuf))]
    pub path_assemblies: PathBuf,

    // Typing database FASTA
    #[arg(short = 'd', value_parser = clap::value_parser!(PathBuf))]
    pub path_db: PathBuf,

    // Output directory
    #[arg(short = 'o', value_parser = clap::value_parser!(PathBuf))]
    pub path_out: PathBuf,

    // Makefile to generate
    #[arg(short = 'm', value_parser = clap::value_parser!(PathBuf), default_value = DEFAULT_MAKEFILE)]
    pub path_makefile: PathBuf,

    // CPUs requested per blast job on the cluster
    #[arg(long = "cpus", default_value = DEFAULT_CPUS)]
    pub cpus: usize,
}
impl TypingCMD {
    /// Generate a Makefile that blasts every assembly in a directory against
    /// the typing database, one cluster job per assembly.
    pub fn try_execute(&mut self) -> Result<()> {
        utils::check_makeblastdb()?;
        utils::check_blastn()?;
        utils::check_make()?;

        let params = TypingParams {
            path_assemblies: self.path_assemblies.clone(),
            path_db: self.path_db.clone(),
            path_out: self.path_out.clone(),
            path_makefile: self.path_makefile.clone(),
            cpus: self.cpus,
        };

        Typing::run(&params)?;

        info!("Wrote {}", self.path_makefile.display());
        Ok(())
    }
}

pub struct TypingParams {
    pub path_assemblies: PathBuf,
    pub path_db: PathBuf,
    pub path_out: PathBuf,
    pub path_makefile: PathBuf,
    pub cpus: usize,
}

pub struct Typing {}
impl Typing {
    pub fn run(params: &TypingParams) -> Result<()> {
        let assemblies = collect_assemblies(&params.path_assemblies)?;
        if assemblies.is_empty() {
            bail!(
                "No .fa or .fasta files found under {}",
                params.path_assemblies.display()
            );
        }

        let mut mk = MakefilePipeline::new(&params.path_makefile);

        let tgt_db = ok_target(&params.path_db);
        mk.add(
            tgt_db.clone(),
            "",
            format!("makeblastdb -in {} -dbtype nucl", params.path_db.display()),
        )?;

        for asm in &assemblies {
            let stem = asm
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let hits = params.path_out.join(format!("{}.blast.tsv", stem));

            mk.add_parallel(
                ok_target(&hits),
                tgt_db.clone(),
                format!(
                    "blastn -query {} -db {} -outfmt 6 -num_threads {} -out {}",
                    asm.display(),
                    params.path_db.display(),
                    params.cpus,
                    hits.display()
                ),
                params.cpus,
            )?;
        }

        mk.write()?;

        info!(
            "Registered blast jobs for {} assemblies",
            assemblies.len()
        );
        Ok(())
    }
}

/// All .fa/.fasta files below a directory, sorted so the emitted Makefile is
/// stable across runs.
fn collect_assemblies(dir: &PathBuf) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        match entry.path().extension().and_then(|e| e.to_str()) {
            Some("fa") | Some("fasta") => found.push(entry.path().to_path_buf()),
            _ => {}
        }
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_blast_job_per_assembly() {
        let dir = tempfile::tempdir().unwrap();
        let asmdir = dir.path().join("assemblies");
        std::fs::create_dir_all(&asmdir).unwrap();
        std::fs::write(asmdir.join("s1.fa"), ">s1\nACGT\n").unwrap();
        std::fs::write(asmdir.join("s2.fasta"), ">s2\nACGT\n").unwrap();
        std::fs::write(asmdir.join("notes.txt"), "not an assembly").unwrap();

        let mkpath = dir.path().join("typing.mk");
        let params = TypingParams {
            path_assemblies: asmdir,
            path_db: PathBuf::from("db.fa"),
            path_out: PathBuf::from("out"),
            path_makefile: mkpath.clone(),
            cpus: 8,
        };

        Typing::run(&params).unwrap();

        let text = std::fs::read_to_string(&mkpath).unwrap();
        assert!(text.contains("makeblastdb -in db.fa -dbtype nucl"));
        assert_eq!(text.matches("blastn -query").count(), 2);
        assert!(text.contains("srun --cpus-per-task=8 blastn"));
        assert!(text.contains("out/s1.blast.tsv.OK : db.fa.OK"));
        assert!(!text.contains("notes.txt"));
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let params = TypingParams {
            path_assemblies: dir.path().to_path_buf(),
            path_db: PathBuf::from("db.fa"),
            path_out: PathBuf::from("out"),
            path_makefile: dir.path().join("typing.mk"),
            cpus: 1,
        };
        assert!(Typing::run(&params).is_err());
    }
}
