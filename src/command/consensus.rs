use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use log::info;

use crate::pipeline::ok_target;
use crate::pipeline::MakefilePipeline;
use crate::utils;
use crate::utils::read_sample_sheet;
use crate::utils::Sample;

pub const DEFAULT_MAKEFILE: &str = "consensus.mk";
pub const DEFAULT_THREADS: &str = "4";

#[derive(Args)]
pub struct ConsensusCMD {
    // Sample sheet, TSV: name / fastq_1 / fastq_2
    #[arg(short = 's', value_parser = clap::value_parser!(PathBuf))]
    pub path_samples: PathBuf,

    // Reference FASTA
    #[arg(short = 'r', value_parser = clap::value_parser!(PathBuf))]
    pub path_ref: PathBuf,

    // Output directory
    #[arg(short = 'o', value_parser = clap::value_parser!(PathBuf))]
    pub path_out: PathBuf,

    // Makefile to generate
    #[arg(short = 'm', value_parser = clap::value_parser!(PathBuf), default_value = DEFAULT_MAKEFILE)]
    pub path_makefile: PathBuf,

    // Threads per bwa mem invocation
    #[arg(short = '@', default_value = DEFAULT_THREADS)]
    pub threads: usize,
}
impl ConsensusCMD {
    /// Generate a Makefile that maps every sample against the reference and
    /// calls a consensus sequence per sample. Nothing is executed here; the
    /// user runs the emitted file with make.
    pub fn try_execute(&mut self) -> Result<()> {
        utils::check_make()?;

        let samples = read_sample_sheet(&self.path_samples)?;

        let params = ConsensusParams {
            samples,
            path_ref: self.path_ref.clone(),
            path_out: self.path_out.clone(),
            path_makefile: self.path_makefile.clone(),
            threads: self.threads,
        };

        Consensus::run(&params)?;

        info!("Wrote {}", self.path_makefile.display());
        Ok(())
    }
}

pub struct ConsensusParams {
    pub samples: Vec<Sample>,
    pub path_ref: PathBuf,
    pub path_out: PathBuf,
    pub path_makefile: PathBuf,
    pub threads: usize,
}

pub struct Consensus {}
impl Consensus {
    pub fn run(params: &ConsensusParams) -> Result<()> {
        let mut mk = MakefilePipeline::new(&params.path_makefile);
        // recipes pipe bwa into samtools and need pipefail
        mk.set_bash_shell(true);

        let refpath = params.path_ref.display();
        let tgt_index = ok_target(&params.path_ref);
        mk.add(tgt_index.clone(), "", format!("bwa index {}", refpath))?;

        let mut intermediates: Vec<String> = Vec::new();
        for sample in &params.samples {
            let bam = params.path_out.join(format!("{}.bam", sample.name));
            let fasta = params.path_out.join(format!("{}.consensus.fa", sample.name));

            let reads = if sample.is_paired() {
                format!(
                    "{} {}",
                    sample.fastq_1,
                    sample.fastq_2.as_deref().unwrap_or_default()
                )
            } else {
                sample.fastq_1.clone()
            };

            let tgt_bam = ok_target(&bam);
            mk.add(
                tgt_bam.clone(),
                tgt_index.clone(),
                format!(
                    "set -o pipefail; bwa mem -t {} {} {} | samtools sort -o {} -",
                    params.threads,
                    refpath,
                    reads,
                    bam.display()
                ),
            )?;

            let tgt_bai = ok_target(params.path_out.join(format!("{}.bam.bai", sample.name)));
            mk.add(
                tgt_bai.clone(),
                tgt_bam.clone(),
                format!("samtools index {}", bam.display()),
            )?;

            mk.add(
                ok_target(&fasta),
                format!("{} {}", tgt_bam, tgt_bai),
                format!("samtools consensus {} -o {}", bam.display(), fasta.display()),
            )?;

            intermediates.push(bam.display().to_string());
            intermediates.push(format!("{}.bai", bam.display()));
        }

        mk.add_clean(format!("rm -f {}", intermediates.join(" ")));
        mk.write()?;

        info!(
            "Registered {} steps for {} samples",
            mk.num_steps(),
            params.samples.len()
        );
        Ok(())
    }
}
