use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use log::info;

use crate::pipeline::ok_target;
use crate::pipeline::PipelineRunner;
use crate::utils;

pub const DEFAULT_NAME: &str = "sample";
pub const DEFAULT_THREADS: &str = "4";

#[derive(Args)]
pub struct AlignCMD {
    // Forward reads
    #[arg(short = '1', value_parser = clap::value_parser!(PathBuf))]
    pub fastq_1: PathBuf,

    // Reverse reads, if paired
    #[arg(short = '2', value_parser = clap::value_parser!(PathBuf))]
    pub fastq_2: Option<PathBuf>,

    // Reference FASTA
    #[arg(short = 'r', value_parser = clap::value_parser!(PathBuf))]
    pub path_ref: PathBuf,

    // Output directory
    #[arg(short = 'o', value_parser = clap::value_parser!(PathBuf))]
    pub path_out: PathBuf,

    // Sample name used for output files
    #[arg(short = 'n', default_value = DEFAULT_NAME)]
    pub name: String,

    #[arg(short = '@', default_value = DEFAULT_THREADS)]
    pub threads: usize,

    // Re-run every step even if its .OK marker exists
    #[arg(long = "force")]
    pub force: bool,
}
impl AlignCMD {
    /// Align one sample right now, step by step, instead of emitting a
    /// Makefile. Completed steps are skipped on re-invocation via their .OK
    /// markers, so a failed run can simply be restarted.
    pub fn try_execute(&mut self) -> Result<()> {
        utils::check_bwa()?;
        utils::check_samtools()?;

        fs::create_dir_all(&self.path_out)?;

        let mut runner = PipelineRunner::new(self.path_out.join(format!("{}.log", self.name)));
        runner.ignore_sentinels = self.force;

        let refpath = self.path_ref.display();
        runner.run(
            &format!("bwa index {}", refpath),
            &PathBuf::from(ok_target(&self.path_ref)),
            "index reference",
        )?;

        let bam = self.path_out.join(format!("{}.bam", self.name));
        let reads = match &self.fastq_2 {
            Some(fq2) => format!("{} {}", self.fastq_1.display(), fq2.display()),
            None => format!("{}", self.fastq_1.display()),
        };
        runner.run(
            &format!(
                "bwa mem -t {} {} {} | samtools sort -o {} -",
                self.threads,
                refpath,
                reads,
                bam.display()
            ),
            &PathBuf::from(ok_target(&bam)),
            "map and sort reads",
        )?;

        runner.run(
            &format!("samtools index {}", bam.display()),
            &PathBuf::from(ok_target(self.path_out.join(format!("{}.bam.bai", self.name)))),
            "index bam",
        )?;

        let flagstat = self.path_out.join(format!("{}.flagstat.txt", self.name));
        runner.run(
            &format!("samtools flagstat {} > {}", bam.display(), flagstat.display()),
            &PathBuf::from(ok_target(&flagstat)),
            "collect mapping stats",
        )?;

        runner.print_log()?;

        info!("Alignment of {} finished", self.name);
        Ok(())
    }
}
