mod detect_software;
mod samplesheet;

pub use detect_software::check_blastn;
pub use detect_software::check_bwa;
pub use detect_software::check_make;
pub use detect_software::check_makeblastdb;
pub use detect_software::check_samtools;

pub use samplesheet::read_sample_sheet;
pub use samplesheet::Sample;
