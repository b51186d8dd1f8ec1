pub mod error;
pub mod makefile;
pub mod runner;

pub use error::PipelineError;
pub use makefile::BuildStep;
pub use makefile::MakefilePipeline;
pub use runner::PipelineRunner;

use std::path::Path;

/// Sentinel target name for a real output path. The `.OK` file marks "this
/// step completed" by its mere existence; its mtime is what make compares,
/// which sidesteps unreliable directory mtimes on network filesystems.
pub fn ok_target(path: impl AsRef<Path>) -> String {
    format!("{}.OK", path.as_ref().display())
}
