use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;

use crate::pipeline::error::PipelineError;

/// Executes pipeline steps immediately and in order, skipping any step whose
/// sentinel file already exists. The counterpart to `MakefilePipeline` for
/// short workflows where deferring to make is not worth it.
///
/// Every log line is echoed to the console as it happens; `print_log` must be
/// called at the end to persist the full log. A run that errors out before the
/// caller reaches `print_log` keeps only the console echo.
pub struct PipelineRunner {
    log_path: PathBuf,
    log_lines: Vec<String>,
    /// When set, sentinels are ignored and every step re-executes.
    pub ignore_sentinels: bool,
}

impl PipelineRunner {
    pub fn new(log_path: impl Into<PathBuf>) -> PipelineRunner {
        PipelineRunner {
            log_path: log_path.into(),
            log_lines: Vec::new(),
            ignore_sentinels: false,
        }
    }

    /// Run one step unless its sentinel says it already completed. On success
    /// the sentinel is touched; on a non-zero exit the sentinel is left absent
    /// and the error propagates to the caller, so a rerun of the same script
    /// redoes exactly the failed step onward.
    pub fn run(
        &mut self,
        command: &str,
        sentinel: &Path,
        description: &str,
    ) -> Result<(), PipelineError> {
        if !self.ignore_sentinels && sentinel.exists() {
            self.log(&format!("{} -- already executed", description));
            self.log(command);
            return Ok(());
        }

        self.log(description);
        self.log(command);
        let status = Command::new("sh")
            .arg("-c")
            .arg(command)
            .status()
            .map_err(|source| PipelineError::SpawnFailed {
                cmd: command.to_string(),
                source,
            })?;

        if !status.success() {
            self.log(&format!("FAILED: {}", description));
            return Err(PipelineError::step_failed(
                description,
                command,
                status.code().unwrap_or(-1),
            ));
        }

        touch(sentinel).map_err(|source| PipelineError::SentinelWriteFailed {
            path: sentinel.to_path_buf(),
            source,
        })?;
        self.log(&format!("{} -- done", description));
        Ok(())
    }

    /// Run unconditionally, with no sentinel and no skip logic. Only for steps
    /// that must never be replayed against partial state, such as appending to
    /// an output file.
    pub fn run_lite(&mut self, command: &str) -> Result<(), PipelineError> {
        println!("{}", command);
        let status = Command::new("sh")
            .arg("-c")
            .arg(command)
            .status()
            .map_err(|source| PipelineError::SpawnFailed {
                cmd: command.to_string(),
                source,
            })?;
        if !status.success() {
            return Err(PipelineError::step_failed(
                "one-shot command",
                command,
                status.code().unwrap_or(-1),
            ));
        }
        Ok(())
    }

    /// Record a message and echo it immediately, so a user watching a long
    /// run sees live progress rather than a post-hoc file.
    pub fn log(&mut self, message: &str) {
        println!("{}", message);
        self.log_lines.push(message.to_string());
    }

    /// Overwrite the log file with everything accumulated so far.
    pub fn print_log(&self) -> anyhow::Result<()> {
        let mut file = File::create(&self.log_path)?;
        writeln!(file, "{}", self.log_lines.join("\n"))?;
        Ok(())
    }
}

fn touch(path: &Path) -> std::io::Result<()> {
    File::create(path)?;
    Ok(())
}
