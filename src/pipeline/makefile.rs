use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::PathBuf;

use itertools::Itertools;
use log::warn;

use crate::pipeline::error::PipelineError;

/// One unit of work: the sentinel target it produces, the space-joined
/// targets it waits for, and the shell command that produces it.
#[derive(Debug, Clone)]
pub struct BuildStep {
    pub target: String,
    pub dependencies: String,
    pub command: String,
}

/// Accumulates build steps in registration order and serializes them as a
/// Makefile that an external `make` runs with dependency ordering and
/// sentinel-based resumability. This type never executes anything itself.
///
/// Each emitted recipe touches `<target>` after its command succeeds, so the
/// target file doubles as a completion marker: reruns skip every step whose
/// marker already exists. `.DELETE_ON_ERROR:` keeps a half-written target from
/// satisfying dependents after a failed recipe.
pub struct MakefilePipeline {
    path: PathBuf,
    steps: Vec<BuildStep>,
    targets: HashSet<String>,
    clean_command: Option<String>,
    bash_shell: bool,
}

impl MakefilePipeline {
    pub fn new(path: impl Into<PathBuf>) -> MakefilePipeline {
        MakefilePipeline {
            path: path.into(),
            steps: Vec::new(),
            targets: HashSet::new(),
            clean_command: None,
            bash_shell: false,
        }
    }

    /// Emit `SHELL:=/bin/bash` so recipes can rely on bash pipe semantics.
    pub fn set_bash_shell(&mut self, bash_shell: bool) {
        self.bash_shell = bash_shell;
    }

    /// Register one step. `dependencies` may be empty, a single target, or a
    /// space-joined list; the caller formats it. A target declared twice is
    /// rejected immediately rather than silently shadowing the earlier step.
    pub fn add(
        &mut self,
        target: impl Into<String>,
        dependencies: impl Into<String>,
        command: impl Into<String>,
    ) -> Result<(), PipelineError> {
        let target = target.into();
        if !self.targets.insert(target.clone()) {
            return Err(PipelineError::duplicate_target(target));
        }
        self.steps.push(BuildStep {
            target,
            dependencies: dependencies.into(),
            command: command.into(),
        });
        Ok(())
    }

    /// Like `add`, but wraps the command with a cluster job-submission prefix
    /// requesting at least `min_cpus` CPUs. The generator only annotates; the
    /// downstream launcher enforces the request.
    pub fn add_parallel(
        &mut self,
        target: impl Into<String>,
        dependencies: impl Into<String>,
        command: impl Into<String>,
        min_cpus: usize,
    ) -> Result<(), PipelineError> {
        let command = command.into();
        let wrapped = format!("srun --cpus-per-task={} {}", min_cpus, command);
        self.add(target, dependencies, wrapped)
    }

    /// Register the recipe for a `clean` pseudo-target. At most one per
    /// pipeline; calling again overwrites. Note that `clean` removes only what
    /// the command names: sentinel targets are left in place, so a
    /// clean-then-rerun considers every step already done unless the command
    /// removes the sentinels too.
    pub fn add_clean(&mut self, command: impl Into<String>) {
        self.clean_command = Some(command.into());
    }

    /// Dependency tokens that match no registered target. Depending on files
    /// the graph never creates is legitimate (reference FASTA, raw reads), but
    /// a typo here stalls `make` forever, so `write` reports these.
    pub fn unknown_dependencies(&self) -> Vec<String> {
        self.steps
            .iter()
            .flat_map(|s| s.dependencies.split_whitespace())
            .filter(|d| !self.targets.contains(*d))
            .map(|d| d.to_string())
            .collect()
    }

    /// Serialize the whole graph to the configured path. Deterministic: the
    /// same registration sequence always produces byte-identical output.
    pub fn write(&self) -> anyhow::Result<()> {
        for dep in self.unknown_dependencies() {
            warn!(
                "Dependency '{}' is not produced by this pipeline; make will expect it to exist already",
                dep
            );
        }

        let file = File::create(&self.path)?;
        let mut out = BufWriter::new(file);

        if self.bash_shell {
            writeln!(out, "SHELL:=/bin/bash")?;
        }
        writeln!(out, ".DELETE_ON_ERROR:")?;
        writeln!(out)?;

        let all_targets = self.steps.iter().map(|s| s.target.as_str()).join(" ");
        writeln!(out, "all : {}", all_targets)?;
        writeln!(out)?;

        for step in &self.steps {
            writeln!(out, "{} : {}", step.target, step.dependencies)?;
            writeln!(out, "\t{}", step.command)?;
            writeln!(out, "\ttouch {}", step.target)?;
            writeln!(out)?;
        }

        if let Some(clean) = &self.clean_command {
            writeln!(out, "clean :")?;
            writeln!(out, "\t{}", clean)?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn num_steps(&self) -> usize {
        self.steps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_step_pipeline(path: &std::path::Path) -> MakefilePipeline {
        let mut mk = MakefilePipeline::new(path);
        mk.add("A.OK", "", "echo a > a.txt").unwrap();
        mk.add("B.OK", "A.OK", "echo b > b.txt").unwrap();
        mk.add("C.OK", "B.OK", "cat b.txt > c.txt").unwrap();
        mk
    }

    #[test]
    fn test_write_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.mk");
        let mk = three_step_pipeline(&path);

        mk.write().unwrap();
        let first = std::fs::read(&path).unwrap();
        mk.write().unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_all_target_lists_steps_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.mk");
        three_step_pipeline(&path).write().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let all_line = text
            .lines()
            .find(|l| l.starts_with("all :"))
            .expect("missing all target");
        assert_eq!(all_line, "all : A.OK B.OK C.OK");
    }

    #[test]
    fn test_touch_follows_command_in_every_block() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.mk");
        three_step_pipeline(&path).write().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        for target in ["A.OK", "B.OK", "C.OK"] {
            let rule = lines
                .iter()
                .position(|l| l.starts_with(&format!("{} :", target)))
                .unwrap();
            assert!(lines[rule + 1].starts_with('\t'));
            assert!(!lines[rule + 1].contains("touch"));
            assert_eq!(lines[rule + 2], format!("\ttouch {}", target));
        }
    }

    #[test]
    fn test_duplicate_target_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut mk = MakefilePipeline::new(dir.path().join("pipeline.mk"));
        mk.add("A.OK", "", "echo a").unwrap();
        let err = mk.add("A.OK", "", "echo again").unwrap_err();
        assert!(matches!(err, PipelineError::DuplicateTarget { .. }));
        assert_eq!(mk.num_steps(), 1);
    }

    #[test]
    fn test_unknown_dependencies_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut mk = MakefilePipeline::new(dir.path().join("pipeline.mk"));
        mk.add("A.OK", "", "echo a").unwrap();
        mk.add("B.OK", "A.OK ref.fa", "echo b").unwrap();
        assert_eq!(mk.unknown_dependencies(), vec!["ref.fa".to_string()]);
    }

    #[test]
    fn test_add_parallel_wraps_command_with_cpu_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.mk");
        let mut mk = MakefilePipeline::new(&path);
        mk.add_parallel("A.OK", "", "blastn -query q.fa", 8).unwrap();
        mk.write().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\tsrun --cpus-per-task=8 blastn -query q.fa\n"));
    }

    #[test]
    fn test_bash_shell_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.mk");
        let mut mk = MakefilePipeline::new(&path);
        mk.set_bash_shell(true);
        mk.add("A.OK", "", "set -o pipefail; true | true").unwrap();
        mk.write().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("SHELL:=/bin/bash\n.DELETE_ON_ERROR:\n"));
    }

    /// Runs the emitted Makefile through real make, twice. The second run must
    /// do nothing because every sentinel already exists.
    #[test]
    fn test_make_end_to_end() {
        if std::process::Command::new("make").arg("--version").output().is_err() {
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.mk");
        let mut mk = three_step_pipeline(&path);
        mk.add_clean("rm -f a.txt b.txt c.txt");
        mk.write().unwrap();

        let make = |target: &str| {
            std::process::Command::new("make")
                .arg("-f")
                .arg(&path)
                .arg(target)
                .current_dir(dir.path())
                .output()
                .unwrap()
        };

        let run1 = make("all");
        assert!(run1.status.success());
        for f in ["a.txt", "b.txt", "c.txt", "A.OK", "B.OK", "C.OK"] {
            assert!(dir.path().join(f).exists(), "missing {}", f);
        }

        let run2 = make("all");
        assert!(run2.status.success());
        let stdout = String::from_utf8_lossy(&run2.stdout);
        assert!(stdout.contains("Nothing to be done") || stdout.contains("up to date"));

        // clean removes outputs but leaves the sentinels behind, so a
        // subsequent `all` still does nothing. Pinned on purpose.
        let run3 = make("clean");
        assert!(run3.status.success());
        assert!(!dir.path().join("a.txt").exists());
        assert!(dir.path().join("A.OK").exists());

        let run4 = make("all");
        assert!(run4.status.success());
        assert!(!dir.path().join("a.txt").exists());
    }
}
