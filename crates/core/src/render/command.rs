//! Render worker invocation.
//!
//! The worker contract is fixed: it receives the specification path, the
//! output directory and a quality preset, writes zero or more artifacts
//! and exits.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::str::FromStr;

use tokio::process::Command;

use crate::workspace::{absolutize, JobWorkspace};

/// Quality preset forwarded to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderQuality {
    #[default]
    Low,
    Medium,
    High,
}

impl RenderQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for RenderQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!(
                "unknown render quality '{other}', expected low, medium or high"
            )),
        }
    }
}

/// How to start the render worker.
#[derive(Debug, Clone)]
pub struct RenderCommand {
    /// Executable, resolved through `PATH` when it is a bare name.
    pub program: String,
    /// Script handed to `program` as its first argument, if any. Relative
    /// paths are taken from the server's working directory.
    pub script: Option<PathBuf>,
    /// Scene class name forwarded as `--scene-class`.
    pub scene_class: String,
    pub quality: RenderQuality,
}

impl RenderCommand {
    /// Arguments for one job, in order.
    ///
    /// Every path is absolute because the worker runs inside the job
    /// directory.
    pub fn args(&self, workspace: &JobWorkspace) -> Vec<String> {
        let mut args = Vec::with_capacity(9);
        if let Some(script) = &self.script {
            args.push(absolutize(script).display().to_string());
        }
        args.extend([
            "--input".to_string(),
            absolutize(&workspace.spec_path).display().to_string(),
            "--outdir".to_string(),
            absolutize(&workspace.output_dir).display().to_string(),
            "--scene-class".to_string(),
            self.scene_class.clone(),
            "--quality".to_string(),
            self.quality.to_string(),
        ]);
        args
    }

    /// Build the child command for `workspace`.
    ///
    /// stdin is closed, both output channels are piped, and the child is
    /// killed if its handle is dropped.
    pub fn build(&self, workspace: &JobWorkspace) -> Command {
        let mut cmd = Command::new(self.program_path());
        cmd.args(self.args(workspace))
            .current_dir(&workspace.dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// `program` with a relative path (`bin/render`) made absolute. Bare
    /// names are left for `PATH` lookup.
    fn program_path(&self) -> PathBuf {
        let program = Path::new(&self.program);
        if program.components().count() > 1 {
            absolutize(program)
        } else {
            program.to_path_buf()
        }
    }
}
