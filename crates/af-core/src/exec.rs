//! External-tool invocation.
//!
//! The pipeline never reimplements the meshers or solvers; each one is an
//! opaque collaborator invoked as a subprocess with a case-relative working
//! directory. The contract is exit status plus the tail of diagnostic text.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::AfResult;

/// One external-tool invocation, bound to a case directory.
///
/// `tool` is the logical tool name used for log files and error reporting;
/// for parallel runs the spawned `program` is `mpirun` wrapping the tool.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub tool: String,
    pub program: String,
    pub args: Vec<String>,
    pub case_dir: PathBuf,
}

impl ToolInvocation {
    /// Serial invocation of `tool` in `case_dir`.
    pub fn serial(tool: &str, case_dir: &Path) -> Self {
        Self {
            tool: tool.to_string(),
            program: tool.to_string(),
            args: Vec::new(),
            case_dir: case_dir.to_path_buf(),
        }
    }

    /// Parallel invocation: `mpirun -np <n> <tool> -parallel`.
    pub fn parallel(tool: &str, nprocs: usize, case_dir: &Path) -> Self {
        Self {
            tool: tool.to_string(),
            program: "mpirun".to_string(),
            args: vec![
                "-np".to_string(),
                nprocs.to_string(),
                tool.to_string(),
                "-parallel".to_string(),
            ],
            case_dir: case_dir.to_path_buf(),
        }
    }

    /// Append an argument.
    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_string());
        self
    }
}

/// Result of a finished (or failed-to-start) external process.
#[derive(Debug, Clone)]
pub struct ExitOutcome {
    pub success: bool,
    pub code: Option<i32>,
    /// Last lines of diagnostic output, verbatim.
    pub diagnostic_tail: Vec<String>,
}

impl ExitOutcome {
    pub fn diagnostics(&self) -> String {
        self.diagnostic_tail.join("\n")
    }
}

/// Capability to run one external tool to completion.
///
/// Tests substitute a scripted implementation; production uses
/// [`ProcessRunner`].
pub trait ToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> AfResult<ExitOutcome>;
}

/// Blocking subprocess runner.
///
/// Captures stdout/stderr, writes the combined output to a case-local
/// `log.<tool>` file (the wrapped toolchain's own convention), and reports
/// the diagnostic tail. A spawn failure (tool not installed) is reported as
/// a failed outcome carrying the OS error, not as an I/O error, so stage
/// errors surface it verbatim like any other tool failure.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    pub tail_lines: usize,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self { tail_lines: 20 }
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &ToolInvocation) -> AfResult<ExitOutcome> {
        tracing::info!(
            tool = %invocation.tool,
            case = %invocation.case_dir.display(),
            "running external tool"
        );

        let output = match Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.case_dir)
            .output()
        {
            Ok(output) => output,
            Err(err) => {
                return Ok(ExitOutcome {
                    success: false,
                    code: None,
                    diagnostic_tail: vec![format!(
                        "failed to start {}: {}",
                        invocation.program, err
                    )],
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        let log_path = invocation.case_dir.join(format!("log.{}", invocation.tool));
        let mut log_content = stdout.to_string();
        if !stderr.is_empty() {
            log_content.push_str(&stderr);
        }
        std::fs::write(&log_path, log_content)?;

        // Prefer stderr for diagnostics; fall back to stdout.
        let source = if stderr.trim().is_empty() {
            stdout.as_ref()
        } else {
            stderr.as_ref()
        };

        Ok(ExitOutcome {
            success: output.status.success(),
            code: output.status.code(),
            diagnostic_tail: tail(source, self.tail_lines),
        })
    }
}

/// Last `n` non-empty lines of `text`, in file order.
pub fn tail(text: &str, n: usize) -> Vec<String> {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].iter().map(|l| l.to_string()).collect()
}
