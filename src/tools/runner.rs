//! Command runner for external tool execution

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::process::{Command, Stdio};
use crate::error::{RemoverError, Result};

/// A single external program call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<OsString>,
}

impl ToolInvocation {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Arguments as UTF-8 strings, lossily converted
    pub fn args_lossy(&self) -> Vec<String> {
        self.args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    /// Full command line, space separated
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(self.args_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Captured result of a finished tool
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

impl ToolOutput {
    pub fn ok() -> Self {
        Self { success: true, ..Default::default() }
    }
}

/// Executes tool invocations, blocking until the child exits.
pub trait ToolRunner: Send + Sync {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput>;

    /// Run and turn a non-zero exit into `RemoverError::ToolFailed`
    fn run_checked(&self, invocation: &ToolInvocation) -> Result<ToolOutput> {
        log::debug!("Running: {}", invocation);
        let output = self.run(invocation)?;
        if !output.success {
            return Err(RemoverError::ToolFailed {
                command: invocation.command_line(),
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }
}

/// Runs tools as real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemToolRunner;

impl ToolRunner for SystemToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput> {
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| RemoverError::tool_launch(&invocation.program, e.to_string()))?;

        Ok(ToolOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_joins_args() {
        let inv = ToolInvocation::new("ffmpeg").arg("-y").args(["-i", "a.wav"]);
        assert_eq!(inv.command_line(), "ffmpeg -y -i a.wav");
        assert_eq!(inv.to_string(), "ffmpeg -y -i a.wav");
    }

    #[test]
    fn test_run_checked_reports_output() {
        let runner = testing::FakeToolRunner::new().failing("demucs");
        let inv = ToolInvocation::new("demucs").arg("-h");
        match runner.run_checked(&inv) {
            Err(RemoverError::ToolFailed { command, stdout, stderr }) => {
                assert_eq!(command, "demucs -h");
                assert_eq!(stdout, "demucs starting");
                assert_eq!(stderr, "simulated failure");
            }
            other => panic!("expected ToolFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_binary_is_launch_error() {
        let inv = ToolInvocation::new("definitely-not-a-real-tool-4f1c").arg("-h");
        let err = SystemToolRunner.run(&inv).unwrap_err();
        assert!(matches!(err, RemoverError::ToolLaunch { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_captures_streams() {
        let inv = ToolInvocation::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]);
        let output = SystemToolRunner.run(&inv).unwrap();
        assert!(!output.success);
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }
}
