//! Command lines and captured output.

use std::fmt;
use std::path::{Path, PathBuf};

use super::tool::{StderrPolicy, Tool};

/// One external command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    /// The tool to run.
    pub tool: Tool,

    /// Arguments, without the program name.
    pub args: Vec<String>,

    /// The artifact this invocation writes, if any.
    pub output: Option<PathBuf>,
}

impl ToolCommand {
    /// Starts a command line for a tool.
    pub fn new(tool: Tool) -> Self {
        Self {
            tool,
            args: Vec::new(),
            output: None,
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Appends a path argument.
    pub fn path(self, path: &Path) -> Self {
        let arg = path.to_string_lossy().into_owned();
        self.arg(arg)
    }

    /// Appends the output path argument and remembers it as the artifact.
    pub fn output_path(mut self, path: &Path) -> Self {
        self.output = Some(path.to_path_buf());
        self.path(path)
    }

    /// The full command line for logging.
    pub fn command_line(&self) -> String {
        let mut line = self.tool.program().to_string();
        for arg in &self.args {
            line.push(' ');
            if arg.contains(char::is_whitespace) {
                line.push('\'');
                line.push_str(arg);
                line.push('\'');
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Captured result of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Success according to the tool's [`StderrPolicy`].
    pub success: bool,

    /// Exit code, if the process exited normally.
    pub exit_code: Option<i32>,

    /// Captured standard output.
    pub stdout: String,

    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Builds an output, applying the tool's success contract.
    pub fn evaluate(tool: Tool, exit_code: Option<i32>, stdout: String, stderr: String) -> Self {
        let exited_ok = exit_code == Some(0);
        let success = match tool.stderr_policy() {
            StderrPolicy::Strict => {
                exited_ok && !(stdout.trim().is_empty() && !stderr.trim().is_empty())
            }
            StderrPolicy::Diagnostic | StderrPolicy::ExitStatus => exited_ok,
        };

        Self {
            success,
            exit_code,
            stdout,
            stderr,
        }
    }

    /// Standard output and standard error joined, for parsers that scan both.
    pub fn text(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
            (false, true) => self.stdout.clone(),
            _ => self.stderr.clone(),
        }
    }

    /// A short failure description for error messages.
    pub fn failure_summary(&self) -> String {
        let detail = self.text();
        let detail = detail.trim();
        let status = match self.exit_code {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        };
        if detail.is_empty() {
            status
        } else {
            format!("{}: {}", status, detail)
        }
    }
}
