use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::error::{Result, TubescribeError};

/// External tool invocation built as an explicit argument vector.
///
/// No shell is involved at any point; arguments are passed to the process
/// verbatim and the exit status is inspected explicitly.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub description: String,
}

impl ToolCommand {
    pub fn new<S1: Into<String>, S2: Into<String>>(program: S1, description: S2) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add a path argument
    pub fn path<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Run the tool and require a zero exit status.
    pub fn execute(&self) -> Result<()> {
        self.run().map(|_| ())
    }

    /// Run the tool, require a zero exit status, and return captured stdout.
    pub fn execute_capture(&self) -> Result<String> {
        let output = self.run()?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn run(&self) -> Result<std::process::Output> {
        debug!("Executing {}: {} {:?}", self.description, self.program, self.args);

        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TubescribeError::ToolNotFound(self.program.clone())
                } else {
                    TubescribeError::Tool(format!("{}: failed to execute: {}", self.description, e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TubescribeError::Tool(format!(
                "{} failed (exit {:?}): {}",
                self.description,
                output.status.code(),
                stderr_tail(&stderr)
            )));
        }

        Ok(output)
    }
}

// Tool stderr can run to megabytes; keep the last few lines for the error.
fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().collect();
    let start = lines.len().saturating_sub(5);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_preserves_argument_order() {
        let cmd = ToolCommand::new("ffmpeg", "Transcode")
            .arg("-i")
            .path("/tmp/in.mp3")
            .args(["-ar", "16000"])
            .arg("-y")
            .path("/tmp/out.wav");

        assert_eq!(cmd.program, "ffmpeg");
        assert_eq!(
            cmd.args,
            vec!["-i", "/tmp/in.mp3", "-ar", "16000", "-y", "/tmp/out.wav"]
        );
    }

    #[test]
    fn test_missing_binary_maps_to_tool_not_found() {
        let err = ToolCommand::new("definitely-not-a-real-binary-239", "Probe")
            .arg("--version")
            .execute()
            .unwrap_err();

        assert!(matches!(err, TubescribeError::ToolNotFound(_)));
    }

    #[test]
    fn test_nonzero_exit_maps_to_tool_failure() {
        // `false` exists on any POSIX system and always exits 1
        let err = ToolCommand::new("false", "Always fails").execute().unwrap_err();
        assert!(matches!(err, TubescribeError::Tool(_)));
    }

    #[test]
    fn test_stderr_tail_keeps_last_lines() {
        let long: String = (0..20).map(|i| format!("line {}\n", i)).collect();
        let tail = stderr_tail(&long);
        assert!(tail.starts_with("line 15"));
        assert!(tail.ends_with("line 19"));
    }
}
