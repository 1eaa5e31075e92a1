//! A tool for executing external commands.

use crate::error::{Error, Result};
use log::debug;
use std::path::PathBuf;
use std::time::Duration;

/// Runs an external executable with piped output and a deadline.
///
/// Stdout and stderr are drained concurrently while the process runs, so a
/// large dump (metadata JSON, transcoder chatter) cannot fill the pipe and
/// stall the child.
#[derive(Debug, Clone, PartialEq)]
pub struct Executor {
    /// The path to the command executable.
    pub executable_path: PathBuf,
    /// The timeout for the process.
    pub timeout: Duration,

    /// The arguments to pass to the command.
    pub args: Vec<String>,
}

/// Represents the output of a finished process.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutput {
    /// The stdout of the process.
    pub stdout: String,
    /// The stderr of the process.
    pub stderr: String,
    /// The exit code of the process.
    pub code: i32,
}

impl Executor {
    /// Executes the command and returns the captured output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Tool`] if the process exits non-zero,
    /// [`Error::Timeout`] if the deadline passes (the child is killed), and
    /// [`Error::IO`] if the executable cannot be spawned.
    pub async fn execute(&self) -> Result<ProcessOutput> {
        debug!(
            "executing {:?} with args {:?}",
            self.executable_path, self.args
        );

        let mut command = tokio::process::Command::new(&self.executable_path);
        command.stdout(std::process::Stdio::piped());
        command.stderr(std::process::Stdio::piped());

        #[cfg(target_os = "windows")]
        {
            use std::os::windows::process::CommandExt;
            command.creation_flags(0x08000000);
        }

        command.args(&self.args);
        let mut child = command.spawn()?;

        let stdout_handle = child
            .stdout
            .take()
            .ok_or_else(|| Error::Command("Failed to capture stdout".to_string()))?;
        let stderr_handle = child
            .stderr
            .take()
            .ok_or_else(|| Error::Command("Failed to capture stderr".to_string()))?;

        let stdout_task = tokio::spawn(async move {
            let mut buffer = Vec::new();
            tokio::io::copy(&mut tokio::io::BufReader::new(stdout_handle), &mut buffer).await?;
            Ok::<Vec<u8>, std::io::Error>(buffer)
        });

        let stderr_task = tokio::spawn(async move {
            let mut buffer = Vec::new();
            tokio::io::copy(&mut tokio::io::BufReader::new(stderr_handle), &mut buffer).await?;
            Ok::<Vec<u8>, std::io::Error>(buffer)
        });

        let exit_status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(result) => result?,
            Err(_) => {
                if let Err(e) = child.kill().await {
                    log::error!("failed to kill process after timeout: {}", e);
                }
                return Err(Error::Timeout(self.timeout));
            }
        };

        let stdout = String::from_utf8_lossy(&stdout_task.await??).into_owned();
        let stderr = String::from_utf8_lossy(&stderr_task.await??).into_owned();

        let code = exit_status.code().unwrap_or(-1);
        if exit_status.success() {
            return Ok(ProcessOutput {
                stdout,
                stderr,
                code,
            });
        }

        Err(Error::Tool {
            tool: self.tool_name(),
            code,
            stderr: stderr.trim().to_string(),
        })
    }

    /// The bare name of the executable, for error reporting.
    pub fn tool_name(&self) -> String {
        self.executable_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("process")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn write_script(dir: &std::path::Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_stdout_of_successful_process() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "ok.sh", "#!/bin/sh\necho hello\n");

        let executor = Executor {
            executable_path: script,
            timeout: Duration::from_secs(5),
            args: vec![],
        };

        let output = executor.execute().await.unwrap();
        assert_eq!(output.stdout.trim(), "hello");
        assert_eq!(output.code, 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_a_tool_error_with_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "fail.sh", "#!/bin/sh\necho broken >&2\nexit 3\n");

        let executor = Executor {
            executable_path: script,
            timeout: Duration::from_secs(5),
            args: vec![],
        };

        match executor.execute().await {
            Err(Error::Tool { tool, code, stderr }) => {
                assert_eq!(tool, "fail");
                assert_eq!(code, 3);
                assert_eq!(stderr, "broken");
            }
            other => panic!("expected tool error, got {:?}", other.map(|o| o.code)),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_process_is_killed_on_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "slow.sh", "#!/bin/sh\nsleep 5\n");

        let executor = Executor {
            executable_path: script,
            timeout: Duration::from_millis(100),
            args: vec![],
        };

        match executor.execute().await {
            Err(Error::Timeout(t)) => assert_eq!(t, Duration::from_millis(100)),
            other => panic!("expected timeout, got {:?}", other.map(|o| o.code)),
        }
    }

    #[tokio::test]
    async fn missing_executable_is_an_io_error() {
        let executor = Executor {
            executable_path: PathBuf::from("/nonexistent/definitely-not-here"),
            timeout: Duration::from_secs(1),
            args: vec![],
        };

        assert!(matches!(executor.execute().await, Err(Error::IO(_))));
    }
}
