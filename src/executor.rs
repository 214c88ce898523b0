use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{AgentError, Result};

/// Executes one shell command at a time on the local machine.
///
/// Commands run as `sh -c <command>` with a caller-supplied string fed to
/// the child's stdin. `cd` is special-cased: it moves the agent process
/// itself so later relative paths resolve against the new directory.
#[derive(Debug, Clone, Default)]
pub struct CommandExecutor;

impl CommandExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Run `command` with `input` on stdin and return everything it wrote
    /// to stdout.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::SpawnFailure`] if the shell cannot be spawned.
    /// That error is fatal for the whole agent: the coordinator is blocked
    /// waiting on a reply and must see the connection die rather than a
    /// silently dropped request.
    pub async fn execute(&self, input: &str, command: &str) -> Result<String> {
        if let Some(path) = command.strip_prefix("cd ") {
            if let Err(e) = std::env::set_current_dir(path) {
                tracing::warn!(path, error = %e, "could not change directory");
            } else {
                tracing::debug!(path, "changed working directory");
            }
            return Ok(String::new());
        }

        tracing::info!(command, "executing command");

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(AgentError::SpawnFailure)?;

        // Feed the input and close stdin before collecting output, so
        // commands that read until end-of-file cannot deadlock against us.
        if let Some(mut stdin) = child.stdin.take() {
            let input = input.to_owned();
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(input.as_bytes()).await {
                    tracing::debug!(error = %e, "child stopped reading its stdin");
                }
            });
        }

        let output = child.wait_with_output().await?;
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();

        tracing::debug!(
            exit_code = ?output.status.code(),
            stdout_bytes = stdout.len(),
            "command finished"
        );

        Ok(stdout)
    }
}
