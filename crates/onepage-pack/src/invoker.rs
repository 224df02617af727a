//! Build step invocation.

use std::future::Future;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::packager::PackError;

/// Runs the project's build and reports whether it succeeded.
pub trait BuildInvoker: Send + Sync {
    /// Human-readable description of what will run.
    fn describe(&self) -> String;

    /// Run the build in `root` and wait for it to finish.
    fn invoke(&self, root: &Path) -> impl Future<Output = Result<(), PackError>> + Send;
}

/// Runs a shell command line with inherited stdio.
#[derive(Debug, Clone)]
pub struct ShellInvoker {
    command: String,
}

impl ShellInvoker {
    /// Create an invoker for a command line such as `npm run build`.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[cfg(windows)]
fn shell_command(line: &str) -> Command {
    // cmd.exe parses the line itself, so it is passed through unescaped.
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").raw_arg(line);
    cmd
}

#[cfg(not(windows))]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(line);
    cmd
}

impl BuildInvoker for ShellInvoker {
    fn describe(&self) -> String {
        self.command.clone()
    }

    async fn invoke(&self, root: &Path) -> Result<(), PackError> {
        let status = shell_command(&self.command)
            .current_dir(root)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| PackError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        tracing::debug!("`{}` exited with {}", self.command, status);

        if !status.success() {
            return Err(PackError::BuildFailure {
                command: self.command.clone(),
                code: status.code(),
            });
        }

        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn succeeds_on_zero_exit() {
        let temp = tempdir().unwrap();
        ShellInvoker::new("true").invoke(temp.path()).await.unwrap();
    }

    #[tokio::test]
    async fn runs_in_project_root() {
        let temp = tempdir().unwrap();
        ShellInvoker::new("echo built > marker.txt")
            .invoke(temp.path())
            .await
            .unwrap();

        assert!(temp.path().join("marker.txt").exists());
    }

    #[tokio::test]
    async fn passes_quoted_arguments_through_the_shell() {
        let temp = tempdir().unwrap();
        ShellInvoker::new(r#"printf '%s' "two words" > marker.txt"#)
            .invoke(temp.path())
            .await
            .unwrap();

        let written = std::fs::read_to_string(temp.path().join("marker.txt")).unwrap();
        assert_eq!(written, "two words");
    }

    #[tokio::test]
    async fn reports_exit_code_on_failure() {
        let temp = tempdir().unwrap();
        let err = ShellInvoker::new("exit 3")
            .invoke(temp.path())
            .await
            .unwrap_err();

        match err {
            PackError::BuildFailure { command, code } => {
                assert_eq!(command, "exit 3");
                assert_eq!(code, Some(3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_root_is_a_spawn_error() {
        let temp = tempdir().unwrap();
        let err = ShellInvoker::new("true")
            .invoke(&temp.path().join("missing"))
            .await
            .unwrap_err();

        assert!(matches!(err, PackError::Spawn { .. }));
    }
}
