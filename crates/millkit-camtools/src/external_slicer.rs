//! External slicer process runner
//!
//! Delegates slicing to a third-party slicer binary. Output lines are streamed
//! to the job's progress sink as they arrive; the process is killed when it
//! exceeds its time limit.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{info, warn};

use crate::error::{CamToolError, CamToolResult};
use crate::toolpath::JobContext;

/// Captured result of one slicer run
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// Exit code, `None` when terminated by a signal
    pub exit_code: Option<i32>,
    /// Everything written to stdout
    pub stdout: String,
    /// Everything written to stderr
    pub stderr: String,
}

impl ProcessOutput {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// A configured external slicer executable
#[derive(Debug, Clone)]
pub struct ExternalSlicer {
    executable: PathBuf,
    timeout: Duration,
}

impl ExternalSlicer {
    pub fn new(executable: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            executable: executable.into(),
            timeout,
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Command-line arguments for one run
    pub fn arguments(&self, stl: &Path, output: &Path, config: Option<&Path>) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(config) = config {
            args.push("--load".to_string());
            args.push(config.display().to_string());
        }
        args.push(stl.display().to_string());
        args.push("--output".to_string());
        args.push(output.display().to_string());
        args
    }

    /// Run the slicer on `stl`, writing to `output`
    ///
    /// The process runs in the STL's directory. Each stdout line is reported
    /// as `[OUT] ...` and each stderr line as `[ERR] ...`.
    pub async fn run(
        &self,
        stl: &Path,
        output: &Path,
        config: Option<&Path>,
        ctx: &JobContext,
    ) -> CamToolResult<ProcessOutput> {
        let args = self.arguments(stl, output, config);
        info!("Running external slicer {} {:?}", self.executable.display(), args);

        let mut command = Command::new(&self.executable);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = stl.parent().filter(|d| !d.as_os_str().is_empty()) {
            command.current_dir(dir);
        }

        let mut child = command.spawn()?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let run = async {
            let (out, err, status) = tokio::join!(
                collect_lines(stdout, "[OUT] ", ctx),
                collect_lines(stderr, "[ERR] ", ctx),
                child.wait()
            );
            status.map(|status| ProcessOutput {
                exit_code: status.code(),
                stdout: out,
                stderr: err,
            })
        };

        let outcome = tokio::time::timeout(self.timeout, run).await;
        match outcome {
            Ok(result) => {
                let output = result?;
                if !output.succeeded() {
                    warn!("External slicer exited with {:?}", output.exit_code);
                }
                Ok(output)
            }
            Err(_) => {
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill timed-out slicer: {}", e);
                }
                Err(CamToolError::ExternalSlicerTimeout {
                    timeout_secs: self.timeout.as_secs(),
                })
            }
        }
    }
}

async fn collect_lines<R>(reader: Option<R>, prefix: &str, ctx: &JobContext) -> String
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return String::new();
    };

    let mut collected = String::new();
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                // Output is not guaranteed to be UTF-8.
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                ctx.report(&format!("{}{}", prefix, line));
                collected.push_str(line);
                collected.push('\n');
            }
            Err(e) => {
                warn!("Failed to read slicer output: {}", e);
                break;
            }
        }
    }
    collected
}
