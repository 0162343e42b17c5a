//! PDF Renderer
//!
//! Converts certificate HTML into PDF bytes through an external program.

use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::RenderError;

/// Turns an HTML document into PDF bytes.
///
/// Rendering is not retried; a failure is reported to the caller as is.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html: &str) -> Result<Vec<u8>, RenderError>;
}

/// Renders by piping HTML into a command and reading the PDF from its stdout.
///
/// The default invocation is `weasyprint - -`.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// WeasyPrint reading from stdin and writing to stdout.
    pub fn weasyprint(program: impl Into<String>) -> Self {
        Self::new(program, vec!["-".to_string(), "-".to_string()])
    }

    fn spawn_error(&self, source: io::Error) -> RenderError {
        RenderError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

#[async_trait]
impl PdfRenderer for CommandRenderer {
    async fn render(&self, html: &str) -> Result<Vec<u8>, RenderError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            // A renderer that exits early closes the pipe; report its exit
            // status instead.
            if let Err(err) = stdin.write_all(html.as_bytes()).await {
                if err.kind() != io::ErrorKind::BrokenPipe {
                    return Err(self.spawn_error(err));
                }
            }
            // Closing stdin signals end of input
            drop(stdin);
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(RenderError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if output.stdout.is_empty() {
            return Err(RenderError::EmptyOutput);
        }

        debug!("Rendered {} byte PDF", output.stdout.len());
        Ok(output.stdout)
    }
}
