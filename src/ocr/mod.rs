//! Text extraction from images.
//!
//! The engine is an external `tesseract` binary. Image bytes are piped to its
//! stdin and the recognized text is read from stdout, so nothing touches disk.

use async_trait::async_trait;
use log::{ debug, error };
use std::process::{ ExitStatus, Stdio };
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("No image data was provided")]
    EmptyImage,

    #[error("Could not start OCR engine '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("OCR engine failed ({status}): {stderr}")]
    Failed {
        status: ExitStatus,
        stderr: String,
    },

    #[error("OCR I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn extract_text(&self, image: &[u8]) -> Result<String, OcrError>;
}

pub struct TesseractOcr {
    command: String,
    lang: Option<String>,
}

impl TesseractOcr {
    pub fn new(command: impl Into<String>, lang: Option<String>) -> Self {
        Self {
            command: command.into(),
            lang: lang.filter(|l| !l.trim().is_empty()),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn extract_text(&self, image: &[u8]) -> Result<String, OcrError> {
        if image.is_empty() {
            return Err(OcrError::EmptyImage);
        }

        let mut cmd = Command::new(&self.command);
        cmd.arg("stdin").arg("stdout");
        if let Some(lang) = &self.lang {
            cmd.arg("-l").arg(lang);
        }
        cmd.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| OcrError::Spawn {
            command: self.command.clone(),
            source,
        })?;

        // Feed stdin from a separate task; tesseract may start writing before
        // it has consumed all input.
        let mut stdin = child.stdin
            .take()
            .ok_or_else(||
                std::io::Error::new(std::io::ErrorKind::BrokenPipe, "OCR engine stdin unavailable")
            )?;
        let data = image.to_vec();
        let writer = tokio::spawn(async move {
            stdin.write_all(&data).await?;
            stdin.shutdown().await
        });

        let output = child.wait_with_output().await?;
        let written = writer.await.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("OCR failed with {}: {}", output.status, stderr);
            return Err(OcrError::Failed {
                status: output.status,
                stderr,
            });
        }
        written??;

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!("OCR extracted {} characters from {} bytes", text.len(), image.len());
        Ok(text)
    }
}
