use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;

use crate::encode::format::ContainerFormat;
use crate::foundation::error::{KinetypeError, KinetypeResult};
use crate::session::record::CapturedRecording;

/// File name prefix of exported videos.
pub const DEFAULT_BASE_NAME: &str = "animation_export";

/// A finished container file held in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedFile {
    /// Complete container bytes.
    pub bytes: Vec<u8>,
    /// Container and codecs of `bytes`.
    pub format: ContainerFormat,
    /// Suggested file name, extension included.
    pub file_name: String,
}

impl ExportedFile {
    /// MIME type of the file.
    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }

    /// Same stem as this file with the extension of `format`.
    pub fn file_name_for(&self, format: ContainerFormat) -> String {
        let stem = Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(DEFAULT_BASE_NAME);
        format!("{stem}.{}", format.extension())
    }

    /// Write the file into `dir` (created when missing) and return its path.
    pub fn save_to(&self, dir: &Path) -> KinetypeResult<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create output directory '{}'", dir.display()))?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)
            .with_context(|| format!("write export '{}'", path.display()))?;
        Ok(path)
    }
}

/// External re-encoder taking a finished container and returning another.
pub trait Transcoder {
    /// Re-encode `input`.
    fn transcode(&self, input: &ExportedFile) -> KinetypeResult<ExportedFile>;
}

/// Result of a best-effort transcode.
#[derive(Debug)]
pub struct TranscodeOutcome {
    /// The re-encoded file, when the transcoder succeeded.
    pub file: Option<ExportedFile>,
    /// Why the transcoded copy is missing.
    pub degraded: Option<String>,
}

/// Joins captured chunks into the downloadable file.
#[derive(Clone, Debug)]
pub struct ExportFinalizer {
    base_name: String,
}

impl Default for ExportFinalizer {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_NAME)
    }
}

impl ExportFinalizer {
    /// Finalizer naming files `<base_name>_<unix-millis>.<ext>`.
    pub fn new(base_name: impl Into<String>) -> Self {
        let base_name = base_name.into();
        let base_name = if base_name.trim().is_empty() {
            DEFAULT_BASE_NAME.to_owned()
        } else {
            base_name
        };
        Self { base_name }
    }

    /// File name for `format` at `unix_ms`.
    pub fn file_name(&self, format: ContainerFormat, unix_ms: u128) -> String {
        format!("{}_{unix_ms}.{}", self.base_name, format.extension())
    }

    /// Concatenate the chunks, in order, into one file named at the current time.
    pub fn finalize(&self, captured: CapturedRecording) -> KinetypeResult<ExportedFile> {
        let unix_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        self.finalize_at(captured, unix_ms)
    }

    /// [`ExportFinalizer::finalize`] with an explicit timestamp.
    pub fn finalize_at(
        &self,
        captured: CapturedRecording,
        unix_ms: u128,
    ) -> KinetypeResult<ExportedFile> {
        if captured.chunks.iter().all(Vec::is_empty) {
            return Err(KinetypeError::recording("recording produced no data"));
        }
        let bytes = captured.chunks.concat();
        tracing::debug!(
            chunks = captured.chunks.len(),
            bytes = bytes.len(),
            "export finalized"
        );
        Ok(ExportedFile {
            bytes,
            format: captured.format,
            file_name: self.file_name(captured.format, unix_ms),
        })
    }

    /// Run `transcoder` on `file`; a failure is reported, never returned as an error.
    pub fn transcode_best_effort(
        &self,
        file: &ExportedFile,
        transcoder: &dyn Transcoder,
    ) -> TranscodeOutcome {
        match transcoder.transcode(file) {
            Ok(out) => TranscodeOutcome {
                file: Some(out),
                degraded: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "transcode failed, keeping original export");
                TranscodeOutcome {
                    file: None,
                    degraded: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/export.rs"]
mod tests;
