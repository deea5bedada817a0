//! Audio extraction stage

use std::path::PathBuf;
use std::sync::Arc;

use uuid::Uuid;

use super::{ResolvedMedia, StageOutput, Warning};
use crate::config::ServerConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::naming::{sanitize_filename, unique_path};
use crate::tools::{AudioTarget, Transcoder};

/// Turns a raw download into `<title>.<ext>` in the output directory
pub struct AudioStage {
    transcoder: Arc<dyn Transcoder>,
    output_dir: PathBuf,
    extension: String,
    target: AudioTarget,
}

impl AudioStage {
    pub fn new(transcoder: Arc<dyn Transcoder>, config: &ServerConfig) -> Self {
        Self {
            transcoder,
            output_dir: config.output_dir.clone(),
            extension: config.audio.extension.clone(),
            target: AudioTarget {
                // the encoder follows from the output extension
                codec: None,
                bitrate: config.audio.bitrate,
                sample_rate: Some(config.audio.sample_rate),
            },
        }
    }

    /// Encode the audio of `media.raw_path` and delete the raw file.
    ///
    /// On failure the raw file is left where it is.
    pub fn extract(&self, media: &ResolvedMedia, request_id: &Uuid) -> PipelineResult<StageOutput> {
        if !media.raw_path.is_file() {
            return Err(PipelineError::MissingSource(media.raw_path.clone()));
        }

        let mut base = sanitize_filename(&media.title);
        if base.trim().is_empty() {
            base = request_id.to_string();
        }
        let output = unique_path(&self.output_dir, &base, &self.extension, request_id);

        tracing::info!(
            "Converting {} to {}",
            media.raw_path.display(),
            output.display()
        );
        if let Err(e) = self
            .transcoder
            .extract_audio(&media.raw_path, &output, &self.target)
        {
            // a partial encode must not be served later
            if output.exists() {
                let _ = std::fs::remove_file(&output);
            }
            return Err(e);
        }

        if !output.is_file() {
            return Err(PipelineError::OutputMissing(output));
        }

        let mut warnings = Vec::new();
        if let Err(e) = std::fs::remove_file(&media.raw_path) {
            tracing::warn!(
                "Failed to remove intermediate {}: {}",
                media.raw_path.display(),
                e
            );
            warnings.push(Warning::IntermediateNotRemoved {
                path: media.raw_path.clone(),
                reason: e.to_string(),
            });
        }

        Ok(StageOutput {
            path: output,
            warnings,
        })
    }
}
