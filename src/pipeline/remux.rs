//! Video audio-fix stage
//!
//! Merged downloads may carry an audio codec that is legal in MP4 but that
//! many players refuse (Opus being the usual one). The video stream is
//! copied untouched and only the audio is re-encoded; the result is renamed
//! over the original so the final name never goes missing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;

use super::{StageOutput, Warning};
use crate::config::ServerConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::naming::short_id;
use crate::probe;
use crate::tools::{AudioTarget, Transcoder};

pub struct RemuxStage {
    transcoder: Arc<dyn Transcoder>,
    target: AudioTarget,
    require_fixed_output: bool,
    verify_output: bool,
}

/// Request-private sibling the fixed file is written to
pub fn temp_path(input: &Path, request_id: &Uuid) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{}_fixed_{}.mp4", stem, short_id(request_id)))
}

impl RemuxStage {
    pub fn new(transcoder: Arc<dyn Transcoder>, config: &ServerConfig) -> Self {
        Self {
            transcoder,
            target: AudioTarget {
                codec: Some(config.remux.audio_codec.clone()),
                bitrate: config.remux.bitrate,
                sample_rate: None,
            },
            require_fixed_output: config.remux.require_fixed_output,
            verify_output: config.remux.verify_output,
        }
    }

    /// Re-encode the audio of `input` and return the fixed `.mp4` path
    pub fn fix_audio_codec(&self, input: &Path, request_id: &Uuid) -> PipelineResult<StageOutput> {
        if !input.is_file() {
            return Err(PipelineError::MissingSource(input.to_path_buf()));
        }

        let final_path = input.with_extension("mp4");
        let temp = temp_path(input, request_id);
        let mut warnings = Vec::new();

        tracing::info!("Fixing audio codec for {}", input.display());
        if let Err(e) = self
            .transcoder
            .copy_video_reencode_audio(input, &temp, &self.target)
        {
            if temp.exists() {
                let _ = std::fs::remove_file(&temp);
            }
            return Err(e);
        }

        if !temp.is_file() {
            if self.require_fixed_output {
                return Err(PipelineError::OutputMissing(temp));
            }
            tracing::warn!(
                "{} was not produced, serving {} unfixed",
                temp.display(),
                input.display()
            );
            warnings.push(Warning::FixedOutputMissing { path: temp });
            return Ok(StageOutput {
                path: input.to_path_buf(),
                warnings,
            });
        }

        std::fs::rename(&temp, &final_path)?;

        if final_path != input {
            if let Err(e) = std::fs::remove_file(input) {
                tracing::warn!("Failed to remove {}: {}", input.display(), e);
                warnings.push(Warning::IntermediateNotRemoved {
                    path: input.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }

        if self.verify_output {
            if let Some(w) = self.verify(&final_path) {
                warnings.push(w);
            }
        }

        Ok(StageOutput {
            path: final_path,
            warnings,
        })
    }

    fn verify(&self, path: &Path) -> Option<Warning> {
        let detail = match probe::summarize(path) {
            Ok(summary) if summary.audio_is_aac() => return None,
            Ok(summary) if summary.audio_codecs.is_empty() => "no audio track".to_string(),
            Ok(summary) => format!("audio tracks are {}", summary.audio_codecs.join(", ")),
            Err(e) => e.to_string(),
        };
        tracing::warn!("Audio codec of {} unverified: {}", path.display(), detail);
        Some(Warning::AudioCodecUnverified {
            path: path.to_path_buf(),
            detail,
        })
    }
}
