//! Pipeline entry point

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use uuid::Uuid;

use super::{
    AudioStage, ConversionRequest, ConversionResult, OutputFormat, RemuxStage, SourceResolver,
    Warning,
};
use crate::config::ServerConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::tools::{FfmpegCli, MediaExtractor, Transcoder, YtDlp};

/// Where a request is. Moves forward only; any failure ends in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Resolving,
    Fixing,
    Transcoding,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::Resolving => "resolving",
            Stage::Fixing => "fixing",
            Stage::Transcoding => "transcoding",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

struct Artifact {
    title: String,
    path: PathBuf,
    warnings: Vec<Warning>,
}

/// Resolver and stages wired to one pair of tools.
///
/// Holds no per-request state, so a single instance serves concurrent
/// requests.
pub struct Pipeline {
    resolver: SourceResolver,
    audio: AudioStage,
    remux: RemuxStage,
}

impl Pipeline {
    pub fn new(
        config: &ServerConfig,
        extractor: Arc<dyn MediaExtractor>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        Self {
            resolver: SourceResolver::new(extractor, config),
            audio: AudioStage::new(transcoder.clone(), config),
            remux: RemuxStage::new(transcoder, config),
        }
    }

    /// Pipeline backed by the configured yt-dlp and ffmpeg executables
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            config,
            Arc::new(YtDlp::new(&config.tools.ytdlp_path)),
            Arc::new(FfmpegCli::new(&config.tools.ffmpeg_path)),
        )
    }

    /// Run one conversion to completion. Never fails: every error from any
    /// stage comes back as `ConversionResult { success: false, .. }`.
    pub fn process_video(&self, request: &ConversionRequest) -> ConversionResult {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "convert",
            %request_id,
            format = %request.format,
            url = %request.url
        );
        let _enter = span.enter();

        let mut stage = Stage::Start;
        match self.run(request, &request_id, &mut stage) {
            Ok(artifact) => {
                let filename = artifact
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                tracing::info!("Conversion finished: {}", filename);
                ConversionResult::success(filename, artifact.title, artifact.path, artifact.warnings)
            }
            Err(e) => {
                // `stage` still names the step that was running
                tracing::warn!("Conversion failed while {}: {}", stage, e);
                stage = Stage::Failed;
                tracing::debug!("{}", stage);
                ConversionResult::failure(e.to_string())
            }
        }
    }

    /// Drive the stages, leaving `stage` at the step that failed on error
    fn run(
        &self,
        request: &ConversionRequest,
        request_id: &Uuid,
        stage: &mut Stage,
    ) -> PipelineResult<Artifact> {
        *stage = Stage::Resolving;
        tracing::debug!("{}", stage);
        let media = self
            .resolver
            .resolve(&request.url, request.format, request_id)?;

        let output = match request.format {
            OutputFormat::Video => {
                *stage = Stage::Fixing;
                tracing::debug!("{}", stage);
                self.remux.fix_audio_codec(&media.raw_path, request_id)
            }
            OutputFormat::Audio => {
                *stage = Stage::Transcoding;
                tracing::debug!("{}", stage);
                self.audio.extract(&media, request_id)
            }
        }?;

        if !output.path.is_file() {
            return Err(PipelineError::OutputMissing(output.path));
        }

        *stage = Stage::Done;
        Ok(Artifact {
            title: media.title,
            path: output.path,
            warnings: output.warnings,
        })
    }
}
