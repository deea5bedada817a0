//! Media acquisition and transcode pipeline
//!
//! A request flows strictly forward:
//! - `resolver`: download the raw stream(s) through the extractor
//! - `audio`: transcode the raw download into a standalone audio file
//! - `remux`: re-encode the audio track of a downloaded MP4 in place
//! - `orchestrator`: sequence the above and collapse failures into a
//!   `ConversionResult`

pub mod audio;
pub mod orchestrator;
pub mod remux;
pub mod resolver;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

pub use audio::AudioStage;
pub use orchestrator::Pipeline;
pub use remux::RemuxStage;
pub use resolver::SourceResolver;

/// What the caller wants back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Audio-only file
    #[default]
    Audio,
    /// MP4 with a compatibility-safe audio track
    Video,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Audio => write!(f, "audio"),
            OutputFormat::Video => write!(f, "video"),
        }
    }
}

/// Rejected format string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported format: {0}")]
pub struct UnsupportedFormat(pub String);

impl FromStr for OutputFormat {
    type Err = UnsupportedFormat;

    /// Accepts `audio`/`mp3` and `video`/`mp4`, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "audio" | "mp3" => Ok(OutputFormat::Audio),
            "video" | "mp4" => Ok(OutputFormat::Video),
            _ => Err(UnsupportedFormat(s.to_string())),
        }
    }
}

/// One conversion, owned by the call that processes it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub url: String,
    pub format: OutputFormat,
}

impl ConversionRequest {
    pub fn new(url: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            url: url.into(),
            format,
        }
    }
}

/// Output of the source resolver. `raw_path` exists when this is handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    pub title: String,
    pub raw_path: PathBuf,
    pub format: OutputFormat,
}

/// A degraded-but-successful event worth reporting to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// The raw download could not be deleted after a successful transcode
    IntermediateNotRemoved { path: PathBuf, reason: String },
    /// The audio fix exited cleanly but wrote nothing; the unfixed file is served
    FixedOutputMissing { path: PathBuf },
    /// The fixed file could not be confirmed to carry AAC audio
    AudioCodecUnverified { path: PathBuf, detail: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::IntermediateNotRemoved { path, reason } => {
                write!(f, "could not remove {}: {}", path.display(), reason)
            }
            Warning::FixedOutputMissing { path } => {
                write!(f, "fixed output {} was not produced", path.display())
            }
            Warning::AudioCodecUnverified { path, detail } => {
                write!(f, "audio codec of {} unverified: {}", path.display(), detail)
            }
        }
    }
}

/// The only value that crosses from the pipeline to its callers.
///
/// Built through `success` or `failure`, so either `filename` or `error` is
/// set, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip)]
    pub output_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl ConversionResult {
    pub fn success(
        filename: String,
        title: String,
        output_path: PathBuf,
        warnings: Vec<Warning>,
    ) -> Self {
        Self {
            success: true,
            filename: Some(filename),
            title: Some(title),
            output_path: Some(output_path),
            error: None,
            warnings,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            filename: None,
            title: None,
            output_path: None,
            error: Some(error.into()),
            warnings: Vec::new(),
        }
    }
}

/// File produced by a transcode stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutput {
    pub path: PathBuf,
    pub warnings: Vec<Warning>,
}
