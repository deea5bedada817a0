//! External tool capabilities
//!
//! The pipeline never spawns processes itself. It talks to two narrow traits:
//! - `MediaExtractor`: resolve a URL and download the selected stream(s)
//! - `Transcoder`: produce an output file from an input file
//!
//! `ytdlp` and `ffmpeg` hold the command-line implementations.

pub mod ffmpeg;
pub mod process;
pub mod ytdlp;

use std::path::{Path, PathBuf};

use crate::error::PipelineResult;

pub use ffmpeg::FfmpegCli;
pub use ytdlp::YtDlp;

/// How the extractor should pick and write the stream(s)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Format selector, e.g. `bestaudio/best`
    pub format_selector: String,
    /// Container to merge separate video and audio streams into
    pub merge_output_format: Option<String>,
    /// Output template; `%(field)s` placeholders are expanded by the extractor
    pub output_template: String,
    /// Suppress non-essential extractor output
    pub quiet: bool,
    /// Download a single video even if the URL points into a playlist
    pub no_playlist: bool,
    /// Bind outbound connections to IPv4
    pub force_ipv4: bool,
    /// ffmpeg the extractor may use for its own merging
    pub ffmpeg_location: PathBuf,
    /// Opaque extractor arguments, passed through unchanged
    pub extractor_args: Option<String>,
}

/// What the extractor reports after a download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// Title from the source metadata, if any
    pub title: Option<String>,
    /// Final on-disk path as predicted by the extractor itself
    pub path: PathBuf,
}

/// Remote media resolution and download
pub trait MediaExtractor: Send + Sync {
    /// Resolve `url`, download it according to `options`, and report where
    /// the file landed. The reported path is not checked here.
    fn download(&self, url: &str, options: &DownloadOptions) -> PipelineResult<Extracted>;
}

/// Target for an audio encode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioTarget {
    /// Encoder name, `None` to let the tool pick from the output extension
    pub codec: Option<String>,
    /// Bitrate in bps
    pub bitrate: u64,
    /// Output sample rate, `None` to keep the source rate
    pub sample_rate: Option<u32>,
}

/// Audio/video transcoding
pub trait Transcoder: Send + Sync {
    /// Copy the video stream bit-for-bit and re-encode the audio to `target`
    fn copy_video_reencode_audio(
        &self,
        input: &Path,
        output: &Path,
        target: &AudioTarget,
    ) -> PipelineResult<()>;

    /// Drop video and write the audio track alone to `output`
    fn extract_audio(&self, input: &Path, output: &Path, target: &AudioTarget)
        -> PipelineResult<()>;
}
