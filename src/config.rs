//! Server configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// External tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to the ffmpeg executable, shared by the extractor and the transcoder
    pub ffmpeg_path: PathBuf,

    /// Path to the yt-dlp executable
    pub ytdlp_path: PathBuf,

    /// Bind outbound extractor connections to IPv4
    pub force_ipv4: bool,

    /// Extra `--extractor-args` passed through to yt-dlp
    pub extractor_args: Option<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ytdlp_path: PathBuf::from("yt-dlp"),
            force_ipv4: true,
            extractor_args: None,
        }
    }
}

/// Audio extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio bitrate in bps
    pub bitrate: u64,

    /// Output sample rate
    pub sample_rate: u32,

    /// Extension (and therefore container) of extracted audio files
    pub extension: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            bitrate: 192_000,
            sample_rate: 44_100,
            extension: "mp3".to_string(),
        }
    }
}

/// Video audio-fix configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemuxConfig {
    /// Codec the audio track is re-encoded to
    pub audio_codec: String,

    /// Audio bitrate in bps
    pub bitrate: u64,

    /// Fail the request when the transcoder exits cleanly but writes nothing
    pub require_fixed_output: bool,

    /// Inspect the fixed file and warn if its audio track is not AAC
    pub verify_output: bool,
}

impl Default for RemuxConfig {
    fn default() -> Self {
        Self {
            audio_codec: "aac".to_string(),
            bitrate: 192_000,
            require_fixed_output: false,
            verify_output: true,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Flat directory holding every produced file
    pub output_dir: PathBuf,

    /// External tools
    pub tools: ToolsConfig,

    /// Audio extraction
    pub audio: AudioConfig,

    /// Video audio-fix
    pub remux: RemuxConfig,

    /// Enable CORS
    pub cors_enabled: bool,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log output format (pretty, json)
    pub log_format: String,

    /// Maximum pipeline runs executing at once
    pub max_concurrent_jobs: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            output_dir: PathBuf::from("downloads"),
            tools: ToolsConfig::default(),
            audio: AudioConfig::default(),
            remux: RemuxConfig::default(),
            cors_enabled: true,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            max_concurrent_jobs: 4,
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Format a bps value the way ffmpeg expects it (`192000` -> `192k`)
pub fn ffmpeg_bitrate(bps: u64) -> String {
    if bps % 1000 == 0 {
        format!("{}k", bps / 1000)
    } else {
        bps.to_string()
    }
}
