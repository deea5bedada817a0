//! Configuration file support
//!
//! Loads server configuration from TOML files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{AudioConfig, RemuxConfig, ServerConfig, ToolsConfig};
use crate::error::{Result, ServerError};

/// Configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Server settings
    pub server: Option<ServerSettings>,
    /// External tool settings
    pub tools: Option<ToolsSettings>,
    /// Audio extraction settings
    pub audio: Option<AudioSettings>,
    /// Video audio-fix settings
    pub remux: Option<RemuxSettings>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
    /// Limits settings
    pub limits: Option<LimitsSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to
    pub host: Option<String>,
    /// Port to listen on
    pub port: Option<u16>,
    /// Output directory
    pub output_dir: Option<String>,
    /// Enable CORS
    pub cors_enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsSettings {
    pub ffmpeg_path: Option<String>,
    pub ytdlp_path: Option<String>,
    pub force_ipv4: Option<bool>,
    pub extractor_args: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Bitrate in bps
    pub bitrate: Option<u64>,
    pub sample_rate: Option<u32>,
    pub extension: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemuxSettings {
    pub audio_codec: Option<String>,
    /// Bitrate in bps
    pub bitrate: Option<u64>,
    pub require_fixed_output: Option<bool>,
    pub verify_output: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsSettings {
    /// Maximum pipeline runs executing at once
    pub max_concurrent_jobs: Option<usize>,
}

/// Treat empty strings in the file as "not set"
fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| ServerError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Convert to ServerConfig, filling gaps with defaults
    pub fn into_server_config(self) -> ServerConfig {
        let defaults = ServerConfig::default();

        let server = self.server;
        let tools = self.tools.map(|t| {
            let base = ToolsConfig::default();
            ToolsConfig {
                ffmpeg_path: non_empty(t.ffmpeg_path)
                    .map(PathBuf::from)
                    .unwrap_or(base.ffmpeg_path),
                ytdlp_path: non_empty(t.ytdlp_path)
                    .map(PathBuf::from)
                    .unwrap_or(base.ytdlp_path),
                force_ipv4: t.force_ipv4.unwrap_or(base.force_ipv4),
                extractor_args: non_empty(t.extractor_args),
            }
        });
        let audio = self.audio.map(|a| {
            let base = AudioConfig::default();
            AudioConfig {
                bitrate: a.bitrate.unwrap_or(base.bitrate),
                sample_rate: a.sample_rate.unwrap_or(base.sample_rate),
                extension: non_empty(a.extension).unwrap_or(base.extension),
            }
        });
        let remux = self.remux.map(|r| {
            let base = RemuxConfig::default();
            RemuxConfig {
                audio_codec: non_empty(r.audio_codec).unwrap_or(base.audio_codec),
                bitrate: r.bitrate.unwrap_or(base.bitrate),
                require_fixed_output: r.require_fixed_output.unwrap_or(base.require_fixed_output),
                verify_output: r.verify_output.unwrap_or(base.verify_output),
            }
        });

        ServerConfig {
            host: server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(defaults.host),
            port: server.as_ref().and_then(|s| s.port).unwrap_or(defaults.port),
            output_dir: server
                .as_ref()
                .and_then(|s| non_empty(s.output_dir.clone()))
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            cors_enabled: server
                .as_ref()
                .and_then(|s| s.cors_enabled)
                .unwrap_or(defaults.cors_enabled),
            tools: tools.unwrap_or(defaults.tools),
            audio: audio.unwrap_or(defaults.audio),
            remux: remux.unwrap_or(defaults.remux),
            log_level: self
                .logging
                .as_ref()
                .map(|l| l.level.clone())
                .unwrap_or(defaults.log_level),
            log_format: self
                .logging
                .and_then(|l| l.format)
                .unwrap_or(defaults.log_format),
            max_concurrent_jobs: self
                .limits
                .and_then(|l| l.max_concurrent_jobs)
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_concurrent_jobs),
        }
    }
}

/// Load the configuration at `path`. A missing file is `Ok(None)`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<ServerConfig>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }
    ConfigFile::from_file(path).map(|cf| Some(cf.into_server_config()))
}
