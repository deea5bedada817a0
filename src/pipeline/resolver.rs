//! Source resolution: URL in, raw download on disk out

use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;

use super::{OutputFormat, ResolvedMedia};
use crate::config::ServerConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::tools::{DownloadOptions, MediaExtractor};

/// Wraps the extractor with the download policy for each output format
pub struct SourceResolver {
    extractor: Arc<dyn MediaExtractor>,
    output_dir: PathBuf,
    ffmpeg_path: PathBuf,
    force_ipv4: bool,
    extractor_args: Option<String>,
}

/// Escape a literal path for use inside an output template
fn template_prefix(dir: &Path) -> String {
    dir.display().to_string().replace('%', "%%")
}

impl SourceResolver {
    pub fn new(extractor: Arc<dyn MediaExtractor>, config: &ServerConfig) -> Self {
        Self {
            extractor,
            output_dir: config.output_dir.clone(),
            ffmpeg_path: config.tools.ffmpeg_path.clone(),
            force_ipv4: config.tools.force_ipv4,
            extractor_args: config.tools.extractor_args.clone(),
        }
    }

    /// Download options for one request.
    ///
    /// Video is named after the source title. Audio is named after the
    /// request id, since the title is only sanitized later.
    pub fn options(&self, format: OutputFormat, request_id: &Uuid) -> DownloadOptions {
        let dir = template_prefix(&self.output_dir);
        let (format_selector, merge_output_format, output_template) = match format {
            OutputFormat::Video => (
                "bestvideo+bestaudio/best",
                Some("mp4".to_string()),
                format!("{}/%(title)s.%(ext)s", dir),
            ),
            OutputFormat::Audio => (
                "bestaudio/best",
                None,
                format!("{}/{}.%(ext)s", dir, request_id),
            ),
        };

        DownloadOptions {
            format_selector: format_selector.to_string(),
            merge_output_format,
            output_template,
            quiet: true,
            no_playlist: true,
            force_ipv4: self.force_ipv4,
            ffmpeg_location: self.ffmpeg_path.clone(),
            extractor_args: self.extractor_args.clone(),
        }
    }

    /// Download `url` and confirm the file the extractor reported is there
    pub fn resolve(
        &self,
        url: &str,
        format: OutputFormat,
        request_id: &Uuid,
    ) -> PipelineResult<ResolvedMedia> {
        let options = self.options(format, request_id);
        let extracted = self.extractor.download(url, &options)?;

        if !extracted.path.is_file() {
            return Err(PipelineError::DownloadVerification(extracted.path));
        }

        let title = extracted
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| format.to_string());

        tracing::debug!("Resolved \"{}\" to {}", title, extracted.path.display());

        Ok(ResolvedMedia {
            title,
            raw_path: extracted.path,
            format,
        })
    }
}
