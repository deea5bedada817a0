//! yt-dlp command-line extractor
//!
//! The downloaded path is read back from yt-dlp's own `after_move` print
//! hook, which reports the final filename after merging, so no extension
//! is ever guessed here.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use serde::Deserialize;

use super::{process, DownloadOptions, Extracted, MediaExtractor};
use crate::error::{PipelineError, PipelineResult};

const TOOL: &str = "yt-dlp";

/// Print template emitting `{"title": .., "filepath": ..}` once the file
/// has reached its final name
const PRINT_RESULT: &str = "after_move:%(.{title,filepath})j";

#[derive(Debug, Deserialize)]
struct PrintedResult {
    title: Option<String>,
    filepath: Option<PathBuf>,
}

/// Extractor backed by a yt-dlp executable
#[derive(Debug, Clone)]
pub struct YtDlp {
    path: PathBuf,
}

impl YtDlp {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Command-line arguments for one download
pub fn download_args(url: &str, options: &DownloadOptions) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();

    if options.quiet {
        args.push("--quiet".into());
        args.push("--no-warnings".into());
        args.push("--no-progress".into());
    }
    if options.no_playlist {
        args.push("--no-playlist".into());
    }
    if options.force_ipv4 {
        args.push("--force-ipv4".into());
    }
    args.push("--ffmpeg-location".into());
    args.push(options.ffmpeg_location.clone().into());
    if let Some(extra) = &options.extractor_args {
        args.push("--extractor-args".into());
        args.push(extra.into());
    }

    args.push("-f".into());
    args.push(options.format_selector.clone().into());
    if let Some(container) = &options.merge_output_format {
        args.push("--merge-output-format".into());
        args.push(container.into());
    }
    args.push("-o".into());
    args.push(options.output_template.clone().into());

    args.push("--no-simulate".into());
    args.push("--print".into());
    args.push(PRINT_RESULT.into());

    // A URL starting with '-' must not be read as an option.
    args.push("--".into());
    args.push(url.into());
    args
}

/// The extractor's own error lines, or the stderr tail if there are none
fn failure_message(stderr: &[u8], status: &std::process::ExitStatus) -> String {
    let text = String::from_utf8_lossy(stderr);
    let errors: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with("ERROR:"))
        .collect();
    if !errors.is_empty() {
        return errors.join("\n");
    }

    let tail = process::stderr_tail(stderr, 3);
    if tail.is_empty() {
        format!("{} exited with {}", TOOL, status)
    } else {
        tail
    }
}

/// Read the printed result. The last non-empty stdout line wins.
fn parse_printed(stdout: &[u8]) -> PipelineResult<Extracted> {
    let text = String::from_utf8_lossy(stdout);
    let line = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .ok_or_else(|| {
            PipelineError::Extraction(format!("{} reported no downloaded file", TOOL))
        })?;

    let printed: PrintedResult = serde_json::from_str(line).map_err(|e| {
        PipelineError::Extraction(format!("Unreadable {} output: {}", TOOL, e))
    })?;

    let path = printed.filepath.ok_or_else(|| {
        PipelineError::Extraction(format!("{} reported no downloaded file", TOOL))
    })?;

    Ok(Extracted {
        title: printed.title,
        path,
    })
}

impl MediaExtractor for YtDlp {
    fn download(&self, url: &str, options: &DownloadOptions) -> PipelineResult<Extracted> {
        let mut cmd = Command::new(&self.path);
        cmd.args(download_args(url, options));

        let output = process::run(TOOL, &mut cmd)?;
        if !output.status.success() {
            return Err(PipelineError::Extraction(failure_message(
                &output.stderr,
                &output.status,
            )));
        }

        parse_printed(&output.stdout)
    }
}
