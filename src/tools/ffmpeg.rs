//! ffmpeg command-line transcoder

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{process, AudioTarget, Transcoder};
use crate::config::ffmpeg_bitrate;
use crate::error::PipelineResult;

const TOOL: &str = "ffmpeg";

/// Transcoder backed by an ffmpeg executable at a configured path
#[derive(Debug, Clone)]
pub struct FfmpegCli {
    path: PathBuf,
}

impl FfmpegCli {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn run(&self, args: Vec<OsString>) -> PipelineResult<()> {
        let mut cmd = Command::new(&self.path);
        cmd.args(args);
        process::run_checked(TOOL, &mut cmd).map(|_| ())
    }
}

fn common_input_args(input: &Path) -> Vec<OsString> {
    vec![
        "-y".into(),
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-i".into(),
        input.into(),
    ]
}

fn audio_target_args(args: &mut Vec<OsString>, target: &AudioTarget) {
    if let Some(codec) = &target.codec {
        args.push("-c:a".into());
        args.push(codec.into());
    }
    args.push("-b:a".into());
    args.push(ffmpeg_bitrate(target.bitrate).into());
    if let Some(rate) = target.sample_rate {
        args.push("-ar".into());
        args.push(rate.to_string().into());
    }
}

/// Arguments for a video stream-copy with an audio re-encode
pub fn remux_args(input: &Path, output: &Path, target: &AudioTarget) -> Vec<OsString> {
    let mut args = common_input_args(input);
    args.push("-c:v".into());
    args.push("copy".into());
    audio_target_args(&mut args, target);
    args.push(output.into());
    args
}

/// Arguments for an audio-only extraction
pub fn extract_audio_args(input: &Path, output: &Path, target: &AudioTarget) -> Vec<OsString> {
    let mut args = common_input_args(input);
    args.push("-vn".into());
    audio_target_args(&mut args, target);
    args.push(output.into());
    args
}

impl Transcoder for FfmpegCli {
    fn copy_video_reencode_audio(
        &self,
        input: &Path,
        output: &Path,
        target: &AudioTarget,
    ) -> PipelineResult<()> {
        self.run(remux_args(input, output, target))
    }

    fn extract_audio(
        &self,
        input: &Path,
        output: &Path,
        target: &AudioTarget,
    ) -> PipelineResult<()> {
        self.run(extract_audio_args(input, output, target))
    }
}
