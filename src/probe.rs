//! MP4 track inspection
//!
//! Reads only the container header, which is enough to tell which codec
//! each audio track carries after a remux.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use mp4::TrackType;

/// Track-level view of an MP4 file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mp4Summary {
    pub video_tracks: usize,
    /// One entry per audio track, e.g. `aac`; `unknown` for sample
    /// entries the parser does not recognise
    pub audio_codecs: Vec<String>,
}

impl Mp4Summary {
    /// True when there is at least one audio track and every one is AAC
    pub fn audio_is_aac(&self) -> bool {
        !self.audio_codecs.is_empty() && self.audio_codecs.iter().all(|c| c == "aac")
    }
}

/// Summarize the tracks of the MP4 file at `path`
pub fn summarize(path: &Path) -> mp4::Result<Mp4Summary> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    let reader = mp4::Mp4Reader::read_header(BufReader::new(file), size)?;

    let mut summary = Mp4Summary::default();
    for track in reader.tracks().values() {
        match track.track_type() {
            Ok(TrackType::Video) => summary.video_tracks += 1,
            Ok(TrackType::Audio) => summary.audio_codecs.push(
                track
                    .media_type()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|_| "unknown".to_string()),
            ),
            _ => {}
        }
    }
    summary.audio_codecs.sort();
    Ok(summary)
}
