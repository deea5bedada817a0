//! Test doubles for the external tools
//!
//! `FakeExtractor` and `FakeTranscoder` stand in for yt-dlp and ffmpeg so the
//! pipeline and the HTTP layer can be exercised without network or codecs.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use crate::error::{PipelineError, PipelineResult};
use crate::tools::{AudioTarget, DownloadOptions, Extracted, MediaExtractor, Transcoder};

/// How the fake extractor behaves
#[derive(Debug, Clone)]
pub enum ExtractorBehavior {
    /// Write a file and report it
    Download,
    /// Fail with this message
    Fail(String),
    /// Report success but write nothing
    NoFile,
}

/// Extractor that expands the output template itself and writes a small file
#[derive(Debug)]
pub struct FakeExtractor {
    title: Option<String>,
    ext: String,
    contents: Vec<u8>,
    behavior: ExtractorBehavior,
    calls: Mutex<Vec<(String, DownloadOptions)>>,
}

impl FakeExtractor {
    pub fn new(title: &str, ext: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ext: ext.to_string(),
            contents: b"raw media".to_vec(),
            behavior: ExtractorBehavior::Download,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            behavior: ExtractorBehavior::Fail(message.to_string()),
            ..Self::new("unused", "webm")
        }
    }

    pub fn without_file(title: &str) -> Self {
        Self {
            behavior: ExtractorBehavior::NoFile,
            ..Self::new(title, "webm")
        }
    }

    pub fn untitled(ext: &str) -> Self {
        Self {
            title: None,
            ..Self::new("unused", ext)
        }
    }

    pub fn calls(&self) -> Vec<(String, DownloadOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

impl MediaExtractor for FakeExtractor {
    fn download(&self, url: &str, options: &DownloadOptions) -> PipelineResult<Extracted> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), options.clone()));

        if let ExtractorBehavior::Fail(message) = &self.behavior {
            return Err(PipelineError::Extraction(message.clone()));
        }

        let title = self.title.clone().unwrap_or_else(|| "NA".to_string());
        let path = PathBuf::from(
            options
                .output_template
                .replace("%(title)s", &title)
                .replace("%(ext)s", &self.ext)
                .replace("%%", "%"),
        );
        if let ExtractorBehavior::Download = self.behavior {
            std::fs::write(&path, &self.contents)?;
        }

        Ok(Extracted {
            title: self.title.clone(),
            path,
        })
    }
}

/// How the fake transcoder behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscoderBehavior {
    /// Copy the input to the output
    Copy,
    /// Exit nonzero
    Fail,
    /// Exit cleanly without writing the output
    NoOutput,
    /// Write the given MP4 fixture instead of copying
    WriteAacMp4,
}

#[derive(Debug)]
pub struct FakeTranscoder {
    behavior: TranscoderBehavior,
    remux_calls: AtomicUsize,
    extract_calls: AtomicUsize,
    targets: Mutex<Vec<AudioTarget>>,
}

impl FakeTranscoder {
    pub fn new(behavior: TranscoderBehavior) -> Self {
        Self {
            behavior,
            remux_calls: AtomicUsize::new(0),
            extract_calls: AtomicUsize::new(0),
            targets: Mutex::new(Vec::new()),
        }
    }

    pub fn remux_calls(&self) -> usize {
        self.remux_calls.load(Ordering::SeqCst)
    }

    pub fn extract_calls(&self) -> usize {
        self.extract_calls.load(Ordering::SeqCst)
    }

    pub fn targets(&self) -> Vec<AudioTarget> {
        self.targets.lock().unwrap().clone()
    }

    fn produce(&self, input: &Path, output: &Path, target: &AudioTarget) -> PipelineResult<()> {
        self.targets.lock().unwrap().push(target.clone());
        match self.behavior {
            TranscoderBehavior::Copy => {
                std::fs::copy(input, output)?;
                Ok(())
            }
            TranscoderBehavior::Fail => {
                // ffmpeg leaves a partial file behind on failure
                std::fs::write(output, b"partial")?;
                Err(PipelineError::ProcessFailed {
                    tool: "ffmpeg".to_string(),
                    status: "exit status: 1".to_string(),
                })
            }
            TranscoderBehavior::NoOutput => Ok(()),
            TranscoderBehavior::WriteAacMp4 => {
                std::fs::write(output, aac_mp4_bytes())?;
                Ok(())
            }
        }
    }
}

impl Transcoder for FakeTranscoder {
    fn copy_video_reencode_audio(
        &self,
        input: &Path,
        output: &Path,
        target: &AudioTarget,
    ) -> PipelineResult<()> {
        self.remux_calls.fetch_add(1, Ordering::SeqCst);
        self.produce(input, output, target)
    }

    fn extract_audio(
        &self,
        input: &Path,
        output: &Path,
        target: &AudioTarget,
    ) -> PipelineResult<()> {
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        self.produce(input, output, target)
    }
}

/// A minimal MP4 with a single AAC audio track
pub fn aac_mp4_bytes() -> Vec<u8> {
    use mp4::{AacConfig, MediaConfig, Mp4Config, Mp4Sample, Mp4Writer, TrackConfig, TrackType};

    let config = Mp4Config {
        major_brand: str::parse("isom").unwrap(),
        minor_version: 512,
        compatible_brands: vec![str::parse("isom").unwrap(), str::parse("mp41").unwrap()],
        timescale: 1000,
    };
    let mut writer = Mp4Writer::write_start(Cursor::new(Vec::<u8>::new()), &config).unwrap();
    writer
        .add_track(&TrackConfig {
            track_type: TrackType::Audio,
            timescale: 48000,
            language: "und".to_string(),
            media_conf: MediaConfig::AacConfig(AacConfig::default()),
        })
        .unwrap();
    for i in 0..4u64 {
        writer
            .write_sample(
                1,
                &Mp4Sample {
                    start_time: i * 1024,
                    duration: 1024,
                    rendering_offset: 0,
                    is_sync: true,
                    bytes: Bytes::from_static(&[0x21, 0x10, 0x04, 0x60, 0x8c, 0x1c]),
                },
            )
            .unwrap();
    }
    writer.write_end().unwrap();
    writer.into_writer().into_inner()
}

/// Run `f` with a plain-text `fmt` subscriber and return what it logged
pub fn capture_logs<F: FnOnce()>(f: F) -> String {
    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let buffer = Buffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);

    let bytes = buffer.0.lock().unwrap().clone();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Copies the `-i` input to the last argument, like a stream-copy would
#[cfg(unix)]
pub const FAKE_FFMPEG_COPY: &str = r#"src=""
prev=""
out=""
for a in "$@"; do
  if [ "$prev" = "-i" ]; then src="$a"; fi
  prev="$a"
  out="$a"
done
cp "$src" "$out"
"#;

/// Expands `-o`, writes a file there and prints the `after_move` JSON line
#[cfg(unix)]
pub const FAKE_YTDLP: &str = r#"tmpl=""
prev=""
for a in "$@"; do
  if [ "$prev" = "-o" ]; then tmpl="$a"; fi
  prev="$a"
done
path=$(printf '%s' "$tmpl" | sed -e 's/%(title)s/Fake Title/' -e 's/%(ext)s/webm/')
printf 'data' > "$path"
printf '{"title": "Fake Title", "filepath": "%s"}\n' "$path"
"#;

/// Write an executable `sh` script named `name` into `dir`
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
