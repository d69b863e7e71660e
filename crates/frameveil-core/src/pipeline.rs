//! End-to-end embed and extract workflows.
//!
//! Both workflows are linear: demux, transform frame by frame, remux. Every
//! stage failure aborts the whole run; there is no retry and no partial
//! result. Frame correspondence is purely ordinal over the zero-padded
//! frame names, never derived from timestamps, which is why the embed and
//! extract frame rates are free to differ.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use crate::error::FrameveilError;
use crate::media::ffmpeg::{
    FfmpegTool, MediaDemuxer, MediaMuxer, MuxRequest, AUDIO_FILE, FRAME_PATTERN,
};
use crate::media::frame;
use crate::result::Result;

const COVER_FRAMES_DIR: &str = "cover_frames";
const SECRET_FRAMES_DIR: &str = "secret_frames";
const EMBEDDED_FRAMES_DIR: &str = "embedded_frames";
const AUDIO_DIR: &str = "audio";
const OUTPUT_FRAMES_DIR: &str = "output_frames";
const HIDDEN_FRAMES_DIR: &str = "hidden_frames";

/// what to do when cover and secret frame counts differ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MismatchPolicy {
    /// pair up to the shorter sequence and log a warning; excess frames of
    /// the longer sequence are dropped
    #[default]
    Truncate,
    /// refuse to run, surfacing [`FrameveilError::SequenceLengthMismatch`]
    Error,
    /// repeat the secret sequence cyclically until every cover frame has a
    /// partner; a longer secret is still cut to the cover length
    LoopPad,
}

/// explicit configuration for one pipeline run, replacing the fixed working
/// directories and inline frame rates of a naive implementation
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// parent of all intermediate frame and audio directories
    pub work_dir: PathBuf,
    /// rate the stego container is assembled at
    pub embed_frame_rate: f64,
    /// rate the revealed container is assembled at
    pub extract_frame_rate: f64,
    /// must be lossless, the low bit plane does not survive anything else
    pub video_codec: String,
    pub pixel_format: String,
    pub mismatch_policy: MismatchPolicy,
    pub ffmpeg_path: PathBuf,
    /// wall-clock limit per external tool invocation
    pub tool_timeout: Option<Duration>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            embed_frame_rate: 12.5,
            extract_frame_rate: 30.0,
            video_codec: "ffv1".to_string(),
            pixel_format: "bgr0".to_string(),
            mismatch_policy: MismatchPolicy::default(),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            tool_timeout: None,
        }
    }
}

/// drives one embed or extract run over a demuxer/muxer pair
pub struct Pipeline {
    options: PipelineOptions,
    demuxer: Box<dyn MediaDemuxer>,
    muxer: Box<dyn MediaMuxer>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        let demuxer = FfmpegTool::new(&options.ffmpeg_path).with_timeout(options.tool_timeout);
        let muxer = FfmpegTool::new(&options.ffmpeg_path).with_timeout(options.tool_timeout);

        Self::with_tools(options, Box::new(demuxer), Box::new(muxer))
    }

    /// substitute demuxer and muxer, the seam used by tests
    pub fn with_tools(
        options: PipelineOptions,
        demuxer: Box<dyn MediaDemuxer>,
        muxer: Box<dyn MediaMuxer>,
    ) -> Self {
        Self {
            options,
            demuxer,
            muxer,
            cancel: None,
        }
    }

    /// cooperative cancellation, checked between stages and between frames
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// hides `secret` inside `cover` and writes the stego container to `output`
    pub fn embed(&self, cover: &Path, secret: &Path, output: &Path) -> Result<()> {
        ensure_input(cover)?;
        ensure_input(secret)?;

        self.checkpoint()?;
        info!("extracting cover frames from {}", cover.display());
        let cover_dir = self.fresh_dir(COVER_FRAMES_DIR)?;
        self.demuxer.extract_frames(cover, &cover_dir)?;

        self.checkpoint()?;
        info!("extracting secret frames from {}", secret.display());
        let secret_dir = self.fresh_dir(SECRET_FRAMES_DIR)?;
        self.demuxer.extract_frames(secret, &secret_dir)?;

        self.checkpoint()?;
        info!("extracting cover audio");
        let audio_dir = self.fresh_dir(AUDIO_DIR)?;
        self.demuxer.extract_audio(cover, &audio_dir)?;

        self.checkpoint()?;
        let cover_frames = list_frames(&cover_dir)?;
        let secret_frames = list_frames(&secret_dir)?;
        let pairs = pair_frames(
            &cover_frames,
            &secret_frames,
            self.options.mismatch_policy,
        )?;

        info!("embedding {} frame pairs", pairs.len());
        let embedded_dir = self.fresh_dir(EMBEDDED_FRAMES_DIR)?;
        for (i, (cover_frame, secret_frame)) in pairs.iter().enumerate() {
            self.checkpoint()?;
            frame::embed_frame_file(cover_frame, secret_frame, &embedded_dir.join(frame_name(i)))?;
        }

        self.checkpoint()?;
        info!("assembling stego container {}", output.display());
        self.muxer.combine(&MuxRequest {
            frames_pattern: &embedded_dir.join(FRAME_PATTERN),
            frame_rate: self.options.embed_frame_rate,
            audio: Some(&audio_dir.join(AUDIO_FILE)),
            video_codec: &self.options.video_codec,
            pixel_format: &self.options.pixel_format,
            output,
        })
    }

    /// recovers the hidden video carried by `input` and writes it to `output`
    pub fn extract(&self, input: &Path, output: &Path) -> Result<()> {
        ensure_input(input)?;

        self.checkpoint()?;
        info!("extracting stego frames from {}", input.display());
        let frames_dir = self.fresh_dir(OUTPUT_FRAMES_DIR)?;
        self.demuxer.extract_frames(input, &frames_dir)?;

        self.checkpoint()?;
        let stego_frames = list_frames(&frames_dir)?;
        info!("revealing {} frames", stego_frames.len());
        let hidden_dir = self.fresh_dir(HIDDEN_FRAMES_DIR)?;
        for (i, stego_frame) in stego_frames.iter().enumerate() {
            self.checkpoint()?;
            frame::reveal_frame_file(stego_frame, &hidden_dir.join(frame_name(i)))?;
        }

        self.checkpoint()?;
        info!("assembling hidden container {}", output.display());
        self.muxer.combine(&MuxRequest {
            frames_pattern: &hidden_dir.join(FRAME_PATTERN),
            frame_rate: self.options.extract_frame_rate,
            audio: None,
            video_codec: &self.options.video_codec,
            pixel_format: &self.options.pixel_format,
            output,
        })
    }

    fn checkpoint(&self) -> Result<()> {
        if let Some(flag) = &self.cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(FrameveilError::Cancelled);
            }
        }
        Ok(())
    }

    /// an empty, freshly created intermediate directory under the work dir;
    /// leftovers of a previous run are removed so a shorter video cannot
    /// inherit stale trailing frames
    fn fresh_dir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.options.work_dir.join(name);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

fn ensure_input(video: &Path) -> Result<()> {
    if video.is_file() {
        Ok(())
    } else {
        Err(FrameveilError::InputNotFound(video.to_owned()))
    }
}

/// output frames are numbered from zero, while demuxed frames start at one;
/// pairing is positional over sorted listings so the offset never matters
fn frame_name(index: usize) -> String {
    format!("frame_{index:04}.png")
}

/// all PNG frames of a directory, lexically sorted, which given the
/// fixed-width zero padding equals numeric frame order
fn list_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut frames = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("png"))
            .unwrap_or(false)
        {
            frames.push(path);
        }
    }
    frames.sort();
    Ok(frames)
}

/// positional cover/secret pairing under the configured mismatch policy
fn pair_frames<'a>(
    cover: &'a [PathBuf],
    secret: &'a [PathBuf],
    policy: MismatchPolicy,
) -> Result<Vec<(&'a Path, &'a Path)>> {
    if cover.len() != secret.len() {
        match policy {
            MismatchPolicy::Error => {
                return Err(FrameveilError::SequenceLengthMismatch {
                    cover: cover.len(),
                    secret: secret.len(),
                });
            }
            MismatchPolicy::Truncate => {
                warn!(
                    "frame counts differ (cover {}, secret {}), truncating to the shorter sequence",
                    cover.len(),
                    secret.len()
                );
            }
            MismatchPolicy::LoopPad => {
                if secret.is_empty() && !cover.is_empty() {
                    return Err(FrameveilError::SequenceLengthMismatch {
                        cover: cover.len(),
                        secret: 0,
                    });
                }
            }
        }
    }

    let pairs = match policy {
        MismatchPolicy::LoopPad if !secret.is_empty() => cover
            .iter()
            .zip(secret.iter().cycle())
            .map(|(c, s)| (c.as_path(), s.as_path()))
            .collect(),
        _ => cover
            .iter()
            .zip(secret.iter())
            .map(|(c, s)| (c.as_path(), s.as_path()))
            .collect(),
    };

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, RgbImage};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn solid(color: [u8; 3]) -> RgbImage {
        ImageBuffer::from_pixel(4, 4, Rgb(color))
    }

    /// serves pre-seeded frames per video path, numbered 1-based like the
    /// real demuxer does
    #[derive(Default)]
    struct FakeDemuxer {
        videos: HashMap<PathBuf, Vec<RgbImage>>,
    }

    impl FakeDemuxer {
        fn new<P: AsRef<Path>>(videos: Vec<(P, Vec<RgbImage>)>) -> Self {
            Self {
                videos: videos
                    .into_iter()
                    .map(|(p, f)| (p.as_ref().to_owned(), f))
                    .collect(),
            }
        }
    }

    impl MediaDemuxer for FakeDemuxer {
        fn extract_frames(&self, video: &Path, out_dir: &Path) -> Result<()> {
            let frames = self.videos.get(video).ok_or_else(|| {
                FrameveilError::ExternalToolFailure {
                    tool: "fake-demuxer".into(),
                    detail: format!("unknown video {}", video.display()),
                }
            })?;
            for (i, frame) in frames.iter().enumerate() {
                frame
                    .save(out_dir.join(format!("frame_{:04}.png", i + 1)))
                    .expect("fake demuxer failed to write a frame");
            }
            Ok(())
        }

        fn extract_audio(&self, _video: &Path, out_dir: &Path) -> Result<()> {
            fs::write(out_dir.join(AUDIO_FILE), b"not really mp3")?;
            Ok(())
        }
    }

    #[derive(Debug, Clone)]
    struct RecordedMux {
        frames_pattern: PathBuf,
        frame_rate: f64,
        audio: Option<PathBuf>,
        output: PathBuf,
    }

    /// records combine calls and touches the output file
    #[derive(Default)]
    struct FakeMuxer {
        calls: Arc<Mutex<Vec<RecordedMux>>>,
    }

    impl MediaMuxer for FakeMuxer {
        fn combine(&self, request: &MuxRequest<'_>) -> Result<()> {
            self.calls.lock().unwrap().push(RecordedMux {
                frames_pattern: request.frames_pattern.to_owned(),
                frame_rate: request.frame_rate,
                audio: request.audio.map(|p| p.to_owned()),
                output: request.output.to_owned(),
            });
            fs::write(request.output, b"container")?;
            Ok(())
        }
    }

    fn test_pipeline(
        work_dir: &Path,
        demuxer: FakeDemuxer,
        policy: MismatchPolicy,
    ) -> (Pipeline, Arc<Mutex<Vec<RecordedMux>>>) {
        let muxer = FakeMuxer::default();
        let calls = muxer.calls.clone();
        let options = PipelineOptions {
            work_dir: work_dir.to_owned(),
            mismatch_policy: policy,
            ..PipelineOptions::default()
        };
        (
            Pipeline::with_tools(options, Box::new(demuxer), Box::new(muxer)),
            calls,
        )
    }

    fn touch_video(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"video bytes").unwrap();
        path
    }

    #[test]
    fn embed_produces_min_of_both_sequence_lengths() -> Result<()> {
        let work = TempDir::new()?;
        let cover = touch_video(work.path(), "cover.mkv");
        let secret = touch_video(work.path(), "secret.mkv");
        let output = work.path().join("output.mkv");

        let demuxer = FakeDemuxer::new(vec![
            (&cover, vec![solid([10, 10, 10]); 5]),
            (&secret, vec![solid([250, 0, 0]); 3]),
        ]);
        let (pipeline, calls) = test_pipeline(work.path(), demuxer, MismatchPolicy::Truncate);
        pipeline.embed(&cover, &secret, &output)?;

        let embedded = list_frames(&work.path().join(EMBEDDED_FRAMES_DIR))?;
        assert_eq!(embedded.len(), 3);
        assert_eq!(
            embedded[0].file_name().unwrap().to_str().unwrap(),
            "frame_0000.png"
        );

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].frame_rate, 12.5);
        assert!(calls[0].audio.as_ref().unwrap().ends_with(AUDIO_FILE));
        assert!(calls[0]
            .frames_pattern
            .to_str()
            .unwrap()
            .ends_with("embedded_frames/frame_%04d.png"));
        assert_eq!(calls[0].output, output);
        Ok(())
    }

    #[test]
    fn embed_then_extract_reveals_quantized_colors_in_order() -> Result<()> {
        let work = TempDir::new()?;
        let cover = touch_video(work.path(), "cover.mkv");
        let secret = touch_video(work.path(), "secret.mkv");
        let output = work.path().join("output.mkv");

        let secret_colors = [[255, 0, 0], [0, 255, 0], [0, 0, 255]];
        let demuxer = FakeDemuxer::new(vec![
            (&cover, vec![solid([100, 101, 102]); 3]),
            (&secret, secret_colors.iter().map(|c| solid(*c)).collect()),
        ]);
        let (pipeline, _) = test_pipeline(work.path(), demuxer, MismatchPolicy::Truncate);
        pipeline.embed(&cover, &secret, &output)?;

        // feed the stego frames back in as if the container had been demuxed
        let stego_frames: Vec<RgbImage> = list_frames(&work.path().join(EMBEDDED_FRAMES_DIR))?
            .iter()
            .map(|p| image::open(p).unwrap().to_rgb8())
            .collect();
        let hidden = work.path().join("hidden.mkv");
        let demuxer = FakeDemuxer::new(vec![(&output, stego_frames)]);
        let (pipeline, calls) = test_pipeline(work.path(), demuxer, MismatchPolicy::Truncate);
        pipeline.extract(&output, &hidden)?;

        let revealed = list_frames(&work.path().join(HIDDEN_FRAMES_DIR))?;
        assert_eq!(revealed.len(), 3);
        let expected = [[128, 0, 0], [0, 128, 0], [0, 0, 128]];
        for (path, expected) in revealed.iter().zip(expected) {
            let img = image::open(path).unwrap().to_rgb8();
            for pixel in img.pixels() {
                assert_eq!(pixel.0, expected, "wrong color in {}", path.display());
            }
        }

        let calls = calls.lock().unwrap();
        assert_eq!(calls[0].frame_rate, 30.0);
        assert!(calls[0].audio.is_none());
        Ok(())
    }

    #[test]
    fn missing_cover_aborts_before_any_tool_runs() {
        let work = TempDir::new().unwrap();
        let secret = touch_video(work.path(), "secret.mkv");
        let demuxer = FakeDemuxer::default();
        let (pipeline, calls) = test_pipeline(work.path(), demuxer, MismatchPolicy::Truncate);

        let result = pipeline.embed(
            &work.path().join("nope.mkv"),
            &secret,
            &work.path().join("out.mkv"),
        );
        assert!(matches!(result, Err(FrameveilError::InputNotFound(_))));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn error_policy_surfaces_the_length_mismatch() {
        let work = TempDir::new().unwrap();
        let cover = touch_video(work.path(), "cover.mkv");
        let secret = touch_video(work.path(), "secret.mkv");

        let demuxer = FakeDemuxer::new(vec![
            (&cover, vec![solid([1, 2, 3]); 4]),
            (&secret, vec![solid([9, 9, 9]); 2]),
        ]);
        let (pipeline, _) = test_pipeline(work.path(), demuxer, MismatchPolicy::Error);

        let result = pipeline.embed(&cover, &secret, &work.path().join("out.mkv"));
        assert!(matches!(
            result,
            Err(FrameveilError::SequenceLengthMismatch {
                cover: 4,
                secret: 2
            })
        ));
    }

    #[test]
    fn loop_pad_repeats_the_secret_over_every_cover_frame() -> Result<()> {
        let work = TempDir::new()?;
        let cover = touch_video(work.path(), "cover.mkv");
        let secret = touch_video(work.path(), "secret.mkv");

        // cover channels are even, so the carried bit is directly readable
        let demuxer = FakeDemuxer::new(vec![
            (&cover, vec![solid([100, 100, 100]); 5]),
            (&secret, vec![solid([255, 255, 255]), solid([0, 0, 0])]),
        ]);
        let (pipeline, _) = test_pipeline(work.path(), demuxer, MismatchPolicy::LoopPad);
        pipeline.embed(&cover, &secret, &work.path().join("out.mkv"))?;

        let embedded = list_frames(&work.path().join(EMBEDDED_FRAMES_DIR))?;
        assert_eq!(embedded.len(), 5);
        for (i, path) in embedded.iter().enumerate() {
            let img = image::open(path).unwrap().to_rgb8();
            let expected = if i % 2 == 0 { 101 } else { 100 };
            assert_eq!(img.get_pixel(0, 0).0, [expected; 3]);
        }
        Ok(())
    }

    #[test]
    fn a_set_cancel_flag_stops_the_run() {
        let work = TempDir::new().unwrap();
        let cover = touch_video(work.path(), "cover.mkv");
        let secret = touch_video(work.path(), "secret.mkv");

        let demuxer = FakeDemuxer::new(vec![
            (&cover, vec![solid([1, 1, 1])]),
            (&secret, vec![solid([2, 2, 2])]),
        ]);
        let (pipeline, _) = test_pipeline(work.path(), demuxer, MismatchPolicy::Truncate);
        let flag = Arc::new(AtomicBool::new(true));
        let pipeline = pipeline.with_cancel_flag(flag);

        let result = pipeline.embed(&cover, &secret, &work.path().join("out.mkv"));
        assert!(matches!(result, Err(FrameveilError::Cancelled)));
    }

    #[test]
    fn frames_are_listed_in_numeric_order_regardless_of_creation_order() -> Result<()> {
        let dir = TempDir::new()?;
        for name in ["frame_0010.png", "frame_0002.png", "frame_0001.png"] {
            solid([0, 0, 0]).save(dir.path().join(name)).unwrap();
        }
        // non-frame files are ignored
        fs::write(dir.path().join("audio_0.mp3"), b"x")?;

        let names: Vec<String> = list_frames(dir.path())?
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["frame_0001.png", "frame_0002.png", "frame_0010.png"]);
        Ok(())
    }

    #[test]
    fn loop_pad_with_an_empty_secret_is_a_mismatch() {
        let cover = vec![PathBuf::from("frame_0001.png")];
        let secret = Vec::new();

        let result = pair_frames(&cover, &secret, MismatchPolicy::LoopPad);
        assert!(matches!(
            result,
            Err(FrameveilError::SequenceLengthMismatch { .. })
        ));
    }
}
