//! Subprocess seam around the external media toolchain.
//!
//! The pipeline never talks to ffmpeg directly; it goes through the
//! [`MediaDemuxer`] and [`MediaMuxer`] traits so tests can substitute an
//! in-memory fake. [`FfmpegTool`] is the production implementation, one
//! blocking subprocess per operation.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use log::debug;

use crate::error::FrameveilError;
use crate::result::Result;

/// zero-padded frame naming shared by every intermediate directory;
/// lexical order over these names equals numeric order
pub const FRAME_PATTERN: &str = "frame_%04d.png";

/// name of the single extracted audio artifact
pub const AUDIO_FILE: &str = "audio_0.mp3";

const AUDIO_CODEC: &str = "libmp3lame";
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// splits a video container into elementary streams on disk
pub trait MediaDemuxer {
    /// writes one lossless still image per frame into `out_dir`,
    /// named `frame_0001.png` onwards
    fn extract_frames(&self, video: &Path, out_dir: &Path) -> Result<()>;

    /// writes the compressed audio track as `audio_0.mp3` into `out_dir`
    fn extract_audio(&self, video: &Path, out_dir: &Path) -> Result<()>;
}

/// everything one container-assembly call needs
pub struct MuxRequest<'a> {
    /// printf-style frame pattern, e.g. `embedded_frames/frame_%04d.png`
    pub frames_pattern: &'a Path,
    pub frame_rate: f64,
    /// `Some` copies the audio stream verbatim and clamps the container
    /// duration to the shorter stream; `None` produces a video-only container
    pub audio: Option<&'a Path>,
    pub video_codec: &'a str,
    pub pixel_format: &'a str,
    pub output: &'a Path,
}

/// assembles elementary streams back into a video container
pub trait MediaMuxer {
    fn combine(&self, request: &MuxRequest<'_>) -> Result<()>;
}

/// ffmpeg invoked as a blocking subprocess
pub struct FfmpegTool {
    binary: PathBuf,
    timeout: Option<Duration>,
}

impl Default for FfmpegTool {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegTool {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: None,
        }
    }

    /// a wall-clock deadline per invocation; expiry kills the child process
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_extract_frames(&self, video: &Path, out_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-y")
            .arg("-i")
            .arg(video)
            .arg("-pix_fmt")
            .arg("rgb24")
            .arg(out_dir.join(FRAME_PATTERN));
        cmd
    }

    fn build_extract_audio(&self, video: &Path, out_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-y")
            .arg("-i")
            .arg(video)
            .arg("-acodec")
            .arg(AUDIO_CODEC)
            .arg(out_dir.join(AUDIO_FILE));
        cmd
    }

    fn build_combine(&self, request: &MuxRequest<'_>) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-y")
            .arg("-framerate")
            .arg(request.frame_rate.to_string())
            .arg("-i")
            .arg(request.frames_pattern);

        if let Some(audio) = request.audio {
            cmd.arg("-i").arg(audio);
        }

        cmd.arg("-vcodec")
            .arg(request.video_codec)
            .arg("-pix_fmt")
            .arg(request.pixel_format);

        if request.audio.is_some() {
            cmd.arg("-acodec").arg("copy").arg("-shortest");
        }

        cmd.arg(request.output);
        cmd
    }

    fn tool_name(&self) -> String {
        self.binary.display().to_string()
    }

    fn run(&self, mut cmd: Command) -> Result<()> {
        debug!("running {} {:?}", self.tool_name(), cmd.get_args());
        cmd.stdin(Stdio::null()).stdout(Stdio::null());

        match self.timeout {
            None => {
                let output = cmd.output().map_err(|e| FrameveilError::ExternalToolFailure {
                    tool: self.tool_name(),
                    detail: e.to_string(),
                })?;

                if output.status.success() {
                    Ok(())
                } else {
                    Err(FrameveilError::ExternalToolFailure {
                        tool: self.tool_name(),
                        detail: failure_detail(output.status.code(), &output.stderr),
                    })
                }
            }
            Some(limit) => self.run_with_deadline(cmd, limit),
        }
    }

    fn run_with_deadline(&self, mut cmd: Command, limit: Duration) -> Result<()> {
        cmd.stderr(Stdio::piped());
        let mut child = cmd.spawn().map_err(|e| FrameveilError::ExternalToolFailure {
            tool: self.tool_name(),
            detail: e.to_string(),
        })?;

        // drain stderr on a side thread so a chatty child cannot block on
        // a full pipe while we poll for exit
        let stderr = child.stderr.take();
        let drain = std::thread::spawn(move || {
            let mut buf = Vec::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_end(&mut buf);
            }
            buf
        });

        let deadline = Instant::now() + limit;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(FrameveilError::ExternalToolTimeout {
                    tool: self.tool_name(),
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        };

        let stderr = drain.join().unwrap_or_default();
        if status.success() {
            Ok(())
        } else {
            Err(FrameveilError::ExternalToolFailure {
                tool: self.tool_name(),
                detail: failure_detail(status.code(), &stderr),
            })
        }
    }
}

/// exit code plus the tail of stderr, which is where ffmpeg puts the reason
fn failure_detail(code: Option<i32>, stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let tail: Vec<&str> = text.lines().rev().take(4).collect();
    let tail: Vec<&str> = tail.into_iter().rev().collect();

    match code {
        Some(code) => format!("exit code {}: {}", code, tail.join(" | ")),
        None => format!("killed by signal: {}", tail.join(" | ")),
    }
}

impl MediaDemuxer for FfmpegTool {
    fn extract_frames(&self, video: &Path, out_dir: &Path) -> Result<()> {
        self.run(self.build_extract_frames(video, out_dir))
    }

    fn extract_audio(&self, video: &Path, out_dir: &Path) -> Result<()> {
        self.run(self.build_extract_audio(video, out_dir))
    }
}

impl MediaMuxer for FfmpegTool {
    fn combine(&self, request: &MuxRequest<'_>) -> Result<()> {
        self.run(self.build_combine(request))
    }
}
