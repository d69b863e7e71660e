use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use frameveil_core::{MismatchPolicy, PipelineOptions};

use crate::commands::*;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Directory for intermediate frame and audio files
    #[arg(long = "work-dir", value_name = "dir", default_value = ".")]
    pub work_dir: PathBuf,

    /// Path to the ffmpeg binary
    #[arg(long = "ffmpeg", value_name = "path", default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,

    /// Frame rate of the assembled stego container
    #[arg(long = "embed-fps", value_name = "rate", default_value_t = 12.5)]
    pub embed_fps: f64,

    /// Frame rate of the assembled revealed container
    #[arg(long = "extract-fps", value_name = "rate", default_value_t = 30.0)]
    pub extract_fps: f64,

    /// What to do when cover and secret frame counts differ
    #[arg(long = "on-mismatch", value_enum, default_value_t = MismatchArg::Truncate)]
    pub on_mismatch: MismatchArg,

    /// Abort any single ffmpeg invocation after this many seconds
    #[arg(long = "tool-timeout", value_name = "seconds")]
    pub tool_timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Embed(embed::EmbedArgs),
    Extract(extract::ExtractArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchArg {
    /// Pair up to the shorter sequence, drop the excess
    Truncate,
    /// Refuse to run on differing frame counts
    Error,
    /// Repeat the secret video until the cover ends
    Loop,
}

impl From<MismatchArg> for MismatchPolicy {
    fn from(arg: MismatchArg) -> Self {
        match arg {
            MismatchArg::Truncate => MismatchPolicy::Truncate,
            MismatchArg::Error => MismatchPolicy::Error,
            MismatchArg::Loop => MismatchPolicy::LoopPad,
        }
    }
}

impl CliArgs {
    pub fn options(&self) -> PipelineOptions {
        PipelineOptions {
            work_dir: self.work_dir.clone(),
            ffmpeg_path: self.ffmpeg.clone(),
            embed_frame_rate: self.embed_fps,
            extract_frame_rate: self.extract_fps,
            mismatch_policy: self.on_mismatch.into(),
            tool_timeout: self.tool_timeout.map(Duration::from_secs),
            ..PipelineOptions::default()
        }
    }
}
