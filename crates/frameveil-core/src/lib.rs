//! # Frameveil Core API
//!
//! Hides one video's visual content inside another by planting the secret
//! video's top pixel bit into the low bit plane of every cover frame, and
//! recovers it later. Frame and audio stream handling is delegated to an
//! external ffmpeg binary; this crate owns the bit-plane codec, the frame
//! pairing and the pipeline sequencing.
//!
//! # Usage Examples
//!
//! ## Hide a video inside another video
//!
//! ```no_run
//! frameveil_core::api::embed::prepare()
//!     .with_cover("cover-video.mkv")
//!     .with_secret("secret-video.mkv")
//!     .with_output("output_video.mkv")
//!     .execute()
//!     .expect("Failed to embed the secret video");
//! ```
//!
//! ## Recover the hidden video
//!
//! ```no_run
//! frameveil_core::api::extract::prepare()
//!     .with_input("output_video.mkv")
//!     .with_output("hidden_video.mkv")
//!     .execute()
//!     .expect("Failed to extract the hidden video");
//! ```
//!
//! The revealed video is a coarse 1-bit-per-channel quantization of the
//! original secret (each channel comes back as 0 or 128); that loss is
//! inherent to the scheme, not a defect. The stego container must be
//! encoded losslessly, anything else destroys the carried bit plane.

#![warn(clippy::redundant_else)]

pub mod api;
pub mod bitplane;
pub mod commands;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod result;

pub use crate::error::FrameveilError;
pub use crate::media::ffmpeg::{FfmpegTool, MediaDemuxer, MediaMuxer, MuxRequest};
pub use crate::pipeline::{MismatchPolicy, Pipeline, PipelineOptions};
pub use crate::result::Result;
