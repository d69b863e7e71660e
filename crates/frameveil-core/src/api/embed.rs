use std::path::{Path, PathBuf};

use crate::error::FrameveilError;
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::result::Result;

pub fn prepare() -> EmbedApi {
    EmbedApi::default()
}

/// Builder for hiding one video inside another.
///
/// ```no_run
/// frameveil_core::api::embed::prepare()
///     .with_cover("cover-video.mkv")
///     .with_secret("secret-video.mkv")
///     .with_output("output_video.mkv")
///     .execute()
///     .expect("Failed to embed the secret video");
/// ```
#[derive(Default, Debug)]
pub struct EmbedApi {
    cover: Option<PathBuf>,
    secret: Option<PathBuf>,
    output: Option<PathBuf>,
    options: PipelineOptions,
}

impl EmbedApi {
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// the carrier video, used readonly
    pub fn with_cover<A: AsRef<Path>>(mut self, cover: A) -> Self {
        self.cover = Some(cover.as_ref().to_path_buf());
        self
    }

    /// the video that will be hidden
    pub fn with_secret<A: AsRef<Path>>(mut self, secret: A) -> Self {
        self.secret = Some(secret.as_ref().to_path_buf());
        self
    }

    /// where the stego container will be written
    pub fn with_output<A: AsRef<Path>>(mut self, output: A) -> Self {
        self.output = Some(output.as_ref().to_path_buf());
        self
    }

    pub fn execute(self) -> Result<()> {
        let Some(cover) = self.cover else {
            return Err(FrameveilError::CoverNotSet);
        };
        let Some(secret) = self.secret else {
            return Err(FrameveilError::SecretNotSet);
        };
        let Some(output) = self.output else {
            return Err(FrameveilError::TargetNotSet);
        };

        Pipeline::new(self.options).embed(&cover, &secret, &output)
    }
}
