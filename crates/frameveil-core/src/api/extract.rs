use std::path::{Path, PathBuf};

use crate::error::FrameveilError;
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::result::Result;

pub fn prepare() -> ExtractApi {
    ExtractApi::default()
}

/// Builder for recovering the hidden video from a stego container.
///
/// ```no_run
/// frameveil_core::api::extract::prepare()
///     .with_input("output_video.mkv")
///     .with_output("hidden_video.mkv")
///     .execute()
///     .expect("Failed to extract the hidden video");
/// ```
#[derive(Default, Debug)]
pub struct ExtractApi {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    options: PipelineOptions,
}

impl ExtractApi {
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// the stego container produced by an earlier embed run
    pub fn with_input<A: AsRef<Path>>(mut self, input: A) -> Self {
        self.input = Some(input.as_ref().to_path_buf());
        self
    }

    /// where the revealed video will be written
    pub fn with_output<A: AsRef<Path>>(mut self, output: A) -> Self {
        self.output = Some(output.as_ref().to_path_buf());
        self
    }

    pub fn execute(self) -> Result<()> {
        let Some(input) = self.input else {
            return Err(FrameveilError::InputNotSet);
        };
        let Some(output) = self.output else {
            return Err(FrameveilError::TargetNotSet);
        };

        Pipeline::new(self.options).extract(&input, &output)
    }
}
