use std::path::PathBuf;

use clap::Args;
use frameveil_core::PipelineOptions;

use crate::CliResult;

/// Recovers the hidden video from a stego container
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Stego container produced by an earlier embed run
    #[arg(short = 'i', long = "in", value_name = "input video", required = true)]
    pub input: PathBuf,

    /// Revealed video will be stored as this file
    #[arg(
        short = 'o',
        long = "out",
        value_name = "output video file",
        required = true
    )]
    pub output: PathBuf,
}

impl ExtractArgs {
    pub fn run(self, options: PipelineOptions) -> CliResult<()> {
        frameveil_core::commands::extract(&self.input, &self.output, options)
    }
}
