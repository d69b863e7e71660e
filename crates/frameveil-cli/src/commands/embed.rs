use std::path::PathBuf;

use clap::Args;
use frameveil_core::PipelineOptions;

use crate::CliResult;

/// Hides a secret video inside a cover video
#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Carrier video, used readonly
    #[arg(short = 'c', long = "cover", value_name = "cover video", required = true)]
    pub cover: PathBuf,

    /// Video that will be hidden
    #[arg(
        short = 's',
        long = "secret",
        value_name = "secret video",
        required = true
    )]
    pub secret: PathBuf,

    /// Stego container will be stored as this file
    #[arg(
        short = 'o',
        long = "out",
        value_name = "output video file",
        required = true
    )]
    pub output: PathBuf,
}

impl EmbedArgs {
    pub fn run(self, options: PipelineOptions) -> CliResult<()> {
        frameveil_core::commands::embed(&self.cover, &self.secret, &self.output, options)
    }
}
