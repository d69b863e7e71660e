use std::path::Path;

use crate::pipeline::PipelineOptions;
use crate::result::Result;

/// hides `secret` inside `cover`, writing the stego container to `output`
pub fn embed(cover: &Path, secret: &Path, output: &Path, options: PipelineOptions) -> Result<()> {
    crate::api::embed::prepare()
        .with_options(options)
        .with_cover(cover)
        .with_secret(secret)
        .with_output(output)
        .execute()
}

/// recovers the hidden video from `input`, writing it to `output`
pub fn extract(input: &Path, output: &Path, options: PipelineOptions) -> Result<()> {
    crate::api::extract::prepare()
        .with_options(options)
        .with_input(input)
        .with_output(output)
        .execute()
}
