pub mod ffmpeg;
pub mod frame;
