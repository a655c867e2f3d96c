//! External Tools
//!
//! Command line builders for demucs and ffmpeg, and the runner that executes them.

pub mod runner;
pub mod demucs;
pub mod ffmpeg;

pub use runner::{ToolRunner, SystemToolRunner, ToolInvocation, ToolOutput};
pub use demucs::{DemucsSeparator, StemSet, KEPT_STEMS};
pub use ffmpeg::{FfmpegMixer, OutputCodec};
