//! Error Types

use std::path::PathBuf;
use thiserror::Error;

/// Main error type
#[derive(Debug, Clone, Error)]
pub enum RemoverError {
    #[error("Input file does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Missing expected stems in {}: {}", .dir.display(), .missing.join(", "))]
    MissingStems { dir: PathBuf, missing: Vec<String> },

    #[error("Command failed:\n{command}\n\nSTDOUT:\n{stdout}\n\nSTDERR:\n{stderr}")]
    ToolFailed { command: String, stdout: String, stderr: String },

    #[error("Failed to launch {program}: {message}")]
    ToolLaunch { program: String, message: String },

    #[error("Config error: {message}")]
    Config { message: String },

    #[error("IO error: {message}")]
    Io { message: String },

    #[error("Web error: {message}")]
    Web { message: String },
}

impl RemoverError {
    pub fn config<S: Into<String>>(msg: S) -> Self { Self::Config { message: msg.into() } }
    pub fn io<S: Into<String>>(msg: S) -> Self { Self::Io { message: msg.into() } }
    pub fn web<S: Into<String>>(msg: S) -> Self { Self::Web { message: msg.into() } }

    pub fn tool_launch<P: Into<String>, S: Into<String>>(program: P, msg: S) -> Self {
        Self::ToolLaunch { program: program.into(), message: msg.into() }
    }
}

pub type Result<T> = std::result::Result<T, RemoverError>;

impl From<std::io::Error> for RemoverError {
    fn from(err: std::io::Error) -> Self { Self::io(err.to_string()) }
}
