//! Configuration management for guitar removal

use crate::error::{RemoverError, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL: &str = "htdemucs";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tools: ToolsConfig,
    pub separation: SeparationConfig,
    pub mixdown: MixdownConfig,
    pub web: WebConfig,
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub demucs_bin: String,
    pub ffmpeg_bin: String,
    pub check_tools: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparationConfig {
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MixdownConfig {
    pub dropout_transition_secs: u32,
    pub mp3_quality: u8,
    pub aac_bitrate: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
    pub output_suffix: String,
    pub output_extension: String,
    pub max_upload_mb: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub verbose: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            demucs_bin: "demucs".to_string(),
            ffmpeg_bin: "ffmpeg".to_string(),
            check_tools: true,
        }
    }
}

impl Default for SeparationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Default for MixdownConfig {
    fn default() -> Self {
        Self {
            dropout_transition_secs: 2,
            mp3_quality: 2,
            aac_bitrate: "192k".to_string(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            upload_dir: PathBuf::from("uploads"),
            output_dir: PathBuf::from("outputs"),
            output_suffix: "_no_guitar".to_string(),
            output_extension: "mp3".to_string(),
            max_upload_mb: 512,
        }
    }
}

impl Config {
    pub fn model(&self) -> &str {
        &self.separation.model
    }

    pub fn verbose(&self) -> bool {
        self.processing.verbose
    }

    /// Upload body limit in bytes, saturating for unvalidated configs
    pub fn max_upload_bytes(&self) -> usize {
        self.web.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

/// The model name becomes a single directory component under the work dir
pub fn validate_model_name(model: &str) -> Result<()> {
    if model.trim().is_empty() {
        return Err(RemoverError::config("Model name must not be empty"));
    }
    if model.contains(['/', '\\']) || model == "." || model == ".." {
        return Err(RemoverError::config(format!("Invalid model name: {}", model)));
    }
    Ok(())
}

#[derive(Debug, Clone, Parser)]
#[command(name = "remove-guitar", about = "Remove (approx) guitar by mixing non-guitar stems", version)]
pub struct Args {
    #[arg(help = "Path to input audio file")]
    pub input: PathBuf,

    #[arg(help = "Path to output audio file (.mp3, .m4a/.mp4, anything else is written as PCM)")]
    pub output: PathBuf,

    #[arg(short = 'm', long = "model", help = "Demucs model name (default: htdemucs)")]
    pub model: Option<String>,

    #[arg(short = 'c', long = "config", help = "Config file path (TOML format)")]
    pub config_file: Option<PathBuf>,

    #[arg(long = "demucs", help = "Demucs executable")]
    pub demucs_bin: Option<String>,

    #[arg(long = "ffmpeg", help = "FFmpeg executable")]
    pub ffmpeg_bin: Option<String>,

    #[arg(long = "skip-tool-check", help = "Do not probe demucs/ffmpeg before running")]
    pub skip_tool_check: bool,

    #[arg(short = 'v', long = "verbose", help = "Enable verbose output mode")]
    pub verbose: bool,
}

impl Config {
    /// Create config from command line arguments and config file
    pub fn from_args_and_config(args: &Args) -> Result<Self> {
        let mut config = match &args.config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        // Command line arguments override config file settings
        if let Some(model) = &args.model {
            config.separation.model = model.clone();
        }
        if let Some(bin) = &args.demucs_bin {
            config.tools.demucs_bin = bin.clone();
        }
        if let Some(bin) = &args.ffmpeg_bin {
            config.tools.ffmpeg_bin = bin.clone();
        }
        if args.skip_tool_check {
            config.tools.check_tools = false;
        }
        config.processing.verbose |= args.verbose;

        config.validate()?;
        Ok(config)
    }

    /// Load config from TOML config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RemoverError::config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| RemoverError::config(format!("Failed to parse config file: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.tools.demucs_bin.trim().is_empty() {
            return Err(RemoverError::config("Demucs executable must not be empty"));
        }
        if self.tools.ffmpeg_bin.trim().is_empty() {
            return Err(RemoverError::config("FFmpeg executable must not be empty"));
        }

        validate_model_name(&self.separation.model)?;

        if self.mixdown.mp3_quality > 9 {
            return Err(RemoverError::config("MP3 quality must be in range 0..=9"));
        }
        if self.mixdown.aac_bitrate.trim().is_empty() {
            return Err(RemoverError::config("AAC bitrate must not be empty"));
        }

        if self.web.port == 0 {
            return Err(RemoverError::config("Port must be greater than 0"));
        }
        if self.web.max_upload_mb == 0 {
            return Err(RemoverError::config("Upload limit must be greater than 0"));
        }
        if self.web.max_upload_mb.checked_mul(1024 * 1024).is_none() {
            return Err(RemoverError::config(format!("Upload limit too large: {} MB", self.web.max_upload_mb)));
        }
        let ext = self.web.output_extension.as_str();
        if ext.is_empty() || ext.starts_with('.') {
            return Err(RemoverError::config("Output extension must be non-empty and given without a leading dot"));
        }

        Ok(())
    }

    /// Save config to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| RemoverError::config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| RemoverError::config(format!("Failed to write config file: {}", e)))
    }

    pub fn create_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        Self::default().save_to_file(path)
    }
}
