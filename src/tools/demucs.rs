//! Demucs stem separation
//!
//! Demucs writes every stem of a track to `<out>/<model>/<track>/<stem>.wav`.
//! Only the stems kept for the guitar-free mix are tracked here.

use std::path::{Path, PathBuf};
use crate::error::{RemoverError, Result};
use super::ToolInvocation;

/// Stems mixed back together, in ffmpeg input order
pub const KEPT_STEMS: [&str; 3] = ["drums", "bass", "vocals"];

#[derive(Debug, Clone)]
pub struct DemucsSeparator {
    binary: String,
    model: String,
}

impl DemucsSeparator {
    pub fn new<B: Into<String>, M: Into<String>>(binary: B, model: M) -> Self {
        Self {
            binary: binary.into(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// `demucs -h`, used to check the tool is installed
    pub fn probe_invocation(&self) -> ToolInvocation {
        ToolInvocation::new(&self.binary).arg("-h")
    }

    pub fn separation_invocation(&self, input: &Path, out_dir: &Path) -> ToolInvocation {
        ToolInvocation::new(&self.binary)
            .args(["-n", self.model.as_str(), "--out"])
            .arg(out_dir)
            .arg(input)
    }

    /// Model directory holding every track separated with this model
    pub fn model_dir(&self, out_dir: &Path) -> PathBuf {
        out_dir.join(&self.model)
    }

    pub fn track_dir(&self, out_dir: &Path, input: &Path) -> Result<PathBuf> {
        let track = input.file_stem().ok_or_else(|| {
            RemoverError::config(format!("Input has no file name: {}", input.display()))
        })?;
        Ok(self.model_dir(out_dir).join(track))
    }
}

/// Drums, bass and vocals produced for one track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StemSet {
    pub dir: PathBuf,
    pub drums: PathBuf,
    pub bass: PathBuf,
    pub vocals: PathBuf,
}

impl StemSet {
    pub fn expected_in(track_dir: &Path) -> Self {
        let stem = |name: &str| track_dir.join(format!("{name}.wav"));
        Self {
            dir: track_dir.to_path_buf(),
            drums: stem("drums"),
            bass: stem("bass"),
            vocals: stem("vocals"),
        }
    }

    pub fn paths(&self) -> [&Path; 3] {
        [&self.drums, &self.bass, &self.vocals]
    }

    pub fn missing(&self) -> Vec<String> {
        KEPT_STEMS
            .iter()
            .zip(self.paths())
            .filter(|(_, path)| !path.is_file())
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Fails with `MissingStems` unless all three files exist
    pub fn verify(self) -> Result<Self> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(RemoverError::MissingStems { dir: self.dir, missing });
        }
        Ok(self)
    }
}
