//! FFmpeg mixdown of the kept stems

use std::fmt;
use std::path::Path;
use crate::config::MixdownConfig;
use super::ToolInvocation;

/// Audio codec chosen from the output file extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputCodec {
    Mp3 { quality: u8 },
    Aac { bitrate: String },
    Pcm,
}

impl OutputCodec {
    /// `.mp3` is LAME VBR, `.m4a`/`.mp4` is AAC, anything else 16-bit PCM
    pub fn for_path(path: &Path, mixdown: &MixdownConfig) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "mp3" => Self::Mp3 { quality: mixdown.mp3_quality },
            "m4a" | "mp4" => Self::Aac { bitrate: mixdown.aac_bitrate.clone() },
            _ => Self::Pcm,
        }
    }

    pub fn args(&self) -> Vec<String> {
        match self {
            Self::Mp3 { quality } => vec!["-c:a".into(), "libmp3lame".into(), "-q:a".into(), quality.to_string()],
            Self::Aac { bitrate } => vec!["-c:a".into(), "aac".into(), "-b:a".into(), bitrate.clone()],
            Self::Pcm => vec!["-c:a".into(), "pcm_s16le".into()],
        }
    }
}

impl fmt::Display for OutputCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mp3 { quality } => write!(f, "MP3 (VBR q{})", quality),
            Self::Aac { bitrate } => write!(f, "AAC ({})", bitrate),
            Self::Pcm => write!(f, "PCM s16le"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FfmpegMixer {
    binary: String,
    dropout_transition_secs: u32,
}

impl FfmpegMixer {
    pub fn new<B: Into<String>>(binary: B, mixdown: &MixdownConfig) -> Self {
        Self {
            binary: binary.into(),
            dropout_transition_secs: mixdown.dropout_transition_secs,
        }
    }

    /// `ffmpeg -version`, used to check the tool is installed
    pub fn probe_invocation(&self) -> ToolInvocation {
        ToolInvocation::new(&self.binary).arg("-version")
    }

    /// Equal-weight `amix` running until the longest input ends
    pub fn filter_expression(&self, inputs: usize) -> String {
        format!(
            "amix=inputs={}:duration=longest:dropout_transition={}",
            inputs, self.dropout_transition_secs
        )
    }

    pub fn mix_invocation(&self, inputs: &[&Path], codec: &OutputCodec, output: &Path) -> ToolInvocation {
        let mut inv = ToolInvocation::new(&self.binary).arg("-y");
        for input in inputs {
            inv = inv.arg("-i").arg(input);
        }
        inv.arg("-filter_complex")
            .arg(self.filter_expression(inputs.len()))
            .args(codec.args())
            .arg(output)
    }
}
