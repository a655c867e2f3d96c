//! Guitar removal pipeline
//!
//! Separates the input with demucs, checks the drums/bass/vocals stems exist,
//! mixes them with ffmpeg and removes the model's intermediate directory.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use crate::config::{validate_model_name, Config};
use crate::error::{RemoverError, Result};
use crate::tools::{DemucsSeparator, FfmpegMixer, OutputCodec, StemSet, SystemToolRunner, ToolRunner};

/// One input/output/model triple
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub model: String,
}

impl ConversionRequest {
    pub fn new<I: Into<PathBuf>, O: Into<PathBuf>, M: Into<String>>(input: I, output: O, model: M) -> Self {
        Self {
            input_path: input.into(),
            output_path: output.into(),
            model: model.into(),
        }
    }

    /// Directory demucs writes into: the output's parent, or `.`
    pub fn work_dir(&self) -> PathBuf {
        match self.output_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RemovalResult {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub model: String,
    pub codec: OutputCodec,
    pub stems_cleaned: bool,
    pub processing_time: Duration,
}

#[derive(Clone)]
pub struct GuitarRemover {
    config: Config,
    runner: Arc<dyn ToolRunner>,
}

impl std::fmt::Debug for GuitarRemover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuitarRemover").field("config", &self.config).finish_non_exhaustive()
    }
}

impl GuitarRemover {
    pub fn new(config: Config) -> Self {
        Self::with_runner(config, Arc::new(SystemToolRunner))
    }

    pub fn with_runner(config: Config, runner: Arc<dyn ToolRunner>) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Request for `input` → `output` using the configured model
    pub fn request<I: Into<PathBuf>, O: Into<PathBuf>>(&self, input: I, output: O) -> ConversionRequest {
        ConversionRequest::new(input, output, self.config.model())
    }

    pub fn remove_guitar(&self, request: &ConversionRequest) -> Result<RemovalResult> {
        let start_time = Instant::now();
        let input = request.input_path.as_path();
        let output = request.output_path.as_path();

        validate_model_name(&request.model)?;
        if !input.exists() {
            return Err(RemoverError::InputNotFound(input.to_path_buf()));
        }

        let work_dir = request.work_dir();
        std::fs::create_dir_all(&work_dir).map_err(|e| {
            RemoverError::io(format!("Failed to create {}: {}", work_dir.display(), e))
        })?;

        let tools = &self.config.tools;
        let separator = DemucsSeparator::new(&tools.demucs_bin, &request.model);
        let mixer = FfmpegMixer::new(&tools.ffmpeg_bin, &self.config.mixdown);

        if tools.check_tools {
            self.runner.run_checked(&separator.probe_invocation())?;
            self.runner.run_checked(&mixer.probe_invocation())?;
        }

        log::info!("Separating {} with model {}", input.display(), request.model);
        self.runner.run_checked(&separator.separation_invocation(input, &work_dir))?;

        let track_dir = separator.track_dir(&work_dir, input)?;
        let stems = StemSet::expected_in(&track_dir).verify()?;
        log::debug!("Stems found in {}", stems.dir.display());

        let codec = OutputCodec::for_path(output, &self.config.mixdown);
        log::info!("Mixing drums, bass and vocals into {} as {}", output.display(), codec);
        self.runner.run_checked(&mixer.mix_invocation(&stems.paths(), &codec, output))?;

        let stems_cleaned = Self::cleanup(&work_dir, &separator.model_dir(&work_dir));

        Ok(RemovalResult {
            input_path: input.to_path_buf(),
            output_path: output.to_path_buf(),
            model: request.model.clone(),
            codec,
            stems_cleaned,
            processing_time: start_time.elapsed(),
        })
    }

    /// Best-effort removal of a direct child of `work_dir`; failures are only logged
    fn cleanup(work_dir: &Path, model_dir: &Path) -> bool {
        let is_child = model_dir
            .strip_prefix(work_dir)
            .map(|rest| {
                let mut parts = rest.components();
                matches!(parts.next(), Some(Component::Normal(_))) && parts.next().is_none()
            })
            .unwrap_or(false);
        if !is_child {
            log::warn!("Refusing to remove {} outside {}", model_dir.display(), work_dir.display());
            return false;
        }

        match std::fs::remove_dir_all(model_dir) {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                log::warn!("Could not remove {}: {}", model_dir.display(), e);
                false
            }
        }
    }
}

/// Run the pipeline with default configuration and real tools
pub fn remove_guitar<I: Into<PathBuf>, O: Into<PathBuf>>(input: I, output: O, model: &str) -> Result<RemovalResult> {
    let remover = GuitarRemover::new(Config::default());
    remover.remove_guitar(&ConversionRequest::new(input, output, model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::runner::testing::FakeToolRunner;
    use tempfile::TempDir;

    fn setup(runner: FakeToolRunner) -> (TempDir, Arc<FakeToolRunner>, GuitarRemover) {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("song.wav"), b"RIFF").unwrap();
        let runner = Arc::new(runner);
        let remover = GuitarRemover::with_runner(Config::default(), runner.clone());
        (tmp, runner, remover)
    }

    fn mix_args(runner: &FakeToolRunner) -> Vec<String> {
        runner
            .calls()
            .into_iter()
            .find(|c| c.program == "ffmpeg" && c.args.len() > 1)
            .expect("no mixdown invocation")
            .args_lossy()
    }

    #[test]
    fn test_end_to_end_mp3() {
        let (tmp, runner, remover) = setup(FakeToolRunner::new());
        let input = tmp.path().join("song.wav");
        let output = tmp.path().join("out.mp3");

        let result = remover.remove_guitar(&remover.request(&input, &output)).unwrap();

        assert!(output.exists());
        assert!(result.stems_cleaned);
        assert_eq!(result.codec, OutputCodec::Mp3 { quality: 2 });
        assert_eq!(result.model, "htdemucs");
        assert!(!tmp.path().join("htdemucs").exists());

        let calls = runner.calls();
        let programs: Vec<_> = calls.iter().map(|c| c.command_line()).collect();
        assert_eq!(calls.len(), 4, "{:?}", programs);
        assert_eq!(calls[0].args_lossy(), vec!["-h"]);
        assert_eq!(calls[1].args_lossy(), vec!["-version"]);
        assert_eq!(calls[2].program, "demucs");
        assert_eq!(
            calls[2].args_lossy(),
            vec![
                "-n".to_string(),
                "htdemucs".to_string(),
                "--out".to_string(),
                tmp.path().display().to_string(),
                input.display().to_string(),
            ]
        );

        let args = mix_args(&runner);
        let track = tmp.path().join("htdemucs").join("song");
        for stem in ["drums", "bass", "vocals"] {
            let path = track.join(format!("{stem}.wav")).display().to_string();
            assert!(args.contains(&path), "missing {} in {:?}", stem, args);
        }
        assert!(!args.iter().any(|a| a.ends_with("guitar.wav")));
        assert!(args.windows(2).any(|w| w == ["-c:a", "libmp3lame"]));
        assert!(args.windows(2).any(|w| w == ["-q:a", "2"]));
        assert_eq!(args.last().unwrap(), &output.display().to_string());
    }

    #[test]
    fn test_codec_flags_follow_extension() {
        for (name, flag) in [("out.m4a", "aac"), ("out.mp4", "aac"), ("out.wav", "pcm_s16le"), ("out.ogg", "pcm_s16le")] {
            let (tmp, runner, remover) = setup(FakeToolRunner::new());
            let request = remover.request(tmp.path().join("song.wav"), tmp.path().join(name));
            remover.remove_guitar(&request).unwrap();

            let args = mix_args(&runner);
            assert!(args.windows(2).any(|w| w == ["-c:a", flag]), "{}: {:?}", name, args);
            if flag == "aac" {
                assert!(args.windows(2).any(|w| w == ["-b:a", "192k"]));
            }
        }
    }

    #[test]
    fn test_missing_input_runs_nothing() {
        let (tmp, runner, remover) = setup(FakeToolRunner::new());
        let request = remover.request(tmp.path().join("nope.wav"), tmp.path().join("out.mp3"));

        let err = remover.remove_guitar(&request).unwrap_err();
        assert!(matches!(err, RemoverError::InputNotFound(_)));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_missing_stem_skips_mixdown() {
        let (tmp, runner, remover) = setup(FakeToolRunner::with_stems(&["drums", "vocals", "guitar"]));
        let request = remover.request(tmp.path().join("song.wav"), tmp.path().join("out.mp3"));

        match remover.remove_guitar(&request) {
            Err(RemoverError::MissingStems { missing, .. }) => assert_eq!(missing, vec!["bass"]),
            other => panic!("expected MissingStems, got {:?}", other),
        }
        assert!(runner.calls().iter().all(|c| !(c.program == "ffmpeg" && c.args.len() > 1)));
        assert!(!tmp.path().join("out.mp3").exists());
    }

    #[test]
    fn test_separation_failure_surfaces_output() {
        let (tmp, runner, mut remover) = setup(FakeToolRunner::new().failing("demucs"));
        remover.config.tools.check_tools = false;
        let request = remover.request(tmp.path().join("song.wav"), tmp.path().join("out.mp3"));

        match remover.remove_guitar(&request) {
            Err(RemoverError::ToolFailed { command, stderr, .. }) => {
                assert!(command.starts_with("demucs -n htdemucs --out"));
                assert_eq!(stderr, "simulated failure");
            }
            other => panic!("expected ToolFailed, got {:?}", other),
        }
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_tool_check_failure_stops_early() {
        let (tmp, runner, remover) = setup(FakeToolRunner::new().failing("ffmpeg"));
        let request = remover.request(tmp.path().join("song.wav"), tmp.path().join("out.mp3"));

        assert!(matches!(remover.remove_guitar(&request), Err(RemoverError::ToolFailed { .. })));
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].args_lossy(), vec!["-version"]);
    }

    #[test]
    fn test_nested_output_dir_created() {
        let (tmp, _runner, remover) = setup(FakeToolRunner::new());
        let output = tmp.path().join("renders").join("take1").join("out.wav");
        let request = ConversionRequest::new(tmp.path().join("song.wav"), &output, "htdemucs_6s");

        let result = remover.remove_guitar(&request).unwrap();
        assert_eq!(result.codec, OutputCodec::Pcm);
        assert!(output.exists());
        assert!(!output.parent().unwrap().join("htdemucs_6s").exists());
    }

    #[test]
    fn test_unsafe_model_names_rejected_before_running() {
        for model in ["..", "", "a/b", "."] {
            let (tmp, runner, remover) = setup(FakeToolRunner::new());
            let out_dir = tmp.path().join("out");
            std::fs::create_dir_all(&out_dir).unwrap();
            std::fs::write(tmp.path().join("keep.txt"), b"keep").unwrap();
            let request = ConversionRequest::new(tmp.path().join("song.wav"), out_dir.join("o.mp3"), model);

            let err = remover.remove_guitar(&request).unwrap_err();
            assert!(matches!(err, RemoverError::Config { .. }), "{:?}: {:?}", model, err);
            assert!(runner.calls().is_empty(), "{:?} ran tools", model);
            assert!(tmp.path().join("keep.txt").exists());
            assert!(out_dir.exists());
        }
    }

    #[test]
    fn test_cleanup_refuses_paths_outside_work_dir() {
        let tmp = TempDir::new().unwrap();
        let work_dir = tmp.path().join("out");
        std::fs::create_dir_all(work_dir.join("htdemucs").join("song")).unwrap();

        assert!(!GuitarRemover::cleanup(&work_dir, &work_dir));
        assert!(!GuitarRemover::cleanup(&work_dir, &work_dir.join("..")));
        assert!(!GuitarRemover::cleanup(&work_dir, tmp.path()));
        assert!(!GuitarRemover::cleanup(&work_dir, &work_dir.join("htdemucs").join("song")));
        assert!(work_dir.join("htdemucs").join("song").exists());

        assert!(GuitarRemover::cleanup(&work_dir, &work_dir.join("htdemucs")));
        assert!(!work_dir.join("htdemucs").exists());
        assert!(work_dir.exists());
    }

    #[test]
    fn test_cleanup_failure_is_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("htdemucs");
        std::fs::write(&blocker, b"not a directory").unwrap();

        assert!(!GuitarRemover::cleanup(tmp.path(), &blocker));
        assert!(blocker.exists());
    }

    #[test]
    fn test_cleanup_missing_dir_counts_as_cleaned() {
        let tmp = TempDir::new().unwrap();
        assert!(GuitarRemover::cleanup(tmp.path(), &tmp.path().join("htdemucs")));
    }

    #[test]
    fn test_run_succeeds_when_stems_cannot_be_removed() {
        let (tmp, _runner, remover) = setup(FakeToolRunner::new().leaving_model_file());
        let output = tmp.path().join("out.mp3");

        let result = remover.remove_guitar(&remover.request(tmp.path().join("song.wav"), &output)).unwrap();
        assert!(!result.stems_cleaned);
        assert!(output.exists());
    }

    #[test]
    fn test_free_fn_checks_input_first() {
        let tmp = TempDir::new().unwrap();
        let err = remove_guitar(tmp.path().join("absent.wav"), tmp.path().join("out.mp3"), "htdemucs").unwrap_err();
        assert!(matches!(err, RemoverError::InputNotFound(p) if p.ends_with("absent.wav")));
    }

    #[test]
    fn test_free_fn_rejects_parent_model() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("song.wav"), b"RIFF").unwrap();
        let err = remove_guitar(tmp.path().join("song.wav"), tmp.path().join("out").join("o.mp3"), "..").unwrap_err();
        assert!(matches!(err, RemoverError::Config { .. }));
        assert!(tmp.path().join("song.wav").exists());
    }

    #[test]
    fn test_work_dir_defaults_to_current() {
        assert_eq!(ConversionRequest::new("a.wav", "out.mp3", "m").work_dir(), PathBuf::from("."));
        assert_eq!(ConversionRequest::new("a.wav", "x/out.mp3", "m").work_dir(), PathBuf::from("x"));
    }
}
