use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::Config;
use crate::fallback::{
    AudioDownloader, DownloadError, SpeechEngine, SpeechError, WhisperCli, Workspace, YtDlp,
};
use crate::identifier;
use crate::primary::{FetchedTranscript, LookupError, TranscriptSource, YoutubeTranscriptClient};

/// Transcript text with where it came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// The transcript text
    pub text: String,

    /// Which path produced the text
    pub origin: TranscriptOrigin,

    /// Run metadata
    pub metadata: TranscriptMetadata,
}

/// Which stage of the pipeline produced a transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum TranscriptOrigin {
    /// Captions from the hosted transcript service
    Primary {
        video_id: String,
        language_code: String,
        is_generated: bool,
    },

    /// Local speech recognition after the hosted service failed
    Fallback {
        model: String,
        primary_failure: String,
    },
}

/// Metadata about the run that produced a transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMetadata {
    /// Number of caption segments joined (primary only)
    pub segment_count: Option<usize>,

    /// Wall time of the whole run in seconds
    pub elapsed_secs: f64,

    /// Timestamp when the transcript was produced
    pub completed_at: DateTime<Utc>,
}

impl TranscriptMetadata {
    fn finish(segment_count: Option<usize>, started: Instant) -> Self {
        Self {
            segment_count,
            elapsed_secs: started.elapsed().as_secs_f64(),
            completed_at: Utc::now(),
        }
    }
}

/// Coarse classification of pipeline failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    PrimaryUnavailable,
    DownloadFailed,
    TranscriptionFailed,
    Workspace,
}

/// Terminal failures of a pipeline run
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("No transcript available: {0}")]
    PrimaryUnavailable(#[source] LookupError),

    #[error("Audio download failed for {reference}: {source}")]
    DownloadFailed {
        reference: String,
        #[source]
        source: DownloadError,
    },

    #[error("Audio file not found after download: {}", .path.display())]
    ArtifactMissing { path: PathBuf },

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(#[source] SpeechError),

    #[error("Workspace error: {0}")]
    Workspace(#[from] std::io::Error),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::PrimaryUnavailable(_) => ErrorKind::PrimaryUnavailable,
            PipelineError::DownloadFailed { .. } | PipelineError::ArtifactMissing { .. } => {
                ErrorKind::DownloadFailed
            }
            PipelineError::TranscriptionFailed(_) => ErrorKind::TranscriptionFailed,
            PipelineError::Workspace(_) => ErrorKind::Workspace,
        }
    }
}

/// Transcript acquisition: hosted captions first, then download + speech recognition
pub struct TranscriptPipeline {
    config: Config,
    source: Box<dyn TranscriptSource>,
    downloader: Box<dyn AudioDownloader>,
    engine: Box<dyn SpeechEngine>,
    show_progress: bool,
}

impl TranscriptPipeline {
    /// Create a pipeline wired to YouTube, yt-dlp and the Whisper CLI
    pub fn new(config: Config) -> Self {
        let source = YoutubeTranscriptClient::new(
            config.primary.base_url.clone(),
            config.primary.languages.clone(),
        );
        let downloader = YtDlp::new(
            config.fallback.downloader.clone(),
            config.fallback.audio_format.clone(),
        );
        let engine = WhisperCli::new(
            config.fallback.whisper_command.clone(),
            config.fallback.language.clone(),
        );

        Self::with_components(config, Box::new(source), Box::new(downloader), Box::new(engine))
    }

    /// Create a pipeline from explicit collaborators
    pub fn with_components(
        config: Config,
        source: Box<dyn TranscriptSource>,
        downloader: Box<dyn AudioDownloader>,
        engine: Box<dyn SpeechEngine>,
    ) -> Self {
        Self {
            config,
            source,
            downloader,
            engine,
            show_progress: true,
        }
    }

    /// Disable progress spinners
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.show_progress = !quiet;
        self
    }

    /// Create a workspace configured for this pipeline
    pub fn acquire_workspace(&self) -> Result<Workspace, PipelineError> {
        Ok(Workspace::acquire(
            self.config.app.work_dir.as_deref(),
            &self.config.fallback.audio_format,
        )?)
    }

    /// Produce a transcript for a video reference in a workspace of its own
    pub async fn transcribe(&self, reference: &str) -> Result<Transcript, PipelineError> {
        let workspace = self.acquire_workspace()?;
        self.transcribe_in(&workspace, reference).await
    }

    /// Produce a transcript for a video reference using the caller's workspace
    pub async fn transcribe_in(
        &self,
        workspace: &Workspace,
        reference: &str,
    ) -> Result<Transcript, PipelineError> {
        let run_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("transcript", run = &run_id[..8]);

        self.run(workspace, reference).instrument(span).await
    }

    async fn run(
        &self,
        workspace: &Workspace,
        reference: &str,
    ) -> Result<Transcript, PipelineError> {
        let started = Instant::now();
        workspace.clear_stale()?;

        let video_id = identifier::extract(reference);
        tracing::info!("Looking up transcript for video id: {}", video_id);

        let primary_failure = match self.source.fetch(video_id).await {
            Ok(fetched) => return Ok(self.primary_transcript(fetched, started)),
            Err(err) => err,
        };

        tracing::warn!(
            "Failed to fetch transcript from {}: {}",
            self.source.source_name(),
            primary_failure
        );

        if !self.config.fallback.enabled {
            return Err(PipelineError::PrimaryUnavailable(primary_failure));
        }

        tracing::info!("Falling back to whisper transcription...");
        self.download(workspace, reference).await?;
        let text = self.run_model(workspace.artifact_path()).await?;

        Ok(Transcript {
            text,
            origin: TranscriptOrigin::Fallback {
                model: self.config.fallback.model.clone(),
                primary_failure: primary_failure.to_string(),
            },
            metadata: TranscriptMetadata::finish(None, started),
        })
    }

    fn primary_transcript(&self, fetched: FetchedTranscript, started: Instant) -> Transcript {
        tracing::info!(
            "Transcript fetched successfully from {}: {} segments ({})",
            self.source.source_name(),
            fetched.segments.len(),
            fetched.language
        );

        Transcript {
            text: fetched.assemble(),
            metadata: TranscriptMetadata::finish(Some(fetched.segments.len()), started),
            origin: TranscriptOrigin::Primary {
                video_id: fetched.video_id,
                language_code: fetched.language_code,
                is_generated: fetched.is_generated,
            },
        }
    }

    /// Run the downloader and check that it left the artifact behind
    async fn download(&self, workspace: &Workspace, reference: &str) -> Result<(), PipelineError> {
        let artifact = workspace.artifact_path();
        let progress = self.spinner("Downloading audio...");

        if let Err(source) = self.downloader.download(reference, artifact).await {
            progress.abandon_with_message("Download failed");
            tracing::error!("Error during audio download: {}", source);
            return Err(PipelineError::DownloadFailed {
                reference: reference.to_string(),
                source,
            });
        }

        if !workspace.artifact_exists() {
            progress.abandon_with_message("Download produced no audio");
            tracing::error!("Audio file not found after download: {}", artifact.display());
            return Err(PipelineError::ArtifactMissing {
                path: artifact.to_path_buf(),
            });
        }

        progress.finish_with_message("Download complete");
        tracing::info!("Audio downloaded successfully: {}", artifact.display());
        Ok(())
    }

    async fn run_model(&self, audio: &Path) -> Result<String, PipelineError> {
        let variant = &self.config.fallback.model;
        let progress = self.spinner(format!("Transcribing with whisper ({})...", variant));

        match self.load_and_transcribe(variant, audio).await {
            Ok(text) => {
                progress.finish_with_message("Transcription completed");
                tracing::info!("Transcription completed using whisper ({} chars)", text.len());
                Ok(text)
            }
            Err(err) => {
                progress.abandon_with_message("Transcription failed");
                tracing::error!("Error during whisper transcription: {}", err);
                Err(PipelineError::TranscriptionFailed(err))
            }
        }
    }

    async fn load_and_transcribe(
        &self,
        variant: &str,
        audio: &Path,
    ) -> Result<String, SpeechError> {
        let model = self.engine.load(variant).await?;
        model.transcribe(audio).await
    }

    fn spinner(&self, message: impl Into<String>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            progress.set_style(style);
        }
        progress.set_message(message.into());
        progress.enable_steady_tick(Duration::from_millis(120));
        progress
    }
}
