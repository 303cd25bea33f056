//! Local fallback path: download the audio with an external tool and run a
//! speech recognition model over it.

use async_trait::async_trait;
use std::path::Path;

pub mod whisper;
pub mod workspace;
pub mod ytdlp;

pub use whisper::WhisperCli;
pub use workspace::Workspace;
pub use ytdlp::YtDlp;

/// Failures of the external downloader
#[derive(thiserror::Error, Debug)]
pub enum DownloadError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Exited {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Failures while loading or running the speech model
#[derive(thiserror::Error, Debug)]
pub enum SpeechError {
    #[error("Unknown model variant: {0}")]
    UnknownVariant(String),

    #[error("Failed to load model {variant}: {reason}")]
    Load { variant: String, reason: String },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid model output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Fetches the audio track of a video reference into a local file
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioDownloader: Send + Sync {
    /// Download audio for `reference` to `output`, blocking until the tool exits
    async fn download(&self, reference: &str, output: &Path) -> Result<(), DownloadError>;
}

/// Loads speech recognition models by variant name
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    async fn load(&self, variant: &str) -> Result<Box<dyn SpeechModel>, SpeechError>;
}

/// A loaded speech recognition model
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechModel: Send + Sync {
    /// Transcribe an audio file into free-form text
    async fn transcribe(&self, audio: &Path) -> Result<String, SpeechError>;
}
