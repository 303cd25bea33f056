//! vidscribe - transcripts for YouTube videos
//!
//! Looks up the published transcript of a video first. When the hosted service
//! has none, the audio is downloaded with yt-dlp and transcribed locally with
//! Whisper.

pub mod cli;
pub mod config;
pub mod fallback;
pub mod identifier;
pub mod output;
pub mod primary;
pub mod transcribe;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use fallback::{AudioDownloader, SpeechEngine, SpeechModel, Workspace};
pub use primary::{FetchedTranscript, LookupError, TranscriptSegment, TranscriptSource};
pub use transcribe::{
    ErrorKind, PipelineError, Transcript, TranscriptOrigin, TranscriptPipeline,
};

/// Result type for the binary, configuration and output layers
pub type Result<T> = anyhow::Result<T>;
