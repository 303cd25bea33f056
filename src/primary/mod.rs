use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod timedtext;
pub mod youtube;

pub use youtube::YoutubeTranscriptClient;

/// One caption line as served by the transcript service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Caption text
    pub text: String,

    /// Start offset in seconds
    pub start: f64,

    /// Display duration in seconds
    pub duration: f64,
}

/// A caption track fetched from the transcript service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedTranscript {
    /// Video the track belongs to
    pub video_id: String,

    /// Human readable language name
    pub language: String,

    /// Language code of the track (e.g. "en")
    pub language_code: String,

    /// Whether the track was generated by speech recognition
    pub is_generated: bool,

    /// Segments in chronological order
    pub segments: Vec<TranscriptSegment>,
}

impl FetchedTranscript {
    /// Join the segment texts into a single transcript
    pub fn assemble(&self) -> String {
        assemble(&self.segments)
    }
}

/// Reasons the transcript service could not deliver a transcript
#[derive(thiserror::Error, Debug)]
pub enum LookupError {
    #[error("Invalid video id: {0} (pass the video id, not the full URL)")]
    InvalidVideoId(String),

    #[error("Video is unavailable: {0}")]
    VideoUnavailable(String),

    #[error("Transcripts are disabled for video: {0}")]
    TranscriptsDisabled(String),

    #[error("No transcript found for video {video_id} in {requested:?} (available: {available:?})")]
    NoTranscriptFound {
        video_id: String,
        requested: Vec<String>,
        available: Vec<String>,
    },

    #[error("Request blocked by YouTube for video: {0}")]
    RequestBlocked(String),

    #[error("Video is age restricted: {0}")]
    AgeRestricted(String),

    #[error("Video {video_id} is unplayable: {reason}")]
    VideoUnplayable { video_id: String, reason: String },

    #[error("Unexpected response from YouTube: {0}")]
    UnexpectedResponse(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Hosted source of ready-made transcripts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript for a video identifier
    async fn fetch(&self, video_id: &str) -> Result<FetchedTranscript, LookupError>;

    /// Get the name of this source
    fn source_name(&self) -> &'static str;
}

/// Newline-join segment texts, keeping their order
pub fn assemble(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|segment| segment.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
