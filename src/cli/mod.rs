use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "vidscribe",
    about = "vidscribe - Get a transcript for any YouTube video",
    version,
    long_about = "Fetches the published transcript of a video from YouTube. When none is available, downloads the audio with yt-dlp and transcribes it locally with Whisper."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Produce a transcript for a video URL or id
    Transcribe {
        /// Video URL (e.g. https://www.youtube.com/watch?v=...) or video id
        #[arg(value_name = "REFERENCE")]
        reference: String,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format (defaults to the configured format)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Keep the downloaded audio when the local fallback runs
        #[arg(long)]
        save_audio: bool,

        /// Whisper model variant for the fallback
        #[arg(short, long, value_name = "MODEL", env = "VIDSCRIBE_MODEL")]
        model: Option<String>,

        /// Spoken language hint for the fallback model
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,

        /// Fail instead of downloading and transcribing locally
        #[arg(long)]
        no_fallback: bool,
    },

    /// Print the video id that would be looked up for a reference
    Id {
        #[arg(value_name = "REFERENCE")]
        reference: String,
    },

    /// Show or locate the configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON with origin and metadata
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => anyhow::bail!("Unknown output format: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transcribe_flags() {
        let cli = Cli::parse_from([
            "vidscribe",
            "transcribe",
            "https://x/watch?v=abc123",
            "--format",
            "json",
            "--model",
            "small",
            "--no-fallback",
        ]);

        match cli.command {
            Commands::Transcribe { reference, format, model, no_fallback, save_audio, .. } => {
                assert_eq!(reference, "https://x/watch?v=abc123");
                assert_eq!(format, Some(OutputFormat::Json));
                assert_eq!(model.as_deref(), Some("small"));
                assert!(no_fallback);
                assert!(!save_audio);
            }
            _ => panic!("expected transcribe command"),
        }
    }

    #[test]
    fn test_output_format_from_config_string() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("srt".parse::<OutputFormat>().is_err());
    }
}
