use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use super::{SpeechEngine, SpeechError, SpeechModel};

/// Model sizes understood by the Whisper CLI
pub const KNOWN_VARIANTS: &[&str] = &[
    "tiny", "tiny.en", "base", "base.en", "small", "small.en", "medium", "medium.en",
    "large", "large-v1", "large-v2", "large-v3", "large-v3-turbo", "turbo",
];

/// JSON written by `whisper --output_format json`
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    text: String,
}

/// Speech engine that drives the `whisper` command line tool
pub struct WhisperCli {
    command: String,
    language: Option<String>,
}

impl WhisperCli {
    pub fn new(command: impl Into<String>, language: Option<String>) -> Self {
        Self {
            command: command.into(),
            language,
        }
    }
}

impl Default for WhisperCli {
    fn default() -> Self {
        Self::new("whisper", None)
    }
}

#[async_trait]
impl SpeechEngine for WhisperCli {
    async fn load(&self, variant: &str) -> Result<Box<dyn SpeechModel>, SpeechError> {
        if !KNOWN_VARIANTS.contains(&variant) {
            return Err(SpeechError::UnknownVariant(variant.to_string()));
        }

        let help = Command::new(&self.command)
            .arg("--help")
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| SpeechError::Load {
                variant: variant.to_string(),
                reason: format!("{} is not available: {}", self.command, e),
            })?;

        if !help.status.success() {
            return Err(SpeechError::Load {
                variant: variant.to_string(),
                reason: String::from_utf8_lossy(&help.stderr).trim().to_string(),
            });
        }

        tracing::debug!("Loaded whisper model '{}' via {}", variant, self.command);
        Ok(Box::new(WhisperModel {
            command: self.command.clone(),
            variant: variant.to_string(),
            language: self.language.clone(),
        }))
    }
}

/// A Whisper model variant bound to the CLI
pub struct WhisperModel {
    command: String,
    variant: String,
    language: Option<String>,
}

impl WhisperModel {
    fn transcribe_args(&self, audio: &Path, output_dir: &Path) -> Vec<String> {
        let mut args = vec![
            audio.to_string_lossy().into_owned(),
            "--model".to_string(),
            self.variant.clone(),
            "--output_format".to_string(),
            "json".to_string(),
            "--output_dir".to_string(),
            output_dir.to_string_lossy().into_owned(),
            "--fp16".to_string(),
            "False".to_string(),
            "--verbose".to_string(),
            "False".to_string(),
        ];

        if let Some(language) = &self.language {
            args.push("--language".to_string());
            args.push(language.clone());
        }

        args
    }
}

/// Read the text Whisper wrote for `audio` into `output_dir`
fn read_transcript(output_dir: &Path, audio: &Path) -> Result<String, SpeechError> {
    let stem = audio
        .file_stem()
        .ok_or_else(|| SpeechError::Inference(format!("Not an audio file: {}", audio.display())))?;
    let json_path = output_dir.join(format!("{}.json", stem.to_string_lossy()));

    let content = fs_err::read_to_string(&json_path)?;
    let output: WhisperOutput = serde_json::from_str(&content)?;

    Ok(output.text.trim().to_string())
}

#[async_trait]
impl SpeechModel for WhisperModel {
    async fn transcribe(&self, audio: &Path) -> Result<String, SpeechError> {
        let output_dir = tempfile::Builder::new().prefix("vidscribe-whisper-").tempdir()?;

        let result = Command::new(&self.command)
            .args(self.transcribe_args(audio, output_dir.path()))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(SpeechError::Inference(format!(
                "{} exited with {}: {}",
                self.command,
                result.status,
                stderr.trim()
            )));
        }

        read_transcript(output_dir.path(), audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_rejects_unknown_variant() {
        let engine = WhisperCli::default();
        let err = engine.load("gigantic").await.err().unwrap();
        assert!(matches!(err, SpeechError::UnknownVariant(v) if v == "gigantic"));
    }

    #[tokio::test]
    async fn test_load_without_binary_fails() {
        let engine = WhisperCli::new("vidscribe-no-such-whisper", None);
        let err = engine.load("base").await.err().unwrap();
        assert!(matches!(err, SpeechError::Load { .. }));
    }

    #[test]
    fn test_transcribe_args_with_language() {
        let model = WhisperModel {
            command: "whisper".to_string(),
            variant: "base".to_string(),
            language: Some("en".to_string()),
        };
        let args = model.transcribe_args(Path::new("/ws/output_audio.mp3"), Path::new("/out"));

        assert_eq!(args[0], "/ws/output_audio.mp3");
        assert_eq!(&args[1..3], ["--model", "base"]);
        assert!(args.windows(2).any(|w| w == ["--output_dir", "/out"]));
        assert_eq!(&args[args.len() - 2..], ["--language", "en"]);
    }

    #[test]
    fn test_read_transcript_trims_text() {
        let dir = tempfile::tempdir().unwrap();
        fs_err::write(
            dir.path().join("output_audio.json"),
            r#"{"text": " spoken words", "segments": [], "language": "en"}"#,
        )
        .unwrap();

        let text = read_transcript(dir.path(), Path::new("/ws/output_audio.mp3")).unwrap();
        assert_eq!(text, "spoken words");
    }

    #[test]
    fn test_read_transcript_missing_output() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_transcript(dir.path(), Path::new("output_audio.mp3")).unwrap_err();
        assert!(matches!(err, SpeechError::Io(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_transcribe_reads_json_written_by_command() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-whisper");
        fs_err::write(
            &script,
            "#!/bin/sh\n\
             [ \"$1\" = \"--help\" ] && exit 0\n\
             name=$(basename \"$1\")\n\
             while [ $# -gt 0 ]; do\n\
               if [ \"$1\" = \"--output_dir\" ]; then out=\"$2\"; fi\n\
               shift\n\
             done\n\
             printf '{\"text\": \" spoken words \", \"segments\": []}' > \"$out/${name%.*}.json\"\n",
        )
        .unwrap();
        fs_err::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let audio = dir.path().join("output_audio.mp3");
        fs_err::write(&audio, "audio").unwrap();

        let engine = WhisperCli::new(script.to_string_lossy(), None);
        let model = engine.load("base").await.unwrap();
        let text = model.transcribe(&audio).await.unwrap();

        assert_eq!(text, "spoken words");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_transcribe_reports_failed_command() {
        let model = WhisperModel {
            command: "false".to_string(),
            variant: "base".to_string(),
            language: None,
        };
        let err = model.transcribe(Path::new("output_audio.mp3")).await.unwrap_err();
        assert!(matches!(err, SpeechError::Inference(msg) if msg.starts_with("false exited")));
    }
}
