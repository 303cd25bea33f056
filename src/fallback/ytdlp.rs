use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use super::{AudioDownloader, DownloadError};

/// Audio downloader backed by yt-dlp
pub struct YtDlp {
    yt_dlp_path: String,
    audio_format: String,
}

impl YtDlp {
    pub fn new(yt_dlp_path: impl Into<String>, audio_format: impl Into<String>) -> Self {
        Self {
            yt_dlp_path: yt_dlp_path.into(),
            audio_format: audio_format.into(),
        }
    }

    /// Arguments requesting the best audio stream, extracted and transcoded to a fixed path
    fn download_args(&self, reference: &str, output: &Path) -> Vec<String> {
        vec![
            "-f".to_string(),
            "bestaudio".to_string(),
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            self.audio_format.clone(),
            "-o".to_string(),
            output.to_string_lossy().into_owned(),
            reference.to_string(),
        ]
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp", "mp3")
    }
}

#[async_trait]
impl AudioDownloader for YtDlp {
    async fn download(&self, reference: &str, output: &Path) -> Result<(), DownloadError> {
        tracing::debug!("Downloading audio for {} to {}", reference, output.display());

        let result = Command::new(&self.yt_dlp_path)
            .args(self.download_args(reference, output))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| DownloadError::Spawn {
                program: self.yt_dlp_path.clone(),
                source,
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            tracing::debug!(
                "{} stdout: {}",
                self.yt_dlp_path,
                String::from_utf8_lossy(&result.stdout)
            );
            return Err(DownloadError::Exited {
                program: self.yt_dlp_path.clone(),
                status: result.status.to_string(),
                stderr,
            });
        }

        Ok(())
    }
}
