use tokio::process::Command;

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Sanitize filename for safe filesystem usage
pub fn sanitize_filename(filename: &str) -> String {
    let sanitized = filename
        .chars()
        .map(|c| match c {
            c if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' => c,
            _ => '_',
        })
        .collect::<String>();

    let trimmed = sanitized.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        "audio".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Check that the download tools of the fallback path are installed
///
/// The whisper command is checked when the model loads, only if the fallback runs.
pub async fn check_dependencies(downloader: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(downloader, "--version").await {
        missing.push(format!(
            "{} - required to download audio for the fallback",
            downloader
        ));
    }

    // yt-dlp needs ffmpeg for --extract-audio
    if !check_command_available("ffmpeg", "-version").await {
        missing.push("ffmpeg - required to extract audio".to_string());
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str, version_arg: &str) -> bool {
    Command::new(command)
        .arg(version_arg)
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.4), "0s");
        assert_eq!(format_duration(30.0), "30s");
        assert_eq!(format_duration(90.0), "1m 30s");
        assert_eq!(format_duration(3661.0), "1h 1m 1s");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(sanitize_filename("abc&t=10"), "abc_t_10");
        assert_eq!(sanitize_filename("https://youtu.be/x"), "https___youtu.be_x");
        assert_eq!(sanitize_filename("../.."), "audio");
    }

    #[tokio::test]
    async fn test_missing_commands_are_reported() {
        let missing = check_dependencies("vidscribe-no-such-downloader").await;
        assert!(missing.iter().any(|m| m.starts_with("vidscribe-no-such-downloader")));
        assert!(!missing.iter().any(|m| m.contains("transcription")));
    }
}
