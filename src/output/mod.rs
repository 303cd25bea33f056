use std::path::Path;

use crate::cli::OutputFormat;
use crate::transcribe::Transcript;
use crate::Result;

/// Render a transcript in the requested format
pub fn render(transcript: &Transcript, format: &OutputFormat) -> Result<String> {
    let content = match format {
        OutputFormat::Text => transcript.text.clone(),
        OutputFormat::Json => serde_json::to_string_pretty(transcript)?,
    };

    Ok(content)
}

/// Save transcript to file
pub async fn save_to_file(
    transcript: &Transcript,
    path: &Path,
    format: &OutputFormat,
) -> Result<()> {
    let content = render(transcript, format)?;
    fs_err::write(path, content)?;
    Ok(())
}

/// Print transcript to console
pub fn print_to_console(transcript: &Transcript, format: &OutputFormat) -> Result<()> {
    println!("{}", render(transcript, format)?);
    Ok(())
}
