use anyhow::Result;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::extractors::Transcript;

/// Render a transcript in the requested format
pub fn format_transcript(transcript: &Transcript, format: &OutputFormat) -> Result<String> {
    let content = match format {
        OutputFormat::Text => transcript.text.clone(),
        OutputFormat::Json => serde_json::to_string_pretty(transcript)?,
    };

    Ok(content)
}

/// Save transcript to file
pub fn save_to_file(transcript: &Transcript, path: &Path, format: &OutputFormat) -> Result<()> {
    let content = format_transcript(transcript, format)?;

    fs_err::write(path, content)?;
    Ok(())
}

/// Print transcript to console
pub fn print_to_console(transcript: &Transcript, format: &OutputFormat) -> Result<()> {
    let content = format_transcript(transcript, format)?;

    println!("{}", content);
    Ok(())
}
