use anyhow::Result;
use std::path::Path;
use url::Url;

/// Build a URL with query parameters appended
pub fn build_url(base: &str, params: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(base).map_err(|_| anyhow::anyhow!("Invalid URL format: {}", base))?;

    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol");
    }

    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params.iter());
    }
    Ok(url)
}

/// First `max_chars` characters of `text`, with an ellipsis when truncated
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Hide all but the last four characters of a secret
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "****".to_string();
    }

    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{}", tail)
}

/// Parse language name or code and return the ISO 639-1 code
pub fn normalize_language_code(lang: &str) -> String {
    let lower = lang.trim().to_lowercase();
    let normalized = match lower.as_str() {
        "english" | "en-us" | "en-gb" => "en",
        "punjabi" | "pa-in" => "pa",
        "hindi" | "hi-in" => "hi",
        "urdu" => "ur",
        "spanish" | "es-es" => "es",
        "french" | "fr-fr" => "fr",
        "german" | "de-de" => "de",
        "italian" => "it",
        "portuguese" | "pt-br" => "pt",
        "japanese" => "ja",
        "korean" => "ko",
        "chinese" | "zh-cn" => "zh-CN",
        "arabic" => "ar",
        "russian" => "ru",
        _ => lang.trim(),
    };

    normalized.to_string()
}

/// Check if a file exists and is readable
pub fn check_file_accessible(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("File does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("Path is not a file: {}", path.display());
    }

    std::fs::metadata(path)
        .map_err(|e| anyhow::anyhow!("Cannot access file {}: {}", path.display(), e))?;

    Ok(())
}

/// MIME type for an uploaded video, from its extension
pub fn video_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}
