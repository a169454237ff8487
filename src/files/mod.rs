use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

/// Map a loosely-specified file-type token to an extension. Total:
/// unknown tokens get ".txt".
pub fn resolve_extension(file_type: &str) -> &'static str {
    match file_type.to_lowercase().as_str() {
        "javascript" | "js" => ".js",
        "python" | "py" => ".py",
        "html" => ".html",
        "css" => ".css",
        "typescript" | "ts" => ".ts",
        "json" => ".json",
        "markdown" | "md" => ".md",
        "text" | "txt" => ".txt",
        "rust" | "rs" => ".rs",
        "toml" => ".toml",
        "yaml" | "yml" => ".yaml",
        "shell" | "sh" | "bash" => ".sh",
        _ => ".txt",
    }
}

/// Name for a generated file: `<fileType>_<epochMillis><ext>`.
pub fn generated_file_name(file_type: &str) -> String {
    format!(
        "{}_{}{}",
        file_type,
        Utc::now().timestamp_millis(),
        resolve_extension(file_type)
    )
}

/// Persist model output verbatim under the working directory, returning
/// the path written.
pub fn write_generated(
    working_dir: &Path,
    file_type: &str,
    content: &str,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let full_path = working_dir.join(generated_file_name(file_type));
    fs::write(&full_path, content)?;
    Ok(full_path)
}
