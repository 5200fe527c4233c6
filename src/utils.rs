use crate::errors::Result;
use log::info;

/// Sanitizes a filename by removing invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Creates a directory if it doesn't exist
pub async fn ensure_dir_exists(path: &std::path::Path) -> Result<()> {
    if !path.exists() {
        tokio::fs::create_dir_all(path).await?;
        info!("Created directory: {:?}", path);
    }
    Ok(())
}

/// Generates a unique ID for a single request/response cycle
pub fn generate_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    }
}
