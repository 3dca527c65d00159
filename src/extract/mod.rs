pub mod gemini;

use anyhow::{Result, bail};
use async_trait::async_trait;
use std::path::Path;

/// Turns raw feature documentation into actionable usage instructions
/// suitable for a browser-automation task.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract_usage(&self, text: &str) -> Result<String>;
}

/// File extensions accepted as plain-text documentation.
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "rst"];

/// Read a documentation file as text. Only plain-text formats are
/// supported; anything else is rejected rather than half-parsed.
pub async fn read_docs(path: &Path) -> Result<String> {
    let supported = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| TEXT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false);

    if !supported {
        bail!(
            "unsupported documentation format: {} (expected .txt, .md, or .rst)",
            path.display()
        );
    }

    Ok(tokio::fs::read_to_string(path).await?)
}
