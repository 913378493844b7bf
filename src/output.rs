use crate::script::Script;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::fs;

static RESERVED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());

/// Strips filesystem-reserved characters and turns spaces into underscores.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned = RESERVED.replace_all(name, "").replace(' ', "_");
    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned
    }
}

pub fn sidecar_text(script: &Script, topic: &str) -> String {
    let title = if script.title.trim().is_empty() {
        topic
    } else {
        script.title.as_str()
    };
    format!(
        "TITLE: {}\n\nDESCRIPTION:\n{}\n\nTAGS: {}",
        title,
        script.description,
        script.tags.join(" ")
    )
}

/// Writes `<dir>/<name>_INFO.txt`.
pub async fn write_sidecar(dir: &Path, name: &str, script: &Script, topic: &str) -> Result<PathBuf> {
    let path = dir.join(format!("{}_INFO.txt", name));
    fs::write(&path, sidecar_text(script, topic))
        .await
        .with_context(|| format!("Failed to write metadata {}", path.display()))?;
    Ok(path)
}
