use crate::config::Config;
use crate::logi;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

pub async fn ensure_directories(cfg: &Config) -> Result<()> {
    for dir in [&cfg.output_dir, &cfg.music_dir, &cfg.work_dir] {
        if !Path::new(dir).exists() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
            logi(format!("Created directory: {}", dir.display()));
        }
    }
    Ok(())
}

async fn tool_responds(program: &str, arg: &str) -> bool {
    match tokio::process::Command::new(program)
        .arg(arg)
        .output()
        .await
    {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}

pub async fn check_ffmpeg() -> bool {
    tool_responds("ffmpeg", "-version").await
}

pub async fn check_ffprobe() -> bool {
    tool_responds("ffprobe", "-version").await
}

pub async fn check_edge_tts() -> bool {
    tool_responds("edge-tts", "--version").await
}
