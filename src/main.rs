use anyhow::Result;
use autotuber::config::{Config, TtsBackend};
use autotuber::generator::Pipeline;
use autotuber::init;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cfg = Config::from_env();
    cfg.validate()?;
    init::ensure_directories(&cfg).await?;

    if !init::check_ffmpeg().await || !init::check_ffprobe().await {
        tracing::warn!("[WARN] FFmpeg/FFprobe not found in PATH. Rendering will fail.");
    }
    if cfg.tts_backend == TtsBackend::Edge && !init::check_edge_tts().await {
        tracing::warn!("[WARN] edge-tts not found in PATH. Install it with `pip install edge-tts`.");
    }

    let pipeline = Pipeline::new(&cfg)?;
    tracing::info!(
        "[INFO] Autotuber started. Output: {}. Press Ctrl-C to stop.",
        cfg.output_dir.display()
    );

    tokio::select! {
        _ = pipeline.run_forever() => {}
        res = tokio::signal::ctrl_c() => {
            res?;
            tracing::info!("[INFO] Stopped by user.");
        }
    }
    Ok(())
}
