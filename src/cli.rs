use anyhow::Result;
use autotuber::config::Config;
use autotuber::generator::Pipeline;
use autotuber::init;

// Single iteration; exit status 0 only when a video was written.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cfg = Config::from_env();
    cfg.validate()?;
    init::ensure_directories(&cfg).await?;

    if !init::check_ffmpeg().await {
        eprintln!("[WARNING] FFmpeg not found in PATH. Please install FFmpeg.");
    }

    let report = Pipeline::new(&cfg)?.run_iteration().await?;
    let code = match &report.video {
        Some(path) => {
            println!("{}", path.display());
            0
        }
        None => 1,
    };
    std::process::exit(code);
}
