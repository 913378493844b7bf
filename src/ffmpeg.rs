use crate::assembler::{CoverCrop, FPS, MusicBed};
use anyhow::{Context, Result};
use std::path::Path;
use tokio::process::Command;

const STDERR_SNIPPET_CHARS: usize = 600;

async fn run_cmd(args: &[String]) -> Result<()> {
    let Some((program, rest)) = args.split_first() else {
        return Ok(());
    };

    let output = Command::new(program)
        .args(rest)
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("Failed to run {}", program))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let snippet = stderr.trim().chars().take(STDERR_SNIPPET_CHARS).collect::<String>();
        anyhow::bail!("Command failed ({}): {:?}: {}", output.status, args, snippet);
    }

    Ok(())
}

pub async fn ffprobe_video_dimensions(path: &Path) -> Result<(u32, u32)> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height",
            "-of",
            "csv=s=x:p=0",
        ])
        .arg(path)
        .kill_on_drop(true)
        .output()
        .await
        .context("ffprobe execution failed")?;

    if !output.status.success() {
        anyhow::bail!("ffprobe failed for {}", path.display());
    }

    parse_dimensions(&String::from_utf8_lossy(&output.stdout))
        .with_context(|| format!("Invalid dimensions for {}", path.display()))
}

fn parse_dimensions(text: &str) -> Option<(u32, u32)> {
    let mut parts = text.trim().split('x');
    let w = parts.next()?.trim().parse::<u32>().ok()?;
    let h = parts.next()?.trim().parse::<u32>().ok()?;
    if w == 0 || h == 0 {
        return None;
    }
    Some((w, h))
}

pub async fn ffprobe_duration_seconds(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .kill_on_drop(true)
        .output()
        .await
        .context("ffprobe duration failed")?;

    if !output.status.success() {
        anyhow::bail!("ffprobe failed for {}", path.display());
    }

    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let duration = text.parse::<f64>().unwrap_or(-1.0);
    if duration <= 0.1 {
        anyhow::bail!("Invalid duration for {}: {:?}", path.display(), text);
    }
    Ok(duration)
}

fn encoder_args() -> Vec<String> {
    ["-c:v", "libx264", "-pix_fmt", "yuv420p", "-preset", "ultrafast", "-threads", "1"]
        .map(String::from)
        .to_vec()
}

/// Normalized, silent segment of exactly `duration_s`. The input is looped so
/// short stock clips still fill their share.
pub fn segment_args(input: &Path, duration_s: f64, crop: &CoverCrop, out: &Path) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "ffmpeg".into(),
        "-y".into(),
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-stream_loop".into(),
        "-1".into(),
        "-i".into(),
        input.display().to_string(),
        "-t".into(),
        format!("{:.3}", duration_s),
        "-an".into(),
        "-vf".into(),
        format!("{},fps={}", crop.filter(), FPS),
    ];
    args.extend(encoder_args());
    args.push(out.display().to_string());
    args
}

pub async fn ffmpeg_render_segment(
    input: &Path,
    duration_s: f64,
    crop: &CoverCrop,
    out: &Path,
) -> Result<()> {
    run_cmd(&segment_args(input, duration_s, crop, out)).await?;
    if !out.exists() {
        anyhow::bail!("ffmpeg produced no segment at {}", out.display());
    }
    Ok(())
}

/// Joins the concat list with narration (and the music bed, if any) into the
/// final file.
pub fn final_args(
    concat_list: &Path,
    narration: &Path,
    music: Option<(&Path, &MusicBed)>,
    narration_s: f64,
    out: &Path,
) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "ffmpeg".into(),
        "-y".into(),
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-f".into(),
        "concat".into(),
        "-safe".into(),
        "0".into(),
        "-i".into(),
        concat_list.display().to_string(),
        "-i".into(),
        narration.display().to_string(),
    ];

    match music {
        Some((track, bed)) => {
            if bed.plays > 1 {
                args.push("-stream_loop".into());
                args.push((bed.plays - 1).to_string());
            }
            args.push("-i".into());
            args.push(track.display().to_string());
            args.push("-filter_complex".into());
            args.push(format!(
                "[2:a]atrim=0:{:.3},asetpts=PTS-STARTPTS,volume={:.2}[bed];\
                 [1:a][bed]amix=inputs=2:duration=first:dropout_transition=0:normalize=0[a]",
                bed.trim_secs, bed.volume
            ));
            args.extend(["-map", "0:v", "-map", "[a]"].map(String::from));
        }
        None => {
            args.extend(["-map", "0:v", "-map", "1:a"].map(String::from));
        }
    }

    args.push("-t".into());
    args.push(format!("{:.3}", narration_s));
    args.push("-r".into());
    args.push(FPS.to_string());
    args.extend(encoder_args());
    args.extend(
        ["-c:a", "aac", "-b:a", "192k", "-movflags", "+faststart", "-f", "mp4"].map(String::from),
    );
    args.push(out.display().to_string());
    args
}

pub async fn ffmpeg_render_final(
    concat_list: &Path,
    narration: &Path,
    music: Option<(&Path, &MusicBed)>,
    narration_s: f64,
    out: &Path,
) -> Result<()> {
    run_cmd(&final_args(concat_list, narration, music, narration_s, out)).await
}
