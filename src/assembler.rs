use crate::config::Config;
use crate::error::AssembleError;
use crate::ffmpeg;
use crate::{loge, logi, logok, logw};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tokio::fs;

pub const TARGET_WIDTH: u32 = 1080;
pub const TARGET_HEIGHT: u32 = 1920;
pub const FPS: u32 = 24;
pub const MUSIC_VOLUME: f64 = 0.12;
/// Looped music is extended this far past the narration before trimming.
pub const MUSIC_TAIL_SECS: f64 = 2.0;

fn even_ceil(value: f64) -> u32 {
    let n = value.ceil() as u32;
    n + (n % 2)
}

/// Scale-to-cover then center-crop onto the vertical target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverCrop {
    pub scale_w: u32,
    pub scale_h: u32,
    pub crop_x: u32,
    pub crop_y: u32,
}

impl CoverCrop {
    pub fn for_source(src_w: u32, src_h: u32) -> Self {
        Self::fit(src_w, src_h, TARGET_WIDTH, TARGET_HEIGHT)
    }

    pub fn fit(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> Self {
        let (sw, sh) = (src_w.max(1) as u64, src_h.max(1) as u64);
        let source_is_wider = sw * dst_h as u64 > dst_w as u64 * sh;

        if source_is_wider {
            let scale_w = even_ceil(sw as f64 * dst_h as f64 / sh as f64).max(dst_w);
            Self {
                scale_w,
                scale_h: dst_h,
                crop_x: (scale_w - dst_w) / 2,
                crop_y: 0,
            }
        } else {
            let scale_h = even_ceil(sh as f64 * dst_w as f64 / sw as f64).max(dst_h);
            Self {
                scale_w: dst_w,
                scale_h,
                crop_x: 0,
                crop_y: (scale_h - dst_h) / 2,
            }
        }
    }

    pub fn filter(&self) -> String {
        format!(
            "scale={}:{},crop={}:{}:{}:{},setsar=1",
            self.scale_w, self.scale_h, TARGET_WIDTH, TARGET_HEIGHT, self.crop_x, self.crop_y
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClipCut {
    pub source: PathBuf,
    pub duration: f64,
}

/// Equal share of the narration for every clip, in input order.
pub fn plan_cuts(narration_secs: f64, clips: &[PathBuf]) -> Vec<ClipCut> {
    if clips.is_empty() {
        return Vec::new();
    }
    let share = narration_secs / clips.len() as f64;
    clips
        .iter()
        .map(|source| ClipCut {
            source: source.clone(),
            duration: share,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MusicBed {
    pub music_secs: f64,
    /// Times the track is played back to back.
    pub plays: u32,
    pub trim_secs: f64,
    pub volume: f64,
}

impl MusicBed {
    pub fn plan(narration_secs: f64, music_secs: f64) -> Self {
        let plays = if music_secs > 0.0 && music_secs < narration_secs {
            ((narration_secs + MUSIC_TAIL_SECS) / music_secs).ceil() as u32
        } else {
            1
        };
        Self {
            music_secs,
            plays: plays.max(1),
            trim_secs: narration_secs,
            volume: MUSIC_VOLUME,
        }
    }
}

/// Existing regular files larger than `min_bytes`, order and duplicates kept.
pub async fn valid_clips(clips: &[PathBuf], min_bytes: u64) -> Vec<PathBuf> {
    let mut out = Vec::with_capacity(clips.len());
    for clip in clips {
        match fs::metadata(clip).await {
            Ok(meta) if meta.is_file() && meta.len() > min_bytes => out.push(clip.clone()),
            Ok(meta) => logw(format!(
                "Skipping clip {} ({} bytes)",
                clip.display(),
                meta.len()
            )),
            Err(_) => logw(format!("Skipping missing clip {}", clip.display())),
        }
    }
    out
}

pub struct Assembler {
    output_dir: PathBuf,
    work_dir: PathBuf,
    min_clip_bytes: u64,
}

impl Assembler {
    pub fn new(cfg: &Config) -> Self {
        Self {
            output_dir: cfg.output_dir.clone(),
            work_dir: cfg.work_dir.clone(),
            min_clip_bytes: cfg.min_clip_bytes,
        }
    }

    /// Renders `<output_dir>/<output_name>`. Failures are logged and reported
    /// as `None`.
    pub async fn assemble(
        &self,
        narration: &Path,
        music: Option<&Path>,
        clips: &[PathBuf],
        output_name: &str,
    ) -> Option<PathBuf> {
        logi("Mixing & rendering...");
        match self.try_assemble(narration, music, clips, output_name).await {
            Ok(path) => {
                logok(format!("Rendered {}", path.display()));
                Some(path)
            }
            Err(err) => {
                loge(format!("Editor failed: {:#}", err));
                None
            }
        }
    }

    pub async fn try_assemble(
        &self,
        narration: &Path,
        music: Option<&Path>,
        clips: &[PathBuf],
        output_name: &str,
    ) -> Result<PathBuf, AssembleError> {
        let clips = valid_clips(clips, self.min_clip_bytes).await;
        if clips.is_empty() {
            return Err(AssembleError::NoValidFootage);
        }

        let narration_secs = ffmpeg::ffprobe_duration_seconds(narration)
            .await
            .map_err(|e| AssembleError::InvalidNarration(format!("{:#}", e)))?;
        let cuts = plan_cuts(narration_secs, &clips);
        logi(format!(
            "Narration {:.2}s over {} clips ({:.2}s each)",
            narration_secs,
            cuts.len(),
            narration_secs / cuts.len() as f64
        ));

        fs::create_dir_all(&self.work_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.work_dir.display()))?;
        // Segments and the concat list go away with this guard.
        let workspace = tempfile::Builder::new()
            .prefix("render-")
            .tempdir_in(&self.work_dir)
            .context("Failed to create render workspace")?;

        let mut list = String::new();
        for (idx, cut) in cuts.iter().enumerate() {
            let (w, h) = ffmpeg::ffprobe_video_dimensions(&cut.source).await?;
            let crop = CoverCrop::for_source(w, h);
            let name = format!("segment_{:03}.mp4", idx);
            let segment = workspace.path().join(&name);
            ffmpeg::ffmpeg_render_segment(&cut.source, cut.duration, &crop, &segment)
                .await
                .with_context(|| format!("Failed to normalize {}", cut.source.display()))?;
            list.push_str(&format!("file '{}'\n", name));
        }
        let list_path = workspace.path().join("concat_list.txt");
        fs::write(&list_path, list.as_bytes())
            .await
            .context("Failed to write concat list")?;

        let bed = match music {
            Some(track) => match ffmpeg::ffprobe_duration_seconds(track).await {
                Ok(music_secs) => Some((track, MusicBed::plan(narration_secs, music_secs))),
                Err(err) => {
                    logw(format!("Unusable music {}: {:#}; narration only.", track.display(), err));
                    None
                }
            },
            None => None,
        };

        fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.output_dir.display()))?;
        // Removed on drop unless persisted.
        let render = tempfile::Builder::new()
            .prefix(".render-")
            .suffix(".mp4")
            .tempfile_in(&self.output_dir)
            .context("Failed to create temporary render file")?
            .into_temp_path();

        ffmpeg::ffmpeg_render_final(
            &list_path,
            narration,
            bed.as_ref().map(|(track, bed)| (*track, bed)),
            narration_secs,
            &render,
        )
        .await?;

        let final_path = self.output_dir.join(output_name);
        render
            .persist(&final_path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to move render to {}", final_path.display()))?;
        Ok(final_path)
    }
}
