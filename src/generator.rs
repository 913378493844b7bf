use crate::api::groq::GroqClient;
use crate::api::pexels::PexelsClient;
use crate::api::{CompletionClient, FootageSource, SpeechSynthesizer};
use crate::assembler::Assembler;
use crate::config::Config;
use crate::context::{self, VisualContext};
use crate::footage::FootageRetriever;
use crate::music::MusicSelector;
use crate::narration::{self, Narrator};
use crate::output;
use crate::script::Script;
use crate::topic::TopicGenerator;
use crate::writer::ScriptGenerator;
use crate::{loge, logi, logok, logw};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;

/// Files owned by one iteration; deleted on drop, errors ignored.
#[derive(Debug, Default)]
pub(crate) struct IterationScratch {
    paths: Vec<PathBuf>,
}

impl IterationScratch {
    fn track(&mut self, path: PathBuf) -> PathBuf {
        if !self.paths.contains(&path) {
            self.paths.push(path.clone());
        }
        path
    }
}

impl Drop for IterationScratch {
    fn drop(&mut self) {
        for path in &self.paths {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[derive(Debug, Clone)]
pub struct IterationReport {
    pub topic: String,
    pub context: VisualContext,
    pub title: String,
    pub video: Option<PathBuf>,
    pub sidecar: Option<PathBuf>,
}

pub struct Pipeline {
    output_dir: PathBuf,
    work_dir: PathBuf,
    cooldown: Duration,
    backoff: Duration,
    topics: TopicGenerator,
    writer: ScriptGenerator,
    narrator: Narrator,
    music: MusicSelector,
    footage: FootageRetriever,
    assembler: Assembler,
}

impl Pipeline {
    pub fn new(cfg: &Config) -> Result<Self> {
        let llm: Arc<dyn CompletionClient> = Arc::new(GroqClient::new(cfg)?);
        let footage: Arc<dyn FootageSource> = Arc::new(PexelsClient::new(cfg)?);
        Ok(Self::with_services(cfg, llm, footage, narration::voice_for(cfg)))
    }

    pub fn with_services(
        cfg: &Config,
        llm: Arc<dyn CompletionClient>,
        footage: Arc<dyn FootageSource>,
        voice: Box<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            output_dir: cfg.output_dir.clone(),
            work_dir: cfg.work_dir.clone(),
            cooldown: Duration::from_secs(cfg.cooldown_secs),
            backoff: Duration::from_secs(cfg.backoff_secs),
            topics: TopicGenerator::new(llm.clone()),
            writer: ScriptGenerator::new(llm),
            narrator: Narrator::new(voice),
            music: MusicSelector::new(cfg),
            footage: FootageRetriever::new(footage, cfg),
            assembler: Assembler::new(cfg),
        }
    }

    /// One clip path per scene where possible. A scene whose whole fallback
    /// chain fails reuses the previous clip; with no previous clip it is skipped.
    pub(crate) async fn collect_footage(
        &self,
        script: &Script,
        context: VisualContext,
        iteration_id: i64,
        scratch: &mut IterationScratch,
    ) -> Vec<PathBuf> {
        let mut clips: Vec<PathBuf> = Vec::with_capacity(script.scenes.len());
        for (idx, scene) in script.scenes.iter().enumerate() {
            let dest = scratch.track(
                self.work_dir
                    .join(format!("temp_clip_{}_{}.mp4", iteration_id, idx)),
            );
            match self
                .footage
                .retrieve(&scene.visual, &dest, Some(context.as_str()))
                .await
            {
                Ok(path) => clips.push(path),
                Err(err) => match clips.last().cloned() {
                    Some(previous) => {
                        logw(format!(
                            "Scene {}: {}; reusing {}",
                            idx + 1,
                            err,
                            previous.display()
                        ));
                        clips.push(previous);
                    }
                    None => logw(format!("Scene {}: {}; no clip", idx + 1, err)),
                },
            }
        }
        clips
    }

    pub async fn run_iteration(&self) -> Result<IterationReport> {
        let topic = self.topics.generate().await;
        logok(format!("Topic: {}", topic));
        let context = context::classify(&topic);
        logi(format!("Context detected: {}", context));

        let script = self.writer.generate(&topic, Some(context)).await;
        logok(format!(
            "Script '{}' ({} scenes, mood {})",
            script.title,
            script.scenes.len(),
            script.mood
        ));

        fs::create_dir_all(&self.work_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.work_dir.display()))?;
        let iteration_id = chrono::Utc::now().timestamp();
        let mut scratch = IterationScratch::default();

        let voice_path = scratch.track(
            self.work_dir
                .join(format!("temp_voice_{}.mp3", iteration_id)),
        );
        let music = self.music.select(&script.mood);
        self.narrator.narrate(&script, &voice_path).await?;

        let clips = self
            .collect_footage(&script, context, iteration_id, &mut scratch)
            .await;

        let safe_topic = output::sanitize_filename(&topic);
        let video = self
            .assembler
            .assemble(
                &voice_path,
                music.as_deref(),
                &clips,
                &format!("{}.mp4", safe_topic),
            )
            .await;

        let sidecar = match &video {
            Some(path) => {
                logok(format!("SUCCESS! Saved: {}", path.display()));
                let meta =
                    output::write_sidecar(&self.output_dir, &safe_topic, &script, &topic).await?;
                logok(format!("Metadata: {}", meta.display()));
                Some(meta)
            }
            None => {
                logw(format!("No video produced for '{}'", topic));
                None
            }
        };

        drop(scratch);
        logi("Cleaned up temporary files.");

        Ok(IterationReport {
            topic,
            context,
            title: script.title,
            video,
            sidecar,
        })
    }

    /// Runs iterations back to back until the task is dropped.
    pub async fn run_forever(&self) {
        loop {
            match self.run_iteration().await {
                Ok(_) => {
                    logi(format!("Cooling down ({} seconds)...", self.cooldown.as_secs()));
                    tokio::time::sleep(self.cooldown).await;
                }
                Err(err) => {
                    loge(format!("Iteration failed: {:#}", err));
                    logi(format!("Backing off ({} seconds)...", self.backoff.as_secs()));
                    tokio::time::sleep(self.backoff).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CompletionRequest;
    use crate::script::Scene;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::path::Path;
    use std::process::Command;

    struct FakeLlm;

    #[async_trait]
    impl CompletionClient for FakeLlm {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            if request.json_response {
                Ok(r##"{"title":"The Bloop","description":"A sound from the deep.",
                    "tags":["#Ocean","#Shorts"],"mood":"Suspense",
                    "scenes":[{"text":"In 1997 the ocean roared.","visual":"Ocean"}]}"##
                    .to_string())
            } else {
                Ok("The Bloop Mystery".to_string())
            }
        }
    }

    /// Search hits only for terms in `known`; downloads are either zero bytes
    /// or an ffmpeg test pattern.
    struct FakeFootage {
        known: HashSet<String>,
        render: bool,
    }

    impl FakeFootage {
        fn new(known: &[&str], render: bool) -> Arc<Self> {
            Arc::new(Self {
                known: known.iter().map(|s| s.to_string()).collect(),
                render,
            })
        }
    }

    #[async_trait]
    impl FootageSource for FakeFootage {
        async fn search(&self, query: &str) -> Result<Option<String>> {
            Ok(self.known.contains(query).then(|| query.to_string()))
        }

        async fn download(&self, _url: &str, dest: &Path) -> Result<u64> {
            if self.render {
                let status = Command::new("ffmpeg")
                    .args(["-y", "-hide_banner", "-loglevel", "error", "-f", "lavfi", "-i"])
                    .arg("testsrc=duration=2:size=640x360:rate=24")
                    .args(["-c:v", "libx264", "-pix_fmt", "yuv420p", "-f", "mp4"])
                    .arg(dest)
                    .status()?;
                anyhow::ensure!(status.success(), "test pattern render failed");
            } else {
                std::fs::write(dest, vec![7u8; 6000])?;
            }
            Ok(std::fs::metadata(dest)?.len())
        }
    }

    struct FakeVoice {
        render: bool,
        fail: bool,
    }

    #[async_trait]
    impl SpeechSynthesizer for FakeVoice {
        async fn synthesize(&self, _text: &str, out_path: &Path) -> Result<()> {
            anyhow::ensure!(!self.fail, "voice service unavailable");
            if self.render {
                // WAV payload; ffprobe sniffs content, not the extension.
                let status = Command::new("ffmpeg")
                    .args(["-y", "-hide_banner", "-loglevel", "error", "-f", "lavfi", "-i"])
                    .arg("sine=frequency=440:duration=3")
                    .args(["-c:a", "pcm_s16le", "-f", "wav"])
                    .arg(out_path)
                    .status()?;
                anyhow::ensure!(status.success(), "test tone render failed");
            } else {
                std::fs::write(out_path, b"RIFF")?;
            }
            Ok(())
        }
    }

    fn test_config(root: &Path) -> Config {
        let mut cfg = Config::from_lookup(|_| None);
        cfg.output_dir = root.join("out");
        cfg.music_dir = root.join("music");
        cfg.work_dir = root.join("work");
        cfg
    }

    fn pipeline(cfg: &Config, footage: Arc<FakeFootage>, voice: FakeVoice) -> Pipeline {
        Pipeline::with_services(cfg, Arc::new(FakeLlm), footage, Box::new(voice))
    }

    fn files_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    fn ffmpeg_ready() -> bool {
        let probe = Command::new("ffprobe").arg("-version").output();
        let encoders = Command::new("ffmpeg")
            .args(["-hide_banner", "-encoders"])
            .output();
        match (probe, encoders) {
            (Ok(p), Ok(e)) => {
                p.status.success() && String::from_utf8_lossy(&e.stdout).contains("libx264")
            }
            _ => false,
        }
    }

    #[tokio::test]
    async fn failed_scenes_reuse_previous_clip() {
        let root = tempfile::tempdir().unwrap();
        let cfg = test_config(root.path());
        std::fs::create_dir_all(&cfg.work_dir).unwrap();
        let p = pipeline(&cfg, FakeFootage::new(&["Shark", "Ship"], false), FakeVoice {
            render: false,
            fail: false,
        });

        let mut script = Script::fallback("x", None);
        script.scenes = ["Nothing", "Shark", "Nothing", "Ship"]
            .iter()
            .map(|v| Scene { text: "line".into(), visual: v.to_string() })
            .collect();

        let mut scratch = IterationScratch::default();
        let clips = p
            .collect_footage(&script, VisualContext::Underwater, 42, &mut scratch)
            .await;

        let clip = |i: usize| cfg.work_dir.join(format!("temp_clip_42_{}.mp4", i));
        assert_eq!(clips, vec![clip(1), clip(1), clip(3)]);
        assert!(clip(1).exists() && clip(3).exists());
        assert!(!clip(0).exists() && !clip(2).exists());

        drop(scratch);
        assert!(files_in(&cfg.work_dir).is_empty());
    }

    #[tokio::test]
    async fn narration_failure_fails_iteration_and_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let cfg = test_config(root.path());
        let p = pipeline(&cfg, FakeFootage::new(&["Ocean"], false), FakeVoice {
            render: false,
            fail: true,
        });

        let err = p.run_iteration().await.unwrap_err();
        assert!(format!("{:#}", err).contains("voice service unavailable"));
        assert!(files_in(&cfg.work_dir).is_empty());
        assert!(files_in(&cfg.output_dir).is_empty());
    }

    #[tokio::test]
    async fn missing_footage_produces_no_video() {
        let root = tempfile::tempdir().unwrap();
        let cfg = test_config(root.path());
        let p = pipeline(&cfg, FakeFootage::new(&[], false), FakeVoice {
            render: false,
            fail: false,
        });

        let report = p.run_iteration().await.unwrap();
        assert_eq!(report.topic, "The Bloop Mystery");
        assert_eq!(report.context, VisualContext::DarkAtmosphere);
        assert!(report.video.is_none());
        assert!(report.sidecar.is_none());
        assert!(files_in(&cfg.work_dir).is_empty());
    }

    #[tokio::test]
    async fn renders_video_and_sidecar_end_to_end() {
        if !ffmpeg_ready() {
            eprintln!("ffmpeg/ffprobe with libx264 not available; skipping");
            return;
        }
        let root = tempfile::tempdir().unwrap();
        let cfg = test_config(root.path());
        let p = pipeline(&cfg, FakeFootage::new(&["Ocean"], true), FakeVoice {
            render: true,
            fail: false,
        });

        let report = p.run_iteration().await.unwrap();
        let video = cfg.output_dir.join("The_Bloop_Mystery.mp4");
        let sidecar = cfg.output_dir.join("The_Bloop_Mystery_INFO.txt");
        assert_eq!(report.video.as_deref(), Some(video.as_path()));
        assert_eq!(report.sidecar.as_deref(), Some(sidecar.as_path()));
        assert_eq!(
            files_in(&cfg.output_dir),
            vec!["The_Bloop_Mystery.mp4", "The_Bloop_Mystery_INFO.txt"]
        );

        let (w, h) = crate::ffmpeg::ffprobe_video_dimensions(&video).await.unwrap();
        assert_eq!((w, h), (1080, 1920));
        let secs = crate::ffmpeg::ffprobe_duration_seconds(&video).await.unwrap();
        assert!((secs - 3.0).abs() < 0.5, "duration {secs}");

        let info = std::fs::read_to_string(sidecar).unwrap();
        assert!(info.starts_with("TITLE: The Bloop\n"));
        assert!(info.ends_with("TAGS: #Ocean #Shorts"));

        assert!(files_in(&cfg.work_dir).is_empty());
    }
}
