use crate::logw;
use anyhow::Result;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtsBackend {
    Edge,
    ElevenLabs,
}

impl FromStr for TtsBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "edge" | "edge-tts" => Ok(Self::Edge),
            "elevenlabs" | "eleven" => Ok(Self::ElevenLabs),
            other => anyhow::bail!("unknown TTS_BACKEND: {}", other),
        }
    }
}

/// Process-wide settings, built once at startup and handed to each component.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_key: String,
    pub pexels_key: String,
    pub output_dir: PathBuf,
    pub music_dir: PathBuf,
    pub work_dir: PathBuf,
    pub llm_model: String,
    pub llm_base_url: String,
    pub tts_backend: TtsBackend,
    pub tts_voice: String,
    pub elevenlabs_key: String,
    pub eleven_voice_id: String,
    pub eleven_model_id: String,
    pub cooldown_secs: u64,
    pub backoff_secs: u64,
    pub min_clip_bytes: u64,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("Aivideos")
}

fn default_music_dir() -> PathBuf {
    PathBuf::from("Aivideos").join("music")
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("tmp")
}

fn default_llm_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_tts_voice() -> String {
    "en-US-ChristopherNeural".to_string()
}

fn default_voice_id() -> String {
    "JBFqnCBsd6RMkjVDRZzb".to_string()
}

fn default_model_id() -> String {
    "eleven_multilingual_v2".to_string()
}

const DEFAULT_COOLDOWN_SECS: u64 = 10;
const DEFAULT_BACKOFF_SECS: u64 = 60;
const DEFAULT_MIN_CLIP_BYTES: u64 = 5000;

impl Config {
    /// Loads `.env` (if any) and reads the process environment.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let number = |key: &str, default: u64| match get(key) {
            Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                logw(format!("{} is not a number ({}); using {}", key, raw, default));
                default
            }),
            None => default,
        };

        let tts_backend = match get("TTS_BACKEND") {
            Some(raw) => raw.parse::<TtsBackend>().unwrap_or_else(|err| {
                logw(format!("{}; falling back to edge", err));
                TtsBackend::Edge
            }),
            None => TtsBackend::Edge,
        };

        Self {
            groq_key: get("GROQ_API_KEY").unwrap_or_default(),
            pexels_key: get("PEXELS_API_KEY").unwrap_or_default(),
            output_dir: get("OUTPUT_PATH").map(PathBuf::from).unwrap_or_else(default_output_dir),
            music_dir: get("MUSIC_PATH").map(PathBuf::from).unwrap_or_else(default_music_dir),
            work_dir: get("WORK_PATH").map(PathBuf::from).unwrap_or_else(default_work_dir),
            llm_model: get("LLM_MODEL").unwrap_or_else(default_llm_model),
            llm_base_url: get("LLM_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(default_llm_base_url),
            tts_backend,
            tts_voice: get("TTS_VOICE").unwrap_or_else(default_tts_voice),
            elevenlabs_key: get("ELEVENLABS_API_KEY").unwrap_or_default(),
            eleven_voice_id: get("ELEVEN_VOICE_ID").unwrap_or_else(default_voice_id),
            eleven_model_id: get("ELEVEN_MODEL_ID").unwrap_or_else(default_model_id),
            cooldown_secs: number("COOLDOWN_SECS", DEFAULT_COOLDOWN_SECS),
            backoff_secs: number("BACKOFF_SECS", DEFAULT_BACKOFF_SECS),
            min_clip_bytes: number("MIN_CLIP_BYTES", DEFAULT_MIN_CLIP_BYTES),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.groq_key.is_empty() {
            anyhow::bail!("GROQ_API_KEY missing");
        }
        if self.pexels_key.is_empty() {
            anyhow::bail!("PEXELS_API_KEY missing");
        }
        if self.tts_backend == TtsBackend::ElevenLabs && self.elevenlabs_key.is_empty() {
            anyhow::bail!("ELEVENLABS_API_KEY missing (TTS_BACKEND=elevenlabs)");
        }
        Ok(())
    }
}
