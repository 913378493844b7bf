use crate::api::SpeechSynthesizer;
use crate::api::edge_tts::EdgeTtsVoice;
use crate::api::elevenlabs::ElevenLabsVoice;
use crate::config::{Config, TtsBackend};
use crate::logi;
use crate::script::Script;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub fn voice_for(cfg: &Config) -> Box<dyn SpeechSynthesizer> {
    match cfg.tts_backend {
        TtsBackend::Edge => Box::new(EdgeTtsVoice::new(cfg)),
        TtsBackend::ElevenLabs => Box::new(ElevenLabsVoice::new(cfg)),
    }
}

pub struct Narrator {
    voice: Box<dyn SpeechSynthesizer>,
}

impl Narrator {
    pub fn new(voice: Box<dyn SpeechSynthesizer>) -> Self {
        Self { voice }
    }

    /// Speaks every scene of `script`, in order, into `out_path`.
    /// Errors are returned to the caller.
    pub async fn narrate(&self, script: &Script, out_path: &Path) -> Result<PathBuf> {
        let text = script.narration_text();
        logi(format!(
            "Synthesizing narration ({} chars) -> {}",
            text.len(),
            out_path.display()
        ));
        self.voice
            .synthesize(&text, out_path)
            .await
            .context("Narration synthesis failed")?;
        Ok(out_path.to_path_buf())
    }
}
