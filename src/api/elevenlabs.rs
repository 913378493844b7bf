use super::SpeechSynthesizer;
use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;
use tokio::fs;

pub struct ElevenLabsVoice {
    client: Client,
    api_key: String,
    voice_id: String,
    model_id: String,
}

impl ElevenLabsVoice {
    pub fn new(cfg: &Config) -> Self {
        Self {
            client: Client::new(),
            api_key: cfg.elevenlabs_key.clone(),
            voice_id: cfg.eleven_voice_id.clone(),
            model_id: cfg.eleven_model_id.clone(),
        }
    }

    fn request_url(&self) -> String {
        format!(
            "https://api.elevenlabs.io/v1/text-to-speech/{}?output_format=mp3_44100_128",
            self.voice_id
        )
    }

    fn request_body(&self, text: &str) -> serde_json::Value {
        serde_json::json!({
            "text": text,
            "model_id": self.model_id,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsVoice {
    async fn synthesize(&self, text: &str, out_path: &Path) -> Result<()> {
        let resp = self
            .client
            .post(self.request_url())
            .header("Content-Type", "application/json")
            .header("xi-api-key", &self.api_key)
            .json(&self.request_body(text))
            .timeout(std::time::Duration::from_secs(300))
            .send()
            .await
            .context("ElevenLabs request failed")?;

        if !resp.status().is_success() {
            anyhow::bail!("ElevenLabs TTS failed HTTP {}", resp.status().as_u16());
        }

        let bytes = resp.bytes().await.context("ElevenLabs response read failed")?;
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create dir {}", parent.display()))?;
        }
        fs::write(out_path, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", out_path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_targets_configured_voice_and_model() {
        let mut cfg = Config::from_lookup(|_| None);
        cfg.elevenlabs_key = "xi".to_string();
        cfg.eleven_voice_id = "voice123".to_string();
        cfg.eleven_model_id = "eleven_turbo_v2".to_string();
        let voice = ElevenLabsVoice::new(&cfg);

        assert_eq!(
            voice.request_url(),
            "https://api.elevenlabs.io/v1/text-to-speech/voice123?output_format=mp3_44100_128"
        );
        let body = voice.request_body("In 1997 the ocean roared.");
        assert_eq!(body["text"], "In 1997 the ocean roared.");
        assert_eq!(body["model_id"], "eleven_turbo_v2");
        assert_eq!(voice.api_key, "xi");
    }

    #[test]
    fn defaults_come_from_config() {
        let voice = ElevenLabsVoice::new(&Config::from_lookup(|_| None));
        assert!(voice.request_url().contains("/JBFqnCBsd6RMkjVDRZzb?"));
        assert_eq!(voice.request_body("x")["model_id"], "eleven_multilingual_v2");
    }
}
