use super::SpeechSynthesizer;
use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::fs;
use tokio::process::Command;

/// Microsoft Edge neural voices through the `edge-tts` command-line tool.
pub struct EdgeTtsVoice {
    program: String,
    voice: String,
}

impl EdgeTtsVoice {
    pub fn new(cfg: &Config) -> Self {
        Self {
            program: "edge-tts".to_string(),
            voice: cfg.tts_voice.clone(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn command(&self, text: &str, out_path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--voice")
            .arg(&self.voice)
            // One token, so narration starting with '-' is not read as a flag.
            .arg(format!("--text={}", text))
            .arg("--write-media")
            .arg(out_path)
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl SpeechSynthesizer for EdgeTtsVoice {
    async fn synthesize(&self, text: &str, out_path: &Path) -> Result<()> {
        let output = self
            .command(text, out_path)
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{} failed ({}): {}", self.program, output.status, stderr.trim());
        }

        let size = fs::metadata(out_path)
            .await
            .map(|m| m.len())
            .with_context(|| format!("{} produced no file at {}", self.program, out_path.display()))?;
        if size == 0 {
            anyhow::bail!("{} wrote an empty file at {}", self.program, out_path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_voice_text_and_output() {
        let cfg = Config::from_lookup(|_| None);
        let voice = EdgeTtsVoice::new(&cfg);
        let cmd = voice.command("Hello there.", Path::new("/tmp/v.mp3"));
        let args: Vec<String> = cmd
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "--voice",
                "en-US-ChristopherNeural",
                "--text=Hello there.",
                "--write-media",
                "/tmp/v.mp3"
            ]
        );
    }

    #[test]
    fn leading_dash_stays_inside_text_argument() {
        let cfg = Config::from_lookup(|_| None);
        let voice = EdgeTtsVoice::new(&cfg);
        let cmd = voice.command("-40 degrees at the pole.", Path::new("v.mp3"));
        let args: Vec<String> = cmd
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args.len(), 5);
        assert_eq!(args[2], "--text=-40 degrees at the pole.");
        assert!(!args.iter().any(|a| a == "-40 degrees at the pole."));
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let cfg = Config::from_lookup(|_| None);
        let voice = EdgeTtsVoice::new(&cfg).with_program("definitely-not-edge-tts-xyz");
        let dir = tempfile::tempdir().unwrap();
        let err = voice
            .synthesize("hi", &dir.path().join("v.mp3"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("definitely-not-edge-tts-xyz"));
    }
}
