use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

pub mod edge_tts;
pub mod elevenlabs;
pub mod groq;
pub mod pexels;

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub temperature: f32,
    /// Ask the provider to constrain output to a JSON object.
    pub json_response: bool,
}

/// Single-shot text completion.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Stock-footage provider.
#[async_trait]
pub trait FootageSource: Send + Sync {
    /// Download URL of the first usable result, `None` when the search is empty.
    async fn search(&self, query: &str) -> Result<Option<String>>;

    /// Streams `url` into `dest`, returning the number of bytes written.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, out_path: &Path) -> Result<()>;
}
