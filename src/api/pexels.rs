use super::FootageSource;
use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};

const SEARCH_URL: &str = "https://api.pexels.com/videos/search";
const DOWNLOAD_CHUNK_BYTES: usize = 64 * 1024;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    videos: Vec<Video>,
}

#[derive(Debug, Deserialize)]
struct Video {
    #[serde(default)]
    video_files: Vec<VideoFile>,
}

#[derive(Debug, Deserialize)]
struct VideoFile {
    #[serde(default)]
    link: String,
}

fn first_link(body: &str) -> Result<Option<String>> {
    let parsed: SearchResponse =
        serde_json::from_str(body).context("Failed to parse Pexels search response")?;
    Ok(parsed
        .videos
        .into_iter()
        .next()
        .and_then(|v| v.video_files.into_iter().find(|f| !f.link.is_empty()))
        .map(|f| f.link))
}

pub struct PexelsClient {
    client: Client,
    api_key: String,
}

impl PexelsClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_key: cfg.pexels_key.clone(),
        })
    }
}

#[async_trait]
impl FootageSource for PexelsClient {
    async fn search(&self, query: &str) -> Result<Option<String>> {
        let resp = self
            .client
            .get(SEARCH_URL)
            .header("Authorization", &self.api_key)
            .query(&[
                ("query", query),
                ("per_page", "1"),
                ("orientation", "portrait"),
                ("size", "medium"),
            ])
            .timeout(Duration::from_secs(60))
            .send()
            .await
            .context("Pexels search request failed")?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("Pexels search HTTP {}", status.as_u16());
        }
        first_link(&body)
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut resp = self
            .client
            .get(url)
            .send()
            .await
            .context("Pexels download request failed")?
            .error_for_status()
            .context("Pexels download rejected")?;

        let file = fs::File::create(dest)
            .await
            .with_context(|| format!("Failed to create {}", dest.display()))?;
        let mut out = BufWriter::with_capacity(DOWNLOAD_CHUNK_BYTES, file);

        let mut written = 0u64;
        while let Some(chunk) = resp.chunk().await.context("Pexels download interrupted")? {
            out.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        out.flush().await?;

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_file_of_first_video() {
        let body = r#"{
            "page": 1,
            "videos": [
                {"id": 1, "video_files": [
                    {"quality": "sd", "link": ""},
                    {"quality": "hd", "link": "https://videos.pexels.com/1.mp4"}
                ]},
                {"id": 2, "video_files": [{"link": "https://videos.pexels.com/2.mp4"}]}
            ]
        }"#;
        assert_eq!(
            first_link(body).unwrap().as_deref(),
            Some("https://videos.pexels.com/1.mp4")
        );
    }

    #[test]
    fn empty_results_are_not_an_error() {
        assert_eq!(first_link(r#"{"videos": []}"#).unwrap(), None);
        assert_eq!(first_link(r#"{"total_results": 0}"#).unwrap(), None);
        assert_eq!(first_link(r#"{"videos": [{"video_files": []}]}"#).unwrap(), None);
        assert!(first_link("Forbidden").is_err());
    }
}
