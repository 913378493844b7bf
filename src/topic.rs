use crate::api::{CompletionClient, CompletionRequest};
use crate::{logi, logw};
use rand::Rng;
use rand::seq::SliceRandom;
use std::sync::Arc;

pub const FALLBACK_TOPIC: &str = "The Bloop Mystery";

pub const NICHES: &[&str] = &[
    "A terrifying Space Anomaly",
    "A Dark Psychology Fact",
    "A Bizarre Historical Event",
    "A Deep Sea Mystery",
    "A Glitch in the Simulation",
    "A Future Technology Prediction",
    "A Serial Killer Fact",
    "An Ancient Civilization Mystery",
];

const TOPIC_TEMPERATURE: f32 = 0.9;

pub struct TopicGenerator {
    llm: Arc<dyn CompletionClient>,
}

fn topic_prompt(niche: &str) -> String {
    format!(
        "Generate ONE catchy, viral topic for a YouTube Short about: {}.\n\
         Make it sound shocking or mysterious.\n\
         Output ONLY the raw topic text. No quotes.\n",
        niche
    )
}

fn clean_topic(raw: &str) -> Option<String> {
    let cleaned = raw
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '“' || c == '”')
        .trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

pub fn pick_niche<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    NICHES.choose(rng).copied().unwrap_or(NICHES[0])
}

impl TopicGenerator {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { llm }
    }

    pub async fn generate(&self) -> String {
        let niche = pick_niche(&mut rand::thread_rng());
        self.generate_for(niche).await
    }

    /// Never fails: any request problem yields [`FALLBACK_TOPIC`].
    pub async fn generate_for(&self, niche: &str) -> String {
        logi(format!("Brainstorming topic about '{}'...", niche));

        let request = CompletionRequest {
            prompt: topic_prompt(niche),
            temperature: TOPIC_TEMPERATURE,
            json_response: false,
        };

        match self.llm.complete(&request).await {
            Ok(text) => match clean_topic(&text) {
                Some(topic) => topic,
                None => {
                    logw("Topic response was empty; using fallback topic.");
                    FALLBACK_TOPIC.to_string()
                }
            },
            Err(err) => {
                logw(format!("Topic error: {:#}", err));
                FALLBACK_TOPIC.to_string()
            }
        }
    }
}
