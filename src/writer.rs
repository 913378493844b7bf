use crate::api::{CompletionClient, CompletionRequest};
use crate::context::VisualContext;
use crate::script::{GENERIC_VISUAL, Script};
use crate::{logi, logw};
use std::sync::Arc;

const SCRIPT_TEMPERATURE: f32 = 0.75;

pub struct ScriptGenerator {
    llm: Arc<dyn CompletionClient>,
}

pub fn script_prompt(topic: &str, context: Option<VisualContext>) -> String {
    let ctx = context.map(|c| c.as_str()).unwrap_or(GENERIC_VISUAL);

    let mut prompt = format!(
        "You are a YouTube Expert. Create a 30-second YouTube Shorts script about '{topic}' strictly in JSON format.\n\
         \n\
         Return STRICT JSON with exactly these keys: \"title\", \"description\", \"tags\", \"mood\", \"scenes\".\n\
         - \"tags\" is a list of hashtags.\n\
         - \"mood\" is one word such as Suspense, Dark, Chill or Epic.\n\
         - \"scenes\" is a list of objects with \"text\" (one narration sentence) and \"visual\".\n\
         \n\
         CRITICAL VISUAL INSTRUCTIONS:\n\
         1. The \"visual\" field must be a 1-2 word search term for a stock footage site.\n\
         2. Use concrete physical things a camera can film (e.g. \"Shark\", \"Ship\", \"Telescope\"). NEVER use abstract words like \"Mystery\", \"Fear\" or \"Idea\".\n"
    );

    if let Some(context) = context {
        prompt.push_str(&format!(
            "3. CONTEXT RULE: EVERY visual must fit the theme \"{context}\". If the theme is underwater, every visual must be related to water; if it is space, every visual must be space-related. NEVER use \"City\" or \"Street\" unless the theme demands it.\n\
             4. Current Context: {context}\n"
        ));
    }

    prompt.push_str(&format!(
        "\n\
         Structure Example:\n\
         {{\n\
           \"title\": \"Viral Title\",\n\
           \"description\": \"Video description...\",\n\
           \"tags\": [\"#Tag1\", \"#Tag2\"],\n\
           \"mood\": \"Suspense\",\n\
           \"scenes\": [\n\
             {{\"text\": \"Hook sentence.\", \"visual\": \"{ctx}\"}},\n\
             {{\"text\": \"Body sentence.\", \"visual\": \"Dark {ctx}\"}}\n\
           ]\n\
         }}\n"
    ));
    prompt
}

impl ScriptGenerator {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { llm }
    }

    /// Always returns a script with at least one scene.
    pub async fn generate(&self, topic: &str, context: Option<VisualContext>) -> Script {
        let label = context.map(|c| c.as_str()).unwrap_or("none");
        logi(format!("Writing script for '{}' (context: {})...", topic, label));

        let request = CompletionRequest {
            prompt: script_prompt(topic, context),
            temperature: SCRIPT_TEMPERATURE,
            json_response: true,
        };
        let fallback_visual = context.map(|c| c.as_str()).unwrap_or(GENERIC_VISUAL);

        let parsed = match self.llm.complete(&request).await {
            Ok(text) => Script::from_json(&text, fallback_visual),
            Err(err) => Err(err),
        };

        match parsed {
            Ok(script) => script,
            Err(err) => {
                logw(format!("Script error: {:#}", err));
                Script::fallback(topic, context.map(|c| c.as_str()))
            }
        }
    }
}
