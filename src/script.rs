use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const GENERIC_VISUAL: &str = "Dark Atmosphere";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub text: String,
    #[serde(default)]
    pub visual: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_mood")]
    pub mood: String,
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

fn default_mood() -> String {
    "Chill".to_string()
}

impl Script {
    /// Parses an LLM response. Blank scenes are dropped, blank visuals get
    /// `fallback_visual`; an empty scene list is an error.
    pub fn from_json(text: &str, fallback_visual: &str) -> Result<Self> {
        let mut script: Script =
            serde_json::from_str(text.trim()).context("Failed to parse script JSON")?;

        script.scenes.retain(|s| !s.text.trim().is_empty());
        for scene in &mut script.scenes {
            scene.text = scene.text.trim().to_string();
            if scene.visual.trim().is_empty() {
                scene.visual = fallback_visual.to_string();
            }
        }

        if script.scenes.is_empty() {
            anyhow::bail!("script has no scenes");
        }
        if script.mood.trim().is_empty() {
            script.mood = default_mood();
        }
        Ok(script)
    }

    pub fn fallback(topic: &str, visual: Option<&str>) -> Self {
        Self {
            title: topic.to_string(),
            description: format!("Amazing facts about {}", topic),
            tags: vec!["#Shorts".to_string()],
            mood: "Suspense".to_string(),
            scenes: vec![Scene {
                text: format!("Did you know this about {}?", topic),
                visual: visual.unwrap_or(GENERIC_VISUAL).to_string(),
            }],
        }
    }

    /// Scene texts joined by a single space, in order.
    pub fn narration_text(&self) -> String {
        self.scenes
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_script() {
        let raw = r##"{
            "title": "The Bloop",
            "description": "A sound from the deep.",
            "tags": ["#Ocean", "#Mystery"],
            "mood": "Suspense",
            "scenes": [
                {"text": "In 1997 something roared.", "visual": "Ocean"},
                {"text": "Nobody knows what.", "visual": "Dark Water"}
            ]
        }"##;
        let script = Script::from_json(raw, "Underwater").unwrap();
        assert_eq!(script.title, "The Bloop");
        assert_eq!(script.tags, vec!["#Ocean", "#Mystery"]);
        assert_eq!(script.scenes.len(), 2);
        assert_eq!(script.scenes[1].visual, "Dark Water");
        assert_eq!(
            script.narration_text(),
            "In 1997 something roared. Nobody knows what."
        );
    }

    #[test]
    fn missing_fields_get_defaults() {
        let raw = r#"{"scenes": [{"text": "Hook.", "visual": ""}, {"text": "  "}]}"#;
        let script = Script::from_json(raw, "Space").unwrap();
        assert_eq!(script.mood, "Chill");
        assert!(script.tags.is_empty());
        assert_eq!(script.scenes.len(), 1);
        assert_eq!(script.scenes[0].visual, "Space");
    }

    #[test]
    fn rejects_empty_or_malformed_scripts() {
        assert!(Script::from_json(r#"{"title": "x", "scenes": []}"#, "Space").is_err());
        assert!(Script::from_json("not json", "Space").is_err());
        assert!(Script::from_json(r#"{"scenes": "oops"}"#, "Space").is_err());
    }

    #[test]
    fn fallback_has_one_scene() {
        let script = Script::fallback("The Bloop Mystery", Some("Underwater"));
        assert_eq!(script.title, "The Bloop Mystery");
        assert_eq!(script.description, "Amazing facts about The Bloop Mystery");
        assert_eq!(script.tags, vec!["#Shorts"]);
        assert_eq!(script.mood, "Suspense");
        assert_eq!(script.scenes.len(), 1);
        assert_eq!(script.scenes[0].visual, "Underwater");

        let generic = Script::fallback("x", None);
        assert_eq!(generic.scenes[0].visual, GENERIC_VISUAL);
    }
}
