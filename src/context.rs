use std::fmt;

/// Coarse visual theme used as a fallback footage search term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualContext {
    Underwater,
    Space,
    AncientRuins,
    Technology,
    Forest,
    DarkAtmosphere,
}

impl VisualContext {
    pub const ALL: [VisualContext; 6] = [
        VisualContext::Underwater,
        VisualContext::Space,
        VisualContext::AncientRuins,
        VisualContext::Technology,
        VisualContext::Forest,
        VisualContext::DarkAtmosphere,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VisualContext::Underwater => "Underwater",
            VisualContext::Space => "Space",
            VisualContext::AncientRuins => "Ancient Ruins",
            VisualContext::Technology => "Technology",
            VisualContext::Forest => "Forest",
            VisualContext::DarkAtmosphere => "Dark Atmosphere",
        }
    }
}

impl fmt::Display for VisualContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// First match wins.
const RULES: &[(VisualContext, &[&str])] = &[
    (
        VisualContext::Underwater,
        &["sea", "ocean", "water", "lake", "river", "island", "beach", "ship", "boat"],
    ),
    (
        VisualContext::Space,
        &["space", "star", "galaxy", "universe", "planet", "moon", "sky", "solar"],
    ),
    (
        VisualContext::AncientRuins,
        &["history", "ancient", "ruin", "civilization", "temple", "egypt", "rome"],
    ),
    (
        VisualContext::Technology,
        &["tech", "robot", "future", "ai", "cyber", "simulation", "glitch"],
    ),
    (
        VisualContext::Forest,
        &["forest", "jungle", "nature", "mountain"],
    ),
];

// Short keywords like "ai" hide inside too many words ("mountain"), so they
// only count as whole words.
fn keyword_matches(topic_lower: &str, keyword: &str) -> bool {
    if keyword.len() <= 2 {
        topic_lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == keyword)
    } else {
        topic_lower.contains(keyword)
    }
}

/// First theme with a keyword in the lower-cased topic, else Dark Atmosphere.
/// Keywords of two characters or fewer match whole words only, so "mountain"
/// is Forest rather than Technology.
pub fn classify(topic: &str) -> VisualContext {
    let t = topic.to_lowercase();
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| keyword_matches(&t, k)))
        .map(|(ctx, _)| *ctx)
        .unwrap_or(VisualContext::DarkAtmosphere)
}
