use crate::config::Config;
use crate::{logi, logw};
use rand::Rng;
use rand::seq::SliceRandom;
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

const PLAYABLE_EXTENSIONS: &[&str] = &["mp3", "m4a", "wav", "ogg", "flac", "aac"];

pub fn is_playable(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| PLAYABLE_EXTENSIONS.iter().any(|p| ext.eq_ignore_ascii_case(p)))
        .unwrap_or(false)
}

/// "  suspense " -> "Suspense"
pub fn canonical_mood(mood: &str) -> String {
    let lower = mood.trim().to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn tracks_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut out: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_playable(p))
        .collect();
    out.sort();
    out
}

fn tracks_under(root: &Path) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_playable(e.path()))
        .map(|e| e.into_path())
        .collect();
    out.sort();
    out
}

pub struct MusicSelector {
    root: PathBuf,
}

impl MusicSelector {
    pub fn new(cfg: &Config) -> Self {
        Self::with_root(cfg.music_dir.clone())
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    // A mood names one folder directly under the root, nothing else.
    fn mood_dir(&self, mood: &str) -> Option<PathBuf> {
        let mut parts = Path::new(mood).components();
        match (parts.next(), parts.next()) {
            (Some(Component::Normal(name)), None) => Some(self.root.join(name)),
            _ => None,
        }
    }

    pub fn select(&self, mood: &str) -> Option<PathBuf> {
        self.select_with(mood, &mut rand::thread_rng())
    }

    /// Picks from `<root>/<Mood>/` first, then from anything under the root.
    /// `None` means the library is empty; callers render narration-only audio.
    pub fn select_with<R: Rng + ?Sized>(&self, mood: &str, rng: &mut R) -> Option<PathBuf> {
        let mood = canonical_mood(mood);
        if let Some(mood_dir) = self.mood_dir(&mood) {
            if let Some(track) = tracks_in(&mood_dir).choose(rng) {
                logi(format!("Music for mood '{}': {}", mood, track.display()));
                return Some(track.clone());
            }
        }

        match tracks_under(&self.root).choose(rng) {
            Some(track) => {
                logi(format!("No '{}' music; using {}", mood, track.display()));
                Some(track.clone())
            }
            None => {
                logw(format!(
                    "No music found under {}; narration only.",
                    self.root.display()
                ));
                None
            }
        }
    }
}
