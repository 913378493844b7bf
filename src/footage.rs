use crate::api::FootageSource;
use crate::config::Config;
use crate::error::FootageError;
use crate::script::GENERIC_VISUAL;
use crate::{logi, logok, logw};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

/// First word of a scene visual; single words hit more stock results.
pub fn primary_term(query: &str) -> Option<&str> {
    query.split_whitespace().next()
}

/// Ordered, de-duplicated search terms: scene word, theme, generic.
pub fn search_terms<'a>(query: &'a str, fallback_context: Option<&'a str>) -> Vec<&'a str> {
    let candidates = [primary_term(query), fallback_context, Some(GENERIC_VISUAL)];
    let mut terms: Vec<&str> = Vec::with_capacity(candidates.len());
    for term in candidates.into_iter().flatten() {
        let term = term.trim();
        if term.is_empty() || terms.iter().any(|t| t.eq_ignore_ascii_case(term)) {
            continue;
        }
        terms.push(term);
    }
    terms
}

async fn remove_partial(dest: &Path) {
    let _ = fs::remove_file(dest).await;
}

pub struct FootageRetriever {
    source: Arc<dyn FootageSource>,
    min_bytes: u64,
}

impl FootageRetriever {
    pub fn new(source: Arc<dyn FootageSource>, cfg: &Config) -> Self {
        Self {
            source,
            min_bytes: cfg.min_clip_bytes,
        }
    }

    async fn attempt(&self, term: &str, dest: &Path) -> Result<PathBuf, FootageError> {
        let url = match self.source.search(term).await {
            Ok(Some(url)) => url,
            Ok(None) => return Err(FootageError::NoResults(term.to_string())),
            Err(err) => {
                return Err(FootageError::Request {
                    query: term.to_string(),
                    message: format!("{:#}", err),
                });
            }
        };

        let bytes = match self.source.download(&url, dest).await {
            Ok(bytes) => bytes,
            Err(err) => {
                remove_partial(dest).await;
                return Err(FootageError::Request {
                    query: term.to_string(),
                    message: format!("{:#}", err),
                });
            }
        };

        let on_disk = fs::metadata(dest).await.map(|m| m.len()).unwrap_or(bytes);
        if on_disk <= self.min_bytes {
            remove_partial(dest).await;
            return Err(FootageError::TooSmall {
                query: term.to_string(),
                bytes: on_disk,
            });
        }

        Ok(dest.to_path_buf())
    }

    /// Tries the scene term, then the theme, then the generic term. Any file
    /// left by a failed attempt is removed before the next one.
    pub async fn retrieve(
        &self,
        query: &str,
        dest: &Path,
        fallback_context: Option<&str>,
    ) -> Result<PathBuf, FootageError> {
        let terms = search_terms(query, fallback_context);
        let mut tried = Vec::with_capacity(terms.len());

        for term in terms {
            if tried.is_empty() {
                logi(format!("Searching footage for '{}'...", term));
            } else {
                logi(format!("Retrying footage search with '{}'...", term));
            }
            tried.push(term.to_string());

            match self.attempt(term, dest).await {
                Ok(path) => {
                    logok(format!("Footage for '{}' -> {}", term, path.display()));
                    return Ok(path);
                }
                Err(err) => logw(format!("Footage attempt failed: {}", err)),
            }
        }

        Err(FootageError::Exhausted(tried))
    }
}
