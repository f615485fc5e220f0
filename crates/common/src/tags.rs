//! Tag extraction for videos and user profiles.

use std::collections::HashSet;

use regex::Regex;

/// Maximum number of hashtags taken from a description.
pub const MAX_DESCRIPTION_HASHTAGS: usize = 5;

// Static patterns that cannot fail to compile
#[allow(clippy::unwrap_used)]
static WORD_RE: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"[a-z0-9]+").unwrap());

#[allow(clippy::unwrap_used)]
static HASHTAG_RE: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"#([A-Za-z0-9]+)").unwrap());

/// Derives search tags from free text.
///
/// Built once from the configured stop-word list and shared by the services
/// that write videos and user profiles.
#[derive(Debug, Clone, Default)]
pub struct TagExtractor {
    stop_words: HashSet<String>,
}

impl TagExtractor {
    /// Create an extractor ignoring `stop_words` (case-insensitive).
    pub fn new<I, S>(stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stop_words: stop_words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Extract tags from `text` plus the leading hashtags of `description`.
    ///
    /// Tags are lowercase alphanumeric tokens, deduplicated, in order of first
    /// occurrence.
    #[must_use]
    pub fn extract(&self, text: &str, description: Option<&str>) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut tags = Vec::new();

        let lowered = text.to_lowercase();
        for word in WORD_RE.find_iter(&lowered).map(|m| m.as_str()) {
            if self.stop_words.contains(word) {
                continue;
            }
            if seen.insert(word.to_string()) {
                tags.push(word.to_string());
            }
        }

        if let Some(description) = description {
            let hashtags = HASHTAG_RE
                .captures_iter(description)
                .filter_map(|c| c.get(1))
                .take(MAX_DESCRIPTION_HASHTAGS)
                .map(|m| m.as_str().to_lowercase());
            for tag in hashtags {
                if seen.insert(tag.clone()) {
                    tags.push(tag);
                }
            }
        }

        tags
    }

    /// Whether `word` is ignored by this extractor.
    #[must_use]
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(&word.to_lowercase())
    }
}
