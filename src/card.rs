//! Card artifacts: one rendered news item, independent of any widget.

use crate::client::NewsItem;
use crate::labels::{self, Sentiment};

pub const UNKNOWN_SOURCE: &str = "Unknown source";
pub const NO_SUMMARY: &str = "No summary available";

/// Translated summary block, labeled with the resolved language name.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedBlock {
    pub language: String,
    pub text: String,
}

/// Everything the UI needs to draw one article, with display fallbacks
/// already applied. `opacity` starts at zero and is driven upward by the
/// reveal pipeline until the card is fully visible.
#[derive(Debug, Clone)]
pub struct NewsCard {
    pub title: String,
    pub source: String,
    pub summary: String,
    pub timestamp: String,
    pub sentiment: Option<Sentiment>,
    pub translation: Option<TranslatedBlock>,
    pub url: String,
    pub opacity: f32,
}

impl NewsCard {
    /// Build a card from a wire item. There is no error path: missing
    /// fields degrade to fallback strings instead of failing the item.
    pub fn from_item(item: &NewsItem) -> Self {
        let translation = item.translated_summary.as_ref().map(|text| TranslatedBlock {
            language: labels::language_name(item.translation_language.as_deref().unwrap_or(""))
                .to_string(),
            text: text.clone(),
        });

        Self {
            title: item.title.clone(),
            source: item
                .source
                .clone()
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            summary: item
                .summary
                .clone()
                .unwrap_or_else(|| NO_SUMMARY.to_string()),
            timestamp: labels::format_timestamp(item.published_date.as_deref()),
            sentiment: item.sentiment.as_deref().and_then(Sentiment::parse),
            translation,
            url: item.url.clone(),
            opacity: 0.0,
        }
    }

    pub fn is_faded_in(&self) -> bool {
        self.opacity >= 1.0
    }
}
