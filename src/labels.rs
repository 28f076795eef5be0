//! Pure display lookups: language codes, sentiment styles, timestamps.

use chrono::{DateTime, NaiveDate};
use ratatui::style::{Color, Modifier, Style};

use crate::theme::Theme;

const TIMESTAMP_FORMAT: &str = "%b %-d, %Y %H:%M";

/// Resolve a translation language code to its display name.
/// Unknown codes are shown as-is.
pub fn language_name(code: &str) -> &str {
    match code {
        "hi" => "Hindi",
        "mr" => "Marathi",
        "es" => "Spanish",
        "fr" => "French",
        other => other,
    }
}

/// Sentiment assigned to an article by the news server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Parse the wire value. Anything unrecognized means "no sentiment"
    /// rather than a parse failure, so an odd server value never kills
    /// the whole response.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Self::Positive),
            "negative" => Some(Self::Negative),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }

    /// Accent color for the card carrying this sentiment.
    pub fn accent(&self, theme: &Theme) -> Color {
        match self {
            Self::Positive => theme.success,
            Self::Negative => theme.danger,
            Self::Neutral => theme.warning,
        }
    }

    /// Style for the inline sentiment badge.
    pub fn badge(&self, theme: &Theme) -> Style {
        Style::default()
            .bg(self.accent(theme))
            .fg(theme.bg)
            .add_modifier(Modifier::BOLD)
    }
}

/// Format a published timestamp for display. Absent input yields an empty
/// string; a string none of the known formats can parse is shown unchanged.
pub fn format_timestamp(value: Option<&str>) -> String {
    let Some(raw) = value else {
        return String::new();
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format(TIMESTAMP_FORMAT).to_string();
    }
    // RSS-style pubDate
    if let Ok(parsed) = DateTime::parse_from_rfc2822(raw) {
        return parsed.format(TIMESTAMP_FORMAT).to_string();
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return parsed.format("%b %-d, %Y").to_string();
    }

    raw.to_string()
}
