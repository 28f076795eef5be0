//! UI color palette and the opacity blend used by the card fade-in.

use ratatui::style::Color;

/// Theme colors for the UI.
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,      // Active borders, links, highlights
    pub success: Color,     // Positive sentiment
    pub warning: Color,     // Neutral sentiment, transient status
    pub danger: Color,      // Negative sentiment, errors
    pub text: Color,        // Primary text
    pub text_dim: Color,    // Secondary text, hints
    pub bg: Color,          // Background, fade target
    pub bg_selected: Color, // Focused form field background
    pub inactive: Color,    // Inactive borders
    pub header: Color,      // Box titles
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired palette
        Self {
            accent: Color::Rgb(250, 179, 135),
            success: Color::Rgb(166, 218, 149),
            warning: Color::Rgb(238, 212, 159),
            danger: Color::Rgb(243, 139, 168),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            bg: Color::Rgb(30, 30, 46),
            bg_selected: Color::Rgb(69, 71, 90),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(243, 139, 168),
        }
    }
}

impl Theme {
    /// Blend a foreground color toward the background by the card's
    /// opacity. 0.0 disappears into the background, 1.0 is the color
    /// itself. This is how a DOM-style opacity fade reads in a terminal.
    pub fn fade(&self, color: Color, opacity: f32) -> Color {
        let t = opacity.clamp(0.0, 1.0);
        let (br, bg, bb) = rgb(self.bg);
        let (r, g, b) = rgb(color);
        Color::Rgb(lerp(br, r, t), lerp(bg, g, t), lerp(bb, b, t))
    }
}

fn lerp(from: u8, to: u8, t: f32) -> u8 {
    (from as f32 + (to as f32 - from as f32) * t).round() as u8
}

fn rgb(color: Color) -> (u8, u8, u8) {
    match color {
        Color::Rgb(r, g, b) => (r, g, b),
        // The palette is all-RGB; anything else falls back to primary text.
        _ => (205, 214, 244),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_at_zero_is_background() {
        let theme = Theme::default();
        assert_eq!(theme.fade(theme.text, 0.0), theme.bg);
    }

    #[test]
    fn test_fade_at_one_is_the_color() {
        let theme = Theme::default();
        assert_eq!(theme.fade(theme.text, 1.0), theme.text);
    }

    #[test]
    fn test_fade_clamps_out_of_range_opacity() {
        let theme = Theme::default();
        assert_eq!(theme.fade(theme.text, -0.5), theme.bg);
        assert_eq!(theme.fade(theme.text, 2.0), theme.text);
    }

    #[test]
    fn test_fade_midpoint_sits_between() {
        let theme = Theme::default();
        let Color::Rgb(r, _, _) = theme.fade(Color::Rgb(230, 30, 46), 0.5) else {
            panic!("fade always yields an RGB color");
        };
        assert_eq!(r, 130); // halfway between 30 and 230
    }
}
