//! Theme system
//!
//! Provides:
//! - Theme struct with all UI colors
//! - Built-in presets (amber, catppuccin, nord, gruvbox)
//! - Hex color parsing for config overrides

use ratatui::style::Color;

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Main background color
    pub background: Color,
    /// Primary text color
    pub foreground: Color,
    /// Background for the focused control
    pub selection_bg: Color,
    /// Text color for the focused control
    pub selection_fg: Color,
    /// Accent color (borders, selected radio, switch on)
    pub accent: Color,
    /// Dimmed text (hints, unselected options)
    pub dimmed: Color,
    /// More dimmed text (inactive borders)
    pub dimmed_alt: Color,
    /// Cost field while editing
    pub input_highlight: Color,
    /// Tip result text
    pub result: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::amber()
    }
}

impl Theme {
    /// Amber on near-black, the default
    pub fn amber() -> Self {
        Self {
            background: Color::Rgb(13, 17, 22),      // #0d1116
            foreground: Color::Rgb(229, 234, 241),   // #e5eaf1
            selection_bg: Color::Rgb(20, 28, 42),    // #141c2a
            selection_fg: Color::Rgb(229, 234, 241), // #e5eaf1
            accent: Color::Rgb(180, 83, 9),          // #b45309
            dimmed: Color::Rgb(156, 163, 175),       // #9ca3af
            dimmed_alt: Color::Rgb(107, 114, 128),   // #6b7280
            input_highlight: Color::Rgb(180, 83, 9), // #b45309
            result: Color::Rgb(34, 197, 94),         // #22c55e
        }
    }

    /// Catppuccin Mocha theme
    pub fn catppuccin_mocha() -> Self {
        Self {
            background: Color::Rgb(30, 30, 46),         // #1e1e2e (base)
            foreground: Color::Rgb(205, 214, 244),      // #cdd6f4 (text)
            selection_bg: Color::Rgb(49, 50, 68),       // #313244 (surface0)
            selection_fg: Color::Rgb(205, 214, 244),    // #cdd6f4 (text)
            accent: Color::Rgb(137, 180, 250),          // #89b4fa (blue)
            dimmed: Color::Rgb(166, 173, 200),          // #a6adc8 (subtext0)
            dimmed_alt: Color::Rgb(147, 153, 178),      // #9399b2 (overlay2)
            input_highlight: Color::Rgb(249, 226, 175), // #f9e2af (yellow)
            result: Color::Rgb(166, 227, 161),          // #a6e3a1 (green)
        }
    }

    /// Catppuccin Latte theme (light)
    pub fn catppuccin_latte() -> Self {
        Self {
            background: Color::Rgb(239, 241, 245),     // #eff1f5 (base)
            foreground: Color::Rgb(76, 79, 105),       // #4c4f69 (text)
            selection_bg: Color::Rgb(204, 208, 218),   // #ccd0da (surface0)
            selection_fg: Color::Rgb(76, 79, 105),     // #4c4f69 (text)
            accent: Color::Rgb(30, 102, 245),          // #1e66f5 (blue)
            dimmed: Color::Rgb(108, 111, 133),         // #6c6f85 (subtext0)
            dimmed_alt: Color::Rgb(140, 143, 161),     // #8c8fa1 (overlay2)
            input_highlight: Color::Rgb(223, 142, 29), // #df8e1d (yellow)
            result: Color::Rgb(64, 160, 43),           // #40a02b (green)
        }
    }

    /// Nord theme
    pub fn nord() -> Self {
        Self {
            background: Color::Rgb(46, 52, 64),         // #2e3440 (nord0)
            foreground: Color::Rgb(236, 239, 244),      // #eceff4 (nord6)
            selection_bg: Color::Rgb(67, 76, 94),       // #434c5e (nord2)
            selection_fg: Color::Rgb(236, 239, 244),    // #eceff4 (nord6)
            accent: Color::Rgb(136, 192, 208),          // #88c0d0 (nord8)
            dimmed: Color::Rgb(216, 222, 233),          // #d8dee9 (nord4)
            dimmed_alt: Color::Rgb(76, 86, 106),        // #4c566a (nord3)
            input_highlight: Color::Rgb(235, 203, 139), // #ebcb8b (nord13)
            result: Color::Rgb(163, 190, 140),          // #a3be8c (nord14)
        }
    }

    /// Gruvbox dark theme
    pub fn gruvbox() -> Self {
        Self {
            background: Color::Rgb(40, 40, 40),         // #282828 (bg)
            foreground: Color::Rgb(235, 219, 178),      // #ebdbb2 (fg)
            selection_bg: Color::Rgb(60, 56, 54),       // #3c3836 (bg1)
            selection_fg: Color::Rgb(235, 219, 178),    // #ebdbb2 (fg)
            accent: Color::Rgb(215, 153, 33),           // #d79921 (yellow)
            dimmed: Color::Rgb(168, 153, 132),          // #a89984 (gray)
            dimmed_alt: Color::Rgb(146, 131, 116),      // #928374 (gray)
            input_highlight: Color::Rgb(250, 189, 47),  // #fabd2f (bright yellow)
            result: Color::Rgb(152, 151, 26),           // #98971a (green)
        }
    }

    /// Load theme from preset name
    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "amber" | "default" => Some(Self::amber()),
            "catppuccin-mocha" | "catppuccin_mocha" | "catppuccin" => Some(Self::catppuccin_mocha()),
            "catppuccin-latte" | "catppuccin_latte" => Some(Self::catppuccin_latte()),
            "nord" => Some(Self::nord()),
            "gruvbox" | "gruvbox-dark" | "gruvbox_dark" => Some(Self::gruvbox()),
            _ => None,
        }
    }
}

/// Parse hex color string to Color
/// Supports: #rrggbb, #rgb, rrggbb, rgb, #rrggbbaa (alpha ignored)
pub fn parse_hex_color(s: &str) -> Result<Color, ColorError> {
    let s = s.trim().trim_start_matches('#');
    if !s.is_ascii() {
        return Err(ColorError::InvalidHex);
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&s[range], 16).map_err(|_| ColorError::InvalidHex)
    };

    match s.len() {
        // #rgb -> #rrggbb
        3 => Ok(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        6 | 8 => Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        _ => Err(ColorError::InvalidLength),
    }
}

/// Color parsing error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ColorError {
    #[error("invalid color length (expected 3, 6, or 8 hex chars)")]
    InvalidLength,
    #[error("invalid hex character")]
    InvalidHex,
}
