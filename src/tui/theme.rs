// Centralized styling for every screen. Colors follow the configured theme.

use ratatui::style::{Color, Modifier, Style};

use crate::config::Theme;

/// Colors used by a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub text: Color,
    pub text_dim: Color,
}

impl Palette {
    /// Warm dark palette.
    pub const DARK: Self = Self {
        primary: Color::Rgb(211, 134, 155),
        secondary: Color::Rgb(177, 98, 134),
        accent: Color::Rgb(251, 241, 199),
        success: Color::Rgb(184, 187, 38),
        warning: Color::Rgb(250, 189, 47),
        error: Color::Rgb(251, 73, 52),
        text: Color::Rgb(235, 219, 178),
        text_dim: Color::Rgb(146, 131, 116),
    };

    /// Same hues, darkened for light backgrounds.
    pub const LIGHT: Self = Self {
        primary: Color::Rgb(143, 63, 113),
        secondary: Color::Rgb(177, 98, 134),
        accent: Color::Rgb(60, 56, 54),
        success: Color::Rgb(121, 116, 14),
        warning: Color::Rgb(181, 118, 20),
        error: Color::Rgb(157, 0, 6),
        text: Color::Rgb(60, 56, 54),
        text_dim: Color::Rgb(124, 111, 100),
    };

    #[must_use]
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::DARK,
            Theme::Light => Self::LIGHT,
        }
    }
}

/// Ready-made styles derived from a palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Styles {
    pub title: Style,
    pub subtitle: Style,
    pub text: Style,
    pub text_dim: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub border: Style,
    pub input: Style,
    pub list_item: Style,
    pub list_item_active: Style,
}

impl Styles {
    #[must_use]
    pub fn new(palette: Palette) -> Self {
        Self {
            title: Style::default()
                .fg(palette.primary)
                .add_modifier(Modifier::BOLD),
            subtitle: Style::default().fg(palette.secondary),
            text: Style::default().fg(palette.text),
            text_dim: Style::default().fg(palette.text_dim),
            success: Style::default().fg(palette.success),
            warning: Style::default().fg(palette.warning),
            error: Style::default().fg(palette.error),
            border: Style::default().fg(palette.secondary),
            input: Style::default().fg(palette.accent),
            list_item: Style::default().fg(palette.text),
            list_item_active: Style::default()
                .fg(palette.primary)
                .add_modifier(Modifier::BOLD),
        }
    }

    #[must_use]
    pub fn for_theme(theme: Theme) -> Self {
        Self::new(Palette::for_theme(theme))
    }
}
