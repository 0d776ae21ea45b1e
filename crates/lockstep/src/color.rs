//! Terminal colors for diff palettes

use lockstep_core::{DiffPalette, EditorTheme, Rgba};
use ratatui::style::Color;

/// Terminal color for an already opaque value; alpha is ignored
pub fn rgb(color: Rgba) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

/// Composite a palette color over the surface and convert it for the terminal
pub fn to_color(rgba: Rgba, surface: Rgba) -> Color {
    rgb(rgba.over(surface))
}

/// Colors for chrome that the diff palette does not cover
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UiColors {
    pub surface: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub status_bg: Color,
}

impl UiColors {
    pub fn for_theme(theme: EditorTheme, palette: &DiffPalette) -> Self {
        let surface = to_color(palette.surface_bg, palette.surface_bg);
        if theme.is_dark() {
            Self {
                surface,
                text: Color::Rgb(0xab, 0xb2, 0xbf),
                muted: Color::Rgb(0x63, 0x6d, 0x83),
                accent: Color::Rgb(0x61, 0xaf, 0xef),
                status_bg: Color::Rgb(0x21, 0x25, 0x2b),
            }
        } else {
            Self {
                surface,
                text: Color::Rgb(0x38, 0x3a, 0x42),
                muted: Color::Rgb(0xa0, 0xa1, 0xa7),
                accent: Color::Rgb(0x40, 0x78, 0xf2),
                status_bg: Color::Rgb(0xe5, 0xe5, 0xe6),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockstep_core::theme;

    #[test]
    fn test_translucent_colors_are_composited() {
        let surface = Rgba::opaque(0, 0, 0);
        assert_eq!(to_color(Rgba::new(200, 100, 50, 0.5), surface), Color::Rgb(100, 50, 25));
        assert_eq!(to_color(Rgba::opaque(1, 2, 3), surface), Color::Rgb(1, 2, 3));
    }

    #[test]
    fn test_ui_colors_follow_theme() {
        let dark = UiColors::for_theme(EditorTheme::Dark, &theme::resolve(EditorTheme::Dark));
        let light = UiColors::for_theme(EditorTheme::Light, &theme::resolve(EditorTheme::Light));
        assert_eq!(dark.surface, Color::Rgb(0x2d, 0x30, 0x35));
        assert_eq!(light.surface, Color::Rgb(0xf8, 0xf9, 0xfa));
        assert_ne!(dark.text, light.text);
    }
}
