//! Theme tokens resolved into decoration colors and visual classes

use crate::color::{resolve_color, ColorError, Rgba};
use crate::decoration::DecorationClass;
use crate::placeholder::PlaceholderPalette;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Editor color themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditorTheme {
    Light,
    #[default]
    Dark,
    SeeDark,
    /// Legacy name kept for old configs; renders as `Dark`
    SchemaEditorDark,
}

impl EditorTheme {
    pub const ALL: [EditorTheme; 4] = [
        EditorTheme::Light,
        EditorTheme::Dark,
        EditorTheme::SeeDark,
        EditorTheme::SchemaEditorDark,
    ];

    pub fn is_dark(self) -> bool {
        self != EditorTheme::Light
    }

    pub fn name(self) -> &'static str {
        match self {
            EditorTheme::Light => "light",
            EditorTheme::Dark => "dark",
            EditorTheme::SeeDark => "seeDark",
            EditorTheme::SchemaEditorDark => "schemaEditorDark",
        }
    }

    /// Next theme in `ALL`, wrapping around
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for EditorTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EditorTheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EditorTheme::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown theme '{}'", s))
    }
}

/// Concrete colors for every diff decoration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffPalette {
    pub added_bg: Rgba,
    pub removed_bg: Rgba,
    pub modified_bg: Rgba,
    pub inline_added_bg: Rgba,
    pub inline_added_border: Rgba,
    pub inline_removed_bg: Rgba,
    pub inline_removed_border: Rgba,
    pub stripe1: Rgba,
    pub stripe2: Rgba,
    pub placeholder_border: Rgba,
    /// Surface background the translucent colors are composited over
    pub surface_bg: Rgba,
}

const DARK: DiffPalette = DiffPalette {
    added_bg: Rgba::new(152, 195, 121, 0.15),
    removed_bg: Rgba::new(224, 108, 117, 0.15),
    modified_bg: Rgba::new(229, 192, 123, 0.15),
    inline_added_bg: Rgba::new(80, 200, 100, 0.5),
    inline_added_border: Rgba::new(80, 200, 100, 0.6),
    inline_removed_bg: Rgba::new(240, 80, 80, 0.5),
    inline_removed_border: Rgba::new(240, 80, 80, 0.6),
    stripe1: Rgba::opaque(0x48, 0x4c, 0x52),
    stripe2: Rgba::opaque(0x3a, 0x3e, 0x44),
    placeholder_border: Rgba::opaque(0x5a, 0x5e, 0x64),
    surface_bg: Rgba::opaque(0x2d, 0x30, 0x35),
};

// Light backgrounds get a higher alpha to keep contrast
const LIGHT: DiffPalette = DiffPalette {
    added_bg: Rgba::new(152, 195, 121, 0.25),
    removed_bg: Rgba::new(224, 108, 117, 0.25),
    modified_bg: Rgba::new(229, 192, 123, 0.25),
    inline_added_bg: Rgba::new(80, 200, 100, 0.4),
    inline_added_border: Rgba::new(80, 200, 100, 0.5),
    inline_removed_bg: Rgba::new(240, 80, 80, 0.4),
    inline_removed_border: Rgba::new(240, 80, 80, 0.5),
    stripe1: Rgba::opaque(0xe0, 0xe0, 0xe0),
    stripe2: Rgba::opaque(0xec, 0xec, 0xec),
    placeholder_border: Rgba::opaque(0xd0, 0xd0, 0xd0),
    surface_bg: Rgba::opaque(0xf8, 0xf9, 0xfa),
};

/// Resolve a theme to its palette
pub fn resolve(theme: EditorTheme) -> DiffPalette {
    match theme {
        EditorTheme::Light => LIGHT,
        EditorTheme::Dark | EditorTheme::SeeDark | EditorTheme::SchemaEditorDark => DARK,
    }
}

impl DiffPalette {
    pub fn placeholder(&self) -> PlaceholderPalette {
        PlaceholderPalette {
            stripe1: self.stripe1,
            stripe2: self.stripe2,
            border: self.placeholder_border,
        }
    }
}

/// User overrides for palette tokens; values may name an entry in `defs`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaletteOverrides {
    pub defs: HashMap<String, String>,
    pub added_bg: Option<String>,
    pub removed_bg: Option<String>,
    pub modified_bg: Option<String>,
    pub inline_added_bg: Option<String>,
    pub inline_added_border: Option<String>,
    pub inline_removed_bg: Option<String>,
    pub inline_removed_border: Option<String>,
    pub stripe1: Option<String>,
    pub stripe2: Option<String>,
    pub placeholder_border: Option<String>,
    pub surface_bg: Option<String>,
}

impl PaletteOverrides {
    /// Apply every valid override; invalid values are reported and skipped
    pub fn apply(
        &self,
        mut palette: DiffPalette,
    ) -> (DiffPalette, Vec<(&'static str, ColorError)>) {
        let mut errors = Vec::new();
        let mut set = |name: &'static str, value: &Option<String>, slot: &mut Rgba| {
            if let Some(value) = value {
                match resolve_color(value, &self.defs) {
                    Ok(color) => *slot = color,
                    Err(err) => errors.push((name, err)),
                }
            }
        };
        set("added_bg", &self.added_bg, &mut palette.added_bg);
        set("removed_bg", &self.removed_bg, &mut palette.removed_bg);
        set("modified_bg", &self.modified_bg, &mut palette.modified_bg);
        set("inline_added_bg", &self.inline_added_bg, &mut palette.inline_added_bg);
        set(
            "inline_added_border",
            &self.inline_added_border,
            &mut palette.inline_added_border,
        );
        set("inline_removed_bg", &self.inline_removed_bg, &mut palette.inline_removed_bg);
        set(
            "inline_removed_border",
            &self.inline_removed_border,
            &mut palette.inline_removed_border,
        );
        set("stripe1", &self.stripe1, &mut palette.stripe1);
        set("stripe2", &self.stripe2, &mut palette.stripe2);
        set(
            "placeholder_border",
            &self.placeholder_border,
            &mut palette.placeholder_border,
        );
        set("surface_bg", &self.surface_bg, &mut palette.surface_bg);
        (palette, errors)
    }
}

/// Style registered for a visual class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassStyle {
    pub background: Rgba,
    pub border: Option<Rgba>,
    pub strikethrough: bool,
}

/// Caches the palette and class registry for the current theme
#[derive(Debug, Clone)]
pub struct ThemeBinding {
    theme: EditorTheme,
    overrides: PaletteOverrides,
    palette: DiffPalette,
    classes: FxHashMap<DecorationClass, ClassStyle>,
    /// Bumped every time classes are re-registered
    generation: u64,
}

impl ThemeBinding {
    pub fn new(theme: EditorTheme) -> Self {
        Self::with_overrides(theme, PaletteOverrides::default())
    }

    pub fn with_overrides(theme: EditorTheme, overrides: PaletteOverrides) -> Self {
        let mut binding = Self {
            theme,
            overrides,
            palette: resolve(theme),
            classes: FxHashMap::default(),
            generation: 0,
        };
        binding.register();
        binding
    }

    pub fn theme(&self) -> EditorTheme {
        self.theme
    }

    pub fn palette(&self) -> &DiffPalette {
        &self.palette
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn style(&self, class: DecorationClass) -> Option<&ClassStyle> {
        self.classes.get(&class)
    }

    /// Switch themes. Only re-registers classes when the theme identity
    /// changes; returns whether it did.
    pub fn rebind(&mut self, theme: EditorTheme) -> bool {
        if theme == self.theme {
            return false;
        }
        self.theme = theme;
        self.register();
        true
    }

    fn register(&mut self) {
        let (palette, errors) = self.overrides.apply(resolve(self.theme));
        for (token, err) in errors {
            tracing::warn!(token, %err, "ignoring palette override");
        }
        self.palette = palette;

        let p = &self.palette;
        self.classes.clear();
        for class in DecorationClass::ALL {
            let style = match class {
                DecorationClass::LineAdded => plain(p.added_bg),
                DecorationClass::LineRemoved => plain(p.removed_bg),
                DecorationClass::LineModified => plain(p.modified_bg),
                DecorationClass::InlineAdded => ClassStyle {
                    background: p.inline_added_bg,
                    border: Some(p.inline_added_border),
                    strikethrough: false,
                },
                DecorationClass::InlineRemoved => ClassStyle {
                    background: p.inline_removed_bg,
                    border: Some(p.inline_removed_border),
                    strikethrough: true,
                },
                DecorationClass::Placeholder => ClassStyle {
                    background: p.stripe1,
                    border: Some(p.placeholder_border),
                    strikethrough: false,
                },
            };
            self.classes.insert(class, style);
        }
        self.generation += 1;
        tracing::debug!(
            theme = %self.theme,
            generation = self.generation,
            "registered diff classes"
        );
    }
}

fn plain(background: Rgba) -> ClassStyle {
    ClassStyle {
        background,
        border: None,
        strikethrough: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_variants_share_palette() {
        assert_eq!(resolve(EditorTheme::SeeDark), resolve(EditorTheme::Dark));
        assert_eq!(resolve(EditorTheme::SchemaEditorDark), resolve(EditorTheme::Dark));
        assert_ne!(resolve(EditorTheme::Light), resolve(EditorTheme::Dark));
    }

    #[test]
    fn test_placeholder_palette_from_theme() {
        let p = resolve(EditorTheme::Light).placeholder();
        assert_eq!(p.stripe1, Rgba::opaque(0xe0, 0xe0, 0xe0));
        assert_eq!(p.stripe2, Rgba::opaque(0xec, 0xec, 0xec));
        assert_eq!(p.border, Rgba::opaque(0xd0, 0xd0, 0xd0));
    }

    #[test]
    fn test_theme_from_str() {
        assert_eq!("seeDark".parse::<EditorTheme>(), Ok(EditorTheme::SeeDark));
        assert_eq!("LIGHT".parse::<EditorTheme>(), Ok(EditorTheme::Light));
        assert!("solarized".parse::<EditorTheme>().is_err());
        assert_eq!(EditorTheme::SchemaEditorDark.next(), EditorTheme::Light);
    }

    #[test]
    fn test_rebind_only_on_identity_change() {
        let mut binding = ThemeBinding::new(EditorTheme::Dark);
        assert_eq!(binding.generation(), 1);
        assert!(!binding.rebind(EditorTheme::Dark));
        assert_eq!(binding.generation(), 1);

        assert!(binding.rebind(EditorTheme::Light));
        assert_eq!(binding.generation(), 2);
        assert_eq!(
            binding.style(DecorationClass::LineAdded).map(|s| s.background),
            Some(resolve(EditorTheme::Light).added_bg)
        );
    }

    #[test]
    fn test_every_class_is_registered() {
        let binding = ThemeBinding::new(EditorTheme::Light);
        for class in DecorationClass::ALL {
            assert!(binding.style(class).is_some(), "{}", class.as_str());
        }
        assert!(binding.style(DecorationClass::InlineRemoved).unwrap().strikethrough);
    }

    #[test]
    fn test_overrides_survive_rebind() {
        let mut defs = HashMap::new();
        defs.insert("green".to_string(), "#00ff00".to_string());
        let overrides = PaletteOverrides {
            defs,
            added_bg: Some("green".to_string()),
            stripe2: Some("not-a-color".to_string()),
            ..Default::default()
        };
        let mut binding = ThemeBinding::with_overrides(EditorTheme::Dark, overrides);
        assert_eq!(binding.palette().added_bg, Rgba::opaque(0, 255, 0));
        assert_eq!(binding.palette().stripe2, resolve(EditorTheme::Dark).stripe2);

        binding.rebind(EditorTheme::Light);
        assert_eq!(binding.palette().added_bg, Rgba::opaque(0, 255, 0));
        assert_eq!(binding.palette().stripe1, resolve(EditorTheme::Light).stripe1);
    }
}
