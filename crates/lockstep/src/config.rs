//! Configuration file support for lockstep
//!
//! Config file location: `~/.config/lockstep/config.toml` (XDG_CONFIG_HOME)
//!
//! Example config:
//! ```toml
//! [ui]
//! theme = "dark"
//! line_numbers = true
//!
//! [ui.palette]
//! added_bg = "green"
//! stripe1 = "#40444a"
//!
//! [ui.palette.defs]
//! green = "rgba(80, 200, 100, 0.3)"
//!
//! [editor]
//! read_only_left = false
//! read_only_right = false
//!
//! [scroll]
//! guard_ms = 50
//! step = 4
//!
//! [diff]
//! debounce_ms = 200
//! ```

use lockstep_core::{EditorTheme, PaletteOverrides};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// UI configuration
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Color theme: "light", "dark", "seeDark" or "schemaEditorDark"
    pub theme: EditorTheme,
    /// Show the line number gutter
    pub line_numbers: bool,
    /// Overrides for individual diff palette tokens
    pub palette: PaletteOverrides,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: EditorTheme::default(),
            line_numbers: true,
            palette: PaletteOverrides::default(),
        }
    }
}

/// Editing configuration
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub read_only_left: bool,
    pub read_only_right: bool,
}

/// Horizontal scroll configuration
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// How long a pane ignores its own scroll events after a mirrored scroll
    pub guard_ms: u64,
    /// Columns moved per horizontal scroll step
    pub step: u32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            guard_ms: 50,
            step: 4,
        }
    }
}

/// Diff recompute configuration
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Quiet period after an edit before the diff is recomputed
    pub debounce_ms: u64,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self { debounce_ms: 200 }
    }
}

/// Root configuration
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub ui: UiConfig,
    pub editor: EditorConfig,
    pub scroll: ScrollConfig,
    pub diff: DiffConfig,
}

impl Config {
    /// Get all possible config file paths in priority order
    fn config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG_CONFIG_HOME (if set)
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg).join("lockstep").join("config.toml"));
        }

        // 2. ~/.config/lockstep/config.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("lockstep").join("config.toml"));
        }

        // 3. Platform-specific config dir (~/Library/Application Support on macOS)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join("lockstep").join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        paths
    }

    /// Get the first existing config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_paths().into_iter().find(|p| p.exists())
    }

    /// Load config from the first existing path.
    /// Returns default config if no file exists or it can't be parsed.
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| std::fs::read_to_string(&path).ok())
            .map(|content| Self::parse(&content))
            .unwrap_or_default()
    }

    fn parse(content: &str) -> Self {
        toml::from_str(content)
            .map_err(|e| {
                eprintln!("Warning: Failed to parse config: {}", e);
                e
            })
            .unwrap_or_default()
    }

    pub fn guard_window(&self) -> Duration {
        Duration::from_millis(self.scroll.guard_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.diff.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockstep_core::{Rgba, ThemeBinding};

    #[test]
    fn test_defaults() {
        let config = Config::parse("");
        assert_eq!(config.ui.theme, EditorTheme::Dark);
        assert!(config.ui.line_numbers);
        assert!(!config.editor.read_only_left);
        assert_eq!(config.guard_window(), Duration::from_millis(50));
        assert_eq!(config.scroll.step, 4);
        assert_eq!(config.debounce(), Duration::from_millis(200));
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r##"
            [ui]
            theme = "light"
            line_numbers = false

            [ui.palette]
            added_bg = "green"
            stripe1 = "#101010"

            [ui.palette.defs]
            green = "rgba(0, 255, 0, 0.5)"

            [editor]
            read_only_right = true

            [scroll]
            guard_ms = 80

            [diff]
            debounce_ms = 500
            "##,
        );
        assert_eq!(config.ui.theme, EditorTheme::Light);
        assert!(!config.ui.line_numbers);
        assert!(config.editor.read_only_right);
        assert_eq!(config.scroll.guard_ms, 80);
        assert_eq!(config.scroll.step, 4);
        assert_eq!(config.diff.debounce_ms, 500);

        let binding = ThemeBinding::with_overrides(config.ui.theme, config.ui.palette);
        assert_eq!(binding.palette().added_bg, Rgba::new(0, 255, 0, 0.5));
        assert_eq!(binding.palette().stripe1, Rgba::opaque(0x10, 0x10, 0x10));
    }

    #[test]
    fn test_theme_names_follow_editor_spelling() {
        let config = Config::parse("[ui]\ntheme = \"schemaEditorDark\"\n");
        assert_eq!(config.ui.theme, EditorTheme::SchemaEditorDark);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let config = Config::parse("[ui\ntheme = ");
        assert_eq!(config.ui.theme, EditorTheme::Dark);
        assert_eq!(config.scroll.step, 4);
    }
}
