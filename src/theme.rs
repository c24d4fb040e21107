//! Theme system for the TUI.
//!
//! Provides semantic color roles that map to ratatui `Style` values.
//! `ThemeVariant` selects between Dark and Light palettes, and `StyleMap`
//! resolves role names to concrete styles.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeVariant {
    Dark,
    #[default]
    Light,
}

impl ThemeVariant {
    /// Parse a variant name (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    /// Build the `ColorPalette` for this variant.
    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// The other variant.
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    /// Lowercase name, as stored in preferences and config.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    /// Human-readable name for status display.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// Every semantic UI role mapped to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Chrome --
    pub background: Style,
    pub header: Style,
    pub header_filter: Style,
    pub search_input: Style,
    pub status_bar: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,

    // -- Cards --
    pub card_title: Style,
    pub card_selected: Style,
    pub card_meta: Style,
    pub card_description: Style,
    pub bookmark_marker: Style,

    // -- List states --
    pub list_error: Style,
    pub list_empty: Style,
    pub spinner: Style,
    pub load_more_hint: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            background: Style::default().bg(Color::Black).fg(Color::White),
            header: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            header_filter: Style::default().fg(Color::Cyan),
            search_input: Style::default().fg(Color::Yellow),
            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Cyan),

            card_title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            card_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            card_meta: Style::default().fg(Color::Gray),
            card_description: Style::default().fg(Color::Gray),
            bookmark_marker: Style::default().fg(Color::Yellow),

            list_error: Style::default().fg(Color::LightRed),
            list_empty: Style::default().fg(Color::Gray),
            spinner: Style::default().fg(Color::LightBlue),
            load_more_hint: Style::default().fg(Color::LightBlue),
        }
    }

    fn light() -> Self {
        Self {
            background: Style::default().bg(Color::White).fg(Color::Black),
            header: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            header_filter: Style::default().fg(Color::Blue),
            search_input: Style::default().fg(Color::Magenta),
            status_bar: Style::default().bg(Color::Gray).fg(Color::Black),
            panel_border: Style::default().fg(Color::Gray),
            panel_border_focused: Style::default().fg(Color::Blue),

            card_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            card_selected: Style::default().bg(Color::Blue).fg(Color::White),
            card_meta: Style::default().fg(Color::DarkGray),
            card_description: Style::default().fg(Color::DarkGray),
            bookmark_marker: Style::default().fg(Color::Magenta),

            list_error: Style::default().fg(Color::Red),
            list_empty: Style::default().fg(Color::DarkGray),
            spinner: Style::default().fg(Color::Blue),
            load_more_hint: Style::default().fg(Color::Blue),
        }
    }
}

// ============================================================================
// Style Map
// ============================================================================

/// String-keyed style lookup built from a `ColorPalette`.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

/// All semantic role names, in declaration order.
const ROLE_NAMES: [&str; 16] = [
    "background",
    "header",
    "header_filter",
    "search_input",
    "status_bar",
    "panel_border",
    "panel_border_focused",
    "card_title",
    "card_selected",
    "card_meta",
    "card_description",
    "bookmark_marker",
    "list_error",
    "list_empty",
    "spinner",
    "load_more_hint",
];

impl StyleMap {
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 16] = [
            p.background,
            p.header,
            p.header_filter,
            p.search_input,
            p.status_bar,
            p.panel_border,
            p.panel_border_focused,
            p.card_title,
            p.card_selected,
            p.card_meta,
            p.card_description,
            p.bookmark_marker,
            p.list_error,
            p.list_empty,
            p.spinner,
            p.load_more_hint,
        ];

        let map = ROLE_NAMES
            .iter()
            .copied()
            .zip(styles.iter().copied())
            .collect();
        Self { map }
    }

    /// Resolve a role name to its `Style`. Unknown roles get `Style::default()`.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_variant_is_light() {
        assert_eq!(ThemeVariant::default(), ThemeVariant::Light);
        assert!(!ThemeVariant::default().is_dark());
    }

    #[test]
    fn toggled_flips() {
        assert_eq!(ThemeVariant::Dark.toggled(), ThemeVariant::Light);
        assert_eq!(ThemeVariant::Light.toggled(), ThemeVariant::Dark);
    }

    #[test]
    fn variant_from_str_name() {
        assert_eq!(ThemeVariant::from_str_name("dark"), Some(ThemeVariant::Dark));
        assert_eq!(ThemeVariant::from_str_name("Light"), Some(ThemeVariant::Light));
        assert_eq!(ThemeVariant::from_str_name(" DARK "), Some(ThemeVariant::Dark));
        assert_eq!(ThemeVariant::from_str_name("neon"), None);
    }

    #[test]
    fn stored_name_round_trips() {
        for v in [ThemeVariant::Dark, ThemeVariant::Light] {
            assert_eq!(ThemeVariant::from_str_name(v.as_str()), Some(v));
        }
    }

    #[test]
    fn backgrounds_differ() {
        let dark = ThemeVariant::Dark.palette();
        let light = ThemeVariant::Light.palette();
        assert_eq!(dark.background.bg, Some(Color::Black));
        assert_eq!(light.background.bg, Some(Color::White));
        assert_ne!(dark.card_selected, light.card_selected);
    }

    #[test]
    fn style_map_resolves_known_roles() {
        let palette = ThemeVariant::Dark.palette();
        let sm = StyleMap::from_palette(&palette);
        assert_eq!(sm.resolve("card_selected"), palette.card_selected);
        assert_eq!(sm.resolve("list_error"), palette.list_error);
        assert_eq!(sm.resolve("status_bar"), palette.status_bar);
    }

    #[test]
    fn style_map_returns_default_for_unknown() {
        let sm = StyleMap::from_palette(&ThemeVariant::Light.palette());
        assert_eq!(sm.resolve("nonexistent_role"), Style::default());
    }

    #[test]
    fn style_map_has_all_roles() {
        let sm = StyleMap::from_palette(&ThemeVariant::Dark.palette());
        assert_eq!(sm.map.len(), ROLE_NAMES.len());
        for name in ROLE_NAMES {
            assert!(sm.map.contains_key(name), "Role '{}' missing", name);
        }
    }
}
