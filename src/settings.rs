//! Visual settings of a memorial page.
//!
//! A [`Settings`] value is owned by exactly one page draft. It is never
//! mutated in place: [`update_setting`] takes the current value and returns
//! a new one with a single field replaced, so renderers holding the old
//! value keep seeing a consistent snapshot.
//!
//! ## Dark backgrounds
//!
//! Text colors in every renderer are chosen from [`Palette::for_settings`],
//! which is driven by [`is_dark_background`]. The predicate is a lookup in
//! a closed set of hex values:
//!
//! ```text
//! #1d1d1f  #2c2c2e  #1c1c1e
//! ```
//!
//! Any other background, including arbitrary dark colors typed by hand, is
//! treated as light.
//!
//! The palette only ever carries `#rgb` / `#rrggbb` values. Anything else in
//! a stored document falls back to the global default color.

use crate::template::TemplateId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Background colors that switch the renderers to light-on-dark text.
pub const DARK_BACKGROUNDS: [&str; 3] = ["#1d1d1f", "#2c2c2e", "#1c1c1e"];

pub const DEFAULT_BACKGROUND: &str = "#ffffff";
pub const DEFAULT_ACCENT: &str = "#007aff";

#[derive(Error, Debug, PartialEq)]
pub enum SettingsError {
    #[error("unknown setting '{0}'")]
    UnknownKey(String),
    #[error("invalid value '{value}' for setting '{key}'")]
    InvalidValue { key: String, value: String },
    #[error("expected key=value, got '{0}'")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Sans,
    Serif,
}

impl FontFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            FontFamily::Sans => "sans",
            FontFamily::Serif => "serif",
        }
    }

    /// CSS `font-family` stack used by the renderers.
    pub fn css_stack(self) -> &'static str {
        match self {
            FontFamily::Sans => {
                "-apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, \"Helvetica Neue\", sans-serif"
            }
            FontFamily::Serif => "Georgia, \"Times New Roman\", serif",
        }
    }
}

impl FromStr for FontFamily {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sans" => Ok(FontFamily::Sans),
            "serif" => Ok(FontFamily::Serif),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Grid,
    Timeline,
    Carousel,
}

impl Layout {
    pub fn as_str(self) -> &'static str {
        match self {
            Layout::Grid => "grid",
            Layout::Timeline => "timeline",
            Layout::Carousel => "carousel",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grid" => Ok(Layout::Grid),
            "timeline" => Ok(Layout::Timeline),
            "carousel" => Ok(Layout::Carousel),
            _ => Err(()),
        }
    }
}

/// Visual and behavioral configuration of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub template: TemplateId,
    pub background_color: String,
    pub accent_color: String,
    pub font_family: FontFamily,
    pub layout: Layout,
    pub show_dates: bool,
    pub allow_comments: bool,
}

impl Default for Settings {
    /// Global defaults, used for any field a template preset leaves unset.
    fn default() -> Self {
        Self {
            template: TemplateId::default(),
            background_color: DEFAULT_BACKGROUND.to_string(),
            accent_color: DEFAULT_ACCENT.to_string(),
            font_family: FontFamily::Sans,
            layout: Layout::Grid,
            show_dates: true,
            allow_comments: true,
        }
    }
}

/// A single-field change to [`Settings`].
///
/// One variant per field, so every update names exactly one key and
/// [`update_setting`] can never fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingUpdate {
    Template(TemplateId),
    BackgroundColor(String),
    AccentColor(String),
    FontFamily(FontFamily),
    Layout(Layout),
    ShowDates(bool),
    AllowComments(bool),
}

impl SettingUpdate {
    /// Parse a `key=value` pair as typed on the command line.
    ///
    /// Keys accept both `snake_case` and the `camelCase` names used in
    /// stored documents.
    pub fn parse(pair: &str) -> Result<Self, SettingsError> {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| SettingsError::Malformed(pair.to_string()))?;
        let key = key.trim();
        let value = value.trim();
        let invalid = || SettingsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "template" => value.parse().map(Self::Template).map_err(|_| invalid()),
            "background_color" | "backgroundColor" => {
                parse_hex_color(value).map(Self::BackgroundColor).ok_or_else(invalid)
            }
            "accent_color" | "accentColor" => {
                parse_hex_color(value).map(Self::AccentColor).ok_or_else(invalid)
            }
            "font_family" | "fontFamily" => {
                value.parse().map(Self::FontFamily).map_err(|_| invalid())
            }
            "layout" => value.parse().map(Self::Layout).map_err(|_| invalid()),
            "show_dates" | "showDates" => value.parse().map(Self::ShowDates).map_err(|_| invalid()),
            "allow_comments" | "allowComments" => {
                value.parse().map(Self::AllowComments).map_err(|_| invalid())
            }
            other => Err(SettingsError::UnknownKey(other.to_string())),
        }
    }
}

/// Accepts `#rgb` and `#rrggbb`, returned lowercased.
fn parse_hex_color(value: &str) -> Option<String> {
    let hex = value.trim().strip_prefix('#')?;
    let valid = matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit());
    valid.then(|| format!("#{}", hex.to_ascii_lowercase()))
}

/// Return a copy of `settings` with exactly one field replaced.
pub fn update_setting(settings: &Settings, update: SettingUpdate) -> Settings {
    let mut next = settings.clone();
    match update {
        SettingUpdate::Template(v) => next.template = v,
        SettingUpdate::BackgroundColor(v) => next.background_color = v,
        SettingUpdate::AccentColor(v) => next.accent_color = v,
        SettingUpdate::FontFamily(v) => next.font_family = v,
        SettingUpdate::Layout(v) => next.layout = v,
        SettingUpdate::ShowDates(v) => next.show_dates = v,
        SettingUpdate::AllowComments(v) => next.allow_comments = v,
    }
    next
}

/// True iff the background is one of [`DARK_BACKGROUNDS`].
pub fn is_dark_background(settings: &Settings) -> bool {
    DARK_BACKGROUNDS
        .iter()
        .any(|dark| dark.eq_ignore_ascii_case(settings.background_color.trim()))
}

/// Colors derived from settings, shared by all renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub dark: bool,
    pub background: String,
    pub accent: String,
    pub text: &'static str,
    pub text_secondary: &'static str,
}

impl Palette {
    pub fn for_settings(settings: &Settings) -> Self {
        let dark = is_dark_background(settings);
        let (text, text_secondary) = if dark {
            ("#f5f5f7", "#a1a1a6")
        } else {
            ("#1d1d1f", "#6e6e73")
        };
        Self {
            dark,
            background: parse_hex_color(&settings.background_color)
                .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string()),
            accent: parse_hex_color(&settings.accent_color)
                .unwrap_or_else(|| DEFAULT_ACCENT.to_string()),
            text,
            text_secondary,
        }
    }
}
