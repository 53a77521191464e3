//! Static catalog of page templates.
//!
//! A template is a named preset of default [`Settings`]. Presets only name
//! the fields they care about; everything else falls back to
//! [`Settings::default`]. The catalog is fixed at build time and listed in
//! a stable order:
//!
//! | id | background | accent | font | layout |
//! |----|-----------|--------|------|--------|
//! | classic | `#ffffff` | (default) | serif | timeline |
//! | modern | `#1d1d1f` | `#0a84ff` | sans | grid |
//! | minimal | `#f5f5f7` | `#1d1d1f` | (default) | grid, dates hidden |
//! | elegant | `#2c2c2e` | `#d4af37` | serif | carousel, comments off |

use crate::settings::{FontFamily, Layout, Settings};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum TemplateError {
    #[error("template '{0}' not found")]
    NotFound(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    #[default]
    Classic,
    Modern,
    Minimal,
    Elegant,
}

impl TemplateId {
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateId::Classic => "classic",
            TemplateId::Modern => "modern",
            TemplateId::Minimal => "minimal",
            TemplateId::Elegant => "elegant",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        get_template_by_name(s).map(|t| t.id)
    }
}

/// Fields a preset overrides. `None` means "use the global default".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresetSettings {
    pub background_color: Option<&'static str>,
    pub accent_color: Option<&'static str>,
    pub font_family: Option<FontFamily>,
    pub layout: Option<Layout>,
    pub show_dates: Option<bool>,
    pub allow_comments: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub id: TemplateId,
    pub name: &'static str,
    pub description: &'static str,
    /// Preview image shipped with the frontend bundle.
    pub preview_ref: &'static str,
    pub defaults: PresetSettings,
}

impl Template {
    /// Settings seeded from this preset.
    pub fn settings(&self) -> Settings {
        let base = Settings::default();
        let d = &self.defaults;
        Settings {
            template: self.id,
            background_color: d
                .background_color
                .map(str::to_string)
                .unwrap_or(base.background_color),
            accent_color: d
                .accent_color
                .map(str::to_string)
                .unwrap_or(base.accent_color),
            font_family: d.font_family.unwrap_or(base.font_family),
            layout: d.layout.unwrap_or(base.layout),
            show_dates: d.show_dates.unwrap_or(base.show_dates),
            allow_comments: d.allow_comments.unwrap_or(base.allow_comments),
        }
    }
}

static TEMPLATES: [Template; 4] = [
    Template {
        id: TemplateId::Classic,
        name: "Classic",
        description: "A timeless white page with a chronological timeline",
        preview_ref: "templates/classic.jpg",
        defaults: PresetSettings {
            background_color: Some("#ffffff"),
            accent_color: None,
            font_family: Some(FontFamily::Serif),
            layout: Some(Layout::Timeline),
            show_dates: None,
            allow_comments: None,
        },
    },
    Template {
        id: TemplateId::Modern,
        name: "Modern",
        description: "Dark background with a bold photo grid",
        preview_ref: "templates/modern.jpg",
        defaults: PresetSettings {
            background_color: Some("#1d1d1f"),
            accent_color: Some("#0a84ff"),
            font_family: Some(FontFamily::Sans),
            layout: Some(Layout::Grid),
            show_dates: None,
            allow_comments: None,
        },
    },
    Template {
        id: TemplateId::Minimal,
        name: "Minimal",
        description: "Quiet and uncluttered, photos without dates",
        preview_ref: "templates/minimal.jpg",
        defaults: PresetSettings {
            background_color: Some("#f5f5f7"),
            accent_color: Some("#1d1d1f"),
            font_family: None,
            layout: Some(Layout::Grid),
            show_dates: Some(false),
            allow_comments: None,
        },
    },
    Template {
        id: TemplateId::Elegant,
        name: "Elegant",
        description: "Deep tones, serif type and a sliding carousel",
        preview_ref: "templates/elegant.jpg",
        defaults: PresetSettings {
            background_color: Some("#2c2c2e"),
            accent_color: Some("#d4af37"),
            font_family: Some(FontFamily::Serif),
            layout: Some(Layout::Carousel),
            show_dates: None,
            allow_comments: Some(false),
        },
    },
];

/// All templates in catalog order.
pub fn list_templates() -> &'static [Template] {
    &TEMPLATES
}

pub fn get_template(id: TemplateId) -> &'static Template {
    // Every TemplateId has exactly one entry, in declaration order.
    &TEMPLATES[id as usize]
}

/// Look a template up by its string id, as stored in documents or typed
/// on the command line.
pub fn get_template_by_name(name: &str) -> Result<&'static Template, TemplateError> {
    TEMPLATES
        .iter()
        .find(|t| t.id.as_str() == name)
        .ok_or_else(|| TemplateError::NotFound(name.to_string()))
}
