//! The preview model: everything a renderer needs, computed once.
//!
//! All three renderers (editor preview, sidebar, public page) take a
//! [`PreviewModel`] and nothing else, so visibility filtering, ordering,
//! date formatting and the color palette can never diverge between them.

use crate::draft::{PageDraft, PageStatus};
use crate::memory::{MediaKind, Memory};
use crate::settings::{Palette, Settings};
use chrono::{Locale, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Interface language: long-date format, `lang` attribute, messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// `15 Ocak 2020`
    #[default]
    Tr,
    /// `January 15, 2020`
    En,
}

impl Language {
    fn chrono_locale(self) -> Locale {
        match self {
            Language::Tr => Locale::tr_TR,
            Language::En => Locale::en_US,
        }
    }

    fn long_format(self) -> &'static str {
        match self {
            Language::Tr => "%-d %B %Y",
            Language::En => "%B %-d, %Y",
        }
    }

    /// BCP 47 tag for the `lang` attribute.
    pub fn lang_tag(self) -> &'static str {
        match self {
            Language::Tr => "tr",
            Language::En => "en",
        }
    }

    /// Sidebar indicator for `n` memories left out.
    pub fn more_label(self, n: usize) -> String {
        match self {
            Language::Tr => format!("+{n} daha"),
            Language::En => format!("+{n} more"),
        }
    }

    pub fn comments_heading(self) -> &'static str {
        match self {
            Language::Tr => "Yorumlar",
            Language::En => "Comments",
        }
    }
}

/// Rendering knobs shared by all projections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderOptions {
    /// Language for long dates and the page `lang` attribute.
    pub locale: Language,
    /// Column count of the `grid` layout.
    pub grid_columns: u32,
    /// Items shown in the sidebar before the "N more" indicator.
    pub sidebar_max_items: usize,
    /// Characters of bio shown in the sidebar before the ellipsis.
    pub sidebar_bio_chars: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            locale: Language::Tr,
            grid_columns: 3,
            sidebar_max_items: 6,
            sidebar_bio_chars: 120,
        }
    }
}

/// Format a date as a locale long date.
pub fn format_long_date(date: NaiveDate, locale: Language) -> String {
    NaiveDateTime::new(date, NaiveTime::MIN)
        .and_utc()
        .format_localized(locale.long_format(), locale.chrono_locale())
        .to_string()
}

/// First `max` characters of `text`, with `…` appended if anything was cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.truncate(cut.trim_end().len());
    cut.push('…');
    cut
}

/// One visible memory, ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryView {
    pub id: String,
    pub kind: MediaKind,
    /// Durable URL or local preview handle.
    pub src: String,
    pub thumbnail: Option<String>,
    pub description: String,
    /// Formatted date; `None` when the item has no date or dates are hidden.
    pub date_label: Option<String>,
    pub order: i64,
    pub pending: bool,
}

impl MemoryView {
    fn new(memory: &Memory, settings: &Settings, locale: Language) -> Self {
        Self {
            id: memory.id.clone(),
            kind: memory.kind,
            src: memory.source.href().to_string(),
            thumbnail: memory.thumbnail_url.clone(),
            description: memory.description.clone(),
            date_label: memory
                .date
                .filter(|_| settings.show_dates)
                .map(|d| format_long_date(d, locale)),
            order: memory.order,
            pending: memory.source.is_pending(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewModel {
    pub page_id: String,
    pub name: String,
    pub birth_label: Option<String>,
    pub death_label: Option<String>,
    pub bio: String,
    pub profile_photo: Option<String>,
    pub cover_photo: Option<String>,
    /// Visible memories in display order, uncapped.
    pub memories: Vec<MemoryView>,
    pub settings: Settings,
    pub palette: Palette,
    pub status: PageStatus,
    pub unique_link: Option<String>,
    pub language: Language,
}

impl PreviewModel {
    pub fn from_draft(draft: &PageDraft, options: &RenderOptions) -> Self {
        let identity = &draft.identity;
        let locale = options.locale;
        let memories = draft
            .memories
            .visible_sorted()
            .into_iter()
            .map(|m| MemoryView::new(m, &draft.settings, locale))
            .collect();

        Self {
            page_id: draft.id.clone(),
            name: identity.name.clone(),
            birth_label: identity.birth_date.map(|d| format_long_date(d, locale)),
            death_label: identity.death_date.map(|d| format_long_date(d, locale)),
            bio: identity.bio.clone(),
            profile_photo: identity.profile_photo.as_ref().map(|s| s.href().to_string()),
            cover_photo: identity.cover_photo.as_ref().map(|s| s.href().to_string()),
            memories,
            settings: draft.settings.clone(),
            palette: Palette::for_settings(&draft.settings),
            status: draft.status,
            unique_link: draft.unique_link.clone(),
            language: locale,
        }
    }

    /// `birth – death`, or whichever side is known.
    pub fn lifespan(&self) -> Option<String> {
        match (&self.birth_label, &self.death_label) {
            (Some(b), Some(d)) => Some(format!("{b} – {d}")),
            (Some(b), None) => Some(b.clone()),
            (None, Some(d)) => Some(format!("– {d}")),
            (None, None) => None,
        }
    }

    /// The first `max` memories and how many were left out.
    pub fn capped_memories(&self, max: usize) -> (&[MemoryView], usize) {
        let shown = self.memories.len().min(max);
        (&self.memories[..shown], self.memories.len() - shown)
    }
}
