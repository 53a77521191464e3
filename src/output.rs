//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is **information-centric**. The primary display for every entity
//! (template, page, memory) is its semantic identity, its positional index
//! and name, with storage details shown as indented context lines.
//!
//! # Output Format
//!
//! ## Templates
//!
//! ```text
//! 001 Classic (classic)
//!     A timeless white page with a chronological timeline
//!     timeline · serif · #ffffff / #007aff
//! ```
//!
//! ## Draft summary
//!
//! ```text
//! Ayşe Öztürk [published]
//!     Page: pg-1 (owner u1)
//!     Link: /ayse-ozturk-k3x9qa
//!     Settings: classic · timeline · serif · #ffffff / #007aff
//!
//! Memories (2 photos, 1 video)
//! 001 photo #1
//!     Source: https://cdn.example/a.jpg
//!     Description: Bayram, 1978
//! 002 video #4 (hidden, uploading)
//!     Source: local:3f2a…
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::draft::{DraftError, PageDraft};
use crate::preview::truncate_chars;
use crate::settings::Settings;
use crate::template::Template;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn settings_line(settings: &Settings) -> String {
    format!(
        "{} · {} · {} / {}",
        settings.layout,
        settings.font_family.as_str(),
        settings.background_color,
        settings.accent_color
    )
}

// ============================================================================
// Templates
// ============================================================================

pub fn format_templates(templates: &[Template]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, t) in templates.iter().enumerate() {
        lines.push(format!("{} {} ({})", format_index(i + 1), t.name, t.id));
        lines.push(format!("{}{}", indent(1), t.description));
        lines.push(format!("{}{}", indent(1), settings_line(&t.settings())));
    }
    lines
}

pub fn print_templates(templates: &[Template]) {
    for line in format_templates(templates) {
        println!("{}", line);
    }
}

// ============================================================================
// Draft summary
// ============================================================================

/// Summarize a draft: identity, publication state, settings, then memories
/// in stored order with their flags.
pub fn format_draft_summary(draft: &PageDraft) -> Vec<String> {
    let mut lines = Vec::new();
    let name = if draft.identity.name.is_empty() {
        "(unnamed)"
    } else {
        draft.identity.name.as_str()
    };
    lines.push(format!("{} [{}]", name, draft.status));
    lines.push(format!(
        "{}Page: {} (owner {})",
        indent(1),
        draft.id,
        draft.owner_id
    ));
    if let Some(link) = &draft.unique_link {
        lines.push(format!("{}Link: /{}", indent(1), link));
    }
    lines.push(format!(
        "{}Settings: {} · {}",
        indent(1),
        draft.settings.template,
        settings_line(&draft.settings)
    ));

    let counts = draft.memories.counts();
    lines.push(String::new());
    lines.push(format!(
        "Memories ({}, {})",
        plural(counts.photos, "photo"),
        plural(counts.videos, "video")
    ));
    for (i, m) in draft.memories.iter().enumerate() {
        let mut flags = Vec::new();
        if !m.visible {
            flags.push("hidden");
        }
        if m.source.is_pending() {
            flags.push("uploading");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" ({})", flags.join(", "))
        };
        lines.push(format!(
            "{} {} #{}{}",
            format_index(i + 1),
            m.kind,
            m.order,
            flags
        ));
        lines.push(format!("{}Source: {}", indent(1), m.source.href()));
        if !m.description.is_empty() {
            lines.push(format!(
                "{}Description: {}",
                indent(1),
                truncate_chars(&m.description, 60)
            ));
        }
    }
    lines
}

pub fn print_draft_summary(draft: &PageDraft) {
    for line in format_draft_summary(draft) {
        println!("{}", line);
    }
}

// ============================================================================
// Publish check
// ============================================================================

pub fn format_publish_check(result: &Result<(), DraftError>) -> Vec<String> {
    match result {
        Ok(()) => vec!["Ready to publish".to_string()],
        Err(e) => vec![format!("Not publishable: {}", e)],
    }
}

pub fn print_publish_check(result: &Result<(), DraftError>) {
    for line in format_publish_check(result) {
        println!("{}", line);
    }
}
