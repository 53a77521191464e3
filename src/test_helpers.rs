//! Shared test utilities for the memoria test suite.
//!
//! Fixture builders for memories and drafts, plus small extractors that
//! keep assertions readable.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut ed = editor(PageDraft::new("pg", "u1"));
//! ed.add_memory(photo("a", 2)).unwrap();
//! ed.add_memory(photo("b", 1)).unwrap();
//!
//! assert_eq!(ids(ed.draft().memories.visible_sorted()), vec!["b", "a"]);
//! ```

use chrono::NaiveDate;

use crate::draft::{PageDraft, PageEditor};
use crate::memory::{MediaKind, MediaLimits, MediaSource, Memory};

// =========================================================================
// Fixture builders
// =========================================================================

/// A visible photo with a durable URL derived from its id.
pub fn photo(id: &str, order: i64) -> Memory {
    Memory::new(
        id,
        MediaKind::Photo,
        MediaSource::durable(format!("https://cdn.example/{id}.jpg")),
        order,
    )
}

/// A visible video of `size` bytes with a durable URL derived from its id.
pub fn video(id: &str, order: i64, size: u64) -> Memory {
    Memory::new(
        id,
        MediaKind::Video,
        MediaSource::durable(format!("https://cdn.example/{id}.mp4")),
        order,
    )
    .with_size(size)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// An editor over `draft` with the default media limits.
pub fn editor(draft: PageDraft) -> PageEditor {
    PageEditor::new(draft, MediaLimits::default())
}

// =========================================================================
// Extractors
// =========================================================================

/// Memory ids, in iteration order.
pub fn ids<'a>(items: impl IntoIterator<Item = &'a Memory>) -> Vec<&'a str> {
    items.into_iter().map(|m| m.id.as_str()).collect()
}
