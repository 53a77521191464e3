//! Ordered photo/video entries of a page.
//!
//! ## Ordering
//!
//! Each [`Memory`] carries an integer `order` key. Keys may be sparse and
//! may repeat; display order is ascending by key, ties broken by position
//! in the collection (the order items were added). [`MemoryCollection::reorder`]
//! rewrites a single key and never renumbers siblings.
//!
//! ## Limits
//!
//! [`MediaLimits`] caps photos, videos and video size. Limits apply when an
//! item is added and are never re-evaluated against items already present,
//! so a collection built under looser limits stays as it is.
//!
//! ## Pending media
//!
//! A freshly picked file is added with a [`MediaSource::Pending`] handle
//! that only the local session can resolve. Once the upload finishes the
//! handle is swapped for a [`MediaSource::Durable`] URL via
//! [`MemoryCollection::resolve_source`], which is a no-op if the item has
//! been removed in the meantime.
//!
//! All operations take `&self` and return a new collection; a failed
//! operation leaves nothing changed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const MAX_PHOTOS: usize = 8;
pub const MAX_VIDEOS: usize = 2;
pub const MAX_VIDEO_SIZE_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Error, Debug, PartialEq)]
pub enum MemoryError {
    #[error("a page can hold at most {limit} {kind}s")]
    CapacityExceeded { kind: MediaKind, limit: usize },
    #[error("video is {size} bytes, the limit is {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },
    #[error("memory '{0}' not found")]
    NotFound(String),
    #[error("memory id '{0}' is already in use")]
    DuplicateId(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
        })
    }
}

/// Where the bytes of a media item can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum MediaSource {
    /// Permanent URL issued by the object store.
    Durable { url: String },
    /// Session-local preview handle for an upload still in flight.
    Pending { handle: String },
}

impl MediaSource {
    pub fn durable(url: impl Into<String>) -> Self {
        MediaSource::Durable { url: url.into() }
    }

    /// A fresh, unique local preview handle.
    pub fn pending() -> Self {
        MediaSource::Pending {
            handle: format!("local:{}", uuid::Uuid::new_v4()),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, MediaSource::Pending { .. })
    }

    pub fn durable_url(&self) -> Option<&str> {
        match self {
            MediaSource::Durable { url } => Some(url),
            MediaSource::Pending { .. } => None,
        }
    }

    /// The reference renderers put in `src` attributes.
    pub fn href(&self) -> &str {
        match self {
            MediaSource::Durable { url } => url,
            MediaSource::Pending { handle } => handle,
        }
    }
}

/// Generate a page-unique memory id.
pub fn new_memory_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub source: MediaSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
    pub order: i64,
    pub visible: bool,
    /// Byte size reported when the file was picked.
    #[serde(default)]
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Memory {
    /// A visible item with empty description, stamped now.
    pub fn new(id: impl Into<String>, kind: MediaKind, source: MediaSource, order: i64) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            kind,
            source,
            thumbnail_url: None,
            date: None,
            description: String::new(),
            order,
            visible: true,
            size_bytes: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    fn touched(mut self) -> Self {
        self.updated_at = Utc::now();
        self
    }
}

/// Caps applied when media is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaLimits {
    pub max_photos: usize,
    pub max_videos: usize,
    pub max_video_size_bytes: u64,
}

impl Default for MediaLimits {
    fn default() -> Self {
        Self {
            max_photos: MAX_PHOTOS,
            max_videos: MAX_VIDEOS,
            max_video_size_bytes: MAX_VIDEO_SIZE_BYTES,
        }
    }
}

impl MediaLimits {
    fn cap(&self, kind: MediaKind) -> usize {
        match kind {
            MediaKind::Photo => self.max_photos,
            MediaKind::Video => self.max_videos,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MediaCounts {
    pub photos: usize,
    pub videos: usize,
}

impl MediaCounts {
    pub fn of(&self, kind: MediaKind) -> usize {
        match kind {
            MediaKind::Photo => self.photos,
            MediaKind::Video => self.videos,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryCollection {
    items: Vec<Memory>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Memory> {
        self.items.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Memory> {
        self.items.iter().find(|m| m.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn counts(&self) -> MediaCounts {
        self.items.iter().fold(MediaCounts::default(), |mut c, m| {
            match m.kind {
                MediaKind::Photo => c.photos += 1,
                MediaKind::Video => c.videos += 1,
            }
            c
        })
    }

    /// Append `item`, enforcing id uniqueness and `limits`.
    pub fn add(&self, item: Memory, limits: &MediaLimits) -> Result<Self, MemoryError> {
        if self.contains(&item.id) {
            return Err(MemoryError::DuplicateId(item.id));
        }
        if item.kind == MediaKind::Video && item.size_bytes > limits.max_video_size_bytes {
            return Err(MemoryError::FileTooLarge {
                size: item.size_bytes,
                limit: limits.max_video_size_bytes,
            });
        }
        let limit = limits.cap(item.kind);
        if self.counts().of(item.kind) >= limit {
            return Err(MemoryError::CapacityExceeded {
                kind: item.kind,
                limit,
            });
        }

        let mut items = self.items.clone();
        items.push(item);
        Ok(Self { items })
    }

    /// Drop the item with `id`; unchanged if there is none.
    pub fn remove(&self, id: &str) -> Self {
        Self {
            items: self.items.iter().filter(|m| m.id != id).cloned().collect(),
        }
    }

    pub fn reorder(&self, id: &str, new_order: i64) -> Result<Self, MemoryError> {
        self.update(id, |m| m.order = new_order)
    }

    pub fn set_visibility(&self, id: &str, visible: bool) -> Result<Self, MemoryError> {
        self.update(id, |m| m.visible = visible)
    }

    pub fn update_description(&self, id: &str, description: &str) -> Result<Self, MemoryError> {
        self.update(id, |m| m.description = description.to_string())
    }

    /// Replace the source of `id` with a durable URL.
    ///
    /// Returns `None` when the item no longer exists, so a late upload
    /// result can be dropped without touching the collection.
    pub fn resolve_source(&self, id: &str, url: &str) -> Option<Self> {
        self.update(id, |m| m.source = MediaSource::durable(url)).ok()
    }

    fn update(&self, id: &str, f: impl FnOnce(&mut Memory)) -> Result<Self, MemoryError> {
        let pos = self
            .items
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| MemoryError::NotFound(id.to_string()))?;
        let mut items = self.items.clone();
        let mut item = items[pos].clone();
        f(&mut item);
        items[pos] = item.touched();
        Ok(Self { items })
    }

    /// Visible items, ascending by `order`, ties in collection order.
    pub fn visible_sorted(&self) -> Vec<&Memory> {
        let mut visible: Vec<&Memory> = self.items.iter().filter(|m| m.visible).collect();
        // sort_by_key is stable
        visible.sort_by_key(|m| m.order);
        visible
    }
}

impl From<Vec<Memory>> for MemoryCollection {
    fn from(items: Vec<Memory>) -> Self {
        Self { items }
    }
}
