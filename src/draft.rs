//! The page draft aggregate.
//!
//! A [`PageDraft`] is the whole editable state of one memorial page:
//! identity, settings, memories and publication status. It is the document
//! persisted by the editing session and the only input of the projection
//! renderers.
//!
//! [`PageEditor`] wraps a draft together with the media limits in force and
//! exposes every mutation the editor UI can make. Each mutation computes the
//! next draft first and commits it only on success:
//!
//! ```text
//! edit ──► compute next draft ──► Ok  ──► replace draft
//!                              └► Err ──► draft untouched
//! ```
//!
//! Derived views (visible memories, palette) are never stored; they are
//! rebuilt by [`PageEditor::to_preview_model`] on every call.

use crate::memory::{MediaLimits, MediaSource, Memory, MemoryCollection, MemoryError};
use crate::preview::{PreviewModel, RenderOptions};
use crate::settings::{SettingUpdate, Settings, update_setting};
use crate::template::{TemplateId, get_template};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum DraftError {
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("page is not ready to publish: {0}")]
    NotPublishable(String),
    #[error("cannot move page from {from} to {to}")]
    InvalidTransition { from: PageStatus, to: PageStatus },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    #[default]
    Draft,
    Published,
    Unpublished,
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PageStatus::Draft => "draft",
            PageStatus::Published => "published",
            PageStatus::Unpublished => "unpublished",
        })
    }
}

/// Who the page remembers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<NaiveDate>,
    #[serde(default)]
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<MediaSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_photo: Option<MediaSource>,
}

impl Identity {
    pub fn photo(&self, slot: PhotoSlot) -> Option<&MediaSource> {
        match slot {
            PhotoSlot::Profile => self.profile_photo.as_ref(),
            PhotoSlot::Cover => self.cover_photo.as_ref(),
        }
    }

    fn photo_mut(&mut self, slot: PhotoSlot) -> &mut Option<MediaSource> {
        match slot {
            PhotoSlot::Profile => &mut self.profile_photo,
            PhotoSlot::Cover => &mut self.cover_photo,
        }
    }
}

/// Which identity photo an upload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoSlot {
    Profile,
    Cover,
}

/// A single identity edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityField {
    Name(String),
    BirthDate(Option<NaiveDate>),
    DeathDate(Option<NaiveDate>),
    Bio(String),
    ProfilePhoto(Option<MediaSource>),
    CoverPhoto(Option<MediaSource>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDraft {
    pub id: String,
    pub owner_id: String,
    pub identity: Identity,
    #[serde(default)]
    pub memories: MemoryCollection,
    pub settings: Settings,
    #[serde(default)]
    pub status: PageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_link: Option<String>,
    /// Assigned by the document store on write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PageDraft {
    /// An empty draft with global default settings.
    pub fn new(id: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            identity: Identity::default(),
            memories: MemoryCollection::new(),
            settings: Settings::default(),
            status: PageStatus::Draft,
            unique_link: None,
            updated_at: None,
        }
    }

    /// An empty draft seeded from a template's defaults.
    pub fn from_template(
        id: impl Into<String>,
        owner_id: impl Into<String>,
        template: TemplateId,
    ) -> Self {
        Self {
            settings: get_template(template).settings(),
            ..Self::new(id, owner_id)
        }
    }

    /// Check the draft can be handed to the publish flow.
    ///
    /// Media limits are deliberately not re-checked here: items accepted
    /// under earlier limits stay publishable.
    pub fn check_publishable(&self) -> Result<(), DraftError> {
        if self.identity.name.trim().is_empty() {
            return Err(DraftError::NotPublishable("name is empty".into()));
        }
        let pending = self
            .memories
            .iter()
            .filter(|m| m.source.is_pending())
            .count();
        if pending > 0 {
            return Err(DraftError::NotPublishable(format!(
                "{pending} upload(s) still in progress"
            )));
        }
        let photos_pending = [&self.identity.profile_photo, &self.identity.cover_photo]
            .into_iter()
            .flatten()
            .any(MediaSource::is_pending);
        if photos_pending {
            return Err(DraftError::NotPublishable(
                "profile or cover photo still uploading".into(),
            ));
        }
        Ok(())
    }
}

fn apply_identity(identity: &Identity, field: IdentityField) -> Result<Identity, DraftError> {
    let mut next = identity.clone();
    match field {
        IdentityField::Name(v) => next.name = v.trim().to_string(),
        IdentityField::BirthDate(v) => next.birth_date = v,
        IdentityField::DeathDate(v) => next.death_date = v,
        IdentityField::Bio(v) => next.bio = v,
        IdentityField::ProfilePhoto(v) => next.profile_photo = v,
        IdentityField::CoverPhoto(v) => next.cover_photo = v,
    }
    if let (Some(birth), Some(death)) = (next.birth_date, next.death_date) {
        if death < birth {
            return Err(DraftError::Validation(
                "date of death is before date of birth".into(),
            ));
        }
    }
    Ok(next)
}

/// Single-writer handle over one draft.
#[derive(Debug, Clone)]
pub struct PageEditor {
    draft: PageDraft,
    limits: MediaLimits,
}

impl PageEditor {
    pub fn new(draft: PageDraft, limits: MediaLimits) -> Self {
        Self { draft, limits }
    }

    pub fn draft(&self) -> &PageDraft {
        &self.draft
    }

    pub fn into_draft(self) -> PageDraft {
        self.draft
    }

    pub fn limits(&self) -> &MediaLimits {
        &self.limits
    }

    fn commit(&mut self, next: PageDraft) {
        self.draft = next;
    }

    fn with_memories(&self, memories: MemoryCollection) -> PageDraft {
        PageDraft {
            memories,
            ..self.draft.clone()
        }
    }

    pub fn set_identity_field(&mut self, field: IdentityField) -> Result<(), DraftError> {
        let identity = apply_identity(&self.draft.identity, field)?;
        self.commit(PageDraft {
            identity,
            ..self.draft.clone()
        });
        Ok(())
    }

    pub fn apply_setting(&mut self, update: SettingUpdate) {
        let settings = update_setting(&self.draft.settings, update);
        self.commit(PageDraft {
            settings,
            ..self.draft.clone()
        });
    }

    /// Apply several updates as one edit.
    pub fn apply_settings(&mut self, updates: impl IntoIterator<Item = SettingUpdate>) {
        let settings = updates
            .into_iter()
            .fold(self.draft.settings.clone(), |s, u| update_setting(&s, u));
        self.commit(PageDraft {
            settings,
            ..self.draft.clone()
        });
    }

    /// Replace all settings with a template's defaults.
    pub fn apply_template(&mut self, template: TemplateId) {
        let settings = get_template(template).settings();
        self.commit(PageDraft {
            settings,
            ..self.draft.clone()
        });
    }

    pub fn add_memory(&mut self, item: Memory) -> Result<(), DraftError> {
        let memories = self.draft.memories.add(item, &self.limits)?;
        self.commit(self.with_memories(memories));
        Ok(())
    }

    /// Returns the removed item, if there was one.
    pub fn remove_memory(&mut self, id: &str) -> Option<Memory> {
        let removed = self.draft.memories.get(id).cloned()?;
        let memories = self.draft.memories.remove(id);
        self.commit(self.with_memories(memories));
        Some(removed)
    }

    pub fn reorder_memory(&mut self, id: &str, new_order: i64) -> Result<(), DraftError> {
        let memories = self.draft.memories.reorder(id, new_order)?;
        self.commit(self.with_memories(memories));
        Ok(())
    }

    pub fn set_memory_visibility(&mut self, id: &str, visible: bool) -> Result<(), DraftError> {
        let memories = self.draft.memories.set_visibility(id, visible)?;
        self.commit(self.with_memories(memories));
        Ok(())
    }

    pub fn set_memory_description(&mut self, id: &str, text: &str) -> Result<(), DraftError> {
        let memories = self.draft.memories.update_description(id, text)?;
        self.commit(self.with_memories(memories));
        Ok(())
    }

    /// Attach a finished upload. Returns `false` if the memory is gone.
    pub fn resolve_upload(&mut self, id: &str, url: &str) -> bool {
        match self.draft.memories.resolve_source(id, url) {
            Some(memories) => {
                self.commit(self.with_memories(memories));
                true
            }
            None => false,
        }
    }

    /// Attach a finished identity photo upload.
    ///
    /// Applies only while `slot` still holds the pending `handle`; returns
    /// `false` if the photo has since been cleared or replaced.
    pub fn resolve_identity_photo(&mut self, slot: PhotoSlot, handle: &str, url: &str) -> bool {
        self.replace_pending_photo(slot, handle, Some(MediaSource::durable(url)))
    }

    /// Put back the photo a failed upload was meant to replace.
    ///
    /// Same rule as [`resolve_identity_photo`](Self::resolve_identity_photo):
    /// nothing happens unless `slot` still holds `handle`.
    pub fn restore_identity_photo(
        &mut self,
        slot: PhotoSlot,
        handle: &str,
        previous: Option<MediaSource>,
    ) -> bool {
        self.replace_pending_photo(slot, handle, previous)
    }

    fn replace_pending_photo(
        &mut self,
        slot: PhotoSlot,
        handle: &str,
        next: Option<MediaSource>,
    ) -> bool {
        let holds_handle = matches!(
            self.draft.identity.photo(slot),
            Some(MediaSource::Pending { handle: h }) if h == handle
        );
        if !holds_handle {
            return false;
        }
        let mut identity = self.draft.identity.clone();
        *identity.photo_mut(slot) = next;
        self.commit(PageDraft {
            identity,
            ..self.draft.clone()
        });
        true
    }

    /// Move into `Published`, assigning `link` unless one already exists.
    pub fn mark_published(&mut self, link: String) -> Result<(), DraftError> {
        if self.draft.status == PageStatus::Published {
            return Err(DraftError::InvalidTransition {
                from: PageStatus::Published,
                to: PageStatus::Published,
            });
        }
        self.draft.check_publishable()?;
        self.commit(PageDraft {
            status: PageStatus::Published,
            unique_link: self.draft.unique_link.clone().or(Some(link)),
            ..self.draft.clone()
        });
        Ok(())
    }

    pub fn unpublish(&mut self) -> Result<(), DraftError> {
        if self.draft.status != PageStatus::Published {
            return Err(DraftError::InvalidTransition {
                from: self.draft.status,
                to: PageStatus::Unpublished,
            });
        }
        self.commit(PageDraft {
            status: PageStatus::Unpublished,
            ..self.draft.clone()
        });
        Ok(())
    }

    /// Assemble the single input shared by all renderers.
    pub fn to_preview_model(&self, options: &RenderOptions) -> PreviewModel {
        PreviewModel::from_draft(&self.draft, options)
    }
}
