//! Editing session: one user editing one page against the backend.
//!
//! The session owns a [`PageEditor`] and talks to the document and object
//! stores only at save, publish and upload boundaries. Every edit between
//! those is the synchronous editor API, reached through [`EditingSession::editor_mut`].
//!
//! ## Uploads
//!
//! Uploads are split in three steps so the session is never borrowed
//! across an await:
//!
//! ```text
//! stage_media()  ──► PendingUpload ──► upload() ──► CompletedUpload ──► finish_upload()
//!   (sync, adds a                     (async, owns                      (sync, applies the
//!    pending memory)                   its bytes)                        URL or reports orphan)
//! ```
//!
//! While an upload is in flight the user may keep editing, including
//! removing the very item being uploaded. In that case `finish_upload`
//! returns [`UploadOutcome::Discarded`] and the caller hands the URL to
//! [`discard_object`]. A new profile or cover photo that lands reports the
//! durable photo it replaced the same way.
//!
//! ## Persistence
//!
//! [`EditingSession::save`] writes the whole draft as one document under
//! [`PAGES_COLLECTION`]. [`EditingSession::publish`] transitions a copy of
//! the draft, saves the copy, and only then adopts it, so a failed write
//! leaves the session exactly as it was.

use crate::draft::{DraftError, IdentityField, PageDraft, PageEditor, PhotoSlot};
use crate::memory::{MediaKind, MediaLimits, MediaSource, Memory, MemoryError, new_memory_id};
use crate::preview::Language;
use crate::services::{AuthError, CurrentUser, DocumentStore, ObjectStore, StoreError, object_path};
use crate::slug::generate_slug;
use crate::template::TemplateId;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Document collection holding page drafts.
pub const PAGES_COLLECTION: &str = "memorialPages";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error("upload failed: {0}")]
    UploadFailed(StoreError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("stored page is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("user {user} may not edit page {page}")]
    Forbidden { user: String, page: String },
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl SessionError {
    /// Message shown to the user. Saves and uploads are always safe to retry.
    pub fn localized(&self, lang: Language) -> String {
        use MemoryError::{CapacityExceeded, FileTooLarge};
        match (self, lang) {
            (SessionError::Auth(e), _) => e.localized(lang).to_string(),
            (
                SessionError::Draft(DraftError::Memory(CapacityExceeded { kind, limit })),
                Language::Tr,
            ) => {
                let noun = match kind {
                    MediaKind::Photo => "fotoğraf",
                    MediaKind::Video => "video",
                };
                format!("En fazla {limit} {noun} ekleyebilirsiniz.")
            }
            (
                SessionError::Draft(DraftError::Memory(CapacityExceeded { kind, limit })),
                Language::En,
            ) => {
                format!("You can add at most {limit} {kind}s.")
            }
            (SessionError::Draft(DraftError::Memory(FileTooLarge { limit, .. })), Language::Tr) => {
                format!("Video boyutu en fazla {} MB olabilir.", limit / (1024 * 1024))
            }
            (SessionError::Draft(DraftError::Memory(FileTooLarge { limit, .. })), Language::En) => {
                format!("Videos can be at most {} MB.", limit / (1024 * 1024))
            }
            (SessionError::UploadFailed(_), Language::Tr) => {
                "Dosya yüklenemedi. Lütfen tekrar deneyin.".into()
            }
            (SessionError::UploadFailed(_), Language::En) => {
                "The file could not be uploaded. Please try again.".into()
            }
            (SessionError::Store(_), Language::Tr) => {
                "Değişiklikler kaydedilemedi. Lütfen tekrar deneyin.".into()
            }
            (SessionError::Store(_), Language::En) => {
                "Your changes could not be saved. Please try again.".into()
            }
            (SessionError::Forbidden { .. }, Language::Tr) => {
                "Bu sayfayı düzenleme yetkiniz yok.".into()
            }
            (SessionError::Forbidden { .. }, Language::En) => {
                "You do not have permission to edit this page.".into()
            }
            (other, Language::Tr) => format!("İşlem tamamlanamadı: {other}"),
            (other, Language::En) => other.to_string(),
        }
    }
}

/// Backend handles shared by all sessions.
#[derive(Clone)]
pub struct Backend {
    pub documents: Arc<dyn DocumentStore>,
    pub objects: Arc<dyn ObjectStore>,
    /// First path segment of uploaded objects.
    pub storage_root: String,
}

/// What an upload will fill in once it completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    Memory(String),
    /// `previous` is what the slot held before staging, restored on abandon.
    Photo {
        slot: PhotoSlot,
        handle: String,
        previous: Option<MediaSource>,
    },
}

/// A staged upload, ready to be sent with [`upload`].
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub target: UploadTarget,
    pub path: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedUpload {
    pub target: UploadTarget,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// `replaced` is the durable URL of an identity photo the upload took
    /// over, now unreferenced.
    Applied { replaced: Option<String> },
    /// The target was removed or replaced mid-upload; the object is orphaned.
    Discarded { url: String },
}

pub struct EditingSession {
    user: CurrentUser,
    editor: PageEditor,
    backend: Backend,
}

impl EditingSession {
    /// Load `page_id`, or start a fresh draft from `template` if it does not exist.
    ///
    /// A new draft is not written until the first [`save`](Self::save).
    pub async fn open(
        user: CurrentUser,
        backend: Backend,
        page_id: &str,
        template: TemplateId,
        limits: MediaLimits,
    ) -> Result<Self, SessionError> {
        let draft = match backend.documents.get(PAGES_COLLECTION, page_id).await? {
            Some(doc) => {
                let draft: PageDraft = serde_json::from_value(doc)?;
                if !user.can_edit(&draft.owner_id) {
                    return Err(SessionError::Forbidden {
                        user: user.id.clone(),
                        page: page_id.to_string(),
                    });
                }
                debug!(page = page_id, status = %draft.status, "opened existing page");
                draft
            }
            None => {
                debug!(page = page_id, template = %template, "starting new page");
                PageDraft::from_template(page_id, user.id.clone(), template)
            }
        };
        Ok(Self {
            user,
            editor: PageEditor::new(draft, limits),
            backend,
        })
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    pub fn draft(&self) -> &PageDraft {
        self.editor.draft()
    }

    pub fn editor(&self) -> &PageEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut PageEditor {
        &mut self.editor
    }

    /// Object store handle for running [`upload`] and [`discard_object`].
    pub fn objects(&self) -> Arc<dyn ObjectStore> {
        Arc::clone(&self.backend.objects)
    }

    fn path_for(&self, file_name: &str, bytes: &[u8]) -> String {
        let draft = self.editor.draft();
        object_path(
            &self.backend.storage_root,
            &draft.owner_id,
            &draft.id,
            file_name,
            bytes,
        )
    }

    /// Add a pending memory for a picked file and prepare its upload.
    ///
    /// Limits are checked here, before any bytes leave the device.
    pub fn stage_media(
        &mut self,
        kind: MediaKind,
        file_name: &str,
        bytes: Vec<u8>,
        order: i64,
    ) -> Result<PendingUpload, SessionError> {
        let id = new_memory_id();
        let item = Memory::new(id.clone(), kind, MediaSource::pending(), order)
            .with_size(bytes.len() as u64);
        self.editor.add_memory(item)?;
        debug!(memory = %id, %kind, size = bytes.len(), "upload staged");
        Ok(PendingUpload {
            target: UploadTarget::Memory(id),
            path: self.path_for(file_name, &bytes),
            bytes,
        })
    }

    /// Put a pending profile or cover photo in place and prepare its upload.
    pub fn stage_identity_photo(
        &mut self,
        slot: PhotoSlot,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<PendingUpload, SessionError> {
        let source = MediaSource::pending();
        let handle = source.href().to_string();
        let previous = self.editor.draft().identity.photo(slot).cloned();
        let field = match slot {
            PhotoSlot::Profile => IdentityField::ProfilePhoto(Some(source)),
            PhotoSlot::Cover => IdentityField::CoverPhoto(Some(source)),
        };
        self.editor.set_identity_field(field)?;
        debug!(?slot, size = bytes.len(), "identity photo staged");
        Ok(PendingUpload {
            target: UploadTarget::Photo {
                slot,
                handle,
                previous,
            },
            path: self.path_for(file_name, &bytes),
            bytes,
        })
    }

    /// Apply a finished upload to the draft.
    pub fn finish_upload(&mut self, completed: CompletedUpload) -> UploadOutcome {
        let url = completed.url;
        let (applied, replaced) = match completed.target {
            UploadTarget::Memory(id) => (self.editor.resolve_upload(&id, &url), None),
            UploadTarget::Photo {
                slot,
                handle,
                previous,
            } => {
                let applied = self.editor.resolve_identity_photo(slot, &handle, &url);
                // Same bytes land on the same path
                let replaced = previous
                    .as_ref()
                    .and_then(MediaSource::durable_url)
                    .filter(|old| *old != url)
                    .map(str::to_string);
                (applied, replaced)
            }
        };
        if applied {
            debug!(%url, ?replaced, "upload applied");
            UploadOutcome::Applied { replaced }
        } else {
            info!(%url, "upload target gone, discarding object");
            UploadOutcome::Discarded { url }
        }
    }

    /// Undo the staging of an upload that failed.
    ///
    /// A pending memory is removed. An identity photo slot gets back what it
    /// held before, unless it has been changed again since.
    pub fn abandon_upload(&mut self, target: &UploadTarget) {
        match target {
            UploadTarget::Memory(id) => {
                self.editor.remove_memory(id);
            }
            UploadTarget::Photo {
                slot,
                handle,
                previous,
            } => {
                self.editor.restore_identity_photo(*slot, handle, previous.clone());
            }
        }
    }

    /// Remove a memory. Returns its durable URL, if it had one, for cleanup.
    pub fn remove_media(&mut self, id: &str) -> Option<String> {
        let removed = self.editor.remove_memory(id)?;
        removed.source.durable_url().map(str::to_string)
    }

    async fn write(&self, draft: &PageDraft) -> Result<(), SessionError> {
        let doc = serde_json::to_value(draft)?;
        self.backend
            .documents
            .set(PAGES_COLLECTION, &draft.id, doc)
            .await?;
        Ok(())
    }

    /// Write the current draft.
    pub async fn save(&self) -> Result<(), SessionError> {
        let draft = self.editor.draft();
        self.write(draft).await?;
        info!(page = %draft.id, memories = draft.memories.len(), "page saved");
        Ok(())
    }

    /// Publish the page and return its public link.
    ///
    /// The first publish assigns a slug from the page name; later publishes
    /// keep it.
    pub async fn publish(&mut self) -> Result<String, SessionError> {
        let mut next = self.editor.clone();
        next.mark_published(generate_slug(&next.draft().identity.name))?;
        self.write(next.draft()).await?;

        let link = next.draft().unique_link.clone().unwrap_or_default();
        self.editor = next;
        info!(page = %self.editor.draft().id, link = %link, "page published");
        Ok(link)
    }

    /// Take the page offline, keeping its link.
    pub async fn unpublish(&mut self) -> Result<(), SessionError> {
        let mut next = self.editor.clone();
        next.unpublish()?;
        self.write(next.draft()).await?;
        self.editor = next;
        info!(page = %self.editor.draft().id, "page unpublished");
        Ok(())
    }
}

/// Send a staged upload to the object store.
pub async fn upload(
    objects: &dyn ObjectStore,
    pending: PendingUpload,
) -> Result<CompletedUpload, SessionError> {
    let url = objects
        .upload(&pending.path, pending.bytes)
        .await
        .map_err(SessionError::UploadFailed)?;
    Ok(CompletedUpload {
        target: pending.target,
        url,
    })
}

/// Delete an object nobody references any more. Failures are logged only.
pub async fn discard_object(objects: &dyn ObjectStore, url: &str) {
    if let Err(e) = objects.delete(url).await {
        warn!(url, error = %e, "could not delete orphaned object");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{InMemoryDocuments, InMemoryObjects, Role};

    fn backend() -> Backend {
        Backend {
            documents: Arc::new(InMemoryDocuments::new()),
            objects: Arc::new(InMemoryObjects::new()),
            storage_root: "users".into(),
        }
    }

    fn customer(id: &str) -> CurrentUser {
        CurrentUser {
            id: id.into(),
            email: format!("{id}@example.com"),
            email_verified: true,
            role: Role::Customer,
        }
    }

    #[tokio::test]
    async fn new_page_is_seeded_from_template_and_owned_by_user() {
        let s = EditingSession::open(
            customer("u1"),
            backend(),
            "pg",
            TemplateId::Modern,
            MediaLimits::default(),
        )
        .await
        .unwrap();
        assert_eq!(s.draft().owner_id, "u1");
        assert_eq!(s.draft().settings.accent_color, "#0a84ff");
    }

    #[tokio::test]
    async fn staging_over_capacity_fails_before_upload() {
        let limits = MediaLimits {
            max_videos: 1,
            ..MediaLimits::default()
        };
        let mut s =
            EditingSession::open(customer("u1"), backend(), "pg", TemplateId::Classic, limits)
                .await
                .unwrap();
        s.stage_media(MediaKind::Video, "a.mp4", vec![0; 10], 1).unwrap();
        let err = s
            .stage_media(MediaKind::Video, "b.mp4", vec![0; 10], 2)
            .unwrap_err();
        assert!(matches!(err, SessionError::Draft(DraftError::Memory(_))));
        assert_eq!(s.draft().memories.len(), 1);
    }

    #[tokio::test]
    async fn staged_path_is_under_owner_and_page() {
        let mut s = EditingSession::open(
            customer("u1"),
            backend(),
            "pg",
            TemplateId::Classic,
            MediaLimits::default(),
        )
        .await
        .unwrap();
        let pending = s
            .stage_media(MediaKind::Photo, "a.jpg", vec![1, 2, 3], 1)
            .unwrap();
        assert!(pending.path.starts_with("users/u1/pages/pg/"));
        assert!(pending.path.ends_with("-a.jpg"));
        assert_eq!(s.draft().memories.iter().next().map(|m| m.size_bytes), Some(3));
    }

    #[test]
    fn errors_have_user_messages() {
        let full = SessionError::Draft(DraftError::Memory(MemoryError::CapacityExceeded {
            kind: MediaKind::Photo,
            limit: 8,
        }));
        assert_eq!(full.localized(Language::Tr), "En fazla 8 fotoğraf ekleyebilirsiniz.");
        assert_eq!(full.localized(Language::En), "You can add at most 8 photos.");

        let big = SessionError::Draft(DraftError::Memory(MemoryError::FileTooLarge {
            size: 60 * 1024 * 1024,
            limit: 50 * 1024 * 1024,
        }));
        assert_eq!(big.localized(Language::En), "Videos can be at most 50 MB.");

        let auth = SessionError::Auth(AuthError::WeakPassword);
        assert_eq!(
            auth.localized(Language::En),
            AuthError::WeakPassword.localized(Language::En)
        );
    }

    #[tokio::test]
    async fn abandoned_upload_unblocks_publishing() {
        let mut s = EditingSession::open(
            customer("u1"),
            backend(),
            "pg",
            TemplateId::Classic,
            MediaLimits::default(),
        )
        .await
        .unwrap();
        s.editor_mut()
            .set_identity_field(IdentityField::Name("Ali".into()))
            .unwrap();
        let pending = s
            .stage_identity_photo(PhotoSlot::Cover, "c.jpg", vec![9])
            .unwrap();
        assert!(s.draft().check_publishable().is_err());

        s.abandon_upload(&pending.target);
        assert_eq!(s.draft().identity.cover_photo, None);
        assert!(s.draft().check_publishable().is_ok());
    }
}
