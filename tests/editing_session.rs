//! Editing session against the in-memory backends.

use memoria::draft::{DraftError, IdentityField, PageStatus, PhotoSlot};
use memoria::memory::{MediaKind, MediaLimits, MediaSource};
use memoria::services::{
    CurrentUser, DocumentStore, IdentityProvider, InMemoryDocuments, InMemoryIdentity,
    InMemoryObjects, Role,
};
use memoria::session::{
    Backend, EditingSession, PAGES_COLLECTION, SessionError, UploadOutcome, discard_object, upload,
};
use memoria::slug::is_valid_slug;
use memoria::template::TemplateId;
use std::sync::Arc;

struct Fixture {
    documents: Arc<InMemoryDocuments>,
    objects: Arc<InMemoryObjects>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            documents: Arc::new(InMemoryDocuments::new()),
            objects: Arc::new(InMemoryObjects::new()),
        }
    }

    fn backend(&self) -> Backend {
        Backend {
            documents: self.documents.clone(),
            objects: self.objects.clone(),
            storage_root: "users".into(),
        }
    }

    async fn open(&self, user: &CurrentUser, page: &str) -> Result<EditingSession, SessionError> {
        EditingSession::open(
            user.clone(),
            self.backend(),
            page,
            TemplateId::Classic,
            MediaLimits::default(),
        )
        .await
    }
}

fn user(id: &str, role: Role) -> CurrentUser {
    CurrentUser {
        id: id.into(),
        email: format!("{id}@example.com"),
        email_verified: true,
        role,
    }
}

fn named(session: &mut EditingSession, name: &str) {
    session
        .editor_mut()
        .set_identity_field(IdentityField::Name(name.into()))
        .unwrap();
}

#[tokio::test]
async fn saved_page_reopens_with_same_content() {
    let fx = Fixture::new();
    let owner = user("u1", Role::Customer);

    let mut s = fx.open(&owner, "pg").await.unwrap();
    named(&mut s, "Ayşe Öztürk");
    let pending = s
        .stage_media(MediaKind::Photo, "a.jpg", b"jpeg".to_vec(), 1)
        .unwrap();
    let done = upload(&*fx.objects, pending).await.unwrap();
    assert_eq!(
        s.finish_upload(done),
        UploadOutcome::Applied { replaced: None }
    );
    s.save().await.unwrap();

    let stored = fx.documents.get(PAGES_COLLECTION, "pg").await.unwrap().unwrap();
    assert!(stored["updatedAt"].is_string());

    let reopened = fx.open(&owner, "pg").await.unwrap();
    assert_eq!(reopened.draft().identity.name, "Ayşe Öztürk");
    assert_eq!(reopened.draft().memories.len(), 1);
    assert!(reopened.draft().updated_at.is_some());
    let memory = reopened.draft().memories.iter().next().unwrap();
    assert!(!memory.source.is_pending());
    assert!(fx.objects.contains(memory.source.href()));
}

#[tokio::test]
async fn failed_save_keeps_edits_in_session() {
    let fx = Fixture::new();
    let owner = user("u1", Role::Customer);
    let mut s = fx.open(&owner, "pg").await.unwrap();
    named(&mut s, "Ali");

    fx.documents.set_fail_writes(true);
    let err = s.save().await.unwrap_err();
    assert!(matches!(err, SessionError::Store(_)));
    assert_eq!(s.draft().identity.name, "Ali");
    assert!(fx.documents.is_empty());

    fx.documents.set_fail_writes(false);
    s.save().await.unwrap();
    assert_eq!(fx.documents.len(), 1);
}

#[tokio::test]
async fn upload_finishing_after_removal_is_discarded() {
    let fx = Fixture::new();
    let owner = user("u1", Role::Customer);
    let mut s = fx.open(&owner, "pg").await.unwrap();

    let pending = s
        .stage_media(MediaKind::Video, "v.mp4", vec![0; 64], 1)
        .unwrap();
    let memory_id = s.draft().memories.iter().next().unwrap().id.clone();

    // The user removes the item while its bytes are still in flight
    assert_eq!(s.remove_media(&memory_id), None);
    let done = upload(&*fx.objects, pending).await.unwrap();

    let UploadOutcome::Discarded { url } = s.finish_upload(done) else {
        panic!("expected a discarded upload");
    };
    assert!(s.draft().memories.is_empty());

    discard_object(&*fx.objects, &url).await;
    assert!(fx.objects.is_empty());
}

#[tokio::test]
async fn removing_uploaded_media_returns_url_for_cleanup() {
    let fx = Fixture::new();
    let owner = user("u1", Role::Customer);
    let mut s = fx.open(&owner, "pg").await.unwrap();

    let pending = s
        .stage_media(MediaKind::Photo, "a.jpg", vec![1], 1)
        .unwrap();
    let done = upload(&*fx.objects, pending).await.unwrap();
    let url = done.url.clone();
    s.finish_upload(done);

    let id = s.draft().memories.iter().next().unwrap().id.clone();
    assert_eq!(s.remove_media(&id), Some(url.clone()));

    // Cleanup failures are logged, never surfaced
    fx.objects.set_fail_deletes(true);
    discard_object(&*fx.objects, &url).await;
    assert!(fx.objects.contains(&url));
}

#[tokio::test]
async fn failed_upload_can_be_abandoned() {
    let fx = Fixture::new();
    let owner = user("u1", Role::Customer);
    let mut s = fx.open(&owner, "pg").await.unwrap();
    named(&mut s, "Ali");

    let pending = s
        .stage_media(MediaKind::Photo, "a.jpg", vec![1], 1)
        .unwrap();
    let target = pending.target.clone();
    fx.objects.set_fail_uploads(true);

    let err = upload(&*fx.objects, pending).await.unwrap_err();
    assert!(matches!(err, SessionError::UploadFailed(_)));
    assert!(matches!(
        s.draft().check_publishable(),
        Err(DraftError::NotPublishable(_))
    ));

    s.abandon_upload(&target);
    assert!(s.draft().memories.is_empty());
    assert!(s.draft().check_publishable().is_ok());
}

#[tokio::test]
async fn failed_photo_replacement_keeps_current_photo() {
    let fx = Fixture::new();
    let owner = user("u1", Role::Customer);
    let mut s = fx.open(&owner, "pg").await.unwrap();
    named(&mut s, "Ali");
    let old = MediaSource::durable("https://cdn/old.jpg");
    s.editor_mut()
        .set_identity_field(IdentityField::ProfilePhoto(Some(old.clone())))
        .unwrap();

    let pending = s
        .stage_identity_photo(PhotoSlot::Profile, "new.jpg", vec![7])
        .unwrap();
    let target = pending.target.clone();
    fx.objects.set_fail_uploads(true);
    assert!(upload(&*fx.objects, pending).await.is_err());

    s.abandon_upload(&target);
    assert_eq!(s.draft().identity.profile_photo, Some(old));
    assert!(s.draft().check_publishable().is_ok());
}

#[tokio::test]
async fn replaced_photo_is_returned_for_cleanup() {
    let fx = Fixture::new();
    let owner = user("u1", Role::Customer);
    let mut s = fx.open(&owner, "pg").await.unwrap();

    let first = s
        .stage_identity_photo(PhotoSlot::Cover, "a.jpg", vec![1])
        .unwrap();
    let done = upload(&*fx.objects, first).await.unwrap();
    let old_url = done.url.clone();
    assert_eq!(
        s.finish_upload(done),
        UploadOutcome::Applied { replaced: None }
    );

    let second = s
        .stage_identity_photo(PhotoSlot::Cover, "b.jpg", vec![2])
        .unwrap();
    let done = upload(&*fx.objects, second).await.unwrap();
    let new_url = done.url.clone();
    let UploadOutcome::Applied {
        replaced: Some(replaced),
    } = s.finish_upload(done)
    else {
        panic!("expected the old cover to be handed back");
    };
    assert_eq!(replaced, old_url);
    assert_eq!(
        s.draft().identity.cover_photo,
        Some(MediaSource::durable(new_url.clone()))
    );

    discard_object(&*fx.objects, &replaced).await;
    assert!(!fx.objects.contains(&old_url));
    assert!(fx.objects.contains(&new_url));
}

#[tokio::test]
async fn reuploading_the_same_photo_replaces_nothing() {
    let fx = Fixture::new();
    let owner = user("u1", Role::Customer);
    let mut s = fx.open(&owner, "pg").await.unwrap();

    for _ in 0..2 {
        let pending = s
            .stage_identity_photo(PhotoSlot::Profile, "me.jpg", vec![5])
            .unwrap();
        let done = upload(&*fx.objects, pending).await.unwrap();
        assert_eq!(
            s.finish_upload(done),
            UploadOutcome::Applied { replaced: None }
        );
    }
    assert_eq!(fx.objects.len(), 1);
}

#[tokio::test]
async fn publish_assigns_link_once() {
    let fx = Fixture::new();
    let owner = user("u1", Role::Customer);
    let mut s = fx.open(&owner, "pg").await.unwrap();
    named(&mut s, "Ayşe Öztürk");

    let link = s.publish().await.unwrap();
    assert!(link.starts_with("ayse-ozturk-"), "{link}");
    assert!(is_valid_slug(&link));
    assert_eq!(s.draft().status, PageStatus::Published);

    s.unpublish().await.unwrap();
    let again = s.publish().await.unwrap();
    assert_eq!(again, link);

    let reopened = fx.open(&owner, "pg").await.unwrap();
    assert_eq!(reopened.draft().unique_link.as_deref(), Some(link.as_str()));
}

#[tokio::test]
async fn failed_publish_write_leaves_session_unpublished() {
    let fx = Fixture::new();
    let owner = user("u1", Role::Customer);
    let mut s = fx.open(&owner, "pg").await.unwrap();
    named(&mut s, "Ali");

    fx.documents.set_fail_writes(true);
    assert!(s.publish().await.is_err());
    assert_eq!(s.draft().status, PageStatus::Draft);
    assert_eq!(s.draft().unique_link, None);
}

#[tokio::test]
async fn publish_with_pending_upload_is_rejected() {
    let fx = Fixture::new();
    let owner = user("u1", Role::Customer);
    let mut s = fx.open(&owner, "pg").await.unwrap();
    named(&mut s, "Ali");
    s.stage_media(MediaKind::Photo, "a.jpg", vec![1], 1).unwrap();

    let err = s.publish().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Draft(DraftError::NotPublishable(_))
    ));
    assert!(fx.documents.is_empty());
}

#[tokio::test]
async fn other_customers_cannot_open_a_page() {
    let fx = Fixture::new();
    let owner = user("u1", Role::Customer);
    let s = fx.open(&owner, "pg").await.unwrap();
    s.save().await.unwrap();

    let stranger = user("u2", Role::Customer);
    assert!(matches!(
        fx.open(&stranger, "pg").await,
        Err(SessionError::Forbidden { .. })
    ));

    let admin = user("a1", Role::Admin);
    let s = fx.open(&admin, "pg").await.unwrap();
    assert_eq!(s.draft().owner_id, "u1");
}

#[tokio::test]
async fn corrupt_document_is_reported() {
    let fx = Fixture::new();
    fx.documents
        .set(PAGES_COLLECTION, "pg", serde_json::json!({"id": 5}))
        .await
        .unwrap();

    let owner = user("u1", Role::Customer);
    assert!(matches!(
        fx.open(&owner, "pg").await,
        Err(SessionError::Corrupt(_))
    ));
}

#[tokio::test]
async fn signed_in_user_opens_own_page() {
    let fx = Fixture::new();
    let auth = InMemoryIdentity::new();
    auth.sign_up("ayse@example.com", "secret1", "05551234567")
        .await
        .unwrap();
    let current = auth.current_user().unwrap();

    let s = fx.open(&current, "pg").await.unwrap();
    assert_eq!(s.user().id, current.id);
    assert_eq!(s.draft().owner_id, current.id);
}
