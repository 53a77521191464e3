//! # Memoria
//!
//! The page composition model behind a QR-linked digital memorial service.
//! A customer composes a memorial page for someone who has passed away:
//! identity, a small collection of photos and videos, and a visual style
//! picked from a template catalog. The same page state drives three views:
//! the editor's live preview, a compact sidebar preview, and the public
//! page visitors reach by scanning the plaque.
//!
//! # Architecture
//!
//! ```text
//! template ─┐
//! settings ─┼─► PageDraft ──► PreviewModel ──► render (full | sidebar | public)
//! memory  ──┘      ▲
//!                  │ load / save / upload
//!             EditingSession ◄──► services (identity, documents, objects)
//! ```
//!
//! Everything left of the session is synchronous and pure: every mutation
//! returns a new value or leaves the old one untouched. The session is the
//! only place that awaits collaborator calls.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`template`] | Closed catalog of style presets (`classic`, `modern`, `minimal`, `elegant`) |
//! | [`settings`] | Page appearance, single-field updates, dark-background palette |
//! | [`memory`] | Ordered photo/video collection with media limits |
//! | [`draft`] | The page aggregate and its editor: identity, status transitions |
//! | [`preview`] | Render-ready projection of a draft, computed once per view |
//! | [`render`] | Maud renderers for the three views |
//! | [`slug`] | Public link slugs from names, with Turkish transliteration |
//! | [`services`] | Identity, document store and object store contracts plus in-memory backends |
//! | [`session`] | One user editing one page: uploads, save, publish |
//! | [`config`] | `config.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## One Model, Three Views
//!
//! Renderers never see a [`draft::PageDraft`]. They take a
//! [`preview::PreviewModel`] in which hidden memories are already gone,
//! order is settled and dates are formatted, so the views cannot disagree
//! about what the page shows.
//!
//! ## Pending Media
//!
//! A picked file appears in the preview immediately through a local handle
//! and is swapped for a durable URL when its upload completes. Pages with
//! pending media cannot be published.
//!
//! ## Grandfathered Limits
//!
//! Media limits are checked when an item is added. Lowering a limit never
//! trims existing pages or blocks them from publishing.

pub mod config;
pub mod draft;
pub mod memory;
pub mod output;
pub mod preview;
pub mod render;
pub mod services;
pub mod session;
pub mod settings;
pub mod slug;
pub mod template;

#[cfg(test)]
pub(crate) mod test_helpers;
