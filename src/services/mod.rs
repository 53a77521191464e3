//! Contracts of the external collaborators.
//!
//! Authentication, document persistence and object storage are provided
//! by a managed backend. This module defines only what the page model
//! consumes from them:
//!
//! | Trait | Operations |
//! |-------|-----------|
//! | [`IdentityProvider`] | `sign_up`, `sign_in`, `sign_out`, `current_user` |
//! | [`DocumentStore`] | `get`, `set` on JSON documents |
//! | [`ObjectStore`] | `upload` bytes to a path, `delete` by URL |
//!
//! The [`in_memory`] implementations back the tests and the CLI; a
//! deployment plugs in clients for its backend behind the same traits.

pub mod identity;
pub mod in_memory;
pub mod store;

pub use identity::{AuthError, CurrentUser, IdentityProvider, Role};
pub use in_memory::{InMemoryDocuments, InMemoryIdentity, InMemoryObjects};
pub use store::{DocumentStore, ObjectStore, StoreError, object_path};
