//! Process-local implementations of the collaborator traits.
//!
//! Each store has switches that make the next calls fail, so callers can
//! exercise their error paths without a real backend.

use super::identity::{AuthError, CurrentUser, IdentityProvider, Role};
use super::store::{DocumentStore, ObjectStore, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

const MIN_PASSWORD_LEN: usize = 6;

fn poisoned<E>(_: E) -> StoreError {
    StoreError::Unavailable("lock poisoned".into())
}

struct Account {
    password: String,
    user: CurrentUser,
}

/// Email/password accounts held in memory.
#[derive(Default)]
pub struct InMemoryIdentity {
    accounts: Mutex<HashMap<String, Account>>,
    current: Mutex<Option<CurrentUser>>,
    disabled: AtomicBool,
}

impl InMemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every sign-up and sign-in fail with `OperationDisabled`.
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }

    /// Change the role of an existing account.
    pub fn set_role(&self, email: &str, role: Role) -> Result<(), AuthError> {
        let mut accounts = self
            .accounts
            .lock()
            .map_err(|_| AuthError::Unknown("lock poisoned".into()))?;
        let account = accounts
            .get_mut(&email.to_lowercase())
            .ok_or(AuthError::InvalidIdentifier)?;
        account.user.role = role;
        Ok(())
    }

    fn check_enabled(&self) -> Result<(), AuthError> {
        if self.disabled.load(Ordering::SeqCst) {
            Err(AuthError::OperationDisabled)
        } else {
            Ok(())
        }
    }

    fn set_current(&self, user: Option<CurrentUser>) -> Result<(), AuthError> {
        let mut current = self
            .current
            .lock()
            .map_err(|_| AuthError::Unknown("lock poisoned".into()))?;
        *current = user;
        Ok(())
    }
}

fn valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

fn valid_phone(phone: &str) -> bool {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    digits >= 10
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'))
}

#[async_trait]
impl IdentityProvider for InMemoryIdentity {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        phone: &str,
    ) -> Result<CurrentUser, AuthError> {
        self.check_enabled()?;
        let email = email.trim().to_lowercase();
        if !valid_email(&email) || !valid_phone(phone) {
            return Err(AuthError::InvalidIdentifier);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        let user = {
            let mut accounts = self
                .accounts
                .lock()
                .map_err(|_| AuthError::Unknown("lock poisoned".into()))?;
            if accounts.contains_key(&email) {
                return Err(AuthError::EmailInUse);
            }
            let user = CurrentUser {
                id: uuid::Uuid::new_v4().simple().to_string(),
                email: email.clone(),
                email_verified: false,
                role: Role::Customer,
            };
            accounts.insert(
                email,
                Account {
                    password: password.to_string(),
                    user: user.clone(),
                },
            );
            user
        };
        debug!(user = %user.id, "signed up");
        self.set_current(Some(user.clone()))?;
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<CurrentUser, AuthError> {
        self.check_enabled()?;
        let user = {
            let accounts = self
                .accounts
                .lock()
                .map_err(|_| AuthError::Unknown("lock poisoned".into()))?;
            match accounts.get(&email.trim().to_lowercase()) {
                Some(account) if account.password == password => account.user.clone(),
                _ => return Err(AuthError::InvalidIdentifier),
            }
        };
        self.set_current(Some(user.clone()))?;
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.set_current(None)
    }

    fn current_user(&self) -> Option<CurrentUser> {
        self.current.lock().ok().and_then(|c| c.clone())
    }
}

/// JSON documents keyed by `(collection, id)`.
#[derive(Default)]
pub struct InMemoryDocuments {
    docs: Mutex<HashMap<(String, String), serde_json::Value>>,
    fail_writes: AtomicBool,
}

impl InMemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.docs.lock().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocuments {
    async fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<serde_json::Value>, StoreError> {
        let docs = self.docs.lock().map_err(poisoned)?;
        Ok(docs.get(&(collection.to_string(), id.to_string())).cloned())
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        mut document: serde_json::Value,
    ) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes are failing".into()));
        }
        if let Some(obj) = document.as_object_mut() {
            obj.insert(
                "updatedAt".into(),
                serde_json::Value::String(Utc::now().to_rfc3339()),
            );
        }
        let mut docs = self.docs.lock().map_err(poisoned)?;
        docs.insert((collection.to_string(), id.to_string()), document);
        debug!(collection, id, "document written");
        Ok(())
    }
}

/// Objects held in memory under `memory://objects/{path}` URLs.
#[derive(Default)]
pub struct InMemoryObjects {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
}

impl InMemoryObjects {
    pub const BASE_URL: &'static str = "memory://objects/";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, url: &str) -> bool {
        self.objects
            .lock()
            .map(|o| o.contains_key(url))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjects {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, StoreError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("uploads are failing".into()));
        }
        let url = format!("{}{}", Self::BASE_URL, path);
        let mut objects = self.objects.lock().map_err(poisoned)?;
        objects.insert(url.clone(), bytes);
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<(), StoreError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("deletes are failing".into()));
        }
        let mut objects = self.objects.lock().map_err(poisoned)?;
        objects
            .remove(url)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(url.to_string()))
    }
}
