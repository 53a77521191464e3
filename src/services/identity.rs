//! Identity provider contract.

use crate::preview::Language;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dashboard role of a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Creates and pays for memorial pages.
    #[default]
    Customer,
    /// Manufactures the physical QR plaques.
    Producer,
    Admin,
}

/// The signed-in user, passed explicitly to whoever needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub email_verified: bool,
    pub role: Role,
}

impl CurrentUser {
    /// Owners edit their own pages; admins edit any page.
    pub fn can_edit(&self, owner_id: &str) -> bool {
        self.role == Role::Admin || self.id == owner_id
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("email address is already in use")]
    EmailInUse,
    #[error("password is too weak")]
    WeakPassword,
    #[error("invalid email, phone number or password")]
    InvalidIdentifier,
    #[error("this sign-in method is disabled")]
    OperationDisabled,
    #[error("authentication failed: {0}")]
    Unknown(String),
}

impl AuthError {
    /// Message shown to the user.
    pub fn localized(&self, lang: Language) -> &'static str {
        match (self, lang) {
            (AuthError::EmailInUse, Language::Tr) => "Bu e-posta adresi zaten kullanılıyor.",
            (AuthError::EmailInUse, Language::En) => "This email address is already in use.",
            (AuthError::WeakPassword, Language::Tr) => "Şifre en az 6 karakter olmalıdır.",
            (AuthError::WeakPassword, Language::En) => {
                "Password must be at least 6 characters."
            }
            (AuthError::InvalidIdentifier, Language::Tr) => {
                "Geçersiz e-posta, telefon numarası veya şifre."
            }
            (AuthError::InvalidIdentifier, Language::En) => {
                "Invalid email, phone number or password."
            }
            (AuthError::OperationDisabled, Language::Tr) => "Bu giriş yöntemi şu anda kapalı.",
            (AuthError::OperationDisabled, Language::En) => {
                "This sign-in method is currently disabled."
            }
            (AuthError::Unknown(_), Language::Tr) => "Bir hata oluştu. Lütfen tekrar deneyin.",
            (AuthError::Unknown(_), Language::En) => "Something went wrong. Please try again.",
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        phone: &str,
    ) -> Result<CurrentUser, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<CurrentUser, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// The signed-in user, if any.
    fn current_user(&self) -> Option<CurrentUser>;
}
