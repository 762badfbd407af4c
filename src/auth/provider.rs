use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;

use super::errors::AuthErrorCode;
use super::session::User;
use crate::error::BookshelfError;

/// Failure reported by the authentication provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ProviderError {
    /// Provider code such as `auth/wrong-password`
    pub code: String,
    pub message: String,
}

impl ProviderError {
    pub fn new<C: Into<String>, M: Into<String>>(code: C, message: M) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn auth_code(&self) -> AuthErrorCode {
        AuthErrorCode::from_code(&self.code)
    }
}

impl From<ProviderError> for BookshelfError {
    fn from(err: ProviderError) -> Self {
        BookshelfError::Auth {
            code: err.auth_code(),
        }
    }
}

/// Federated identity providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
}

/// Result of a sign-in or registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub user: User,
    /// `true` when the provider created the account during this sign-in
    pub is_new_user: bool,
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Managed authentication provider
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in_with_email(
        &self,
        email: &str,
        password: &str,
    ) -> ProviderResult<Credential>;

    async fn register_with_email(
        &self,
        email: &str,
        password: &str,
    ) -> ProviderResult<Credential>;

    async fn sign_in_with_popup(&self, provider: OAuthProvider) -> ProviderResult<Credential>;

    async fn sign_in_with_redirect(
        &self,
        provider: OAuthProvider,
    ) -> ProviderResult<Credential>;

    async fn send_password_reset(&self, email: &str) -> ProviderResult<()>;

    async fn sign_out(&self) -> ProviderResult<()>;

    fn current_user(&self) -> Option<User>;

    /// Auth-state notifications, starting with the current value
    fn on_auth_state_changed(&self) -> watch::Receiver<Option<User>>;
}
