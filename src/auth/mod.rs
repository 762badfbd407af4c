//! Accounts and the signed-in session
//!
//! The managed authentication provider is reached through [`AuthProvider`].
//! [`AuthService`] layers profile bookkeeping and localized error reporting
//! on top of it, and keeps the shared [`Session`] current.

pub mod errors;
pub mod forms;
pub mod provider;
pub mod service;
pub mod session;

pub use errors::AuthErrorCode;
pub use forms::{LoginForm, RegisterForm};
pub use provider::{AuthProvider, Credential, OAuthProvider, ProviderError, ProviderResult};
pub use service::{AuthService, USERS_COLLECTION, UserProfile};
pub use session::{Session, User};
