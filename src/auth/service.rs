use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use super::forms::{LoginForm, RegisterForm, validate_reset_email};
use super::provider::{AuthProvider, Credential, OAuthProvider};
use super::session::{Session, User};
use crate::error::{BookshelfError, Result};
use crate::notice::{LogNotifier, Notice, Notifier, messages};
use crate::store::{BlobStore, DocumentStore};

/// Collection holding one profile document per uid
pub const USERS_COLLECTION: &str = "users";

const FOLDER_MARKER: &str = ".folder";
const DEFAULT_DISPLAY_NAME: &str = "Usuario";
const UNKNOWN_EMAIL: &str = "unknown";

/// Profile document stored at `users/{uid}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

impl UserProfile {
    fn for_user(user: &User, display_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            uid: user.uid.clone(),
            email: user.email.clone(),
            display_name: display_name.or_else(|| user.display_name.clone()),
            photo_url: user.photo_url.clone(),
            email_verified: user.email_verified,
            created_at: now,
            last_login: now,
        }
    }
}

/// Blob folder that belongs to the account with `email`
pub fn user_folder(email: &str) -> String {
    format!("users/{}", email)
}

/// Account operations on top of an [`AuthProvider`]
///
/// Successful sign-ins update the shared [`Session`]. Provider failures are
/// mapped to [`BookshelfError::Auth`] and reported to the notifier with their
/// localized message.
pub struct AuthService {
    provider: Arc<dyn AuthProvider>,
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    session: Session,
    notifier: Arc<dyn Notifier>,
}

impl AuthService {
    pub fn new(
        provider: Arc<dyn AuthProvider>,
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        session: Session,
    ) -> Self {
        Self {
            provider,
            documents,
            blobs,
            session,
            notifier: Arc::new(LogNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Sign in with email and password
    ///
    /// Recording the last-login time is best effort.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn login_with_email(&self, form: &LoginForm) -> Result<User> {
        let result = self.try_login_with_email(form).await;
        self.report(result)
    }

    /// Create an account, its profile document and its blob folder
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register_with_email(&self, form: &RegisterForm) -> Result<User> {
        let result = self.try_register_with_email(form).await;
        self.report(result)
    }

    /// Google sign-in through a popup, falling back to the redirect flow
    /// when the popup is closed or blocked
    ///
    /// The first sign-in of an account creates its folder and profile.
    #[instrument(skip(self))]
    pub async fn login_with_google(&self) -> Result<User> {
        let result = self.try_login_with_google().await;
        self.report(result)
    }

    #[instrument(skip(self))]
    pub async fn reset_password(&self, email: &str) -> Result<()> {
        let result = self.try_reset_password(email).await;
        if result.is_ok() {
            info!("Password reset email sent");
            self.notifier.notify(Notice::success(messages::RECOVERY_SENT));
        }
        self.report(result)
    }

    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        let result = self.provider.sign_out().await.map_err(BookshelfError::from);
        if result.is_ok() {
            self.session.set(None);
            info!("Signed out");
        }
        self.report(result)
    }

    pub fn current_user(&self) -> Option<User> {
        self.session
            .current()
            .or_else(|| self.provider.current_user())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    fn signed_in(&self, credential: Credential) -> User {
        info!(uid = %credential.user.uid, new_user = credential.is_new_user, "Signed in");
        self.session.set(Some(credential.user.clone()));
        credential.user
    }

    fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            warn!("Account operation failed: {}", err);
            self.notifier.notify(Notice::error(err.user_message()));
        }
        result
    }

    async fn try_login_with_email(&self, form: &LoginForm) -> Result<User> {
        form.validate()?;
        let credential = self
            .provider
            .sign_in_with_email(form.email.trim(), &form.password)
            .await?;
        self.record_last_login(&credential.user).await;
        Ok(self.signed_in(credential))
    }

    async fn try_register_with_email(&self, form: &RegisterForm) -> Result<User> {
        form.validate()?;
        let email = form.email.trim();
        let mut credential = self
            .provider
            .register_with_email(email, &form.password)
            .await?;

        let display_name = form.full_name.trim().to_string();
        self.save_profile(&credential.user, Some(display_name.clone()))
            .await?;
        self.ensure_user_folder(email).await?;

        credential.user.display_name = Some(display_name);
        Ok(self.signed_in(credential))
    }

    async fn try_login_with_google(&self) -> Result<User> {
        let credential = match self.provider.sign_in_with_popup(OAuthProvider::Google).await {
            Ok(credential) => credential,
            Err(err) if err.auth_code().is_popup_failure() => {
                info!(code = %err.code, "Popup sign-in unavailable, using redirect");
                self.provider
                    .sign_in_with_redirect(OAuthProvider::Google)
                    .await?
            }
            Err(err) => return Err(err.into()),
        };

        let user = &credential.user;
        let existing = self.documents.get(USERS_COLLECTION, &user.uid).await?;
        if existing.is_none() {
            info!(uid = %user.uid, "First Google sign-in, creating profile");
            self.ensure_user_folder(user.email.as_deref().unwrap_or(UNKNOWN_EMAIL))
                .await?;
            let display_name = user
                .display_name
                .clone()
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());
            self.save_profile(user, Some(display_name)).await?;
        }

        self.record_last_login(user).await;
        Ok(self.signed_in(credential))
    }

    async fn try_reset_password(&self, email: &str) -> Result<()> {
        validate_reset_email(email)?;
        self.provider.send_password_reset(email.trim()).await?;
        Ok(())
    }

    async fn save_profile(&self, user: &User, display_name: Option<String>) -> Result<()> {
        let profile = UserProfile::for_user(user, display_name);
        self.documents
            .set_merge(USERS_COLLECTION, &user.uid, serde_json::to_value(&profile)?)
            .await?;
        debug!(uid = %user.uid, "Profile saved");
        Ok(())
    }

    async fn record_last_login(&self, user: &User) {
        let fields = json!({ "lastLogin": Utc::now() });
        if let Err(err) = self
            .documents
            .set_merge(USERS_COLLECTION, &user.uid, fields)
            .await
        {
            warn!(uid = %user.uid, "Could not record last login: {}", err);
        }
    }

    /// Create `users/{email}/.folder` unless the folder already has content
    async fn ensure_user_folder(&self, email: &str) -> Result<()> {
        let folder = user_folder(email);

        match self.blobs.list(&folder).await {
            Ok(listing) if !listing.is_empty() => {
                debug!(folder = %folder, "User folder already exists");
                return Ok(());
            }
            Ok(_) => {}
            Err(err) => debug!(folder = %folder, "Folder listing failed: {}", err),
        }

        self.blobs
            .upload_text(&format!("{}/{}", folder, FOLDER_MARKER), "")
            .await?;
        info!(folder = %folder, "User folder created");
        Ok(())
    }
}
