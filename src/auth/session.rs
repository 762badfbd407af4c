use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Signed-in account as reported by the authentication provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

impl User {
    pub fn new<S: Into<String>>(uid: S) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
            photo_url: None,
            email_verified: false,
        }
    }

    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name<S: Into<String>>(mut self, name: S) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Shared holder of the current signed-in user
///
/// Cloning is cheap and every clone sees the same value. Subscribers get the
/// current value first and then each change.
#[derive(Clone)]
pub struct Session {
    sender: Arc<watch::Sender<Option<User>>>,
}

impl Session {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Session already holding `user`
    pub fn signed_in(user: User) -> Self {
        let session = Self::new();
        session.set(Some(user));
        session
    }

    pub fn current(&self) -> Option<User> {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.sender.subscribe()
    }

    pub fn set(&self, user: Option<User>) {
        self.sender.send_replace(user);
    }

    pub fn is_authenticated(&self) -> bool {
        self.sender.borrow().is_some()
    }

    /// Mirror the provider's auth-state notifications into this session
    ///
    /// The current provider value is applied right away. The task ends when
    /// the provider drops its sender.
    pub fn attach(&self, mut provider: watch::Receiver<Option<User>>) -> JoinHandle<()> {
        let sender = Arc::clone(&self.sender);
        sender.send_replace(provider.borrow_and_update().clone());

        tokio::spawn(async move {
            while provider.changed().await.is_ok() {
                let user = provider.borrow_and_update().clone();
                debug!(uid = ?user.as_ref().map(|u| u.uid.as_str()), "Auth state changed");
                sender.send_replace(user);
            }
            debug!("Auth state source closed");
        })
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
