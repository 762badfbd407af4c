//! Account flows against a scripted provider and in-memory stores

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use bookshelf_client::auth::{
    AuthErrorCode, AuthProvider, AuthService, LoginForm, RegisterForm, Session, USERS_COLLECTION,
    UserProfile,
};
use bookshelf_client::notice::{NoticeKind, messages};
use bookshelf_client::store::{BlobStore, DocumentStore, MemoryBlobStore, MemoryDocumentStore};
use bookshelf_client::BookshelfError;
use common::{FakeAuthProvider, drain, notice_channel};
use tokio::time::timeout;
use tracing_test::traced_test;

struct Harness {
    provider: Arc<FakeAuthProvider>,
    documents: Arc<MemoryDocumentStore>,
    blobs: Arc<MemoryBlobStore>,
    session: Session,
    service: AuthService,
    notices: tokio::sync::mpsc::UnboundedReceiver<bookshelf_client::Notice>,
}

fn harness(provider: FakeAuthProvider) -> Harness {
    let provider = Arc::new(provider);
    let documents = Arc::new(MemoryDocumentStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let session = Session::new();
    let (tx, notices) = notice_channel();

    let service = AuthService::new(
        provider.clone(),
        documents.clone(),
        blobs.clone(),
        session.clone(),
    )
    .with_notifier(tx);

    Harness {
        provider,
        documents,
        blobs,
        session,
        service,
        notices,
    }
}

fn register_form(email: &str) -> RegisterForm {
    RegisterForm {
        full_name: "Ana Pérez".to_string(),
        email: email.to_string(),
        password: "secreto".to_string(),
        accepted_terms: true,
    }
}

#[tokio::test]
#[traced_test]
async fn test_register_creates_profile_and_folder() {
    let mut h = harness(FakeAuthProvider::new());

    let user = h
        .service
        .register_with_email(&register_form("ana@example.com"))
        .await
        .unwrap();
    assert_eq!(user.display_name.as_deref(), Some("Ana Pérez"));
    assert_eq!(h.session.current().unwrap().uid, user.uid);
    assert!(h.service.is_authenticated());

    let doc = h
        .documents
        .get(USERS_COLLECTION, &user.uid)
        .await
        .unwrap()
        .expect("profile document");
    let profile: UserProfile = doc.decode().unwrap();
    assert_eq!(profile.email.as_deref(), Some("ana@example.com"));
    assert_eq!(profile.display_name.as_deref(), Some("Ana Pérez"));

    let listing = h.blobs.list("users/ana@example.com").await.unwrap();
    assert_eq!(listing.items, vec!["users/ana@example.com/.folder"]);
    assert!(drain(&mut h.notices).is_empty());
}

#[tokio::test]
async fn test_register_keeps_existing_folder() {
    let h = harness(FakeAuthProvider::new());
    h.blobs
        .upload_text("users/ana@example.com/notes.txt", "hola")
        .await
        .unwrap();

    h.service
        .register_with_email(&register_form("ana@example.com"))
        .await
        .unwrap();

    let listing = h.blobs.list("users/ana@example.com").await.unwrap();
    assert_eq!(listing.items, vec!["users/ana@example.com/notes.txt"]);
}

#[tokio::test]
async fn test_register_existing_email_maps_error_code() {
    let mut h = harness(FakeAuthProvider::new().with_account("ana@example.com", "secreto"));

    let err = h
        .service
        .register_with_email(&register_form("ana@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BookshelfError::Auth {
            code: AuthErrorCode::EmailAlreadyInUse
        }
    ));

    let notices = drain(&mut h.notices);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::Error);
    assert_eq!(notices[0].message, "Este correo ya está registrado");
}

#[tokio::test]
async fn test_invalid_form_never_reaches_provider() {
    let h = harness(FakeAuthProvider::new());

    let mut form = register_form("ana@example.com");
    form.accepted_terms = false;
    let err = h.service.register_with_email(&form).await.unwrap_err();
    assert!(matches!(err, BookshelfError::InvalidForm { field: "terms", .. }));
    assert!(h.provider.current_user().is_none());
    assert_eq!(h.documents.len(USERS_COLLECTION).await, 0);
}

#[tokio::test]
#[traced_test]
async fn test_login_records_last_login() {
    let h = harness(FakeAuthProvider::new().with_account("ana@example.com", "secreto"));

    let user = h
        .service
        .login_with_email(&LoginForm::new("ana@example.com", "secreto"))
        .await
        .unwrap();

    let doc = h
        .documents
        .get(USERS_COLLECTION, &user.uid)
        .await
        .unwrap()
        .unwrap();
    assert!(doc.field("lastLogin").is_some());
    assert_eq!(h.session.current(), Some(user));
}

#[tokio::test]
async fn test_wrong_password_message() {
    let mut h = harness(FakeAuthProvider::new().with_account("ana@example.com", "secreto"));

    let err = h
        .service
        .login_with_email(&LoginForm::new("ana@example.com", "otro-secreto"))
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Contraseña incorrecta");
    assert!(!h.session.is_authenticated());

    let notices = drain(&mut h.notices);
    assert_eq!(notices[0].message, "Contraseña incorrecta");
}

#[tokio::test]
async fn test_google_first_login_creates_profile_once() {
    let h = harness(FakeAuthProvider::new());

    let user = h.service.login_with_google().await.unwrap();
    assert_eq!(&user, h.provider.google_user());

    let profile: UserProfile = h
        .documents
        .get(USERS_COLLECTION, &user.uid)
        .await
        .unwrap()
        .unwrap()
        .decode()
        .unwrap();
    assert_eq!(profile.display_name.as_deref(), Some("Ana Google"));
    let created_at = profile.created_at;

    let listing = h.blobs.list("users/ana@gmail.com").await.unwrap();
    assert_eq!(listing.items.len(), 1);

    // Returning user: profile keeps its creation time
    h.service.login_with_google().await.unwrap();
    let profile: UserProfile = h
        .documents
        .get(USERS_COLLECTION, &user.uid)
        .await
        .unwrap()
        .unwrap()
        .decode()
        .unwrap();
    assert_eq!(profile.created_at, created_at);
    assert!(profile.last_login >= created_at);
    assert_eq!(h.provider.redirect_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_google_popup_blocked_falls_back_to_redirect() {
    let h = harness(FakeAuthProvider::new().with_popup_error("auth/popup-blocked"));

    let user = h.service.login_with_google().await.unwrap();
    assert_eq!(user.uid, "google-uid");
    assert_eq!(h.provider.redirect_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_google_other_popup_error_is_reported() {
    let mut h = harness(FakeAuthProvider::new().with_popup_error("auth/user-disabled"));

    let err = h.service.login_with_google().await.unwrap_err();
    assert!(matches!(
        err,
        BookshelfError::Auth {
            code: AuthErrorCode::UserDisabled
        }
    ));
    assert_eq!(h.provider.redirect_calls.load(Ordering::SeqCst), 0);
    assert_eq!(drain(&mut h.notices).len(), 1);
}

#[tokio::test]
async fn test_reset_password() {
    let mut h = harness(FakeAuthProvider::new().with_account("ana@example.com", "secreto"));

    h.service.reset_password("ana@example.com").await.unwrap();
    assert_eq!(
        h.provider.reset_emails.lock().unwrap().clone(),
        vec!["ana@example.com"]
    );
    let notices = drain(&mut h.notices);
    assert_eq!(notices[0].kind, NoticeKind::Success);
    assert_eq!(notices[0].message, messages::RECOVERY_SENT);

    let err = h.service.reset_password("  ").await.unwrap_err();
    assert!(matches!(err, BookshelfError::InvalidForm { field: "email", .. }));

    let err = h
        .service
        .reset_password("nadie@example.com")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BookshelfError::Auth {
            code: AuthErrorCode::UserNotFound
        }
    ));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let h = harness(FakeAuthProvider::new().with_account("ana@example.com", "secreto"));

    h.service
        .login_with_email(&LoginForm::new("ana@example.com", "secreto"))
        .await
        .unwrap();
    assert!(h.service.is_authenticated());

    h.service.logout().await.unwrap();
    assert!(!h.service.is_authenticated());
    assert!(h.session.current().is_none());
}

#[tokio::test]
async fn test_session_follows_provider_state() {
    let h = harness(FakeAuthProvider::new().with_account("ana@example.com", "secreto"));
    let watcher = Session::new();
    let _forward = watcher.attach(h.provider.on_auth_state_changed());
    let mut rx = watcher.subscribe();

    h.service
        .login_with_email(&LoginForm::new("ana@example.com", "secreto"))
        .await
        .unwrap();
    timeout(Duration::from_secs(1), rx.wait_for(|user| user.is_some()))
        .await
        .unwrap()
        .unwrap();

    h.service.logout().await.unwrap();
    timeout(Duration::from_secs(1), rx.wait_for(|user| user.is_none()))
        .await
        .unwrap()
        .unwrap();
}
