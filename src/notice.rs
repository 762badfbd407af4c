//! Transient user-facing messages
//!
//! Operations that the user triggers report their outcome as a [`Notice`].
//! The presentation layer decides how to show it (toast, snackbar, status
//! line). A [`Notifier`] is injected wherever notices are produced.

use std::fmt;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info<S: Into<String>>(message: S) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn success<S: Into<String>>(message: S) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error<S: Into<String>>(message: S) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Fixed notice texts
pub mod messages {
    pub const NO_BOOKS_FOUND: &str = "No se encontraron libros";
    pub const LOAD_FAILED: &str = "Error al cargar libros";
    pub const SEARCH_FAILED: &str = "Error al buscar libros";
    pub const LOAD_MORE_FAILED: &str = "Error al cargar más libros";
    pub const ENTER_SEARCH: &str = "Escribe un término o selecciona un filtro";
    pub const REFERENCE_SAVED: &str = "Referencia guardada exitosamente";
    pub const REFERENCE_SAVE_FAILED: &str = "Error al guardar referencia";
    pub const REFERENCE_DELETED: &str = "Referencia eliminada exitosamente";
    pub const REFERENCE_DELETE_FAILED: &str = "Error al eliminar referencia";
    pub const LOGIN_REQUIRED: &str = "Debes iniciar sesión para guardar referencias";
    pub const RECOVERY_SENT: &str = "Se ha enviado un correo de recuperación";
}

/// Sink for notices
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the tracing log; useful when nothing displays them
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Error => warn!(message = %notice.message, "notice"),
            NoticeKind::Info | NoticeKind::Success => info!(message = %notice.message, "notice"),
        }
    }
}

/// Forward notices over a channel to whatever renders them
impl Notifier for UnboundedSender<Notice> {
    fn notify(&self, notice: Notice) {
        // A closed receiver means the screen is gone; nothing left to show
        let _ = self.send(notice);
    }
}
