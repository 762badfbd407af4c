use std::fmt;

/// Error codes reported by the authentication provider
///
/// The table is exhaustive for the codes the app handles. Anything else is
/// kept verbatim in [`AuthErrorCode::Unknown`] and shown with a generic
/// message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    UserNotFound,
    WrongPassword,
    InvalidCredential,
    EmailAlreadyInUse,
    InvalidEmail,
    WeakPassword,
    TooManyRequests,
    NetworkRequestFailed,
    PopupClosedByUser,
    PopupBlocked,
    UserDisabled,
    OperationNotAllowed,
    MissingEmail,
    Unknown(String),
}

const DEFAULT_MESSAGE: &str = "Error de autenticación. Inténtalo de nuevo";

impl AuthErrorCode {
    /// Map a provider code such as `auth/wrong-password`
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "auth/user-not-found" => Self::UserNotFound,
            "auth/wrong-password" => Self::WrongPassword,
            "auth/invalid-credential" => Self::InvalidCredential,
            "auth/email-already-in-use" => Self::EmailAlreadyInUse,
            "auth/invalid-email" => Self::InvalidEmail,
            "auth/weak-password" => Self::WeakPassword,
            "auth/too-many-requests" => Self::TooManyRequests,
            "auth/network-request-failed" => Self::NetworkRequestFailed,
            "auth/popup-closed-by-user" => Self::PopupClosedByUser,
            "auth/popup-blocked" => Self::PopupBlocked,
            "auth/user-disabled" => Self::UserDisabled,
            "auth/operation-not-allowed" => Self::OperationNotAllowed,
            "auth/missing-email" => Self::MissingEmail,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_code(&self) -> &str {
        match self {
            Self::UserNotFound => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::InvalidCredential => "auth/invalid-credential",
            Self::EmailAlreadyInUse => "auth/email-already-in-use",
            Self::InvalidEmail => "auth/invalid-email",
            Self::WeakPassword => "auth/weak-password",
            Self::TooManyRequests => "auth/too-many-requests",
            Self::NetworkRequestFailed => "auth/network-request-failed",
            Self::PopupClosedByUser => "auth/popup-closed-by-user",
            Self::PopupBlocked => "auth/popup-blocked",
            Self::UserDisabled => "auth/user-disabled",
            Self::OperationNotAllowed => "auth/operation-not-allowed",
            Self::MissingEmail => "auth/missing-email",
            Self::Unknown(code) => code,
        }
    }

    /// Localized message for a notice
    pub fn message(&self) -> &'static str {
        match self {
            Self::UserNotFound => "No existe una cuenta con este correo",
            Self::WrongPassword => "Contraseña incorrecta",
            Self::InvalidCredential => "Correo o contraseña incorrectos",
            Self::EmailAlreadyInUse => "Este correo ya está registrado",
            Self::InvalidEmail => "El correo electrónico no es válido",
            Self::WeakPassword => "La contraseña debe tener al menos 6 caracteres",
            Self::TooManyRequests => "Demasiados intentos. Inténtalo más tarde",
            Self::NetworkRequestFailed => "Error de conexión. Revisa tu red",
            Self::PopupClosedByUser => "Se cerró la ventana de inicio de sesión",
            Self::PopupBlocked => "El navegador bloqueó la ventana de inicio de sesión",
            Self::UserDisabled => "Esta cuenta ha sido deshabilitada",
            Self::OperationNotAllowed => "Este método de inicio de sesión no está habilitado",
            Self::MissingEmail => "Ingresa tu correo electrónico",
            Self::Unknown(_) => DEFAULT_MESSAGE,
        }
    }

    /// Popup failures that the redirect flow can recover from
    pub fn is_popup_failure(&self) -> bool {
        matches!(self, Self::PopupClosedByUser | Self::PopupBlocked)
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}
