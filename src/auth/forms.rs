//! Login and registration form validation

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{BookshelfError, Result};

pub const MIN_PASSWORD_LEN: usize = 6;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Failed to compile email regex")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email.trim())
}

fn invalid(field: &'static str, reason: &'static str) -> BookshelfError {
    BookshelfError::InvalidForm { field, reason }
}

fn check_email(email: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(invalid("email", "El correo es obligatorio"));
    }
    if !is_valid_email(email) {
        return Err(invalid("email", "El correo electrónico no es válido"));
    }
    Ok(())
}

fn check_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(invalid("password", "La contraseña es obligatoria"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(invalid(
            "password",
            "La contraseña debe tener al menos 6 caracteres",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new<E: Into<String>, P: Into<String>>(email: E, password: P) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_email(&self.email)?;
        check_password(&self.password)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub accepted_terms: bool,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<()> {
        if self.full_name.trim().is_empty() {
            return Err(invalid("full_name", "El nombre es obligatorio"));
        }
        check_email(&self.email)?;
        check_password(&self.password)?;
        if !self.accepted_terms {
            return Err(invalid("terms", "Debes aceptar los términos y condiciones"));
        }
        Ok(())
    }
}

/// Validate the address typed into the password-recovery prompt
pub fn validate_reset_email(email: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(invalid("email", "El correo es obligatorio"));
    }
    Ok(())
}
