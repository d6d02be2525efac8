use std::sync::LazyLock;

use regex::Regex;

use crate::{
    error::{AppError, FieldError},
    models::{note::CreateNote, user::CreateUser, user::LoginPayload},
    store::users::normalize_email,
};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_TITLE_LEN: usize = 200;

/// Normalized email plus the password exactly as typed.
#[derive(Debug, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Trimmed title plus untouched content.
#[derive(Debug, PartialEq, Eq)]
pub struct NoteInput {
    pub title: String,
    pub content: String,
}

static EMAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").unwrap());

pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

fn check_email(raw: &str, errors: &mut Vec<FieldError>) {
    let email = raw.trim();
    if email.is_empty() {
        errors.push(field("email", "Email is required"));
    } else if !is_email(email) {
        errors.push(field("email", "Invalid email address"));
    }
}

fn field(name: &'static str, message: &str) -> FieldError {
    FieldError {
        field: name,
        message: message.to_string(),
    }
}

fn finish<T>(errors: Vec<FieldError>, value: impl FnOnce() -> T) -> Result<T, AppError> {
    if errors.is_empty() {
        Ok(value())
    } else {
        Err(AppError::validation(errors))
    }
}

pub fn registration(payload: &CreateUser) -> Result<Credentials, AppError> {
    let mut errors = Vec::new();
    check_email(&payload.email, &mut errors);

    let password = payload.password.trim();
    if password.is_empty() {
        errors.push(field("password", "Password is required"));
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(field("password", "Password must be at least 6 characters"));
    }

    finish(errors, || Credentials {
        email: normalize_email(&payload.email),
        password: payload.password.clone(),
    })
}

/// Login only checks presence.
pub fn login(payload: &LoginPayload) -> Result<Credentials, AppError> {
    let mut errors = Vec::new();
    check_email(&payload.email, &mut errors);
    if payload.password.trim().is_empty() {
        errors.push(field("password", "Password is required"));
    }

    finish(errors, || Credentials {
        email: normalize_email(&payload.email),
        password: payload.password.clone(),
    })
}

pub fn new_note(payload: &CreateNote) -> Result<NoteInput, AppError> {
    let mut errors = Vec::new();
    let title = payload.title.trim();
    if title.is_empty() {
        errors.push(field("title", "Title is required"));
    } else if title.chars().count() > MAX_TITLE_LEN {
        errors.push(field("title", "Title cannot exceed 200 characters"));
    }
    if payload.content.trim().is_empty() {
        errors.push(field("content", "Content is required"));
    }

    finish(errors, || NoteInput {
        title: title.to_string(),
        content: payload.content.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str, password: &str) -> Result<Credentials, AppError> {
        registration(&CreateUser {
            email: email.into(),
            password: password.into(),
        })
    }

    #[test]
    fn email_shapes() {
        assert!(is_email("a@b.co"));
        assert!(is_email("first.last+tag@sub.example.org"));
        assert!(!is_email("plainaddress"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("user@localhost"));
        assert!(!is_email("user@.com"));
        assert!(!is_email("user@example."));
        assert!(!is_email("us er@example.com"));
        assert!(is_email("a@b.c@d"));
    }

    #[test]
    fn registration_normalizes_email_and_keeps_password() {
        let creds = register("  Alice@Example.COM ", " secret1 ").unwrap();
        assert_eq!(creds.email, "alice@example.com");
        assert_eq!(creds.password, " secret1 ");
    }

    #[test]
    fn registration_reports_every_field() {
        match register("nope", "123") {
            Err(AppError::Validation { message, errors }) => {
                assert_eq!(message, "Invalid email address");
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[1].field, "password");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn login_skips_length_rule() {
        let creds = login(&LoginPayload {
            email: "a@b.co".into(),
            password: "x".into(),
        })
        .unwrap();
        assert_eq!(creds.password, "x");

        assert!(login(&LoginPayload {
            email: "a@b.co".into(),
            password: "   ".into(),
        })
        .is_err());
    }

    #[test]
    fn note_title_bounds() {
        let ok = new_note(&CreateNote {
            title: "  Groceries  ".into(),
            content: " ciphertext ".into(),
        })
        .unwrap();
        assert_eq!(ok.title, "Groceries");
        assert_eq!(ok.content, " ciphertext ");

        let long = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(new_note(&CreateNote {
            title: long,
            content: "c".into(),
        })
        .is_err());

        let exact = "x".repeat(MAX_TITLE_LEN);
        assert!(new_note(&CreateNote {
            title: exact,
            content: "c".into(),
        })
        .is_ok());
    }

    #[test]
    fn note_requires_content() {
        assert!(matches!(
            new_note(&CreateNote {
                title: "t".into(),
                content: "  ".into(),
            }),
            Err(AppError::Validation { .. })
        ));
    }
}
