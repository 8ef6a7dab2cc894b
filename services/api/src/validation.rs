//! Request validation rules.
//!
//! Each public function checks one request shape and returns every failing
//! field at once (no early abort), so clients can render the full list.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ApiError, FieldDetail};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 100;
const EMAIL_MAX: usize = 200;
const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 50;

fn check_name(path: &str, value: &str, details: &mut Vec<FieldDetail>) {
    let trimmed = value.trim();
    if trimmed.chars().count() < NAME_MIN || trimmed.chars().count() > NAME_MAX {
        details.push(FieldDetail::new(
            path,
            format!("length must be between {NAME_MIN} and {NAME_MAX} characters"),
        ));
    }
}

fn check_email(value: &str, details: &mut Vec<FieldDetail>) {
    if value.len() > EMAIL_MAX || !EMAIL_RE.is_match(value) {
        details.push(FieldDetail::new("email", "must be a valid email"));
    }
}

fn check_password(value: &str, details: &mut Vec<FieldDetail>) {
    if value.len() < PASSWORD_MIN || value.len() > PASSWORD_MAX {
        details.push(FieldDetail::new(
            "password",
            format!("length must be between {PASSWORD_MIN} and {PASSWORD_MAX} characters"),
        ));
    }
    if !value.chars().any(|c| c.is_ascii_lowercase()) {
        details.push(FieldDetail::new(
            "password",
            "must contain at least one lowercase character",
        ));
    }
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        details.push(FieldDetail::new(
            "password",
            "must contain at least one uppercase character",
        ));
    }
    if value.chars().all(|c| c.is_ascii_alphanumeric()) {
        details.push(FieldDetail::new(
            "password",
            "must contain at least one special character",
        ));
    }
}

fn check_otp_code(value: u32, details: &mut Vec<FieldDetail>) {
    if !(100_000..=999_999).contains(&value) {
        details.push(FieldDetail::new("token", "must be a 6-digit code"));
    }
}

fn check_reference_code(value: &str, details: &mut Vec<FieldDetail>) {
    if value.len() != 36 {
        details.push(FieldDetail::new(
            "reference_code",
            "length must be 36 characters",
        ));
    }
}

fn finish(details: Vec<FieldDetail>) -> Result<(), ApiError> {
    if details.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(details))
    }
}

pub fn signin(email: &str, password: &str) -> Result<(), ApiError> {
    let mut details = Vec::new();
    check_email(email, &mut details);
    if password.len() < PASSWORD_MIN || password.len() > PASSWORD_MAX {
        details.push(FieldDetail::new(
            "password",
            format!("length must be between {PASSWORD_MIN} and {PASSWORD_MAX} characters"),
        ));
    }
    finish(details)
}

pub fn signup(
    firstname: &str,
    lastname: &str,
    email: &str,
    password: &str,
    token: u32,
    reference_code: &str,
) -> Result<(), ApiError> {
    let mut details = Vec::new();
    check_name("firstname", firstname, &mut details);
    check_name("lastname", lastname, &mut details);
    check_email(email, &mut details);
    check_password(password, &mut details);
    check_otp_code(token, &mut details);
    check_reference_code(reference_code, &mut details);
    finish(details)
}

pub fn verify_email(email: &str) -> Result<(), ApiError> {
    let mut details = Vec::new();
    check_email(email, &mut details);
    finish(details)
}

pub fn create_user(
    firstname: &str,
    lastname: &str,
    email: &str,
    password: &str,
) -> Result<(), ApiError> {
    let mut details = Vec::new();
    check_name("firstname", firstname, &mut details);
    check_name("lastname", lastname, &mut details);
    check_email(email, &mut details);
    check_password(password, &mut details);
    finish(details)
}

pub fn update_user(
    firstname: Option<&str>,
    lastname: Option<&str>,
    password: Option<&str>,
) -> Result<(), ApiError> {
    let mut details = Vec::new();
    if let Some(firstname) = firstname {
        check_name("firstname", firstname, &mut details);
    }
    if let Some(lastname) = lastname {
        check_name("lastname", lastname, &mut details);
    }
    if let Some(password) = password {
        check_password(password, &mut details);
    }
    finish(details)
}

/// Role and permission names share the profile-name length rule.
pub fn entity_name(path: &str, name: &str) -> Result<(), ApiError> {
    let mut details = Vec::new();
    check_name(path, name, &mut details);
    finish(details)
}
