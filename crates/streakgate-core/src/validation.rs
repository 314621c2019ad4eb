//! Format contracts for login and registration input
//!
//! - Login: a syntactically valid email and a non-empty password, both
//!   trimmed
//! - Registration: names of letters and spaces, a valid email, a password
//!   of at least 8 characters with a lowercase letter, an uppercase letter
//!   and a digit, and a phone number of the form `+?[1-9]\d{1,14}`

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::user::Profile;

/// Minimum registration password length
pub const MIN_PASSWORD_LENGTH: usize = 8;
/// Maximum digits after the leading digit of a phone number
const MAX_PHONE_TAIL: usize = 14;

/// Input that broke a format contract
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password is required")]
    MissingPassword,

    #[error("{0} is required")]
    MissingName(&'static str),

    #[error("{0} can only contain letters")]
    InvalidName(&'static str),

    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("Password must contain at least one lowercase, one uppercase, and one number")]
    PasswordTooWeak,

    #[error("Invalid phone number format")]
    InvalidPhone,
}

/// Login form input
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form input
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

impl RegistrationForm {
    /// Profile part of the form (everything but the password)
    pub fn profile(&self) -> Profile {
        Profile {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Check a login form, returning the trimmed values
pub fn validate_login(form: &LoginForm) -> Result<LoginForm, ValidationError> {
    let email = form.email.trim();
    let password = form.password.trim();

    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if password.is_empty() {
        return Err(ValidationError::MissingPassword);
    }

    Ok(LoginForm {
        email: email.to_string(),
        password: password.to_string(),
    })
}

/// Check a registration form
pub fn validate_registration(form: &RegistrationForm) -> Result<(), ValidationError> {
    validate_name("First name", &form.first_name)?;
    validate_name("Last name", &form.last_name)?;

    if !is_valid_email(&form.email) {
        return Err(ValidationError::InvalidEmail);
    }

    validate_password(&form.password)?;

    if !is_valid_phone(&form.phone) {
        return Err(ValidationError::InvalidPhone);
    }

    Ok(())
}

fn validate_name(field: &'static str, name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::MissingName(field));
    }
    if !name.chars().all(|c| c.is_ascii_alphabetic() || c.is_whitespace()) {
        return Err(ValidationError::InvalidName(field));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_lower && has_upper && has_digit) {
        return Err(ValidationError::PasswordTooWeak);
    }

    Ok(())
}

/// `local@domain.tld` with conservative character sets
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    let local_ok = !local.is_empty()
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-'".contains(c));

    let labels: Vec<&str> = domain.split('.').collect();
    let domain_ok = labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
        && labels
            .last()
            .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()));

    local_ok && domain_ok
}

/// International phone number: optional `+`, a non-zero digit, then 1-14 digits
pub fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let mut chars = digits.chars();

    match chars.next() {
        Some(first) if ('1'..='9').contains(&first) => {}
        _ => return false,
    }

    let tail: Vec<char> = chars.collect();
    (1..=MAX_PHONE_TAIL).contains(&tail.len()) && tail.iter().all(|c| c.is_ascii_digit())
}
