//! Authentication business logic - password hashing, registration and login.
//!
//! Passwords are hashed with bcrypt and only the hash is stored. Login
//! failures never reveal whether the username exists.

use crate::{
    core::forms::FormFields,
    entities::{Role, user},
    errors::{Error, FieldError, Result, conflict_on_unique},
};
use sea_orm::{Set, SqlErr, prelude::*};
use std::collections::HashMap;
use tracing::{info, instrument, warn};

/// Shortest accepted username
pub const USERNAME_MIN_LEN: usize = 4;
/// Longest accepted username
pub const USERNAME_MAX_LEN: usize = 30;
/// Shortest accepted password
pub const PASSWORD_MIN_LEN: usize = 7;

pub(crate) const USERNAME_TAKEN: &str = "Username already exists! Please try a different username";
pub(crate) const EMAIL_TAKEN: &str =
    "Email Address already exists! Please try a different email address";

/// Maps a unique violation on the users table to the clashing field.
///
/// The detail names the column (`UNIQUE constraint failed: users.email`),
/// which is how a lost race on the email is told apart from one on the
/// username.
pub(crate) fn account_conflict(err: DbErr) -> Error {
    let email_clash = matches!(
        err.sql_err(),
        Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains("email")
    );
    if email_clash {
        conflict_on_unique(err, "email_address", EMAIL_TAKEN)
    } else {
        conflict_on_unique(err, "username", USERNAME_TAKEN)
    }
}

/// Hashes a plaintext password with the given bcrypt cost.
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    bcrypt::hash(password, cost).map_err(Into::into)
}

/// Checks a plaintext password against a stored hash.
///
/// A malformed hash is treated as a mismatch.
#[must_use]
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    bcrypt::verify(password, password_hash).unwrap_or(false)
}

pub(crate) fn username_problem(username: &str) -> Option<String> {
    let len = username.chars().count();
    if (USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        None
    } else {
        Some(format!(
            "Field must be between {USERNAME_MIN_LEN} and {USERNAME_MAX_LEN} characters long."
        ))
    }
}

pub(crate) fn email_problem(email: &str) -> Option<String> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        None
    } else {
        Some("Invalid email address.".to_string())
    }
}

pub(crate) fn password_problem(password: &str) -> Option<String> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        Some(format!(
            "Field must be at least {PASSWORD_MIN_LEN} characters long."
        ))
    } else {
        None
    }
}

/// A submitted registration.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Reads `username`, `email_address`, `password1` and `password2`.
    pub fn from_form(values: &HashMap<String, String>) -> Result<Self> {
        let mut form = FormFields::new(values);
        let registration = Self {
            username: form.text("username"),
            email: form.text("email_address"),
            password: form.secret("password1"),
            confirm_password: form.secret("password2"),
        };
        let registration = form.finish(registration)?;
        registration.validate()?;
        Ok(registration)
    }

    /// Shape checks that do not need the database.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if let Some(message) = username_problem(&self.username) {
            errors.push(FieldError::new("username", message));
        }
        if let Some(message) = email_problem(&self.email) {
            errors.push(FieldError::new("email_address", message));
        }
        if let Some(message) = password_problem(&self.password) {
            errors.push(FieldError::new("password1", message));
        }
        if self.password != self.confirm_password {
            errors.push(FieldError::new("password2", "Field must be equal to password1."));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation { errors })
        }
    }
}

/// A submitted login.
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn from_form(values: &HashMap<String, String>) -> Result<Self> {
        let mut form = FormFields::new(values);
        let login = Self {
            username: form.text("username"),
            password: form.secret("password"),
        };
        form.finish(login)
    }
}

/// Creates a worker account after checking that username and email are free.
///
/// The uniqueness checks run before the insert; a concurrent registration that
/// wins the race is still reported as a conflict by the store constraint.
#[instrument(skip(db, form), fields(username = %form.username))]
pub async fn register(
    db: &DatabaseConnection,
    form: RegistrationForm,
    cost: u32,
) -> Result<user::Model> {
    form.validate()?;

    if crate::core::user::get_user_by_username(db, &form.username)
        .await?
        .is_some()
    {
        return Err(Error::Conflict {
            field: "username".to_string(),
            message: USERNAME_TAKEN.to_string(),
        });
    }
    if crate::core::user::get_user_by_email(db, &form.email)
        .await?
        .is_some()
    {
        return Err(Error::Conflict {
            field: "email_address".to_string(),
            message: EMAIL_TAKEN.to_string(),
        });
    }

    let password_hash = hash_password(&form.password, cost)?;
    let now = chrono::Utc::now().naive_utc();

    let account = user::ActiveModel {
        username: Set(form.username),
        email: Set(form.email),
        password_hash: Set(password_hash),
        role: Set(Role::Worker),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = account
        .insert(db)
        .await
        .map_err(account_conflict)?;

    info!(user_id = created.id, "account registered");
    Ok(created)
}

/// Verifies a username/password pair.
///
/// # Errors
/// Returns [`Error::InvalidCredentials`] for an unknown username and for a
/// wrong password alike.
#[instrument(skip(db, password))]
pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<user::Model> {
    let Some(account) = crate::core::user::get_user_by_username(db, username).await? else {
        warn!("login failed");
        return Err(Error::InvalidCredentials);
    };

    if verify_password(password, &account.password_hash) {
        info!(user_id = account.id, "login succeeded");
        Ok(account)
    } else {
        warn!("login failed");
        Err(Error::InvalidCredentials)
    }
}
