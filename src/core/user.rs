//! User business logic - lookups, role transitions, removal and account settings.

use crate::{
    core::{
        auth::{
            self, EMAIL_TAKEN, USERNAME_TAKEN, email_problem, password_problem, username_problem,
        },
        forms::FormFields,
    },
    entities::{
        Flock, HealthRecord, Inventory, Production, Role, User, flock, health_record, inventory,
        production, user,
    },
    errors::{Error, FieldError, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use std::collections::HashMap;
use tracing::{info, instrument};

/// Finds a user by primary key.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Like [`get_user_by_id`] but a miss is [`Error::UserNotFound`].
pub async fn require_user(db: &DatabaseConnection, user_id: i64) -> Result<user::Model> {
    get_user_by_id(db, user_id)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })
}

pub async fn get_user_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}

pub async fn get_user_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All users, alphabetically.
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_asc(user::Column::Username)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Users holding the worker role, alphabetically.
pub async fn list_workers(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .filter(user::Column::Role.eq(Role::Worker))
        .order_by_asc(user::Column::Username)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Outcome of a promotion or demotion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleChange {
    /// The user now holds the requested role
    Changed(user::Model),
    /// The user already held the requested role; nothing written
    Unchanged(user::Model),
}

impl RoleChange {
    /// The user the request was about, in its current state.
    #[must_use]
    pub const fn user(&self) -> &user::Model {
        match self {
            Self::Changed(u) | Self::Unchanged(u) => u,
        }
    }

    #[must_use]
    pub const fn changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }
}

async fn set_role(db: &DatabaseConnection, account: user::Model, role: Role) -> Result<RoleChange> {
    if account.role == role {
        return Ok(RoleChange::Unchanged(account));
    }

    let user_id = account.id;
    let mut active: user::ActiveModel = account.into();
    active.role = Set(role);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    let updated = active.update(db).await?;

    info!(user_id, role = %role, "role changed");
    Ok(RoleChange::Changed(updated))
}

/// Worker to admin. Promoting an admin is a reported no-op.
#[instrument(skip(db))]
pub async fn promote(db: &DatabaseConnection, user_id: i64) -> Result<RoleChange> {
    let account = require_user(db, user_id).await?;
    set_role(db, account, Role::Admin).await
}

/// Admin to worker. Demoting a worker is a reported no-op.
#[instrument(skip(db))]
pub async fn demote(db: &DatabaseConnection, user_id: i64) -> Result<RoleChange> {
    let account = require_user(db, user_id).await?;
    set_role(db, account, Role::Worker).await
}

/// Promotion by username, for bootstrapping the first admin.
///
/// Returns `None` when no such user exists.
#[instrument(skip(db))]
pub async fn promote_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<RoleChange>> {
    match get_user_by_username(db, username).await? {
        Some(account) => set_role(db, account, Role::Admin).await.map(Some),
        None => Ok(None),
    }
}

/// Deletes a user and detaches every record they owned.
///
/// Records survive with a `NULL` owner; their `created_by_username` is left
/// as it was. Everything happens in one transaction.
#[instrument(skip(db))]
pub async fn remove_user(db: &DatabaseConnection, user_id: i64) -> Result<user::Model> {
    let txn = db.begin().await?;

    let account = User::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;

    let no_owner = || Expr::value(Option::<i64>::None);
    Flock::update_many()
        .col_expr(flock::Column::UserId, no_owner())
        .filter(flock::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;
    Production::update_many()
        .col_expr(production::Column::UserId, no_owner())
        .filter(production::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;
    Inventory::update_many()
        .col_expr(inventory::Column::UserId, no_owner())
        .filter(inventory::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;
    HealthRecord::update_many()
        .col_expr(health_record::Column::UserId, no_owner())
        .filter(health_record::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;

    User::delete_by_id(user_id).exec(&txn).await?;
    txn.commit().await?;

    info!(user_id, username = %account.username, "user removed");
    Ok(account)
}

/// Changes a user submits about their own account.
#[derive(Debug, Clone)]
pub struct AccountSettingsForm {
    pub username: String,
    pub email: String,
    pub current_password: String,
    pub new_password: Option<String>,
    pub confirm_new_password: Option<String>,
}

impl AccountSettingsForm {
    pub fn from_form(values: &HashMap<String, String>) -> Result<Self> {
        let mut form = FormFields::new(values);
        let settings = Self {
            username: form.text("username"),
            email: form.text("email_address"),
            current_password: form.secret("current_password"),
            new_password: values.get("new_password").filter(|p| !p.is_empty()).cloned(),
            confirm_new_password: values
                .get("confirm_new_password")
                .filter(|p| !p.is_empty())
                .cloned(),
        };
        form.finish(settings)
    }
}

/// Applies account settings after re-checking the current password.
///
/// Uniqueness of username and email is only checked for values that changed.
#[instrument(skip(db, account, form), fields(user_id = account.id))]
pub async fn update_account(
    db: &DatabaseConnection,
    account: &user::Model,
    form: AccountSettingsForm,
    cost: u32,
) -> Result<user::Model> {
    if !auth::verify_password(&form.current_password, &account.password_hash) {
        return Err(Error::invalid_field(
            "current_password",
            "Current password is incorrect.",
        ));
    }

    let mut errors = Vec::new();
    let username_changed = form.username != account.username;
    let email_changed = form.email != account.email;

    if username_changed {
        if let Some(message) = username_problem(&form.username) {
            errors.push(FieldError::new("username", message));
        }
    }
    if email_changed {
        if let Some(message) = email_problem(&form.email) {
            errors.push(FieldError::new("email_address", message));
        }
    }
    if let Some(new_password) = &form.new_password {
        if let Some(message) = password_problem(new_password) {
            errors.push(FieldError::new("new_password", message));
        }
        if form.confirm_new_password.as_deref() != Some(new_password.as_str()) {
            errors.push(FieldError::new(
                "confirm_new_password",
                "Field must be equal to new_password.",
            ));
        }
    }
    if !errors.is_empty() {
        return Err(Error::Validation { errors });
    }

    if username_changed && get_user_by_username(db, &form.username).await?.is_some() {
        return Err(Error::Conflict {
            field: "username".to_string(),
            message: USERNAME_TAKEN.to_string(),
        });
    }
    if email_changed && get_user_by_email(db, &form.email).await?.is_some() {
        return Err(Error::Conflict {
            field: "email_address".to_string(),
            message: EMAIL_TAKEN.to_string(),
        });
    }

    let mut active: user::ActiveModel = account.clone().into();
    active.username = Set(form.username);
    active.email = Set(form.email);
    if let Some(new_password) = &form.new_password {
        active.password_hash = Set(auth::hash_password(new_password, cost)?);
    }
    active.updated_at = Set(chrono::Utc::now().naive_utc());

    let updated = active
        .update(db)
        .await
        .map_err(auth::account_conflict)?;
    info!("account settings updated");
    Ok(updated)
}
