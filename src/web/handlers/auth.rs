//! Home, registration, login, logout and account settings.

use crate::{
    core::{auth, user},
    errors::Result,
    web::{
        AppState,
        error::WebResult,
        guard::Actor,
        pages::{dashboard_path, form_failure, redirect_with_flash, render},
        session::{FlashCategory, Session},
    },
};
use axum::{
    Extension, Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use std::collections::HashMap;
use tracing::info;

type FormValues = HashMap<String, String>;

fn echo(values: &FormValues, fields: &[&str]) -> serde_json::Value {
    fields
        .iter()
        .map(|field| {
            (
                (*field).to_string(),
                json!(values.get(*field).cloned().unwrap_or_default()),
            )
        })
        .collect::<serde_json::Map<_, _>>()
        .into()
}

/// Signed-in users go straight to their dashboard.
pub async fn home(State(state): State<AppState>, session: Session) -> WebResult<Response> {
    if let Some(account) = session.current_user(&state.db).await? {
        return Ok((session, Redirect::to(dashboard_path(account.role))).into_response());
    }
    Ok(render(session, "home", json!({})))
}

pub async fn register_page(session: Session) -> Response {
    render(session, "register", json!({}))
}

/// Creates a worker account and signs it in.
pub async fn register(
    State(state): State<AppState>,
    mut session: Session,
    Form(values): Form<FormValues>,
) -> WebResult<Response> {
    let created: Result<_> = async {
        let form = auth::RegistrationForm::from_form(&values)?;
        auth::register(&state.db, form, state.config.bcrypt_cost).await
    }
    .await;

    match created {
        Ok(account) => {
            session.login(&account);
            Ok(redirect_with_flash(
                session,
                dashboard_path(account.role),
                FlashCategory::Success,
                format!(
                    "Account successfully created! Your username is: {}",
                    account.username
                ),
            ))
        }
        Err(e) => form_failure(
            session,
            "register",
            echo(&values, &["username", "email_address"]),
            e,
        ),
    }
}

pub async fn login_page(session: Session) -> Response {
    render(session, "login", json!({}))
}

pub async fn login(
    State(state): State<AppState>,
    mut session: Session,
    Form(values): Form<FormValues>,
) -> WebResult<Response> {
    let account: Result<_> = async {
        let form = auth::LoginForm::from_form(&values)?;
        auth::authenticate(&state.db, &form.username, &form.password).await
    }
    .await;

    match account {
        Ok(account) => {
            session.login(&account);
            Ok(redirect_with_flash(
                session,
                dashboard_path(account.role),
                FlashCategory::Success,
                format!("Successfully logged in as: {}", account.username),
            ))
        }
        Err(e) => form_failure(session, "login", echo(&values, &["username"]), e),
    }
}

pub async fn logout(Extension(Actor(actor)): Extension<Actor>, mut session: Session) -> Response {
    session.logout();
    info!(user_id = actor.id, "logged out");
    redirect_with_flash(
        session,
        "/home",
        FlashCategory::Info,
        "You have successfully logged out",
    )
}

pub async fn account_settings_page(
    Extension(Actor(actor)): Extension<Actor>,
    session: Session,
) -> Response {
    render(
        session,
        "account_settings",
        json!({ "username": actor.username, "email_address": actor.email }),
    )
}

pub async fn account_settings(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    session: Session,
    Form(values): Form<FormValues>,
) -> WebResult<Response> {
    let updated: Result<_> = async {
        let form = user::AccountSettingsForm::from_form(&values)?;
        user::update_account(&state.db, &actor, form, state.config.bcrypt_cost).await
    }
    .await;

    match updated {
        Ok(_) => Ok(redirect_with_flash(
            session,
            "/account-settings",
            FlashCategory::Success,
            "Your account has been updated!",
        )),
        Err(e) => form_failure(
            session,
            "account_settings",
            echo(&values, &["username", "email_address"]),
            e,
        ),
    }
}
