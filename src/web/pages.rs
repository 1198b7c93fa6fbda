//! Page views: the JSON stand-in for rendered templates.

use crate::{
    entities::Role,
    errors::Error,
    web::{
        error::{WebError, WebResult},
        session::{Flash, FlashCategory, Session},
    },
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use serde_json::Value;

/// A rendered page: its name, the flashes consumed by this render, and data.
#[derive(Debug, Serialize)]
pub struct PageView {
    pub page: &'static str,
    pub flashes: Vec<Flash>,
    pub data: Value,
}

/// Renders `page` with status 200, consuming pending flashes.
pub fn render(session: Session, page: &'static str, data: Value) -> Response {
    render_with_status(session, StatusCode::OK, page, data)
}

pub fn render_with_status(
    mut session: Session,
    status: StatusCode,
    page: &'static str,
    data: Value,
) -> Response {
    let view = PageView {
        page,
        flashes: session.take_flashes(),
        data,
    };
    (status, session, Json(view)).into_response()
}

/// Flashes `message` and redirects (303).
pub fn redirect_with_flash(
    mut session: Session,
    to: &str,
    category: FlashCategory,
    message: impl Into<String>,
) -> Response {
    session.flash(category, message);
    (session, Redirect::to(to)).into_response()
}

/// Reports a failed form submission.
///
/// Errors caused by the submitted data re-render `page` with 422 and one
/// danger flash per problem; anything else is a terminal error.
pub fn form_failure(
    mut session: Session,
    page: &'static str,
    data: Value,
    err: Error,
) -> WebResult<Response> {
    if !err.is_user_facing() {
        return Err(WebError::from(err));
    }
    for message in err.user_messages() {
        session.flash(FlashCategory::Danger, message);
    }
    Ok(render_with_status(
        session,
        StatusCode::UNPROCESSABLE_ENTITY,
        page,
        data,
    ))
}

/// Landing page for a signed-in user.
#[must_use]
pub const fn dashboard_path(role: Role) -> &'static str {
    match role {
        Role::Admin => "/admin-dashboard",
        Role::Worker => "/workers-dashboard",
    }
}
