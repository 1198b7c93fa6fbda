//! Access guards composed around gated routes.
//!
//! Each [`Gate`] resolves the session identity, asks [`authorize`] for a
//! decision, and either passes the request on with an [`Actor`] extension or
//! answers it directly: a redirect to the login page when nobody is signed
//! in, 403 when the role is wrong.

use crate::{
    core::access::{AccessDecision, AccessRule, authorize},
    entities::user,
    web::{
        AppState,
        error::WebError,
        pages::redirect_with_flash,
        session::{FlashCategory, Session},
    },
};
use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

/// Login page unauthenticated requests are sent to
pub const LOGIN_PATH: &str = "/login-user";
const LOGIN_REQUIRED: &str = "Please log in to access this page.";

/// The signed-in user, available to handlers behind a guard.
#[derive(Debug, Clone)]
pub struct Actor(pub user::Model);

async fn guard(
    rule: AccessRule,
    state: &AppState,
    mut session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let actor = match session.current_user(&state.db).await {
        Ok(actor) => actor,
        Err(e) => return WebError::from(e).into_response(),
    };

    match (authorize(actor.as_ref().map(|u| u.role), rule), actor) {
        (AccessDecision::Proceed, Some(actor)) => {
            request.extensions_mut().insert(Actor(actor));
            next.run(request).await
        }
        (AccessDecision::Forbidden, Some(actor)) => {
            warn!(
                user_id = actor.id,
                role = %actor.role,
                path = %request.uri().path(),
                ?rule,
                "access forbidden"
            );
            WebError::Forbidden.into_response()
        }
        _ => {
            // A stale id (user removed) is dropped along the way
            session.logout();
            redirect_with_flash(session, LOGIN_PATH, FlashCategory::Info, LOGIN_REQUIRED)
        }
    }
}

/// Guard layer state: the application plus the rule it enforces.
#[derive(Clone)]
pub struct Gate {
    app: AppState,
    rule: AccessRule,
}

impl Gate {
    #[must_use]
    pub fn new(app: &AppState, rule: AccessRule) -> Self {
        Self {
            app: app.clone(),
            rule,
        }
    }
}

impl FromRef<Gate> for AppState {
    fn from_ref(gate: &Gate) -> Self {
        gate.app.clone()
    }
}

/// Middleware applying the gate's rule to every request it wraps.
pub async fn require(
    State(gate): State<Gate>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    guard(gate.rule, &gate.app, session, request, next).await
}
