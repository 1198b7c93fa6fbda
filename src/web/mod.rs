//! Web layer - Axum router, sessions, guards and handlers.
//!
//! Routes are grouped by the guard protecting them so every gated route gets
//! its check from one `route_layer` instead of per-handler code.

/// HTTP error responses
pub mod error;
/// Role guards applied as route layers
pub mod guard;
/// Request handlers, one module per area
pub mod handlers;
/// JSON page views, flashes and redirects
pub mod pages;
/// Signed-cookie session
pub mod session;

use crate::{
    config::AppConfig,
    core::access::{AccessRule, RecordAction},
};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use session::SessionSigner;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Settings resolved at startup
    pub config: Arc<AppConfig>,
    /// Session cookie signer keyed by the secret key
    pub signer: SessionSigner,
}

impl AppState {
    #[must_use]
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        let signer = SessionSigner::new(&config.secret_key, &config.cookie_name);
        Self {
            db,
            config: Arc::new(config),
            signer,
        }
    }
}

/// Wraps `routes` in a guard enforcing `rule`.
fn gated(state: &AppState, rule: AccessRule, routes: Router<AppState>) -> Router<AppState> {
    routes.route_layer(middleware::from_fn_with_state(
        guard::Gate::new(state, rule),
        guard::require,
    ))
}

/// Builds the full application router.
///
/// Record routes take their rule from [`RecordAction::required_rule`], so
/// the router cannot disagree with the access policy.
pub fn build_router(state: AppState) -> Router {
    use handlers::{api, auth, dashboards, records};

    let public = Router::new()
        .route("/", get(auth::home))
        .route("/home", get(auth::home))
        .route(
            "/register-account",
            get(auth::register_page).post(auth::register),
        )
        .route("/login-user", get(auth::login_page).post(auth::login));

    let signed_in = gated(
        &state,
        AccessRule::Authenticated,
        Router::new().route("/logout", get(auth::logout)).route(
            "/account-settings",
            get(auth::account_settings_page).post(auth::account_settings),
        ),
    );

    let workers = gated(
        &state,
        AccessRule::WorkerOnly,
        Router::new().route("/workers-dashboard", get(dashboards::workers_dashboard)),
    );

    let record_create = gated(
        &state,
        RecordAction::Create.required_rule(),
        Router::new()
            .route(
                "/add_inventory",
                get(records::add_inventory_page).post(records::add_inventory),
            )
            .route(
                "/add-production",
                get(records::add_production_page).post(records::add_production),
            )
            .route(
                "/add-flock",
                get(records::add_flock_page).post(records::add_flock),
            )
            .route(
                "/add-health-record",
                get(records::add_health_record_page).post(records::add_health_record),
            ),
    );

    let record_view = gated(
        &state,
        RecordAction::View.required_rule(),
        Router::new()
            .route("/view-inventory", get(records::view_inventory))
            .route("/view-flock", get(records::view_flock))
            .route("/view-production", get(records::view_production))
            .route("/view-health_record", get(records::view_health_record)),
    );

    let record_edit = gated(
        &state,
        RecordAction::Edit.required_rule(),
        Router::new().route(
            "/edit-record/:kind/:id",
            get(records::edit_record_page).post(records::edit_record),
        ),
    );

    let record_delete = gated(
        &state,
        RecordAction::Delete.required_rule(),
        Router::new().route("/delete-record/:kind/:id", get(records::delete_record)),
    );

    let admin = gated(
        &state,
        AccessRule::AdminOnly,
        Router::new()
            .route("/admin-dashboard", get(dashboards::admin_dashboard))
            .route("/manage_workers", get(dashboards::manage_workers))
            .route("/promote/:user_id", get(dashboards::promote))
            .route("/demote/:user_id", get(dashboards::demote))
            .route("/remove-worker/:user_id", post(dashboards::remove_worker))
            .route("/api/production-data", get(api::production_data))
            .route("/api/health-record-data", get(api::health_record_data))
            .route("/api/flock-data", get(api::flock_data)),
    );

    Router::new()
        .merge(public)
        .merge(signed_in)
        .merge(workers)
        .merge(record_create)
        .merge(record_view)
        .merge(record_edit)
        .merge(record_delete)
        .merge(admin)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
