//! Dashboards and worker management.

use crate::{
    core::{
        flock, health_record, inventory, production, report,
        user::{self, RoleChange},
    },
    web::{
        AppState,
        error::WebResult,
        guard::Actor,
        pages::{redirect_with_flash, render},
        session::{FlashCategory, Session},
    },
};
use axum::{
    Extension,
    extract::{Path, State},
    response::Response,
};
use serde_json::json;
use tracing::info;

const MANAGE_WORKERS: &str = "/manage_workers";

pub async fn workers_dashboard(
    Extension(Actor(actor)): Extension<Actor>,
    session: Session,
) -> Response {
    render(
        session,
        "workers_dashboard",
        json!({ "username": actor.username }),
    )
}

/// Every record on the farm plus the summary figures.
pub async fn admin_dashboard(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    session: Session,
) -> WebResult<Response> {
    let db = &state.db;
    let data = json!({
        "username": actor.username,
        "summary": report::farm_summary(db).await?,
        "workers": user::list_workers(db).await?,
        "inventories": inventory::list_inventory(db).await?,
        "productions": production::list_productions(db).await?,
        "flocks": flock::list_flocks(db).await?,
        "health_records": health_record::list_health_records(db).await?,
    });
    Ok(render(session, "admin_dashboard", data))
}

pub async fn manage_workers(
    State(state): State<AppState>,
    session: Session,
) -> WebResult<Response> {
    let users = user::list_users(&state.db).await?;
    Ok(render(session, "manage_workers", json!({ "workers": users })))
}

pub async fn promote(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    session: Session,
    Path(user_id): Path<i64>,
) -> WebResult<Response> {
    let outcome = user::promote(&state.db, user_id).await?;
    Ok(match outcome {
        RoleChange::Changed(promoted) => {
            info!(by = actor.id, user_id, "user promoted to admin");
            redirect_with_flash(
                session,
                MANAGE_WORKERS,
                FlashCategory::Success,
                format!("{} has been promoted to admin.", promoted.username),
            )
        }
        RoleChange::Unchanged(_) => redirect_with_flash(
            session,
            MANAGE_WORKERS,
            FlashCategory::Warning,
            "User is already an admin.",
        ),
    })
}

pub async fn demote(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    session: Session,
    Path(user_id): Path<i64>,
) -> WebResult<Response> {
    let outcome = user::demote(&state.db, user_id).await?;
    Ok(match outcome {
        RoleChange::Changed(demoted) => {
            info!(by = actor.id, user_id, "user demoted to worker");
            redirect_with_flash(
                session,
                MANAGE_WORKERS,
                FlashCategory::Success,
                format!("{} has been demoted to worker.", demoted.username),
            )
        }
        RoleChange::Unchanged(_) => redirect_with_flash(
            session,
            MANAGE_WORKERS,
            FlashCategory::Warning,
            "User is already a worker.",
        ),
    })
}

/// Deletes a user; their records stay, detached from any owner.
pub async fn remove_worker(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    session: Session,
    Path(user_id): Path<i64>,
) -> WebResult<Response> {
    let removed = user::remove_user(&state.db, user_id).await?;
    info!(by = actor.id, user_id, "user removed by admin");
    Ok(redirect_with_flash(
        session,
        MANAGE_WORKERS,
        FlashCategory::Success,
        format!("{} has been removed.", removed.username),
    ))
}
