//! Record entry, listing, edit and delete.
//!
//! Entry is open to both roles; listing, editing and deleting are admin-only
//! (enforced by the route layers in [`crate::web::build_router`]).

use crate::{
    core::{
        flock, health_record, inventory, production,
        records::{self, RecordKind},
    },
    entities::user,
    errors::{Error, Result},
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
    extract::{Path, State},
    response::Response,
};
use serde_json::json;
use std::collections::HashMap;
use tracing::{info, warn};

type FormValues = HashMap<String, String>;

const ADMIN_DASHBOARD: &str = "/admin-dashboard";

/// Redirects to the actor's dashboard on success, re-renders `page` otherwise.
fn record_added<T>(
    session: Session,
    actor: &user::Model,
    page: &'static str,
    values: &FormValues,
    result: Result<T>,
    message: &str,
) -> WebResult<Response> {
    match result {
        Ok(_) => Ok(redirect_with_flash(
            session,
            dashboard_path(actor.role),
            FlashCategory::Success,
            message,
        )),
        Err(e) => form_failure(session, page, json!({ "values": values }), e),
    }
}

fn invalid_model(session: Session, err: &Error) -> Response {
    warn!(error = ?err, "unknown record kind requested");
    redirect_with_flash(
        session,
        ADMIN_DASHBOARD,
        FlashCategory::Danger,
        err.to_string(),
    )
}

pub async fn add_inventory_page(session: Session) -> Response {
    render(
        session,
        "add_inventory",
        json!({
            "categories": inventory::CATEGORIES,
            "currencies": inventory::CURRENCIES,
            "default_currency": inventory::DEFAULT_CURRENCY,
        }),
    )
}

pub async fn add_inventory(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    session: Session,
    Form(values): Form<FormValues>,
) -> WebResult<Response> {
    let created: Result<_> = async {
        let input = inventory::NewInventory::from_form(&values)?;
        inventory::create_inventory(&state.db, input, Some(&actor)).await
    }
    .await;
    record_added(
        session,
        &actor,
        "add_inventory",
        &values,
        created,
        "Inventory item added successfully",
    )
}

pub async fn add_production_page(session: Session) -> Response {
    render(session, "add_production", json!({}))
}

pub async fn add_production(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    session: Session,
    Form(values): Form<FormValues>,
) -> WebResult<Response> {
    let created: Result<_> = async {
        let input = production::NewProduction::from_form(&values)?;
        production::create_production(&state.db, input, Some(&actor)).await
    }
    .await;
    record_added(
        session,
        &actor,
        "add_production",
        &values,
        created,
        "Production record added successfully",
    )
}

pub async fn add_flock_page(session: Session) -> Response {
    render(session, "add_flock", json!({}))
}

pub async fn add_flock(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    session: Session,
    Form(values): Form<FormValues>,
) -> WebResult<Response> {
    let created: Result<_> = async {
        let input = flock::NewFlock::from_form(&values)?;
        flock::create_flock(&state.db, input, Some(&actor)).await
    }
    .await;
    record_added(
        session,
        &actor,
        "add_flock",
        &values,
        created,
        "Flock record added successfully",
    )
}

pub async fn add_health_record_page(session: Session) -> Response {
    render(session, "add_health_record", json!({}))
}

pub async fn add_health_record(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    session: Session,
    Form(values): Form<FormValues>,
) -> WebResult<Response> {
    let created: Result<_> = async {
        let input = health_record::NewHealthRecord::from_form(&values)?;
        health_record::create_health_record(&state.db, input, Some(&actor)).await
    }
    .await;
    record_added(
        session,
        &actor,
        "add_health_record",
        &values,
        created,
        "Health record added successfully",
    )
}

pub async fn view_inventory(
    State(state): State<AppState>,
    session: Session,
) -> WebResult<Response> {
    let items = inventory::list_inventory(&state.db).await?;
    Ok(render(session, "view_inventory", json!({ "inventories": items })))
}

pub async fn view_flock(State(state): State<AppState>, session: Session) -> WebResult<Response> {
    let flocks = flock::list_flocks(&state.db).await?;
    Ok(render(session, "view_flock", json!({ "flocks": flocks })))
}

pub async fn view_production(
    State(state): State<AppState>,
    session: Session,
) -> WebResult<Response> {
    let productions = production::list_productions(&state.db).await?;
    Ok(render(
        session,
        "view_production",
        json!({ "productions": productions }),
    ))
}

pub async fn view_health_record(
    State(state): State<AppState>,
    session: Session,
) -> WebResult<Response> {
    let records = health_record::list_health_records(&state.db).await?;
    Ok(render(
        session,
        "view_health_records",
        json!({ "health_records": records }),
    ))
}

/// The edit form for one record, pre-filled from the store.
pub async fn edit_record_page(
    State(state): State<AppState>,
    session: Session,
    Path((tag, id)): Path<(String, i64)>,
) -> WebResult<Response> {
    let kind = match tag.parse::<RecordKind>() {
        Ok(kind) => kind,
        Err(e) => return Ok(invalid_model(session, &e)),
    };
    let record = kind.find(&state.db, id).await?;
    Ok(render(
        session,
        "edit_record",
        json!({ "kind": kind.as_str(), "id": id, "record": record }),
    ))
}

pub async fn edit_record(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    session: Session,
    Path((tag, id)): Path<(String, i64)>,
    Form(values): Form<FormValues>,
) -> WebResult<Response> {
    let kind = match tag.parse::<RecordKind>() {
        Ok(kind) => kind,
        Err(e) => return Ok(invalid_model(session, &e)),
    };
    kind.find(&state.db, id).await?;

    let updated: Result<_> = async {
        let input = kind.parse_form(&values)?;
        records::update_record(&state.db, id, input).await
    }
    .await;

    match updated {
        Ok(_) => {
            info!(by = actor.id, kind = %kind, id, "record updated");
            Ok(redirect_with_flash(
                session,
                ADMIN_DASHBOARD,
                FlashCategory::Success,
                format!("{} updated successfully.", kind.label()),
            ))
        }
        Err(e) => form_failure(
            session,
            "edit_record",
            json!({ "kind": kind.as_str(), "id": id, "values": values }),
            e,
        ),
    }
}

pub async fn delete_record(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    session: Session,
    Path((tag, id)): Path<(String, i64)>,
) -> WebResult<Response> {
    let kind = match tag.parse::<RecordKind>() {
        Ok(kind) => kind,
        Err(e) => return Ok(invalid_model(session, &e)),
    };
    kind.delete(&state.db, id).await?;
    info!(by = actor.id, kind = %kind, id, "record deleted");
    Ok(redirect_with_flash(
        session,
        ADMIN_DASHBOARD,
        FlashCategory::Success,
        format!("{} has been deleted.", kind.label()),
    ))
}
