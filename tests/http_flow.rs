mod common;

use axum::http::StatusCode;
use common::{PASSWORD, assert_redirect, flash_messages, read_json, test_app};
use fowltrak::core::access::RecordAction;
use fowltrak::core::flock::{self, NewFlock};
use fowltrak::entities::{Flock, Production, Role};
use sea_orm::EntityTrait;

#[tokio::test]
async fn alice_is_forbidden_until_promoted() {
    let app = test_app().await;
    app.create_admin("farm_owner").await;

    let mut alice = app.client();
    let response = alice.register("alice", "alice@x.com", PASSWORD).await;
    assert_redirect(&response, "/workers-dashboard");
    alice.get("/workers-dashboard").await;

    let response = alice.get("/logout").await;
    assert_redirect(&response, "/home");
    let page = read_json(alice.get("/home").await).await;
    assert_eq!(
        flash_messages(&page),
        vec!["You have successfully logged out".to_string()]
    );

    let response = alice.login("alice", PASSWORD).await;
    assert_redirect(&response, "/workers-dashboard");
    let page = read_json(alice.get("/workers-dashboard").await).await;
    assert_eq!(page["page"], "workers_dashboard");
    assert_eq!(
        flash_messages(&page),
        vec!["Successfully logged in as: alice".to_string()]
    );

    let alice_id = app.user_id("alice").await;
    let stored = fowltrak::core::user::require_user(&app.db, alice_id)
        .await
        .expect("alice");
    assert_eq!(stored.role, Role::Worker);

    let response = alice.get("/admin-dashboard").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(read_json(response).await["code"], "forbidden");

    let mut owner = app.client();
    owner.login("farm_owner", PASSWORD).await;
    let response = owner.get(&format!("/promote/{alice_id}")).await;
    assert_redirect(&response, "/manage_workers");

    let response = alice.get("/admin-dashboard").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["page"], "admin_dashboard");
}

#[tokio::test]
async fn unauthenticated_requests_redirect_to_login() {
    let app = test_app().await;
    let mut client = app.client();

    for uri in ["/admin-dashboard", "/workers-dashboard", "/add-flock", "/logout"] {
        let response = client.get(uri).await;
        assert_redirect(&response, "/login-user");
    }

    let page = read_json(client.get("/login-user").await).await;
    assert_eq!(page["page"], "login");
    assert_eq!(page["flashes"][0]["category"], "info");
    assert_eq!(
        page["flashes"][0]["message"],
        "Please log in to access this page."
    );
}

#[tokio::test]
async fn worker_gets_forbidden_on_every_admin_route() {
    let app = test_app().await;
    let mut worker = app.client();
    worker.register("worker1", "worker1@x.com", PASSWORD).await;

    for uri in [
        "/admin-dashboard",
        "/manage_workers",
        "/view-inventory",
        "/view-flock",
        "/view-production",
        "/view-health_record",
        "/edit-record/flock/1",
        "/delete-record/flock/1",
        "/promote/1",
        "/demote/1",
        "/api/production-data",
        "/api/health-record-data",
        "/api/flock-data",
    ] {
        let response = worker.get(uri).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
    }
    let response = worker.post_form("/remove-worker/1", &[]).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn record_routes_follow_access_policy() {
    let app = test_app().await;
    app.create_admin("farm_owner").await;
    let mut worker = app.client();
    worker.register("worker1", "worker1@x.com", PASSWORD).await;
    let mut owner = app.client();
    owner.login("farm_owner", PASSWORD).await;

    for (action, uri) in [
        (RecordAction::Create, "/add-flock"),
        (RecordAction::View, "/view-flock"),
        (RecordAction::Edit, "/edit-record/flock/1"),
        (RecordAction::Delete, "/delete-record/flock/1"),
    ] {
        let rule = action.required_rule();

        let status = worker.get(uri).await.status();
        assert_eq!(
            status == StatusCode::FORBIDDEN,
            !rule.allows(Role::Worker),
            "{action:?} {uri}"
        );

        let status = owner.get(uri).await.status();
        assert_eq!(
            status == StatusCode::FORBIDDEN,
            !rule.allows(Role::Admin),
            "{action:?} {uri}"
        );
    }
}

#[tokio::test]
async fn admin_is_forbidden_on_worker_dashboard() {
    let app = test_app().await;
    app.create_admin("farm_owner").await;
    let mut owner = app.client();
    let response = owner.login("farm_owner", PASSWORD).await;
    assert_redirect(&response, "/admin-dashboard");

    let response = owner.get("/workers-dashboard").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn failed_login_is_generic() {
    let app = test_app().await;
    let mut client = app.client();
    client.register("alice", "alice@x.com", PASSWORD).await;
    client.get("/logout").await;
    client.get("/home").await;

    for (username, password) in [("alice", "wrong-password"), ("nobody", PASSWORD)] {
        let response = client.login(username, password).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let page = read_json(response).await;
        assert_eq!(
            flash_messages(&page),
            vec!["Login failed. Check your username and password.".to_string()]
        );
    }
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let app = test_app().await;
    let mut first = app.client();
    first.register("alice", "alice@x.com", PASSWORD).await;

    let mut second = app.client();
    let response = second.register("alice", "other@x.com", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = read_json(response).await;
    assert_eq!(page["page"], "register");
    assert_eq!(
        flash_messages(&page),
        vec![
            "There was an error with username: Username already exists! Please try a different username"
                .to_string()
        ]
    );
}

#[tokio::test]
async fn tampered_cookie_is_ignored() {
    let app = test_app().await;
    let mut client = app.client();
    client.register("alice", "alice@x.com", PASSWORD).await;

    let cookie = client.cookie.clone().expect("session cookie");
    let (name_and_payload, signature) = cookie.rsplit_once('.').expect("signed cookie");
    let flipped = if signature.starts_with('A') { "B" } else { "A" };
    client.cookie = Some(format!("{name_and_payload}.{flipped}{}", &signature[1..]));

    let response = client.get("/workers-dashboard").await;
    assert_redirect(&response, "/login-user");
}

#[tokio::test]
async fn worker_records_are_owned_and_land_on_dashboard() {
    let app = test_app().await;
    let mut worker = app.client();
    worker.register("worker1", "worker1@x.com", PASSWORD).await;

    let response = worker
        .post_form("/add-production", &[("number_eggs_collected", "120")])
        .await;
    assert_redirect(&response, "/workers-dashboard");

    let records = Production::find().all(&app.db).await.expect("query");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].eggs_sold, 0);
    assert_eq!(records[0].user_id, Some(app.user_id("worker1").await));

    let response = worker
        .post_form("/add-flock", &[("breed", "Leghorn"), ("quantity", "0")])
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = read_json(response).await;
    assert_eq!(page["page"], "add_flock");
    assert_eq!(
        danger_messages(&page),
        vec![
            "There was an error with quantity: Number must be at least 1.".to_string(),
            "There was an error with age: This field is required.".to_string(),
        ]
    );
}

fn danger_messages(page: &serde_json::Value) -> Vec<String> {
    page["flashes"]
        .as_array()
        .expect("flashes array")
        .iter()
        .filter(|flash| flash["category"] == "danger")
        .map(|flash| flash["message"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn duplicate_inventory_entry_is_rejected() {
    let app = test_app().await;
    let mut worker = app.client();
    worker.register("worker1", "worker1@x.com", PASSWORD).await;

    let feed = |date: &'static str| {
        vec![
            ("item_name", "Layer Mash"),
            ("category", "Supplies"),
            ("quantity", "4"),
            ("unit", "bags"),
            ("cost", "120.50"),
            ("purchase_date", date),
        ]
    };

    let response = worker.post_form("/add_inventory", &feed("2024-05-01")).await;
    assert_redirect(&response, "/workers-dashboard");
    let response = worker.post_form("/add_inventory", &feed("2024-05-01")).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let response = worker.post_form("/add_inventory", &feed("2024-05-02")).await;
    assert_redirect(&response, "/workers-dashboard");
}

#[tokio::test]
async fn unknown_kind_leaves_store_untouched() {
    let app = test_app().await;
    app.create_admin("farm_owner").await;
    let created = flock::create_flock(
        &app.db,
        NewFlock {
            breed: "Sussex".to_string(),
            quantity: 8,
            age: 3,
            deaths: 0,
            sold: 0,
            entry_date: chrono::Utc::now().date_naive(),
        },
        None,
    )
    .await
    .expect("flock");

    let mut owner = app.client();
    owner.login("farm_owner", PASSWORD).await;
    owner.get("/admin-dashboard").await;

    let response = owner.get(&format!("/delete-record/barn/{}", created.id)).await;
    assert_redirect(&response, "/admin-dashboard");
    assert!(
        Flock::find_by_id(created.id)
            .one(&app.db)
            .await
            .expect("query")
            .is_some()
    );

    let page = read_json(owner.get("/admin-dashboard").await).await;
    assert_eq!(flash_messages(&page), vec!["Invalid model.".to_string()]);
    assert_eq!(page["flashes"][0]["category"], "danger");

    let response = owner.get("/delete-record/flock/9999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["code"], "not_found");

    let response = owner.get(&format!("/delete-record/flock/{}", created.id)).await;
    assert_redirect(&response, "/admin-dashboard");
    assert!(
        Flock::find_by_id(created.id)
            .one(&app.db)
            .await
            .expect("query")
            .is_none()
    );
}

#[tokio::test]
async fn admin_edits_record_through_generic_route() {
    let app = test_app().await;
    app.create_admin("farm_owner").await;
    let mut owner = app.client();
    owner.login("farm_owner", PASSWORD).await;
    owner
        .post_form(
            "/add-flock",
            &[("breed", "Leghorn"), ("quantity", "20"), ("age", "5")],
        )
        .await;
    let flock_id = Flock::find().all(&app.db).await.expect("query")[0].id;

    let page = read_json(owner.get(&format!("/edit-record/flock/{flock_id}")).await).await;
    assert_eq!(page["data"]["record"]["kind"], "flock");
    assert_eq!(page["data"]["record"]["record"]["quantity"], 20);

    let response = owner
        .post_form(
            &format!("/edit-record/flock/{flock_id}"),
            &[
                ("breed", "Leghorn"),
                ("quantity", "18"),
                ("age", "6"),
                ("deaths", "2"),
            ],
        )
        .await;
    assert_redirect(&response, "/admin-dashboard");
    let stored = Flock::find_by_id(flock_id)
        .one(&app.db)
        .await
        .expect("query")
        .expect("flock");
    assert_eq!(stored.quantity, 18);
    assert_eq!(stored.deaths, 2);
}

#[tokio::test]
async fn promote_and_demote_report_no_ops() {
    let app = test_app().await;
    let owner_account = app.create_admin("farm_owner").await;
    let mut worker = app.client();
    worker.register("worker1", "worker1@x.com", PASSWORD).await;
    let worker_id = app.user_id("worker1").await;

    let mut owner = app.client();
    owner.login("farm_owner", PASSWORD).await;
    owner.get("/admin-dashboard").await;

    owner.get(&format!("/demote/{worker_id}")).await;
    let page = read_json(owner.get("/manage_workers").await).await;
    assert_eq!(flash_messages(&page), vec!["User is already a worker.".to_string()]);

    owner.get(&format!("/promote/{}", owner_account.id)).await;
    let page = read_json(owner.get("/manage_workers").await).await;
    assert_eq!(flash_messages(&page), vec!["User is already an admin.".to_string()]);
    assert_eq!(page["flashes"][0]["category"], "warning");

    let response = owner.get("/promote/4242").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn removing_a_worker_detaches_their_records() {
    let app = test_app().await;
    app.create_admin("farm_owner").await;
    let mut worker = app.client();
    worker.register("worker1", "worker1@x.com", PASSWORD).await;
    worker
        .post_form(
            "/add-flock",
            &[("breed", "Leghorn"), ("quantity", "20"), ("age", "5")],
        )
        .await;
    let worker_id = app.user_id("worker1").await;

    let mut owner = app.client();
    owner.login("farm_owner", PASSWORD).await;
    let response = owner
        .post_form(&format!("/remove-worker/{worker_id}"), &[])
        .await;
    assert_redirect(&response, "/manage_workers");

    let flocks = Flock::find().all(&app.db).await.expect("query");
    assert_eq!(flocks.len(), 1);
    assert_eq!(flocks[0].user_id, None);
    assert_eq!(flocks[0].created_by_username.as_deref(), Some("worker1"));

    // The removed worker's session no longer authenticates
    let response = worker.get("/workers-dashboard").await;
    assert_redirect(&response, "/login-user");
}

#[tokio::test]
async fn chart_endpoints_aggregate() {
    let app = test_app().await;
    app.create_admin("farm_owner").await;
    let mut owner = app.client();
    owner.login("farm_owner", PASSWORD).await;

    for (breed, quantity) in [("Leghorn", "10"), ("Sussex", "4"), ("Leghorn", "5")] {
        owner
            .post_form(
                "/add-flock",
                &[("breed", breed), ("quantity", quantity), ("age", "5")],
            )
            .await;
    }
    for (eggs, date) in [("30", "2024-07-02"), ("10", "2024-07-01")] {
        owner
            .post_form(
                "/add-production",
                &[("number_eggs_collected", eggs), ("date_collected", date)],
            )
            .await;
    }
    for symptom in ["Coughing", "Lethargy", "Coughing"] {
        owner
            .post_form(
                "/add-health-record",
                &[
                    ("number_sick", "1"),
                    ("symptom", symptom),
                    ("medication_given", "Vitamins"),
                ],
            )
            .await;
    }

    let flocks = read_json(owner.get("/api/flock-data").await).await;
    assert_eq!(flocks, serde_json::json!({"labels": ["Leghorn", "Sussex"], "data": [15, 4]}));

    let production = read_json(owner.get("/api/production-data").await).await;
    assert_eq!(
        production,
        serde_json::json!({"labels": ["2024-07-01", "2024-07-02"], "data": [10, 30]})
    );

    let symptoms = read_json(owner.get("/api/health-record-data").await).await;
    assert_eq!(
        symptoms,
        serde_json::json!({"labels": ["Coughing", "Lethargy"], "data": [2, 1]})
    );
}

#[tokio::test]
async fn account_settings_require_current_password() {
    let app = test_app().await;
    let mut alice = app.client();
    alice.register("alice", "alice@x.com", PASSWORD).await;

    let response = alice
        .post_form(
            "/account-settings",
            &[
                ("username", "alice"),
                ("email_address", "alice@x.com"),
                ("current_password", "not-my-password"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = alice
        .post_form(
            "/account-settings",
            &[
                ("username", "alice_b"),
                ("email_address", "alice@x.com"),
                ("current_password", PASSWORD),
            ],
        )
        .await;
    assert_redirect(&response, "/account-settings");
    let page = read_json(alice.get("/account-settings").await).await;
    assert_eq!(page["data"]["username"], "alice_b");
}
