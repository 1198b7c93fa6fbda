#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use fowltrak::config::AppConfig;
use fowltrak::config::database::create_tables;
use fowltrak::config::settings::FileConfig;
use fowltrak::core::{auth, user};
use fowltrak::entities::UserModel;
use fowltrak::web::{AppState, build_router};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tower::ServiceExt;

pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub db: DatabaseConnection,
    router: Router,
}

pub async fn test_app() -> TestApp {
    // One connection: every connection to `sqlite::memory:` is its own database
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.expect("connect");
    create_tables(&db).await.expect("tables");

    let config = AppConfig::from_sources(FileConfig::default(), |key: &str| match key {
        "SECRET_KEY" => Some("test-secret".to_string()),
        "BCRYPT_COST" => Some("4".to_string()),
        _ => None,
    })
    .expect("config");

    let router = build_router(AppState::new(db.clone(), config));
    TestApp { db, router }
}

impl TestApp {
    pub fn client(&self) -> TestClient {
        TestClient {
            router: self.router.clone(),
            cookie: None,
        }
    }

    /// Registers `username` directly in the store and makes them an admin.
    pub async fn create_admin(&self, username: &str) -> UserModel {
        let account = auth::register(
            &self.db,
            auth::RegistrationForm {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password: PASSWORD.to_string(),
                confirm_password: PASSWORD.to_string(),
            },
            4,
        )
        .await
        .expect("register admin");
        user::promote(&self.db, account.id).await.expect("promote");
        account
    }

    pub async fn user_id(&self, username: &str) -> i64 {
        user::get_user_by_username(&self.db, username)
            .await
            .expect("lookup")
            .expect("user exists")
            .id
    }
}

/// A browser stand-in that keeps the session cookie between requests.
pub struct TestClient {
    router: Router,
    pub cookie: Option<String>,
}

impl TestClient {
    pub async fn send(&mut self, request: Request<Body>) -> Response {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let value = set_cookie.to_str().expect("ascii cookie");
            let pair = value.split(';').next().unwrap_or_default();
            self.cookie = Some(pair.to_string());
        }
        response
    }

    fn builder(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    pub async fn get(&mut self, uri: &str) -> Response {
        let request = self.builder("GET", uri).body(Body::empty()).expect("request");
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> Response {
        let request = self
            .builder("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(
                serde_urlencoded::to_string(fields).expect("form encoding"),
            ))
            .expect("request");
        self.send(request).await
    }

    pub async fn register(&mut self, username: &str, email: &str, password: &str) -> Response {
        self.post_form(
            "/register-account",
            &[
                ("username", username),
                ("email_address", email),
                ("password1", password),
                ("password2", password),
            ],
        )
        .await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Response {
        self.post_form(
            "/login-user",
            &[("username", username), ("password", password)],
        )
        .await
    }
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .expect("ascii location")
}

pub fn assert_redirect(response: &Response, to: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(response), to);
}

pub async fn read_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

/// Messages of the flashes carried by a page view.
pub fn flash_messages(page: &serde_json::Value) -> Vec<String> {
    page["flashes"]
        .as_array()
        .expect("flashes array")
        .iter()
        .map(|flash| flash["message"].as_str().unwrap_or_default().to_string())
        .collect()
}
