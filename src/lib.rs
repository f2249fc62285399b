rust_i18n::i18n!("locales", fallback = "en");

pub mod db;
pub mod email;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod names;
pub mod quiz;
pub mod rejections;
pub mod services;
pub mod statics;
pub mod utils;
pub mod views;

use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use crate::email::ResendEmailSender;
use crate::services::{auth::AuthService, contact::ContactService, submission::SubmissionService};

#[derive(Clone)]
pub struct AppState {
    pub db: db::Db,
    pub auth: AuthService,
    pub submissions: SubmissionService,
    pub contact: ContactService,
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(db: db::Db, email: ResendEmailSender, base_url: String, secure_cookies: bool) -> Self {
        Self {
            auth: AuthService::new(db.clone(), email.clone(), base_url),
            submissions: SubmissionService::new(db.clone(), email.clone()),
            contact: ContactService::new(email),
            db,
            secure_cookies,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::homepage::routes())
        .merge(handlers::account::routes())
        .merge(handlers::test::routes())
        .merge(handlers::posts::routes())
        .merge(handlers::submission::routes())
        .merge(handlers::admin::routes())
        .fallback(rejections::not_found)
        .layer(middleware::from_fn(csrf_check))
        .nest("/static", statics::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn csrf_check(
    req: axum::http::Request<axum::body::Body>,
    next: middleware::Next,
) -> axum::response::Response {
    use axum::http::{Method, StatusCode};
    use axum::response::IntoResponse;

    let state_changing = [Method::POST, Method::PUT, Method::PATCH, Method::DELETE];

    if state_changing.contains(req.method()) {
        let has_hx_request = req
            .headers()
            .get("HX-Request")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "true");

        if !has_hx_request {
            tracing::warn!("blocked {} {} without HX-Request", req.method(), req.uri());
            return (StatusCode::FORBIDDEN, "CSRF check failed").into_response();
        }
    }

    next.run(req).await
}
