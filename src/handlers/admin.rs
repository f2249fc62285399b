use axum::{
    extract::{Form, Path, State},
    routing::{get, post},
    Router,
};
use maud::Markup;
use rust_i18n::t;
use serde::Deserialize;

use crate::{
    db::models::AuthUser,
    extractors::{AdminGuard, IsHtmx, Locale},
    names,
    rejections::{AppError, ResultExt},
    views,
    views::admin as admin_views,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(names::ADMIN_URL, get(admin_dashboard))
        .route(names::ADMIN_CATEGORIES_URL, post(create_category))
        .route("/admin/categories/{category_id}/toggle", post(toggle_category))
        .route("/admin/questions/{question_id}/toggle", post(toggle_question))
        .route("/admin/posts/{post_id}/toggle", post(toggle_post))
}

async fn dashboard_markup(state: &AppState, locale: &str) -> Result<Markup, AppError> {
    let categories = state
        .db
        .all_categories()
        .await
        .reject("could not get categories")?;
    let questions = state
        .db
        .pending_questions()
        .await
        .reject("could not get pending questions")?;
    let posts = state
        .db
        .pending_posts()
        .await
        .reject("could not get pending posts")?;

    Ok(admin_views::dashboard(&categories, &questions, &posts, locale))
}

async fn refreshed(state: &AppState, user: &AuthUser, locale: &str) -> Result<Markup, AppError> {
    tracing::debug!("moderation view refreshed for {}", user.username);
    Ok(views::titled(
        &t!("admin.title", locale = locale),
        dashboard_markup(state, locale).await?,
    ))
}

async fn admin_dashboard(
    AdminGuard(user): AdminGuard,
    IsHtmx(is_htmx): IsHtmx,
    State(state): State<AppState>,
    Locale(locale): Locale,
) -> Result<Markup, AppError> {
    Ok(views::render(
        is_htmx,
        &t!("admin.title", locale = &locale),
        dashboard_markup(&state, &locale).await?,
        &locale,
        Some(&user),
    ))
}

#[derive(Deserialize)]
struct NewCategoryBody {
    name: String,
    #[serde(default)]
    description: String,
}

async fn create_category(
    AdminGuard(user): AdminGuard,
    State(state): State<AppState>,
    Locale(locale): Locale,
    Form(body): Form<NewCategoryBody>,
) -> Result<Markup, AppError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::Input("category name is required"));
    }

    state
        .db
        .create_category(name, body.description.trim())
        .await
        .reject("could not create category")?;

    refreshed(&state, &user, &locale).await
}

async fn toggle_category(
    AdminGuard(user): AdminGuard,
    State(state): State<AppState>,
    Locale(locale): Locale,
    Path(category_id): Path<i64>,
) -> Result<Markup, AppError> {
    state
        .db
        .toggle_category(category_id)
        .await
        .reject("could not toggle category")?
        .ok_or(AppError::NotFound)?;

    refreshed(&state, &user, &locale).await
}

async fn toggle_question(
    AdminGuard(user): AdminGuard,
    State(state): State<AppState>,
    Locale(locale): Locale,
    Path(question_id): Path<i64>,
) -> Result<Markup, AppError> {
    state
        .db
        .toggle_question(question_id)
        .await
        .reject("could not toggle question")?
        .ok_or(AppError::NotFound)?;

    refreshed(&state, &user, &locale).await
}

async fn toggle_post(
    AdminGuard(user): AdminGuard,
    State(state): State<AppState>,
    Locale(locale): Locale,
    Path(post_id): Path<i64>,
) -> Result<Markup, AppError> {
    state
        .db
        .toggle_post(post_id)
        .await
        .reject("could not toggle post")?
        .ok_or(AppError::NotFound)?;

    refreshed(&state, &user, &locale).await
}
