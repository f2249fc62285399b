use axum::{
    extract::{Form, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use maud::Markup;
use serde::Deserialize;

use crate::{
    extractors::{self, IsHtmx, Locale, MaybeUser},
    names,
    rejections::{AppError, ResultExt},
    utils, views,
    views::homepage as homepage_views,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route(names::CATEGORIES_URL, get(categories))
        .route(names::SET_LOCALE_URL, post(set_locale))
}

async fn index(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    IsHtmx(is_htmx): IsHtmx,
    Locale(locale): Locale,
) -> Result<Markup, AppError> {
    let top_users = state
        .db
        .top_users(names::TOP_USERS_LIMIT)
        .await
        .reject("could not get leaderboard")?;

    Ok(views::render(
        is_htmx,
        &rust_i18n::t!("app.name", locale = &locale),
        homepage_views::index(&top_users, user.is_some(), &locale),
        &locale,
        user.as_ref(),
    ))
}

async fn categories(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    IsHtmx(is_htmx): IsHtmx,
    Locale(locale): Locale,
) -> Result<Markup, AppError> {
    let categories = state
        .db
        .available_categories()
        .await
        .reject("could not get categories")?;

    Ok(views::render(
        is_htmx,
        &rust_i18n::t!("categories.title", locale = &locale),
        homepage_views::categories(&categories, &locale),
        &locale,
        user.as_ref(),
    ))
}

#[derive(Deserialize)]
struct SetLocaleBody {
    locale: String,
}

async fn set_locale(
    State(state): State<AppState>,
    Form(body): Form<SetLocaleBody>,
) -> Result<impl IntoResponse, AppError> {
    let locale = extractors::match_supported_locale(&body.locale).unwrap_or(names::DEFAULT_LOCALE);
    let cookie = utils::cookie(names::LOCALE_COOKIE_NAME, locale, state.secure_cookies)
        .reject("could not build locale cookie")?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    headers.insert("HX-Refresh", HeaderValue::from_static("true"));

    Ok((headers, ""))
}
