use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use maud::Markup;
use rust_i18n::t;
use serde::Deserialize;

use crate::{
    extractors::{IsHtmx, Locale, MaybeUser},
    names,
    rejections::{AppError, ResultExt},
    views,
    views::posts as post_views,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts/{post_id}", get(read_post))
        .route("/posts/category/{category_id}", get(category_posts))
        .route("/posts/tag/{tag}", get(tag_posts))
        .route("/posts/author/{author_id}", get(author_posts))
        .route(names::SEARCH_URL, get(search))
}

async fn read_post(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    IsHtmx(is_htmx): IsHtmx,
    Locale(locale): Locale,
    Path(post_id): Path<i64>,
) -> Result<Markup, AppError> {
    let post = state
        .db
        .get_post(post_id)
        .await
        .reject("could not get post")?
        .ok_or(AppError::NotFound)?;

    // Unpublished posts are visible to their author and to moderators only.
    let may_read = post.available
        || user
            .as_ref()
            .is_some_and(|u| u.is_admin || u.id == post.author_id);
    if !may_read {
        return Err(AppError::NotFound);
    }

    let related = state
        .db
        .related_posts(&post.tag, names::RELATED_POSTS_LIMIT + 1)
        .await
        .reject("could not get related posts")?;

    Ok(views::render(
        is_htmx,
        &post.title,
        post_views::post(&post, &related, &locale),
        &locale,
        user.as_ref(),
    ))
}

async fn category_posts(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    IsHtmx(is_htmx): IsHtmx,
    Locale(locale): Locale,
    Path(category_id): Path<i64>,
) -> Result<Markup, AppError> {
    let category = state
        .db
        .get_category(category_id)
        .await
        .reject("could not get category")?
        .filter(|c| c.available)
        .ok_or(AppError::NotFound)?;

    let posts = state
        .db
        .posts_by_category(category_id)
        .await
        .reject("could not get posts")?;

    let heading = t!("posts.in_category", category = category.name, locale = &locale);
    Ok(views::render(
        is_htmx,
        &heading,
        post_views::list(&heading, &posts, &locale),
        &locale,
        user.as_ref(),
    ))
}

async fn tag_posts(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    IsHtmx(is_htmx): IsHtmx,
    Locale(locale): Locale,
    Path(tag): Path<String>,
) -> Result<Markup, AppError> {
    let posts = state
        .db
        .posts_by_tag(&tag)
        .await
        .reject("could not get posts")?;

    let heading = t!("posts.with_tag", tag = tag, locale = &locale);
    Ok(views::render(
        is_htmx,
        &heading,
        post_views::list(&heading, &posts, &locale),
        &locale,
        user.as_ref(),
    ))
}

async fn author_posts(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    IsHtmx(is_htmx): IsHtmx,
    Locale(locale): Locale,
    Path(author_id): Path<i64>,
) -> Result<Markup, AppError> {
    let author = state
        .db
        .find_username(author_id)
        .await
        .reject("could not get author")?
        .ok_or(AppError::NotFound)?;

    let posts = state
        .db
        .posts_by_author(author_id)
        .await
        .reject("could not get posts")?;

    let heading = t!("posts.by_author", author = author, locale = &locale);
    Ok(views::render(
        is_htmx,
        &heading,
        post_views::list(&heading, &posts, &locale),
        &locale,
        user.as_ref(),
    ))
}

#[derive(Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

async fn search(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    IsHtmx(is_htmx): IsHtmx,
    Locale(locale): Locale,
    Query(query): Query<SearchQuery>,
) -> Result<Markup, AppError> {
    let q = query.q.unwrap_or_default();
    let q = q.trim();

    let results = if q.is_empty() {
        None
    } else {
        Some(
            state
                .db
                .search_posts(q)
                .await
                .reject("could not search posts")?,
        )
    };

    Ok(views::render(
        is_htmx,
        &t!("posts.search_title", locale = &locale),
        post_views::search(q, results.as_deref(), &locale),
        &locale,
        user.as_ref(),
    ))
}
