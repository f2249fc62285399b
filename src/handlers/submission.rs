use axum::{
    extract::{Form, State},
    routing::get,
    Router,
};
use maud::Markup;
use rust_i18n::t;
use serde::Deserialize;

use crate::{
    extractors::{AuthGuard, IsHtmx, Locale},
    models::{NewPost, NewQuestion},
    names,
    quiz::Difficulty,
    rejections::{AppError, ResultExt},
    services::submission::{Author, SubmitOutcome},
    views,
    views::submission as submission_views,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            names::PROPOSE_QUESTION_URL,
            get(question_page).post(question_post),
        )
        .route(names::PROPOSE_POST_URL, get(post_page).post(post_post))
}

async fn question_page(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
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
        &t!("propose.question_title", locale = &locale),
        submission_views::question_form(&categories, None, &locale),
        &locale,
        Some(&user),
    ))
}

#[derive(Deserialize)]
struct QuestionPost {
    category_id: i64,
    difficulty: String,
    question: String,
    right_answer: String,
    answer_1: String,
    answer_2: String,
    answer_3: String,
    answer_4: String,
    #[serde(default)]
    tag: String,
}

async fn question_post(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Locale(locale): Locale,
    Form(body): Form<QuestionPost>,
) -> Result<Markup, AppError> {
    let difficulty =
        Difficulty::from_code(&body.difficulty).ok_or(AppError::Input("unknown difficulty"))?;

    let question = NewQuestion {
        question: body.question,
        category_id: body.category_id,
        difficulty,
        right_answer: body.right_answer,
        answers: [body.answer_1, body.answer_2, body.answer_3, body.answer_4],
        tag: body.tag,
    };
    let author = Author {
        id: user.id,
        username: &user.username,
        is_admin: user.is_admin,
    };

    let outcome = state
        .submissions
        .submit_question(&author, &question)
        .await
        .reject("could not store question")?;

    if let SubmitOutcome::Accepted(id) = outcome {
        tracing::info!("question {id} proposed by {}", user.username);
        return Ok(views::titled(
            &t!("propose.thanks_title", locale = &locale),
            submission_views::thanks(&locale),
        ));
    }

    let categories = state
        .db
        .available_categories()
        .await
        .reject("could not get categories")?;

    Ok(views::titled(
        &t!("propose.question_title", locale = &locale),
        submission_views::question_form(&categories, Some(&outcome), &locale),
    ))
}

async fn post_page(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
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
        &t!("propose.post_title", locale = &locale),
        submission_views::post_form(&categories, None, &locale),
        &locale,
        Some(&user),
    ))
}

#[derive(Deserialize)]
struct PostPost {
    category_id: i64,
    title: String,
    body: String,
    #[serde(default)]
    tag: String,
}

async fn post_post(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Locale(locale): Locale,
    Form(body): Form<PostPost>,
) -> Result<Markup, AppError> {
    let post = NewPost {
        title: body.title,
        category_id: body.category_id,
        body: body.body,
        tag: body.tag,
    };
    let author = Author {
        id: user.id,
        username: &user.username,
        is_admin: user.is_admin,
    };

    let outcome = state
        .submissions
        .submit_post(&author, &post)
        .await
        .reject("could not store post")?;

    if let SubmitOutcome::Accepted(id) = outcome {
        tracing::info!("post {id} proposed by {}", user.username);
        return Ok(views::titled(
            &t!("propose.thanks_title", locale = &locale),
            submission_views::thanks(&locale),
        ));
    }

    let categories = state
        .db
        .available_categories()
        .await
        .reject("could not get categories")?;

    Ok(views::titled(
        &t!("propose.post_title", locale = &locale),
        submission_views::post_form(&categories, Some(&outcome), &locale),
    ))
}
