use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use axum_extra::extract::CookieJar;
use maud::Markup;
use rust_i18n::t;
use serde::Deserialize;

use super::hx_redirect;
use crate::{
    extractors::{AuthGuard, IsHtmx, Locale},
    models::NewUser,
    names,
    rejections::{AppError, ResultExt},
    utils, views,
    views::account as account_views,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(names::REGISTER_URL, get(register_page).post(register_post))
        .route(names::LOGIN_URL, get(login_page).post(login_post))
        .route(names::LOGOUT_URL, post(logout_post))
        .route("/verify/{email}/{key}", get(verify))
        .route(names::PROFILE_URL, get(profile))
        .route(names::PROFILE_EDIT_URL, get(edit_profile_page).post(edit_profile_post))
        .route(names::NO_INFO_URL, post(dismiss_test_info))
        .route(
            names::FORGOT_PASSWORD_URL,
            get(forgot_password_page).post(forgot_password_post),
        )
        .route("/reset-password/{token}", get(reset_password_page))
        .route(names::RESET_PASSWORD_URL, post(reset_password_post))
        .route(
            names::WRITE_TO_ADMIN_URL,
            get(write_to_admin_page).post(write_to_admin_post),
        )
}

fn session_redirect(state: &AppState, session_token: &str) -> Result<Response, AppError> {
    let cookie = utils::cookie(
        names::USER_SESSION_COOKIE_NAME,
        session_token,
        state.secure_cookies,
    )
    .reject("could not build session cookie")?;
    hx_redirect("/", vec![cookie])
}

async fn register_page(IsHtmx(is_htmx): IsHtmx, Locale(locale): Locale) -> Markup {
    views::render(
        is_htmx,
        &t!("account.register_title", locale = &locale),
        account_views::register(
            account_views::RegisterState::NoError,
            account_views::RegisterForm::default(),
            &locale,
        ),
        &locale,
        None,
    )
}

#[derive(Deserialize)]
struct RegisterPost {
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    password: String,
    password_confirm: String,
}

async fn register_post(
    State(state): State<AppState>,
    Locale(locale): Locale,
    Form(body): Form<RegisterPost>,
) -> Result<Response, AppError> {
    use crate::services::auth::RegisterOutcome;
    use account_views::RegisterState;

    let user = NewUser {
        username: body.username,
        email: body.email,
        first_name: body.first_name,
        last_name: body.last_name,
        password: body.password,
    };

    let outcome = state
        .auth
        .register(&user, &body.password_confirm)
        .await
        .reject("registration failed")?;

    let form_state = match outcome {
        RegisterOutcome::LoggedIn(session_token) => {
            return session_redirect(&state, &session_token);
        }
        RegisterOutcome::VerificationSent(email) => {
            return Ok(views::titled(
                &t!("account.check_email_title", locale = &locale),
                account_views::check_email(&email, &locale),
            )
            .into_response());
        }
        RegisterOutcome::VerificationEmailFailed(email) => {
            return Ok(views::titled(
                &t!("account.email_failed_title", locale = &locale),
                account_views::email_failed(&email, &locale),
            )
            .into_response());
        }
        RegisterOutcome::EmptyFields => RegisterState::EmptyFields,
        RegisterOutcome::InvalidName(field) => RegisterState::InvalidName(field),
        RegisterOutcome::UsernameTaken => RegisterState::UsernameTaken,
        RegisterOutcome::EmailTaken => RegisterState::EmailTaken,
        RegisterOutcome::WeakPassword => RegisterState::WeakPassword,
        RegisterOutcome::PasswordMismatch => RegisterState::PasswordMismatch,
    };

    let form = account_views::RegisterForm {
        username: &user.username,
        email: &user.email,
        first_name: &user.first_name,
        last_name: &user.last_name,
    };

    Ok(views::titled(
        &t!("account.register_title", locale = &locale),
        account_views::register(form_state, form, &locale),
    )
    .into_response())
}

async fn login_page(IsHtmx(is_htmx): IsHtmx, Locale(locale): Locale) -> Markup {
    views::render(
        is_htmx,
        &t!("account.login_title", locale = &locale),
        account_views::login(account_views::LoginState::NoError, &locale),
        &locale,
        None,
    )
}

#[derive(Deserialize)]
struct LoginPost {
    username: String,
    password: String,
}

async fn login_post(
    State(state): State<AppState>,
    Locale(locale): Locale,
    Form(body): Form<LoginPost>,
) -> Result<Response, AppError> {
    use crate::services::auth::LoginOutcome;

    let outcome = state
        .auth
        .login(&body.username, &body.password)
        .await
        .reject("login failed")?;

    let login_state = match outcome {
        LoginOutcome::Success(session_token) => return session_redirect(&state, &session_token),
        LoginOutcome::InvalidCredentials => account_views::LoginState::InvalidCredentials,
        LoginOutcome::Inactive => account_views::LoginState::Inactive,
    };

    Ok((
        StatusCode::OK,
        views::titled(
            &t!("account.login_title", locale = &locale),
            account_views::login(login_state, &locale),
        ),
    )
        .into_response())
}

async fn logout_post(jar: CookieJar, State(state): State<AppState>) -> Result<Response, AppError> {
    if let Some(session_id) = jar
        .get(names::USER_SESSION_COOKIE_NAME)
        .map(|c| c.value().to_string())
    {
        state
            .auth
            .logout(&session_id)
            .await
            .reject("could not delete session")?;
    }

    let clear_user = utils::clear_cookie(names::USER_SESSION_COOKIE_NAME, state.secure_cookies)
        .reject("could not build clear-user cookie")?;
    let clear_test = utils::clear_cookie(names::TEST_SESSION_COOKIE_NAME, state.secure_cookies)
        .reject("could not build clear-test cookie")?;

    hx_redirect(names::LOGIN_URL, vec![clear_user, clear_test])
}

async fn verify(
    State(state): State<AppState>,
    IsHtmx(is_htmx): IsHtmx,
    Locale(locale): Locale,
    Path((email, key)): Path<(String, String)>,
) -> Result<Response, AppError> {
    use crate::services::auth::VerifyOutcome;

    let outcome = state
        .auth
        .verify(&email, &key)
        .await
        .reject("could not verify activation key")?;

    let (title, body) = match outcome {
        VerifyOutcome::LoggedIn(session_token) => {
            // Plain GET from an email client: set the cookie and redirect.
            let cookie = utils::cookie(
                names::USER_SESSION_COOKIE_NAME,
                &session_token,
                state.secure_cookies,
            )
            .reject("could not build session cookie")?;
            return Ok((
                StatusCode::SEE_OTHER,
                [
                    (axum::http::header::SET_COOKIE, cookie),
                    (
                        axum::http::header::LOCATION,
                        axum::http::HeaderValue::from_static(names::PROFILE_URL),
                    ),
                ],
            )
                .into_response());
        }
        VerifyOutcome::Expired => (
            t!("account.activation_expired_title", locale = &locale),
            account_views::activation_expired(&locale),
        ),
        VerifyOutcome::Invalid => (
            t!("account.activation_invalid_title", locale = &locale),
            account_views::activation_invalid(&locale),
        ),
    };

    Ok(views::render(is_htmx, &title, body, &locale, None).into_response())
}

async fn profile(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    IsHtmx(is_htmx): IsHtmx,
    Locale(locale): Locale,
) -> Result<Markup, AppError> {
    let profile = state
        .db
        .get_profile(user.id)
        .await
        .reject("could not get profile")?;

    let rank = if profile.score > 0 {
        Some(
            state
                .db
                .user_rank(user.id)
                .await
                .reject("could not get rank")?,
        )
    } else {
        None
    };

    let log = state
        .db
        .user_log(user.id)
        .await
        .reject("could not get user log")?;

    Ok(views::render(
        is_htmx,
        &user.username,
        account_views::profile(&profile, rank, &log, &locale),
        &locale,
        Some(&user),
    ))
}

async fn dismiss_test_info(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state
        .db
        .dismiss_test_info(user.id)
        .await
        .reject("could not dismiss test info")?;

    tracing::info!("user {} hid the test info box", user.id);
    Ok(StatusCode::OK)
}

async fn edit_profile_page(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    IsHtmx(is_htmx): IsHtmx,
    Locale(locale): Locale,
) -> Result<Markup, AppError> {
    let profile = state
        .db
        .get_profile(user.id)
        .await
        .reject("could not get profile")?;

    Ok(views::render(
        is_htmx,
        &t!("account.edit_profile", locale = &locale),
        account_views::edit_profile(
            account_views::ProfileEditState::NoError,
            &profile.first_name,
            &profile.last_name,
            &locale,
        ),
        &locale,
        Some(&user),
    ))
}

#[derive(Deserialize)]
struct ProfileEditPost {
    first_name: String,
    last_name: String,
}

async fn edit_profile_post(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Locale(locale): Locale,
    Form(body): Form<ProfileEditPost>,
) -> Result<Response, AppError> {
    use crate::services::auth::ProfileEditOutcome;
    use account_views::ProfileEditState;

    let outcome = state
        .auth
        .edit_profile(user.id, &body.first_name, &body.last_name)
        .await
        .reject("could not update profile")?;

    let form_state = match outcome {
        ProfileEditOutcome::Saved => {
            tracing::info!("user {} edited their profile", user.id);
            return hx_redirect(names::PROFILE_URL, vec![]);
        }
        ProfileEditOutcome::EmptyFields => ProfileEditState::EmptyFields,
        ProfileEditOutcome::InvalidName(field) => ProfileEditState::InvalidName(field),
    };

    Ok(views::titled(
        &t!("account.edit_profile", locale = &locale),
        account_views::edit_profile(form_state, &body.first_name, &body.last_name, &locale),
    )
    .into_response())
}

async fn forgot_password_page(IsHtmx(is_htmx): IsHtmx, Locale(locale): Locale) -> Markup {
    views::render(
        is_htmx,
        &t!("account.forgot_password_title", locale = &locale),
        account_views::forgot_password(account_views::ForgotPasswordState::NoError, &locale),
        &locale,
        None,
    )
}

#[derive(Deserialize)]
struct ForgotPasswordPost {
    email: String,
}

async fn forgot_password_post(
    State(state): State<AppState>,
    Locale(locale): Locale,
    Form(body): Form<ForgotPasswordPost>,
) -> Result<Markup, AppError> {
    let sent = state
        .auth
        .forgot_password(&body.email)
        .await
        .reject("could not start password reset")?;

    let view_state = if sent {
        account_views::ForgotPasswordState::EmailSent
    } else {
        account_views::ForgotPasswordState::EmailNotConfigured
    };

    Ok(views::titled(
        &t!("account.forgot_password_title", locale = &locale),
        account_views::forgot_password(view_state, &locale),
    ))
}

async fn reset_password_page(
    State(state): State<AppState>,
    IsHtmx(is_htmx): IsHtmx,
    Locale(locale): Locale,
    Path(token): Path<String>,
) -> Result<Markup, AppError> {
    let valid = state
        .auth
        .validate_reset_token(&token)
        .await
        .reject("could not check reset token")?;

    let view_state = if valid {
        account_views::ResetPasswordState::Form
    } else {
        account_views::ResetPasswordState::InvalidToken
    };

    Ok(views::render(
        is_htmx,
        &t!("account.reset_password_title", locale = &locale),
        account_views::reset_password(view_state, &token, &locale),
        &locale,
        None,
    ))
}

#[derive(Deserialize)]
struct ResetPasswordPost {
    token: String,
    password: String,
    password_confirm: String,
}

async fn reset_password_post(
    State(state): State<AppState>,
    Locale(locale): Locale,
    Form(body): Form<ResetPasswordPost>,
) -> Result<Markup, AppError> {
    use crate::services::auth::ResetPasswordOutcome;
    use account_views::ResetPasswordState;

    let outcome = state
        .auth
        .reset_password(&body.token, &body.password, &body.password_confirm)
        .await
        .reject("could not reset password")?;

    let view_state = match outcome {
        ResetPasswordOutcome::Success => ResetPasswordState::Success,
        ResetPasswordOutcome::EmptyPassword => ResetPasswordState::EmptyPassword,
        ResetPasswordOutcome::WeakPassword => ResetPasswordState::WeakPassword,
        ResetPasswordOutcome::PasswordMismatch => ResetPasswordState::PasswordMismatch,
        ResetPasswordOutcome::InvalidToken => ResetPasswordState::InvalidToken,
    };

    Ok(views::titled(
        &t!("account.reset_password_title", locale = &locale),
        account_views::reset_password(view_state, &body.token, &locale),
    ))
}

async fn write_to_admin_page(
    AuthGuard(user): AuthGuard,
    IsHtmx(is_htmx): IsHtmx,
    Locale(locale): Locale,
) -> Markup {
    views::render(
        is_htmx,
        &t!("account.write_to_admin", locale = &locale),
        account_views::write_to_admin(
            account_views::ContactState::NoError,
            account_views::ContactForm::default(),
            &locale,
        ),
        &locale,
        Some(&user),
    )
}

#[derive(Deserialize)]
struct WriteToAdminPost {
    title: String,
    content: String,
    grade: String,
}

async fn write_to_admin_post(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Locale(locale): Locale,
    Form(body): Form<WriteToAdminPost>,
) -> Result<Markup, AppError> {
    use crate::services::contact::{ContactOutcome, Sender};
    use account_views::ContactState;

    let sender = Sender {
        username: &user.username,
        email: &user.email,
    };
    let outcome = state
        .contact
        .write_to_admin(&sender, &body.title, &body.content, &body.grade)
        .await
        .reject("could not send message")?;

    let view_state = match outcome {
        ContactOutcome::Sent => ContactState::Sent,
        ContactOutcome::EmptyFields => ContactState::EmptyFields,
        ContactOutcome::TooLong => ContactState::TooLong,
        ContactOutcome::InvalidGrade => ContactState::InvalidGrade,
        ContactOutcome::NotConfigured => ContactState::NotConfigured,
        ContactOutcome::SendFailed => ContactState::SendFailed,
    };

    let form = account_views::ContactForm {
        title: &body.title,
        content: &body.content,
        grade: &body.grade,
    };

    Ok(views::titled(
        &t!("account.write_to_admin", locale = &locale),
        account_views::write_to_admin(view_state, form, &locale),
    ))
}
