use maud::{html, Markup};
use rust_i18n::t;

use super::components;
use crate::{
    db::models::{UserLog, UserProfile},
    names,
    services::{auth::NameField, contact::MAX_MESSAGE_TITLE_LENGTH},
};

pub enum RegisterState {
    NoError,
    EmptyFields,
    InvalidName(NameField),
    UsernameTaken,
    EmailTaken,
    WeakPassword,
    PasswordMismatch,
}

/// Values to re-fill the registration form with after a failed attempt.
#[derive(Default)]
pub struct RegisterForm<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

fn text_input(
    name: &str,
    kind: &str,
    label: &str,
    value: &str,
    autocomplete: &str,
    error: Option<&str>,
) -> Markup {
    html! {
        label {
            (label)
            input name=(name)
                  type=(kind)
                  value=(value)
                  autocomplete=(autocomplete)
                  required="true"
                  placeholder=(label)
                  aria-invalid=[error.map(|_| "true")]
                  aria-label=(label);
            @if let Some(msg) = error {
                small { (msg) }
            }
        }
    }
}

fn field_error<'a>(state: &RegisterState, message: Option<&'a str>, field: &str) -> Option<&'a str> {
    let hit = match state {
        RegisterState::InvalidName(NameField::Username) | RegisterState::UsernameTaken => {
            field == "username"
        }
        RegisterState::InvalidName(NameField::FirstName) => field == "first_name",
        RegisterState::InvalidName(NameField::LastName) => field == "last_name",
        RegisterState::EmailTaken => field == "email",
        RegisterState::WeakPassword | RegisterState::PasswordMismatch => field == "password",
        RegisterState::EmptyFields => field == "username",
        RegisterState::NoError => false,
    };
    message.filter(|_| hit)
}

pub fn register(state: RegisterState, form: RegisterForm<'_>, locale: &str) -> Markup {
    let message = match &state {
        RegisterState::NoError => None,
        RegisterState::EmptyFields => Some(t!("account.empty_fields", locale = locale)),
        RegisterState::InvalidName(_) => Some(t!("account.invalid_name", locale = locale)),
        RegisterState::UsernameTaken => Some(t!("account.username_taken", locale = locale)),
        RegisterState::EmailTaken => Some(t!("account.email_taken", locale = locale)),
        RegisterState::WeakPassword => Some(t!("account.weak_password", locale = locale)),
        RegisterState::PasswordMismatch => {
            Some(t!("account.password_mismatch", locale = locale))
        }
    };
    let message = message.as_deref();

    html! {
        h1 { (t!("account.register_title", locale = locale)) }
        article style="max-width: 32rem;" {
            form hx-post=(names::REGISTER_URL) hx-target="main" hx-swap="innerHTML" {
                (text_input("username", "text", &t!("account.username", locale = locale), form.username, "username", field_error(&state, message, "username")))
                (text_input("email", "email", &t!("account.email", locale = locale), form.email, "email", field_error(&state, message, "email")))
                (text_input("first_name", "text", &t!("account.first_name", locale = locale), form.first_name, "given-name", field_error(&state, message, "first_name")))
                (text_input("last_name", "text", &t!("account.last_name", locale = locale), form.last_name, "family-name", field_error(&state, message, "last_name")))
                (text_input("password", "password", &t!("account.password", locale = locale), "", "new-password", field_error(&state, message, "password")))
                (text_input("password_confirm", "password", &t!("account.password_confirm", locale = locale), "", "new-password", None))
                button type="submit" { (t!("account.register_btn", locale = locale)) }
            }
            p {
                (t!("account.already_have_account", locale = locale))
                " "
                a href=(names::LOGIN_URL) { (t!("account.log_in", locale = locale)) }
            }
        }
    }
}

pub enum LoginState {
    NoError,
    InvalidCredentials,
    Inactive,
}

pub fn login(state: LoginState, locale: &str) -> Markup {
    let error = match state {
        LoginState::NoError => None,
        LoginState::InvalidCredentials => Some(t!("account.invalid_credentials", locale = locale)),
        LoginState::Inactive => Some(t!("account.inactive", locale = locale)),
    };

    html! {
        h1 { (t!("account.login_title", locale = locale)) }
        article style="max-width: 32rem;" {
            form hx-post=(names::LOGIN_URL) hx-target="main" hx-swap="innerHTML" {
                (text_input("username", "text", &t!("account.username", locale = locale), "", "username", None))
                (text_input("password", "password", &t!("account.password", locale = locale), "", "current-password", error.as_deref()))
                button type="submit" { (t!("account.log_in", locale = locale)) }
            }
            p {
                a href=(names::FORGOT_PASSWORD_URL) { (t!("account.forgot_password_link", locale = locale)) }
            }
            p {
                (t!("account.no_account", locale = locale))
                " "
                a href=(names::REGISTER_URL) { (t!("account.register_btn", locale = locale)) }
            }
        }
    }
}

pub fn check_email(email: &str, locale: &str) -> Markup {
    html! {
        h1 { (t!("account.check_email_title", locale = locale)) }
        p { (t!("account.check_email_body", email = email, locale = locale)) }
    }
}

pub fn email_failed(email: &str, locale: &str) -> Markup {
    html! {
        h1 { (t!("account.email_failed_title", locale = locale)) }
        p { (t!("account.email_failed_body", email = email, locale = locale)) }
    }
}

pub fn activation_expired(locale: &str) -> Markup {
    html! {
        h1 { (t!("account.activation_expired_title", locale = locale)) }
        p { (t!("account.activation_expired_body", locale = locale)) }
    }
}

pub fn activation_invalid(locale: &str) -> Markup {
    html! {
        h1 { (t!("account.activation_invalid_title", locale = locale)) }
        p { (t!("account.activation_invalid_body", locale = locale)) }
    }
}

pub fn profile(profile: &UserProfile, rank: Option<i64>, log: &UserLog, locale: &str) -> Markup {
    html! {
        h1 { (profile.username) }
        article {
            dl {
                dt { (t!("account.name", locale = locale)) }
                dd { (profile.first_name) " " (profile.last_name) }
                dt { (t!("account.email", locale = locale)) }
                dd { (profile.email) }
                dt { (t!("account.score", locale = locale)) }
                dd { (profile.score) }
                @if let Some(rank) = rank {
                    dt { (t!("account.rank", locale = locale)) }
                    dd { (rank) }
                }
            }
        }
        article {
            header { strong { (t!("account.stats_title", locale = locale)) } }
            table {
                tbody {
                    tr {
                        td { (t!("account.questions_answered", locale = locale)) }
                        td { (log.question_count) }
                    }
                    tr {
                        td { (t!("account.right_answers", locale = locale)) }
                        td.answer-right { (log.right_answers) }
                    }
                    tr {
                        td { (t!("account.wrong_answers", locale = locale)) }
                        td.answer-wrong { (log.wrong_answers) }
                    }
                    tr {
                        td { (t!("account.last_login", locale = locale)) }
                        td { (log.last_login.as_deref().unwrap_or("-")) }
                    }
                }
            }
        }
        p {
            a href=(names::author_posts_url(profile.id)) { (t!("account.my_posts", locale = locale)) }
            " · "
            a href=(names::PROFILE_EDIT_URL) { (t!("account.edit_profile", locale = locale)) }
            " · "
            a href=(names::WRITE_TO_ADMIN_URL) { (t!("account.write_to_admin", locale = locale)) }
        }
    }
}

pub enum ForgotPasswordState {
    NoError,
    EmailNotConfigured,
    EmailSent,
}

pub fn forgot_password(state: ForgotPasswordState, locale: &str) -> Markup {
    let back = html! {
        p {
            a href=(names::LOGIN_URL) { (t!("account.back_to_login", locale = locale)) }
        }
    };

    match state {
        ForgotPasswordState::NoError => html! {
            h1 { (t!("account.forgot_password_title", locale = locale)) }
            p { (t!("account.forgot_password_desc", locale = locale)) }
            article style="max-width: 32rem;" {
                form hx-post=(names::FORGOT_PASSWORD_URL) hx-target="main" hx-swap="innerHTML" {
                    (text_input("email", "email", &t!("account.email", locale = locale), "", "email", None))
                    button type="submit" { (t!("account.forgot_password_btn", locale = locale)) }
                }
                (back)
            }
        },
        ForgotPasswordState::EmailNotConfigured => html! {
            h1 { (t!("account.forgot_password_title", locale = locale)) }
            p { (t!("account.forgot_password_not_configured", locale = locale)) }
            (back)
        },
        ForgotPasswordState::EmailSent => html! {
            h1 { (t!("account.forgot_password_title", locale = locale)) }
            p { (t!("account.forgot_password_email_sent", locale = locale)) }
            (back)
        },
    }
}

pub enum ResetPasswordState {
    Form,
    EmptyPassword,
    WeakPassword,
    PasswordMismatch,
    InvalidToken,
    Success,
}

pub fn reset_password(state: ResetPasswordState, token: &str, locale: &str) -> Markup {
    let error = match state {
        ResetPasswordState::InvalidToken => {
            return html! {
                h1 { (t!("account.reset_password_title", locale = locale)) }
                p { (t!("account.reset_password_invalid_token", locale = locale)) }
                p {
                    a href=(names::FORGOT_PASSWORD_URL) { (t!("account.forgot_password_link", locale = locale)) }
                }
            };
        }
        ResetPasswordState::Success => {
            return html! {
                h1 { (t!("account.reset_password_title", locale = locale)) }
                p { (t!("account.reset_password_success", locale = locale)) }
                p {
                    a href=(names::LOGIN_URL) { (t!("account.log_in", locale = locale)) }
                }
            };
        }
        ResetPasswordState::Form => None,
        ResetPasswordState::EmptyPassword => Some(t!("account.empty_fields", locale = locale)),
        ResetPasswordState::WeakPassword => Some(t!("account.weak_password", locale = locale)),
        ResetPasswordState::PasswordMismatch => {
            Some(t!("account.password_mismatch", locale = locale))
        }
    };

    html! {
        h1 { (t!("account.reset_password_title", locale = locale)) }
        article style="max-width: 32rem;" {
            form hx-post=(names::RESET_PASSWORD_URL) hx-target="main" hx-swap="innerHTML" {
                input type="hidden" name="token" value=(token);
                (text_input("password", "password", &t!("account.new_password", locale = locale), "", "new-password", error.as_deref()))
                (text_input("password_confirm", "password", &t!("account.password_confirm", locale = locale), "", "new-password", None))
                button type="submit" { (t!("account.reset_password_btn", locale = locale)) }
            }
        }
    }
}

pub enum ProfileEditState {
    NoError,
    EmptyFields,
    InvalidName(NameField),
}

pub fn edit_profile(state: ProfileEditState, first_name: &str, last_name: &str, locale: &str) -> Markup {
    let message = match &state {
        ProfileEditState::NoError => None,
        ProfileEditState::EmptyFields => Some(t!("account.empty_fields", locale = locale)),
        ProfileEditState::InvalidName(_) => Some(t!("account.invalid_name", locale = locale)),
    };
    let last_name_error = matches!(state, ProfileEditState::InvalidName(NameField::LastName));
    let (first_error, last_error) = if last_name_error {
        (None, message.as_deref())
    } else {
        (message.as_deref(), None)
    };

    html! {
        h1 { (t!("account.edit_profile", locale = locale)) }
        article style="max-width: 32rem;" {
            form hx-post=(names::PROFILE_EDIT_URL) hx-target="main" hx-swap="innerHTML" {
                (text_input("first_name", "text", &t!("account.first_name", locale = locale), first_name, "given-name", first_error))
                (text_input("last_name", "text", &t!("account.last_name", locale = locale), last_name, "family-name", last_error))
                button type="submit" { (t!("account.save_btn", locale = locale)) }
            }
            p {
                a href=(names::PROFILE_URL) { (t!("account.back_to_profile", locale = locale)) }
            }
        }
    }
}

pub enum ContactState {
    NoError,
    EmptyFields,
    TooLong,
    InvalidGrade,
    NotConfigured,
    SendFailed,
    Sent,
}

/// Values to re-fill the letter form with.
#[derive(Default)]
pub struct ContactForm<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub grade: &'a str,
}

pub fn write_to_admin(state: ContactState, form: ContactForm<'_>, locale: &str) -> Markup {
    let error = match state {
        ContactState::Sent => {
            return html! {
                h1 { (t!("account.write_to_admin", locale = locale)) }
                p { (t!("account.message_sent", locale = locale)) }
                p {
                    a href=(names::PROFILE_URL) { (t!("account.back_to_profile", locale = locale)) }
                }
            };
        }
        ContactState::NoError => None,
        ContactState::EmptyFields => Some(t!("account.empty_fields", locale = locale)),
        ContactState::TooLong => Some(t!(
            "account.message_title_too_long",
            max = MAX_MESSAGE_TITLE_LENGTH,
            locale = locale
        )),
        ContactState::InvalidGrade => Some(t!("account.invalid_grade", locale = locale)),
        ContactState::NotConfigured => Some(t!("account.message_not_configured", locale = locale)),
        ContactState::SendFailed => Some(t!("account.message_failed", locale = locale)),
    };

    html! {
        h1 { (t!("account.write_to_admin", locale = locale)) }
        article style="max-width: 40rem;" {
            (components::error_hint(error.as_deref()))
            form hx-post=(names::WRITE_TO_ADMIN_URL) hx-target="main" hx-swap="innerHTML" {
                label {
                    (t!("account.message_title", locale = locale))
                    input name="title" type="text" value=(form.title) required="true"
                          maxlength=(MAX_MESSAGE_TITLE_LENGTH);
                }
                label {
                    (t!("account.message_content", locale = locale))
                    textarea name="content" rows="6" required="true" { (form.content) }
                }
                label {
                    (t!("account.message_grade", locale = locale))
                    input name="grade" type="number" min="1" max="10" value=(form.grade) required="true";
                }
                button type="submit" { (t!("account.send_btn", locale = locale)) }
            }
        }
    }
}
