use maud::{html, Markup, DOCTYPE};
use rust_i18n::t;

use crate::{db::models::AuthUser, names, utils, views::components};

fn css() -> Markup {
    html! {
        link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.min.css";
        link rel="stylesheet" href="/static/index.css";
    }
}

fn js() -> Markup {
    html! {
        script src="https://unpkg.com/htmx.org@2.0.4" {}
        script src="/static/timer.js" {}
    }
}

fn header(locale: &str, user: Option<&AuthUser>) -> Markup {
    html! {
        header {
            nav {
                ul {
                    li."secondary" {
                        a href="/" {
                            strong { (t!("app.name", locale = locale)) }
                        }
                    }
                    li { (components::nav_link(names::CATEGORIES_URL, html! { (t!("nav.categories", locale = locale)) })) }
                    li { (components::nav_link(names::SEARCH_URL, html! { (t!("nav.search", locale = locale)) })) }
                }
                ul {
                    @if let Some(user) = user {
                        @if user.is_admin {
                            li { (components::nav_link(names::ADMIN_URL, html! { (t!("nav.admin", locale = locale)) })) }
                        }
                        li { (components::nav_link(names::PROPOSE_QUESTION_URL, html! { (t!("nav.propose", locale = locale)) })) }
                        li { (components::nav_link(names::PROFILE_URL, html! { (user.username) })) }
                        li {
                            a href="#" hx-post=(names::LOGOUT_URL) { (t!("nav.logout", locale = locale)) }
                        }
                    } @else {
                        li { (components::nav_link(names::LOGIN_URL, html! { (t!("nav.login", locale = locale)) })) }
                        li { (components::nav_link(names::REGISTER_URL, html! { (t!("nav.register", locale = locale)) })) }
                    }
                    li.lang-switch {
                        @for lang in names::SUPPORTED_LOCALES {
                            button."outline secondary"
                                   hx-post=(names::SET_LOCALE_URL)
                                   hx-vals=(format!(r#"{{"locale": "{lang}"}}"#))
                                   disabled[*lang == locale] {
                                (lang)
                            }
                        }
                    }
                }
            }
        }
    }
}

fn footer() -> Markup {
    html! {
        footer {
            small."secondary" { "v" (utils::VERSION) }
        }
    }
}

pub fn page(title: &str, body: Markup, locale: &str, user: Option<&AuthUser>) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(locale) {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                meta name="color-scheme" content="light dark";

                (css())
                (js())

                title { (title) " - " (t!("app.name", locale = locale)) }
            }

            body."container" {
                (header(locale, user))
                main { (body) }
                (footer())
            }
        }
    }
}

/// Fragment for htmx swaps into `main`; htmx picks the title up from it.
pub fn titled(title: &str, body: Markup) -> Markup {
    html! {
        title { (title) }
        (body)
    }
}

/// Full page for regular navigation, fragment for htmx requests.
pub fn render(
    is_htmx: bool,
    title: &str,
    body: Markup,
    locale: &str,
    user: Option<&AuthUser>,
) -> Markup {
    if is_htmx {
        titled(title, body)
    } else {
        page(title, body, locale, user)
    }
}

pub fn error_page(body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                (css())
                title { "Error" }
            }
            body."container" {
                main { (body) }
                p { a href="/" { "Home" } }
            }
        }
    }
}
