use maud::{html, Markup};
use rust_i18n::t;

use crate::{
    db::models::{Category, LeaderboardEntry},
    names,
    views::components,
};

pub fn index(top_users: &[LeaderboardEntry], logged_in: bool, locale: &str) -> Markup {
    html! {
        section {
            h1 { (t!("index.tagline", locale = locale)) }
            p { (t!("index.description", locale = locale)) }
            @if logged_in {
                a role="button" href=(names::CATEGORIES_URL) {
                    (t!("index.choose_category", locale = locale))
                }
            } @else {
                a role="button" href=(names::REGISTER_URL) {
                    (t!("index.sign_up", locale = locale))
                }
                " "
                a role="button" href=(names::LOGIN_URL) class="outline" {
                    (t!("index.log_in", locale = locale))
                }
            }
        }
        (leaderboard(top_users, locale))
    }
}

pub fn leaderboard(top_users: &[LeaderboardEntry], locale: &str) -> Markup {
    html! {
        section {
            h2 { (t!("leaderboard.title", locale = locale)) }
            @if top_users.is_empty() {
                p { (t!("leaderboard.empty", locale = locale)) }
            } @else {
                table.leaderboard {
                    thead {
                        tr {
                            th { "#" }
                            th { (t!("leaderboard.user", locale = locale)) }
                            th { (t!("leaderboard.score", locale = locale)) }
                        }
                    }
                    tbody {
                        @for (place, user) in top_users.iter().enumerate() {
                            tr {
                                td { (place + 1) }
                                td {
                                    (components::nav_link(&names::author_posts_url(user.id), html! { (user.username) }))
                                    " (" (user.first_name) ")"
                                }
                                td { (user.score) }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn categories(categories: &[Category], locale: &str) -> Markup {
    html! {
        h1 { (t!("categories.title", locale = locale)) }
        @if categories.is_empty() {
            p { (t!("categories.empty", locale = locale)) }
        }
        @for category in categories {
            article {
                header {
                    h3 { (category.name) }
                }
                p { (category.description) }
                footer {
                    (components::nav_link(&names::category_url(category.id), html! { (t!("categories.take_test", locale = locale)) }))
                    " · "
                    (components::nav_link(&names::category_posts_url(category.id), html! { (t!("categories.read_posts", locale = locale)) }))
                }
            }
        }
    }
}
