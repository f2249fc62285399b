use maud::{html, Markup};
use rust_i18n::t;

use crate::{
    db::models::{Category, PostRow, QuestionSummary},
    names,
    quiz::Difficulty,
    views::components,
};

fn toggle_button(url: &str, available: bool, locale: &str) -> Markup {
    html! {
        button."outline"
               hx-post=(url)
               hx-target="main"
               hx-swap="innerHTML" {
            @if available {
                (t!("admin.disable", locale = locale))
            } @else {
                (t!("admin.publish", locale = locale))
            }
        }
    }
}

pub fn dashboard(
    categories: &[Category],
    questions: &[QuestionSummary],
    posts: &[PostRow],
    locale: &str,
) -> Markup {
    html! {
        h1 { (t!("admin.title", locale = locale)) }

        section {
            h2 { (t!("admin.categories", locale = locale)) }
            article {
                table {
                    thead { tr {
                        th { (t!("admin.name", locale = locale)) }
                        th { (t!("admin.available", locale = locale)) }
                        th {}
                    } }
                    tbody {
                        @for c in categories {
                            tr {
                                td { (c.name) }
                                td { @if c.available { "✔" } @else { "✘" } }
                                td { (toggle_button(&names::toggle_category_url(c.id), c.available, locale)) }
                            }
                        }
                    }
                }
                form hx-post=(names::ADMIN_CATEGORIES_URL) hx-target="main" hx-swap="innerHTML" {
                    fieldset role="group" {
                        input name="name" type="text" required
                              placeholder=(t!("admin.name", locale = locale));
                        input name="description" type="text"
                              placeholder=(t!("admin.description", locale = locale));
                        button type="submit" { (t!("admin.add_category", locale = locale)) }
                    }
                }
            }
        }

        section {
            h2 { (t!("admin.pending_questions", locale = locale)) }
            @if questions.is_empty() {
                p { (t!("admin.nothing_pending", locale = locale)) }
            }
            @for q in questions {
                article {
                    p { strong { (q.question) } }
                    small {
                        (q.category) " · "
                        @if let Some(difficulty) = Difficulty::from_code(&q.difficulty) {
                            (t!(difficulty.label_key(), locale = locale))
                        }
                        " · " (q.author)
                    }
                    footer { (toggle_button(&names::toggle_question_url(q.id), q.available, locale)) }
                }
            }
        }

        section {
            h2 { (t!("admin.pending_posts", locale = locale)) }
            @if posts.is_empty() {
                p { (t!("admin.nothing_pending", locale = locale)) }
            }
            @for p in posts {
                article {
                    p { strong { (components::nav_link(&names::post_url(p.id), html! { (p.title) })) } }
                    small { (p.category) " · #" (p.tag) " · " (p.author) }
                    footer { (toggle_button(&names::toggle_post_url(p.id), p.available, locale)) }
                }
            }
        }
    }
}
