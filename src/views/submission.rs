use maud::{html, Markup};
use rust_i18n::t;

use crate::{
    db::models::Category,
    models::DEFAULT_TAG,
    names,
    quiz::Difficulty,
    services::submission::{SubmitOutcome, MAX_ANSWER_LENGTH, MAX_QUESTION_LENGTH, MAX_TITLE_LENGTH},
};

fn error_message(outcome: Option<&SubmitOutcome>, locale: &str) -> Option<String> {
    let key = match outcome? {
        SubmitOutcome::Accepted(_) => return None,
        SubmitOutcome::EmptyFields => "propose.empty_fields",
        SubmitOutcome::UnknownCategory => "propose.unknown_category",
        SubmitOutcome::RightAnswerNotAmongOptions => "propose.right_answer_missing",
        SubmitOutcome::TooLong => "propose.too_long",
    };
    Some(t!(key, locale = locale).to_string())
}

fn category_select(categories: &[Category], locale: &str) -> Markup {
    html! {
        label {
            (t!("propose.category", locale = locale))
            select name="category_id" required {
                @for category in categories {
                    option value=(category.id) { (category.name) }
                }
            }
        }
    }
}

pub fn question_form(categories: &[Category], outcome: Option<&SubmitOutcome>, locale: &str) -> Markup {
    html! {
        h1 { (t!("propose.question_title", locale = locale)) }
        p { (t!("propose.moderation_note", locale = locale)) }
        @if let Some(msg) = error_message(outcome, locale) {
            p.answer-wrong { (msg) }
        }
        form hx-post=(names::PROPOSE_QUESTION_URL) hx-target="main" hx-swap="innerHTML" {
            (category_select(categories, locale))
            label {
                (t!("propose.difficulty", locale = locale))
                select name="difficulty" {
                    @for difficulty in Difficulty::ALL {
                        option value=(difficulty.code()) { (t!(difficulty.label_key(), locale = locale)) }
                    }
                }
            }
            label {
                (t!("propose.question", locale = locale))
                textarea name="question" maxlength=(MAX_QUESTION_LENGTH) required {}
            }
            label {
                (t!("propose.right_answer", locale = locale))
                input name="right_answer" type="text" maxlength=(MAX_ANSWER_LENGTH) required;
            }
            @for i in 1..=4 {
                label {
                    (t!("propose.option", number = i, locale = locale))
                    input name=(format!("answer_{i}")) type="text" maxlength=(MAX_ANSWER_LENGTH) required;
                }
            }
            label {
                (t!("propose.tag", locale = locale))
                input name="tag" type="text" placeholder=(DEFAULT_TAG);
            }
            button type="submit" { (t!("propose.send", locale = locale)) }
        }
        p { a href=(names::PROPOSE_POST_URL) { (t!("propose.or_post", locale = locale)) } }
    }
}

pub fn post_form(categories: &[Category], outcome: Option<&SubmitOutcome>, locale: &str) -> Markup {
    html! {
        h1 { (t!("propose.post_title", locale = locale)) }
        p { (t!("propose.moderation_note", locale = locale)) }
        @if let Some(msg) = error_message(outcome, locale) {
            p.answer-wrong { (msg) }
        }
        form hx-post=(names::PROPOSE_POST_URL) hx-target="main" hx-swap="innerHTML" {
            (category_select(categories, locale))
            label {
                (t!("propose.post_heading", locale = locale))
                input name="title" type="text" maxlength=(MAX_TITLE_LENGTH) required;
            }
            label {
                (t!("propose.body", locale = locale))
                textarea name="body" rows="10" required {}
            }
            label {
                (t!("propose.tag", locale = locale))
                input name="tag" type="text" placeholder=(DEFAULT_TAG);
            }
            button type="submit" { (t!("propose.send", locale = locale)) }
        }
    }
}

pub fn thanks(locale: &str) -> Markup {
    html! {
        h1 { (t!("propose.thanks_title", locale = locale)) }
        p { (t!("propose.thanks_body", locale = locale)) }
        a href=(names::CATEGORIES_URL) { (t!("test.another", locale = locale)) }
    }
}
