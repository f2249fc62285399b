use serde::Deserialize;

use crate::quiz::Difficulty;

/// Account data collected by the registration form.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// A question proposed by a user or an admin.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub question: String,
    pub category_id: i64,
    pub difficulty: Difficulty,
    pub right_answer: String,
    pub answers: [String; 4],
    pub tag: String,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub category_id: i64,
    pub body: String,
    pub tag: String,
}

pub const DEFAULT_TAG: &str = "IT";

/// Trims a user supplied tag, falling back to the default one.
pub fn normalize_tag(tag: &str) -> String {
    let tag = tag.trim();
    if tag.is_empty() {
        DEFAULT_TAG.to_string()
    } else {
        tag.to_string()
    }
}
