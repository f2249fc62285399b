// Database model structs

use crate::quiz::Difficulty;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub show_test_info: bool,
}

#[derive(Debug, sqlx::FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub score: i64,
    pub is_active: bool,
}

#[derive(Debug, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub score: i64,
}

#[derive(Debug, Default, sqlx::FromRow)]
pub struct UserLog {
    pub question_count: i64,
    pub right_answers: i64,
    pub wrong_answers: i64,
    pub last_login: Option<String>,
}

/// Result of checking an activation link.
#[derive(Debug, PartialEq, Eq)]
pub enum Activation {
    Activated(i64),
    Expired,
    Invalid,
}

/// Inserting a user collided with an existing username or email.
///
/// Travels inside the `color_eyre::Report` returned by the insert so callers
/// can `downcast_ref` it and report the taken field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserConflict {
    Username,
    Email,
}

impl std::fmt::Display for UserConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserConflict::Username => f.write_str("username is already taken"),
            UserConflict::Email => f.write_str("email is already registered"),
        }
    }
}

impl std::error::Error for UserConflict {}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QuestionRow {
    pub id: i64,
    pub question: String,
    pub category_id: i64,
    pub author_id: i64,
    pub right_answer: String,
    pub answer_1: String,
    pub answer_2: String,
    pub answer_3: String,
    pub answer_4: String,
    pub difficulty: String,
    pub available: bool,
    pub tag: String,
}

impl QuestionRow {
    pub fn answers(&self) -> [&str; 4] {
        [&self.answer_1, &self.answer_2, &self.answer_3, &self.answer_4]
    }

    pub fn difficulty(&self) -> Difficulty {
        Difficulty::from_code(&self.difficulty).unwrap_or(Difficulty::Newbie)
    }
}

/// Pending or published question as listed in the moderation queue.
#[derive(Debug, sqlx::FromRow)]
pub struct QuestionSummary {
    pub id: i64,
    pub question: String,
    pub category: String,
    pub author: String,
    pub difficulty: String,
    pub available: bool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub author_id: i64,
    pub author: String,
    pub category_id: i64,
    pub category: String,
    pub body: String,
    pub tag: String,
    pub available: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub tag: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TestSessionModel {
    pub id: i64,
    pub token: String,
    pub user_id: i64,
    pub category_id: i64,
    pub difficulty: String,
    pub time_limit: bool,
    pub right_answers: i64,
    pub wrong_answers: i64,
    pub finished: bool,
}

impl TestSessionModel {
    pub fn difficulty(&self) -> Difficulty {
        Difficulty::from_code(&self.difficulty).unwrap_or(Difficulty::Newbie)
    }
}

/// What the test page should show next.
#[derive(Debug)]
pub enum CurrentQuestion {
    Question {
        question: QuestionRow,
        /// 1-based position within the test.
        number: i64,
        total: i64,
    },
    Finished,
}

/// Result of submitting an answer within a test session.
#[derive(Debug)]
pub enum AnswerResult {
    Scored(AnswerOutcome),
    /// The question does not belong to the session.
    NotInSession,
    /// Another question has to be answered first.
    NotCurrent,
    /// Time ran out; further answers are not scored.
    SessionFinished,
}

#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    pub question_id: i64,
    pub chosen_answer: String,
    pub is_correct: bool,
    pub points: i64,
    pub score: i64,
    /// The question had already been scored; nothing was changed.
    pub already_answered: bool,
}

#[derive(Debug, Clone)]
pub struct TestProgress {
    pub quantity: i64,
    pub right_answers: i64,
    pub wrong_answers: i64,
    pub remaining: i64,
    pub difficulty: Difficulty,
    pub time_limit: bool,
}

impl TestProgress {
    pub fn points(&self) -> i64 {
        self.difficulty.points()
    }
}
