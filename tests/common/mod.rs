#![allow(dead_code)]

use interview_quiz::db::Db;
use interview_quiz::models::{NewPost, NewQuestion, NewUser};
use interview_quiz::quiz::Difficulty;

pub async fn create_test_db() -> Db {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!(
        "interview_quiz_test_{}_{}.db",
        std::process::id(),
        id
    ));
    // Clean up leftover file from previous runs
    let _ = std::fs::remove_file(&path);
    let url = format!("sqlite://{}", path.display());
    Db::new(&url).await.expect("failed to create test database")
}

pub fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        first_name: "Tester".to_string(),
        last_name: "Testerson".to_string(),
        password: "password123".to_string(),
    }
}

pub async fn create_user(db: &Db, username: &str) -> i64 {
    db.create_user(&new_user(username), false)
        .await
        .expect("create user")
}

pub async fn create_admin(db: &Db, username: &str) -> i64 {
    db.create_user(&new_user(username), true)
        .await
        .expect("create admin")
}

pub fn new_question(category_id: i64, difficulty: Difficulty, n: usize) -> NewQuestion {
    NewQuestion {
        question: format!("Question {n}"),
        category_id,
        difficulty,
        right_answer: format!("right {n}"),
        answers: [
            format!("right {n}"),
            format!("wrong a {n}"),
            format!("wrong b {n}"),
            format!("wrong c {n}"),
        ],
        tag: "rust".to_string(),
    }
}

/// Add `count` published questions of `difficulty` to the category.
pub async fn seed_questions(
    db: &Db,
    author_id: i64,
    category_id: i64,
    difficulty: Difficulty,
    count: usize,
) -> Vec<i64> {
    let mut ids = Vec::with_capacity(count);
    for n in 0..count {
        let id = db
            .create_question(author_id, &new_question(category_id, difficulty, n), true)
            .await
            .expect("create question");
        ids.push(id);
    }
    ids
}

pub fn new_post(category_id: i64, title: &str, tag: &str) -> NewPost {
    NewPost {
        title: title.to_string(),
        category_id,
        body: "Body text.".to_string(),
        tag: tag.to_string(),
    }
}
