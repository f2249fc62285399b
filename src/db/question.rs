use color_eyre::Result;

use super::models::{QuestionRow, QuestionSummary};
use super::Db;
use crate::models::NewQuestion;
use crate::quiz::Difficulty;

const QUESTION_COLUMNS: &str = "id, question, category_id, author_id, right_answer, \
    answer_1, answer_2, answer_3, answer_4, difficulty, available, tag";

impl Db {
    pub async fn create_question(
        &self,
        author_id: i64,
        question: &NewQuestion,
        available: bool,
    ) -> Result<i64> {
        let [a1, a2, a3, a4] = &question.answers;

        let id: i64 = sqlx::query_scalar(
            r#"INSERT INTO questions (question, category_id, author_id, right_answer,
                                      answer_1, answer_2, answer_3, answer_4,
                                      difficulty, available, tag)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING id"#,
        )
        .bind(&question.question)
        .bind(question.category_id)
        .bind(author_id)
        .bind(&question.right_answer)
        .bind(a1)
        .bind(a2)
        .bind(a3)
        .bind(a4)
        .bind(question.difficulty.code())
        .bind(available)
        .bind(&question.tag)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            "question created: id={id}, category={}, author={author_id}, available={available}",
            question.category_id
        );
        Ok(id)
    }

    pub async fn get_question(&self, question_id: i64) -> Result<Option<QuestionRow>> {
        let question = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?"
        ))
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(question)
    }

    /// Ids of the published questions a test can draw from.
    pub async fn available_question_ids(
        &self,
        category_id: i64,
        difficulty: Difficulty,
    ) -> Result<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM questions
            WHERE category_id = ? AND difficulty = ? AND available = TRUE
            ORDER BY id
            "#,
        )
        .bind(category_id)
        .bind(difficulty.code())
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    pub async fn pending_questions(&self) -> Result<Vec<QuestionSummary>> {
        let questions = sqlx::query_as::<_, QuestionSummary>(
            r#"
            SELECT q.id, q.question, c.name AS category, u.username AS author,
                   q.difficulty, q.available
            FROM questions q
            JOIN categories c ON c.id = q.category_id
            JOIN users u ON u.id = q.author_id
            WHERE q.available = FALSE
            ORDER BY q.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    /// Publish or unpublish a question. Returns the new availability.
    pub async fn toggle_question(&self, question_id: i64) -> Result<Option<bool>> {
        let available: Option<bool> = sqlx::query_scalar(
            "UPDATE questions SET available = NOT available WHERE id = ? RETURNING available",
        )
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(available) = available {
            tracing::info!("question {question_id} availability set to {available}");
        }
        Ok(available)
    }
}
