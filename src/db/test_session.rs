use color_eyre::{eyre::OptionExt, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ulid::Ulid;

use super::models::{
    AnswerOutcome, AnswerResult, CurrentQuestion, TestProgress, TestSessionModel,
};
use super::{user_log, Db};
use crate::quiz::{self, Difficulty, MAX_TEST_QUESTIONS};

const SESSION_COLUMNS: &str =
    "id, token, user_id, category_id, difficulty, time_limit, right_answers, wrong_answers, finished";

impl Db {
    /// Start a test for `user_id`: draw up to twenty published questions of
    /// the category and tier and store them in random order. Any earlier
    /// test of the user is deleted; the cookie only ever holds the newest.
    ///
    /// Returns the session token, or `None` when the category is missing or
    /// disabled.
    pub async fn start_test(
        &self,
        user_id: i64,
        category_id: i64,
        difficulty: Difficulty,
        time_limit: bool,
    ) -> Result<Option<String>> {
        match self.get_category(category_id).await? {
            Some(category) if category.available => {}
            _ => {
                tracing::warn!("test requested for unavailable category={category_id}");
                return Ok(None);
            }
        }

        let pool = self.available_question_ids(category_id, difficulty).await?;
        let mut rng = StdRng::from_entropy();
        let selected = quiz::sample_question_ids(&pool, MAX_TEST_QUESTIONS, &mut rng);

        let token = Ulid::new().to_string();

        // Transaction: replace the user's previous test with the new one
        let mut tx = self.pool.begin().await?;

        let pruned = sqlx::query("DELETE FROM test_sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let session_id: i64 = sqlx::query_scalar(
            r#"INSERT INTO test_sessions (token, user_id, category_id, difficulty, time_limit)
               VALUES (?, ?, ?, ?, ?)
               RETURNING id"#,
        )
        .bind(&token)
        .bind(user_id)
        .bind(category_id)
        .bind(difficulty.code())
        .bind(time_limit)
        .fetch_one(&mut *tx)
        .await?;

        for (position, &question_id) in selected.iter().enumerate() {
            sqlx::query(
                "INSERT INTO test_session_questions (session_id, question_id, position) VALUES (?, ?, ?)",
            )
            .bind(session_id)
            .bind(question_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            "test started: session_id={session_id}, user_id={user_id}, category={category_id}, \
             difficulty={difficulty}, questions={}, pool={}, replaced={pruned}",
            selected.len(),
            pool.len()
        );
        Ok(Some(token))
    }

    pub async fn get_test_session(&self, token: &str) -> Result<Option<TestSessionModel>> {
        let session = sqlx::query_as::<_, TestSessionModel>(&format!(
            "SELECT {SESSION_COLUMNS} FROM test_sessions WHERE token = ?"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    /// The next question to show, or `Finished` once nothing remains.
    pub async fn current_question(&self, session: &TestSessionModel) -> Result<CurrentQuestion> {
        let finished: bool = sqlx::query_scalar("SELECT finished FROM test_sessions WHERE id = ?")
            .bind(session.id)
            .fetch_one(&self.pool)
            .await?;
        if finished {
            return Ok(CurrentQuestion::Finished);
        }

        let (total, answered): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COUNT(is_correct)
            FROM test_session_questions
            WHERE session_id = ?
            "#,
        )
        .bind(session.id)
        .fetch_one(&self.pool)
        .await?;

        let Some(question_id) = self.next_question_id(session.id).await? else {
            return Ok(CurrentQuestion::Finished);
        };

        let question = self
            .get_question(question_id)
            .await?
            .ok_or_eyre("session question vanished")?;

        Ok(CurrentQuestion::Question {
            question,
            number: answered + 1,
            total,
        })
    }

    async fn next_question_id(&self, session_id: i64) -> Result<Option<i64>> {
        let id: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT question_id FROM test_session_questions
            WHERE session_id = ? AND is_correct IS NULL
            ORDER BY position
            LIMIT 1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    /// Grade `chosen_answer` for `question_id` and pop it from the session.
    ///
    /// Each question is scored at most once: repeating a submission returns
    /// the stored outcome and leaves score and counters untouched.
    pub async fn submit_answer(
        &self,
        session: &TestSessionModel,
        question_id: i64,
        chosen_answer: &str,
    ) -> Result<AnswerResult> {
        let points = session.difficulty().points();
        // Take the write lock up front: the reads below decide what gets written.
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let row: Option<(Option<bool>, Option<String>)> = sqlx::query_as(
            r#"
            SELECT is_correct, chosen_answer FROM test_session_questions
            WHERE session_id = ? AND question_id = ?
            "#,
        )
        .bind(session.id)
        .bind(question_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((stored, stored_answer)) = row else {
            return Ok(AnswerResult::NotInSession);
        };

        let score: i64 = sqlx::query_scalar("SELECT score FROM users WHERE id = ?")
            .bind(session.user_id)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(is_correct) = stored {
            tracing::debug!(
                "repeated answer for session={} question={question_id}, not scored",
                session.id
            );
            return Ok(AnswerResult::Scored(AnswerOutcome {
                question_id,
                chosen_answer: stored_answer.unwrap_or_default(),
                is_correct,
                points,
                score,
                already_answered: true,
            }));
        }

        let finished: bool = sqlx::query_scalar("SELECT finished FROM test_sessions WHERE id = ?")
            .bind(session.id)
            .fetch_one(&mut *tx)
            .await?;
        if finished {
            return Ok(AnswerResult::SessionFinished);
        }

        let current: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT question_id FROM test_session_questions
            WHERE session_id = ? AND is_correct IS NULL
            ORDER BY position
            LIMIT 1
            "#,
        )
        .bind(session.id)
        .fetch_optional(&mut *tx)
        .await?;
        if current != Some(question_id) {
            return Ok(AnswerResult::NotCurrent);
        }

        let right_answer: String =
            sqlx::query_scalar("SELECT right_answer FROM questions WHERE id = ?")
                .bind(question_id)
                .fetch_one(&mut *tx)
                .await?;
        let is_correct = chosen_answer.trim() == right_answer.trim();

        let popped = sqlx::query(
            r#"
            UPDATE test_session_questions SET is_correct = ?, chosen_answer = ?
            WHERE session_id = ? AND question_id = ? AND is_correct IS NULL
            "#,
        )
        .bind(is_correct)
        .bind(chosen_answer)
        .bind(session.id)
        .bind(question_id)
        .execute(&mut *tx)
        .await?;
        if popped.rows_affected() != 1 {
            color_eyre::eyre::bail!("question {question_id} was answered concurrently");
        }

        let (right, wrong) = if is_correct { (1, 0) } else { (0, 1) };
        sqlx::query(
            r#"
            UPDATE test_sessions
            SET right_answers = right_answers + ?, wrong_answers = wrong_answers + ?
            WHERE id = ?
            "#,
        )
        .bind(right)
        .bind(wrong)
        .bind(session.id)
        .execute(&mut *tx)
        .await?;

        let new_score = quiz::score_after_answer(score, points, is_correct);
        sqlx::query("UPDATE users SET score = ? WHERE id = ?")
            .bind(new_score)
            .bind(session.user_id)
            .execute(&mut *tx)
            .await?;

        user_log::record_answer(&mut *tx, session.user_id, is_correct).await?;

        tx.commit().await?;

        tracing::info!(
            "answer scored: session={} question={question_id} correct={is_correct} score {score} -> {new_score}",
            session.id
        );

        Ok(AnswerResult::Scored(AnswerOutcome {
            question_id,
            chosen_answer: chosen_answer.to_string(),
            is_correct,
            points,
            score: new_score,
            already_answered: false,
        }))
    }

    /// Interrupt the test (time is up); remaining questions are dropped.
    pub async fn finish_test(&self, session_id: i64) -> Result<()> {
        sqlx::query("UPDATE test_sessions SET finished = TRUE WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        tracing::info!("test session {session_id} finished early");
        Ok(())
    }

    pub async fn test_progress(&self, session_id: i64) -> Result<TestProgress> {
        let (difficulty, time_limit, right_answers, wrong_answers, finished): (
            String,
            bool,
            i64,
            i64,
            bool,
        ) = sqlx::query_as(
            r#"
            SELECT difficulty, time_limit, right_answers, wrong_answers, finished
            FROM test_sessions WHERE id = ?
            "#,
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;

        let (quantity, unanswered): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COUNT(*) - COUNT(is_correct)
            FROM test_session_questions
            WHERE session_id = ?
            "#,
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(TestProgress {
            quantity,
            right_answers,
            wrong_answers,
            remaining: if finished { 0 } else { unanswered },
            difficulty: Difficulty::from_code(&difficulty).unwrap_or(Difficulty::Newbie),
            time_limit,
        })
    }
}
