use color_eyre::Result;

use super::models::UserLog;
use super::Db;

impl Db {
    pub async fn user_log(&self, user_id: i64) -> Result<UserLog> {
        let log = sqlx::query_as::<_, UserLog>(
            "SELECT question_count, right_answers, wrong_answers, last_login FROM user_logs WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(log.unwrap_or_default())
    }

    /// Stamp the login time, creating the log row for users that predate it.
    pub async fn record_login(&self, user_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_logs (user_id, last_login) VALUES (?, datetime('now'))
            ON CONFLICT(user_id) DO UPDATE SET last_login = excluded.last_login
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        tracing::debug!("login recorded for user_id={user_id}");
        Ok(())
    }
}

/// Count one scored answer in the user's statistics.
pub(super) async fn record_answer(
    conn: &mut sqlx::SqliteConnection,
    user_id: i64,
    is_correct: bool,
) -> Result<()> {
    let (right, wrong) = if is_correct { (1, 0) } else { (0, 1) };

    sqlx::query(
        r#"
        INSERT INTO user_logs (user_id, question_count, right_answers, wrong_answers)
        VALUES (?, 1, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            question_count = question_count + 1,
            right_answers = right_answers + excluded.right_answers,
            wrong_answers = wrong_answers + excluded.wrong_answers
        "#,
    )
    .bind(user_id)
    .bind(right)
    .bind(wrong)
    .execute(conn)
    .await?;

    Ok(())
}
