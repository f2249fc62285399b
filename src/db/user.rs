use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use color_eyre::Result;
use ulid::Ulid;

use super::models::{Activation, AuthUser, LeaderboardEntry, UserConflict, UserProfile};
use super::Db;
use crate::models::NewUser;

const AUTH_USER_COLUMNS: &str = "id, username, email, is_admin, show_test_info";

impl Db {
    /// Create an active user that can log in right away.
    pub async fn create_user(&self, user: &NewUser, is_admin: bool) -> Result<i64> {
        let password_hash = hash_password(&user.password)?;
        let mut tx = self.pool.begin().await?;

        let user_id: i64 = sqlx::query_scalar(
            r#"INSERT INTO users (username, email, password_hash, first_name, last_name, is_active, is_admin)
               VALUES (?, ?, ?, ?, ?, TRUE, ?)
               RETURNING id"#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(is_admin)
        .fetch_one(&mut *tx)
        .await
        .map_err(user_conflict)?;

        sqlx::query("INSERT INTO user_logs (user_id) VALUES (?)")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "new user created: id={user_id}, username={}, admin={is_admin}",
            user.username
        );
        Ok(user_id)
    }

    /// Create an inactive user with a fresh activation key.
    /// Returns (user_id, activation_key).
    pub async fn create_unverified_user(&self, user: &NewUser) -> Result<(i64, String)> {
        let password_hash = hash_password(&user.password)?;
        let key = Ulid::new().to_string();
        let mut tx = self.pool.begin().await?;

        let user_id: i64 = sqlx::query_scalar(
            r#"INSERT INTO users (username, email, password_hash, first_name, last_name,
                                  is_active, activation_key, activation_key_created_at)
               VALUES (?, ?, ?, ?, ?, FALSE, ?, datetime('now'))
               RETURNING id"#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&key)
        .fetch_one(&mut *tx)
        .await
        .map_err(user_conflict)?;

        sqlx::query("INSERT INTO user_logs (user_id) VALUES (?)")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "new unverified user created: id={user_id}, username={}",
            user.username
        );
        Ok((user_id, key))
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>> {
        let user = sqlx::query_as::<_, AuthUser>(&format!(
            "SELECT {AUTH_USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        let stored_hash: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        match stored_hash {
            Some(hash) => Ok(verify_password(password, &hash)),
            None => Ok(false),
        }
    }

    pub async fn is_user_active(&self, username: &str) -> Result<bool> {
        let active: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        Ok(active.unwrap_or(false))
    }

    /// Check an activation link. Keys expire 48 hours after registration.
    pub async fn activate_user(&self, email: &str, key: &str) -> Result<Activation> {
        let row: Option<(i64, Option<String>, Option<bool>)> = sqlx::query_as(
            r#"SELECT id, activation_key,
                      activation_key_created_at > datetime('now', '-48 hours')
               FROM users WHERE email = ?"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some((user_id, stored_key, fresh)) = row else {
            return Ok(Activation::Invalid);
        };
        let Some(stored_key) = stored_key.filter(|k| !k.is_empty()) else {
            return Ok(Activation::Invalid);
        };
        if !fresh.unwrap_or(false) {
            tracing::warn!("expired activation key for user_id={user_id}");
            return Ok(Activation::Expired);
        }
        if stored_key != key {
            tracing::warn!("activation key mismatch for user_id={user_id}");
            return Ok(Activation::Invalid);
        }

        sqlx::query(
            r#"UPDATE users
               SET is_active = TRUE, activation_key = NULL, activation_key_created_at = NULL
               WHERE id = ?"#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        tracing::info!("user activated: id={user_id}");
        Ok(Activation::Activated(user_id))
    }

    pub async fn create_user_session(&self, user_id: i64) -> Result<String> {
        let session = Ulid::new().to_string();

        sqlx::query("INSERT INTO user_sessions (id, user_id) VALUES (?, ?)")
            .bind(&session)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        tracing::info!("new user session created for user_id={user_id}");
        Ok(session)
    }

    pub async fn get_user_by_session(&self, session_id: &str) -> Result<Option<AuthUser>> {
        let user = sqlx::query_as::<_, AuthUser>(
            r#"
            SELECT u.id, u.username, u.email, u.is_admin, u.show_test_info
            FROM user_sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.id = ? AND u.is_active = TRUE
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn delete_user_session(&self, session_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM user_sessions WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn find_username(&self, user_id: i64) -> Result<Option<String>> {
        let username: Option<String> = sqlx::query_scalar("SELECT username FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(username)
    }

    pub async fn get_profile(&self, user_id: i64) -> Result<UserProfile> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT id, username, email, first_name, last_name, score, is_active FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn user_score(&self, user_id: i64) -> Result<i64> {
        let score: i64 = sqlx::query_scalar("SELECT score FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(score)
    }

    /// Position in the leaderboard: how many users have a score at least as
    /// high as this user's.
    pub async fn user_rank(&self, user_id: i64) -> Result<i64> {
        let rank: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE score >= (SELECT score FROM users WHERE id = ?)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(rank)
    }

    pub async fn top_users(&self, limit: i64) -> Result<Vec<LeaderboardEntry>> {
        let users = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT id, username, first_name, score
            FROM users
            WHERE is_active = TRUE AND score > 0
            ORDER BY score DESC, username ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn update_user_names(
        &self,
        user_id: i64,
        first_name: &str,
        last_name: &str,
    ) -> Result<()> {
        sqlx::query("UPDATE users SET first_name = ?, last_name = ? WHERE id = ?")
            .bind(first_name)
            .bind(last_name)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        tracing::info!("profile updated for user_id={user_id}");
        Ok(())
    }

    /// Create a password reset token for an active user. Returns None if the
    /// email is unknown or the account was never activated.
    pub async fn create_password_reset_token(&self, email: &str) -> Result<Option<String>> {
        let token = Ulid::new().to_string();
        let affected = sqlx::query(
            r#"UPDATE users
               SET password_reset_token = ?, password_reset_expires_at = datetime('now', '+1 hour')
               WHERE email = ? AND is_active = TRUE"#,
        )
        .bind(&token)
        .bind(email)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected > 0 {
            Ok(Some(token))
        } else {
            Ok(None)
        }
    }

    /// Validate a password reset token. Returns the user's email if valid and not expired.
    pub async fn validate_password_reset_token(&self, token: &str) -> Result<Option<String>> {
        let email: Option<String> = sqlx::query_scalar(
            r#"SELECT email FROM users
               WHERE password_reset_token = ?
               AND password_reset_expires_at > datetime('now')"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(email)
    }

    /// Reset a user's password using a valid token and end all of their
    /// login sessions. Returns true if successful.
    pub async fn reset_password_with_token(&self, token: &str, new_password: &str) -> Result<bool> {
        let password_hash = hash_password(new_password)?;
        let mut tx = self.pool.begin().await?;

        let user_id: Option<i64> = sqlx::query_scalar(
            r#"UPDATE users
               SET password_hash = ?, password_reset_token = NULL, password_reset_expires_at = NULL
               WHERE password_reset_token = ?
               AND password_reset_expires_at > datetime('now')
               RETURNING id"#,
        )
        .bind(&password_hash)
        .bind(token)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user_id) = user_id else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM user_sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("password reset for user_id={user_id}");
        Ok(true)
    }

    /// Stop showing the test procedure box on category pages.
    pub async fn dismiss_test_info(&self, user_id: i64) -> Result<()> {
        sqlx::query("UPDATE users SET show_test_info = FALSE WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Turn a UNIQUE violation on `users` into a [`UserConflict`].
fn user_conflict(err: sqlx::Error) -> color_eyre::Report {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            if message.contains("users.username") {
                return UserConflict::Username.into();
            }
            if message.contains("users.email") {
                return UserConflict::Email.into();
            }
        }
    }
    err.into()
}

/// Run argon2 hashing on a dedicated thread with a large stack to avoid
/// stack overflow in debug builds.
fn hash_password(password: &str) -> Result<String> {
    let password = password.to_string();
    std::thread::Builder::new()
        .stack_size(4 * 1024 * 1024) // 4 MB stack
        .spawn(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|h| h.to_string())
                .map_err(|e| color_eyre::eyre::eyre!("failed to hash password: {e}"))
        })?
        .join()
        .map_err(|_| color_eyre::eyre::eyre!("hash thread panicked"))?
}

fn verify_password(password: &str, hash: &str) -> bool {
    let password = password.to_string();
    let hash = hash.to_string();
    std::thread::Builder::new()
        .stack_size(4 * 1024 * 1024)
        .spawn(move || {
            let Ok(parsed_hash) = PasswordHash::new(&hash) else {
                return false;
            };
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok()
        })
        .map(|h| h.join().unwrap_or(false))
        .unwrap_or(false)
}
