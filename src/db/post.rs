use color_eyre::Result;

use super::models::{PostRow, PostSummary};
use super::Db;
use crate::models::NewPost;

impl Db {
    pub async fn create_post(&self, author_id: i64, post: &NewPost, available: bool) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"INSERT INTO posts (title, author_id, category_id, body, tag, available)
               VALUES (?, ?, ?, ?, ?, ?)
               RETURNING id"#,
        )
        .bind(&post.title)
        .bind(author_id)
        .bind(post.category_id)
        .bind(&post.body)
        .bind(&post.tag)
        .bind(available)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            "post created: id={id}, category={}, author={author_id}, available={available}",
            post.category_id
        );
        Ok(id)
    }

    pub async fn get_post(&self, post_id: i64) -> Result<Option<PostRow>> {
        let post = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT p.id, p.title, p.author_id, u.username AS author,
                   p.category_id, c.name AS category,
                   p.body, p.tag, p.available, p.created_at
            FROM posts p
            JOIN users u ON u.id = p.author_id
            JOIN categories c ON c.id = p.category_id
            WHERE p.id = ?
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    pub async fn posts_by_category(&self, category_id: i64) -> Result<Vec<PostSummary>> {
        let posts = sqlx::query_as::<_, PostSummary>(
            "SELECT id, title, tag FROM posts WHERE category_id = ? AND available = TRUE ORDER BY id DESC",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    pub async fn posts_by_tag(&self, tag: &str) -> Result<Vec<PostSummary>> {
        let posts = sqlx::query_as::<_, PostSummary>(
            "SELECT id, title, tag FROM posts WHERE tag = ? AND available = TRUE ORDER BY id DESC",
        )
        .bind(tag)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    pub async fn posts_by_author(&self, author_id: i64) -> Result<Vec<PostSummary>> {
        let posts = sqlx::query_as::<_, PostSummary>(
            "SELECT id, title, tag FROM posts WHERE author_id = ? AND available = TRUE ORDER BY id DESC",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    /// Published posts whose title or tag contains `query`, ignoring case.
    pub async fn search_posts(&self, query: &str) -> Result<Vec<PostSummary>> {
        let pattern = format!("%{}%", escape_like(query.trim()));
        let posts = sqlx::query_as::<_, PostSummary>(
            r#"
            SELECT id, title, tag FROM posts
            WHERE available = TRUE
              AND (title LIKE ? ESCAPE '\' OR tag LIKE ? ESCAPE '\')
            ORDER BY id DESC
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    /// Published posts sharing a question's tag, shown next to an answer.
    pub async fn related_posts(&self, tag: &str, limit: i64) -> Result<Vec<PostSummary>> {
        let posts = sqlx::query_as::<_, PostSummary>(
            "SELECT id, title, tag FROM posts WHERE tag = ? AND available = TRUE ORDER BY id LIMIT ?",
        )
        .bind(tag)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    pub async fn pending_posts(&self) -> Result<Vec<PostRow>> {
        let posts = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT p.id, p.title, p.author_id, u.username AS author,
                   p.category_id, c.name AS category,
                   p.body, p.tag, p.available, p.created_at
            FROM posts p
            JOIN users u ON u.id = p.author_id
            JOIN categories c ON c.id = p.category_id
            WHERE p.available = FALSE
            ORDER BY p.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    pub async fn toggle_post(&self, post_id: i64) -> Result<Option<bool>> {
        let available: Option<bool> = sqlx::query_scalar(
            "UPDATE posts SET available = NOT available WHERE id = ? RETURNING available",
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(available) = available {
            tracing::info!("post {post_id} availability set to {available}");
        }
        Ok(available)
    }
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("rust"), "rust");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }
}
