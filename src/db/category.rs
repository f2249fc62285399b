use color_eyre::Result;

use super::models::Category;
use super::Db;

impl Db {
    pub async fn create_category(&self, name: &str, description: &str) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO categories (name, description) VALUES (?, ?) RETURNING id",
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("category created: id={id}, name={name}");
        Ok(id)
    }

    pub async fn available_categories(&self) -> Result<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, available FROM categories WHERE available = TRUE ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn all_categories(&self) -> Result<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, available FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn get_category(&self, category_id: i64) -> Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, available FROM categories WHERE id = ?",
        )
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    /// Flip a category's availability and carry the new value over to all
    /// of its questions and posts. Returns the new availability, or `None`
    /// when the category does not exist.
    pub async fn toggle_category(&self, category_id: i64) -> Result<Option<bool>> {
        let mut tx = self.pool.begin().await?;

        let available: Option<bool> = sqlx::query_scalar(
            "UPDATE categories SET available = NOT available WHERE id = ? RETURNING available",
        )
        .bind(category_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(available) = available else {
            return Ok(None);
        };

        sqlx::query("UPDATE questions SET available = ? WHERE category_id = ?")
            .bind(available)
            .bind(category_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE posts SET available = ? WHERE category_id = ?")
            .bind(available)
            .bind(category_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("category {category_id} availability set to {available}");
        Ok(Some(available))
    }
}
