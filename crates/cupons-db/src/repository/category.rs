//! # Category Repository
//!
//! Categories are reference data: listed for the sign-up and coupon forms,
//! inserted by the seed binary.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::rows::CategoryRow;
use cupons_core::Category;

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// All categories, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id_categoria, nom_categoria FROM categoria ORDER BY nom_categoria",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id_categoria, nom_categoria FROM categoria WHERE id_categoria = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Category::from))
    }

    /// Inserts `name` unless a category with that name exists, returning
    /// the stored category either way.
    pub async fn insert_if_missing(&self, name: &str) -> DbResult<Category> {
        debug!(name = %name, "Ensuring category");

        sqlx::query("INSERT OR IGNORE INTO categoria (nom_categoria) VALUES (?1)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        sqlx::query_as::<_, CategoryRow>(
            "SELECT id_categoria, nom_categoria FROM categoria WHERE nom_categoria = ?1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .map(Category::from)
        .ok_or_else(|| DbError::not_found("Category", name))
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categoria")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::fixtures;

    #[tokio::test]
    async fn test_list_is_ordered_by_name() {
        let db = fixtures::db().await;
        let repo = db.categories();

        repo.insert_if_missing("Saúde").await.unwrap();
        repo.insert_if_missing("Alimentação").await.unwrap();
        repo.insert_if_missing("Moda").await.unwrap();

        let names: Vec<_> = repo.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, ["Alimentação", "Moda", "Saúde"]);
    }

    #[tokio::test]
    async fn test_insert_if_missing_is_idempotent() {
        let db = fixtures::db().await;
        let repo = db.categories();

        let first = repo.insert_if_missing("Lazer").await.unwrap();
        let second = repo.insert_if_missing("Lazer").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(repo.get(first.id).await.unwrap(), Some(first));
        assert_eq!(repo.get(9999).await.unwrap(), None);
    }
}
