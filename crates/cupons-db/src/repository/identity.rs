//! # Identity Repository
//!
//! Login credentials (`auth_users`). One identity per merchant or resident,
//! keyed by the synthetic email derived from the account's document.
//!
//! Only password hashes are stored; hashing happens in the API.

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;

/// A stored login identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Free-form profile hints written at sign-up (`tipo`, `nome`, ...).
    pub metadata: serde_json::Value,
    pub created_at: String,
}

#[derive(Debug, FromRow)]
struct IdentityRow {
    id: String,
    email: String,
    password_hash: String,
    metadata: String,
    created_at: String,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = serde_json::Error;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        Ok(Identity {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            metadata: serde_json::from_str(&row.metadata)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct IdentityRepository {
    pool: SqlitePool,
}

impl IdentityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        IdentityRepository { pool }
    }

    /// Creates an identity with a fresh id.
    ///
    /// Fails with `UniqueViolation` when `email` is taken.
    pub async fn insert(
        &self,
        email: &str,
        password_hash: &str,
        metadata: &serde_json::Value,
    ) -> DbResult<Identity> {
        let id = Uuid::new_v4().to_string();

        debug!(id = %id, email = %email, "Creating identity");

        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            INSERT INTO auth_users (id, email, password_hash, metadata)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, email, password_hash, metadata, created_at
            "#,
        )
        .bind(&id)
        .bind(email)
        .bind(password_hash)
        .bind(metadata.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(Identity::try_from(row)?)
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(
            "SELECT id, email, password_hash, metadata, created_at FROM auth_users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Identity::try_from).transpose()?)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(
            "SELECT id, email, password_hash, metadata, created_at FROM auth_users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Identity::try_from).transpose()?)
    }

    /// Deletes an identity. Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting identity");

        let result = sqlx::query("DELETE FROM auth_users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::repository::fixtures;
    use crate::DbError;

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = fixtures::db().await;
        let repo = db.identities();

        let metadata = json!({ "tipo": "morador", "nome": "Maria" });
        let identity = repo
            .insert("user11144477735@cupons.app", "$argon2id$...", &metadata)
            .await
            .unwrap();

        let found = repo
            .get_by_email("user11144477735@cupons.app")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, identity);
        assert_eq!(found.metadata["tipo"], "morador");
        assert!(!found.created_at.is_empty());

        assert_eq!(repo.get(&identity.id).await.unwrap(), Some(identity));
        assert_eq!(repo.get_by_email("nobody@cupons.app").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let db = fixtures::db().await;
        let repo = db.identities();

        repo.insert("a@cupons.app", "h", &json!({})).await.unwrap();
        let err = repo.insert("a@cupons.app", "h", &json!({})).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "auth_users.email"));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = fixtures::db().await;
        let repo = db.identities();

        let identity = repo.insert("a@cupons.app", "h", &json!({})).await.unwrap();
        assert!(repo.delete(&identity.id).await.unwrap());
        assert!(!repo.delete(&identity.id).await.unwrap());
        assert_eq!(repo.get(&identity.id).await.unwrap(), None);
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let identity = super::Identity {
            id: "1".into(),
            email: "a@cupons.app".into(),
            password_hash: "secret".into(),
            metadata: json!({}),
            created_at: "2024-01-01T00:00:00Z".into(),
        };
        let value = serde_json::to_value(&identity).unwrap();
        assert!(value.get("password_hash").is_none());
    }
}
