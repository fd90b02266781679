use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

/// One row of the `usuarios` table. The stored bcrypt hash never reaches a
/// response body: serde skips it entirely.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Usuario {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub rol: Option<String>,
    pub lenguage: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Usuario {
    /// Find a user by email, bounding the round-trip with the store timeout.
    pub async fn find_by_email(
        db: &PgPool,
        email: &str,
        timeout: Duration,
    ) -> Result<Option<Usuario>, ApiError> {
        let query = sqlx::query_as::<_, Usuario>(
            r#"
            SELECT id, email, password_hash, rol, lenguage, created_at
            FROM usuarios
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db);
        match tokio::time::timeout(timeout, query).await {
            Ok(row) => Ok(row?),
            Err(_) => Err(ApiError::StoreUnavailable),
        }
    }

    /// Insert a new user. A unique-constraint violation on `email` maps to
    /// `AlreadyExists`, which is how a lost registration race surfaces.
    pub async fn create(
        db: &PgPool,
        email: &str,
        password_hash: &str,
        rol: Option<&str>,
        lenguage: Option<&str>,
        timeout: Duration,
    ) -> Result<Usuario, ApiError> {
        let query = sqlx::query_as::<_, Usuario>(
            r#"
            INSERT INTO usuarios (email, password_hash, rol, lenguage)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, rol, lenguage, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(rol)
        .bind(lenguage)
        .fetch_one(db);
        match tokio::time::timeout(timeout, query).await {
            Ok(row) => Ok(row?),
            Err(_) => Err(ApiError::StoreUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let user = Usuario {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            password_hash: "$2b$10$abcdefghijklmnopqrstuv".into(),
            rol: Some("dev".into()),
            lenguage: Some("en".into()),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).expect("serialize");
        assert!(!json.contains("password"));
        assert!(!json.contains("$2b$"));
        assert!(json.contains("a@x.com"));
        assert!(json.contains("dev"));
    }
}
