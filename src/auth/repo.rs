use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::auth::repo_types::{NewUser, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("a user with this email already exists")]
    Duplicate,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Access to the `users` table.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: &NewUser) -> Result<(), StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

/// Postgres-backed store. Every call checks a connection out of the pool
/// and returns it when the guard drops, whichever way the call exits.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: &NewUser) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, password)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .execute(&mut *conn)
        .await;

        match result {
            Ok(done) => {
                debug!(rows = done.rows_affected(), "user inserted");
                Ok(())
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(StoreError::Duplicate),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT name, email, password
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(user)
    }
}


/// Run with `DATABASE_URL` pointing at a Postgres server and
/// `cargo test -- --ignored`; each test gets a fresh migrated database.
#[cfg(test)]
mod pg_tests {
    use std::time::Duration;

    use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

    use super::*;

    fn ann(password: &str) -> NewUser {
        NewUser {
            name: "Ann".into(),
            email: "ann@x.com".into(),
            password: password.into(),
        }
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn insert_then_find_by_email(pool: PgPool) {
        let store = PgUserStore::new(pool);
        store.insert(&ann("hash")).await.expect("insert");

        let user = store
            .find_by_email("ann@x.com")
            .await
            .expect("select")
            .expect("row");
        assert_eq!(user.name, "Ann");
        assert_eq!(user.password, "hash");
        assert!(store.find_by_email("bob@x.com").await.expect("select").is_none());
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn duplicate_email_maps_to_duplicate(pool: PgPool) {
        let store = PgUserStore::new(pool.clone());
        store.insert(&ann("first")).await.expect("first insert");

        let err = store.insert(&ann("second")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));

        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM users")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(count, 1);
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn connection_goes_back_to_pool_after_failed_insert(
        pool_opts: PgPoolOptions,
        connect_opts: PgConnectOptions,
    ) {
        let pool = pool_opts
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(2))
            .connect_with(connect_opts)
            .await
            .expect("pool");
        let store = PgUserStore::new(pool);

        store.insert(&ann("first")).await.expect("first insert");
        for _ in 0..3 {
            assert!(matches!(
                store.insert(&ann("again")).await,
                Err(StoreError::Duplicate)
            ));
        }
        // A leaked connection would make this acquire time out.
        assert!(store.find_by_email("ann@x.com").await.expect("select").is_some());
    }
}
