//! PostgreSQL Store
//!
//! Document-store access over sqlx: each user and conversation lives in a
//! single JSONB column, written back whole. Multi-document updates run in a
//! transaction with the affected rows locked (`SELECT ... FOR UPDATE`), so
//! the contact handshake cannot interleave with itself; user rows are locked
//! in sorted-username order to rule out deadlock between opposing handshakes.
//!
//! Every operation is wrapped in the configured timeout and surfaces expiry
//! as `Unavailable` instead of hanging. Idempotent reads are retried once on
//! transient I/O errors; nothing else is retried.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::{Conversation, UserRecord};
use crate::error::ApiError;
use crate::store::{
    ConversationStore, ConversationUpdate, CredentialStore, PairUpdate, StoreError,
};

pub struct PgStore {
    pool: PgPool,
    op_timeout: Duration,
}

impl PgStore {
    /// Connect, run migrations, and return a ready store.
    pub async fn connect(database_url: &str, op_timeout: Duration) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(op_timeout)
            .connect(database_url)
            .await?;

        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool, op_timeout })
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: std::future::Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout),
        }
    }

    async fn bounded_api<T, F>(&self, fut: F) -> Result<T, ApiError>
    where
        F: std::future::Future<Output = Result<T, ApiError>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout.into()),
        }
    }

    async fn fetch_user_doc(
        &self,
        username: &str,
    ) -> Result<Option<serde_json::Value>, sqlx::Error> {
        let row = sqlx::query("SELECT doc FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("doc")))
    }

    async fn fetch_conversation_doc(
        &self,
        id: Uuid,
    ) -> Result<Option<serde_json::Value>, sqlx::Error> {
        let row = sqlx::query("SELECT doc FROM conversations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("doc")))
    }

    async fn fetch_conversation_by_pair(
        &self,
        a: &str,
        b: &str,
    ) -> Result<Option<serde_json::Value>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT doc FROM conversations
            WHERE doc->'participants' @> jsonb_build_object($1::text, true)
              AND doc->'participants' @> jsonb_build_object($2::text, true)
            LIMIT 1
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.get("doc")))
    }
}

/// Errors worth a single retry on an idempotent read.
fn is_transient(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut)
}

fn db_err(err: sqlx::Error) -> ApiError {
    StoreError::from(err).into()
}

fn decode<T: serde::de::DeserializeOwned>(
    doc: Option<serde_json::Value>,
) -> Result<Option<T>, StoreError> {
    doc.map(serde_json::from_value).transpose().map_err(Into::into)
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn get(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        self.bounded(async {
            let doc = match self.fetch_user_doc(username).await {
                Ok(doc) => doc,
                Err(e) if is_transient(&e) => {
                    tracing::warn!("retrying user read after transient error: {}", e);
                    self.fetch_user_doc(username).await?
                }
                Err(e) => return Err(e.into()),
            };
            decode(doc)
        })
        .await
    }

    async fn create(&self, username: &str, record: &UserRecord) -> Result<bool, StoreError> {
        self.bounded(async {
            let doc = serde_json::to_value(record)?;
            let result = sqlx::query(
                "INSERT INTO users (username, doc) VALUES ($1, $2) \
                 ON CONFLICT (username) DO NOTHING",
            )
            .bind(username)
            .bind(doc)
            .execute(&self.pool)
            .await?;
            Ok(result.rows_affected() == 1)
        })
        .await
    }

    async fn update_pair(&self, a: &str, b: &str, apply: PairUpdate) -> Result<(), ApiError> {
        self.bounded_api(async {
            let mut tx = self.pool.begin().await.map_err(db_err)?;

            // Deterministic lock order; missing rows lock nothing, which is
            // acceptable for the lazily-created empty-profile case.
            let mut order = [a, b];
            order.sort_unstable();
            let mut docs: [Option<serde_json::Value>; 2] = [None, None];
            for (slot, name) in order.into_iter().enumerate() {
                let row = sqlx::query("SELECT doc FROM users WHERE username = $1 FOR UPDATE")
                    .bind(name)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(db_err)?;
                docs[slot] = row.map(|r| r.get("doc"));
            }
            let [first, second] = docs;
            let (doc_a, doc_b) = if order[0] == a {
                (first, second)
            } else {
                (second, first)
            };

            let mut record_a: Option<UserRecord> =
                decode(doc_a).map_err(ApiError::from)?;
            let mut record_b: Option<UserRecord> =
                decode(doc_b).map_err(ApiError::from)?;

            // A closure error drops the transaction, rolling everything back.
            apply(&mut record_a, &mut record_b)?;

            for (name, record) in [(a, record_a), (b, record_b)] {
                if let Some(record) = record {
                    let doc = serde_json::to_value(&record).map_err(ApiError::from)?;
                    sqlx::query(
                        "INSERT INTO users (username, doc) VALUES ($1, $2) \
                         ON CONFLICT (username) DO UPDATE \
                         SET doc = EXCLUDED.doc, updated_at = now()",
                    )
                    .bind(name)
                    .bind(doc)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_err)?;
                }
            }

            tx.commit().await.map_err(db_err)?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl ConversationStore for PgStore {
    async fn get(&self, id: Uuid) -> Result<Option<Conversation>, StoreError> {
        self.bounded(async {
            let doc = match self.fetch_conversation_doc(id).await {
                Ok(doc) => doc,
                Err(e) if is_transient(&e) => {
                    tracing::warn!("retrying conversation read after transient error: {}", e);
                    self.fetch_conversation_doc(id).await?
                }
                Err(e) => return Err(e.into()),
            };
            decode(doc)
        })
        .await
    }

    async fn find_by_participants(
        &self,
        a: &str,
        b: &str,
    ) -> Result<Option<Conversation>, StoreError> {
        self.bounded(async {
            let doc = match self.fetch_conversation_by_pair(a, b).await {
                Ok(doc) => doc,
                Err(e) if is_transient(&e) => {
                    tracing::warn!("retrying conversation lookup after transient error: {}", e);
                    self.fetch_conversation_by_pair(a, b).await?
                }
                Err(e) => return Err(e.into()),
            };
            decode(doc)
        })
        .await
    }

    async fn create(&self, conversation: &Conversation) -> Result<(), StoreError> {
        self.bounded(async {
            let doc = serde_json::to_value(conversation)?;
            sqlx::query("INSERT INTO conversations (id, doc) VALUES ($1, $2)")
                .bind(conversation.id)
                .bind(doc)
                .execute(&self.pool)
                .await?;
            Ok(())
        })
        .await
    }

    async fn update(&self, id: Uuid, apply: ConversationUpdate) -> Result<Conversation, ApiError> {
        self.bounded_api(async {
            let mut tx = self.pool.begin().await.map_err(db_err)?;

            let row = sqlx::query("SELECT doc FROM conversations WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?;
            let doc: serde_json::Value = row
                .ok_or_else(|| ApiError::not_found("conversation not found"))?
                .get("doc");
            let mut convo: Conversation = serde_json::from_value(doc).map_err(ApiError::from)?;

            apply(&mut convo)?;

            let doc = serde_json::to_value(&convo).map_err(ApiError::from)?;
            sqlx::query("UPDATE conversations SET doc = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(doc)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;

            tx.commit().await.map_err(db_err)?;
            Ok(convo)
        })
        .await
    }
}
