use crate::db::MAX_PAGE_SIZE;
use crate::db::models::{DbExchange, ExchangeCreate, HistoryPage, HistoryStats};
use crate::db::schema::SQLITE_INIT;
use crate::error::VisadeskError;
use chrono::{DateTime, Utc};
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::types::Json;
use std::{str::FromStr, time::Duration};
use tracing::{debug, info};

const EXCHANGE_COLUMNS: &str =
    "id, question, answer, user_id, success, response_time_ms, metadata, created_at";

#[derive(Debug)]
pub enum DbActorMessage {
    /// Insert one exchange and return the stored row.
    Append(ExchangeCreate, RpcReplyPort<Result<DbExchange, VisadeskError>>),

    /// Newest-first window, optionally filtered by user: (user_id, offset, limit).
    List(
        Option<String>,
        u64,
        u32,
        RpcReplyPort<Result<Vec<DbExchange>, VisadeskError>>,
    ),

    /// Row count, optionally filtered by user.
    Count(Option<String>, RpcReplyPort<Result<i64, VisadeskError>>),

    /// Window and total count read together, so both reflect the same set of rows.
    Page(
        Option<String>,
        u64,
        u32,
        RpcReplyPort<Result<HistoryPage, VisadeskError>>,
    ),

    /// Aggregates over the whole table.
    Stats(RpcReplyPort<Result<HistoryStats, VisadeskError>>),

    /// Single exchange by id.
    GetById(i64, RpcReplyPort<Result<Option<DbExchange>, VisadeskError>>),
}

/// Cloneable handle to the history store actor.
#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

impl DbActorHandle {
    pub async fn append(&self, create: ExchangeCreate) -> Result<DbExchange, VisadeskError> {
        ractor::call!(self.actor, DbActorMessage::Append, create)
            .map_err(|e| VisadeskError::RactorError(format!("DbActor Append RPC failed: {e}")))?
    }

    /// Newest first. `limit` is clamped to `1..=MAX_PAGE_SIZE`; an offset past
    /// the end yields an empty vector.
    pub async fn list(&self, offset: u64, limit: u32) -> Result<Vec<DbExchange>, VisadeskError> {
        ractor::call!(self.actor, DbActorMessage::List, None, offset, limit)
            .map_err(|e| VisadeskError::RactorError(format!("DbActor List RPC failed: {e}")))?
    }

    pub async fn list_by_user(
        &self,
        user_id: &str,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<DbExchange>, VisadeskError> {
        ractor::call!(
            self.actor,
            DbActorMessage::List,
            Some(user_id.to_string()),
            offset,
            limit
        )
        .map_err(|e| VisadeskError::RactorError(format!("DbActor List RPC failed: {e}")))?
    }

    pub async fn count(&self) -> Result<i64, VisadeskError> {
        ractor::call!(self.actor, DbActorMessage::Count, None)
            .map_err(|e| VisadeskError::RactorError(format!("DbActor Count RPC failed: {e}")))?
    }

    pub async fn count_by_user(&self, user_id: &str) -> Result<i64, VisadeskError> {
        ractor::call!(self.actor, DbActorMessage::Count, Some(user_id.to_string()))
            .map_err(|e| VisadeskError::RactorError(format!("DbActor Count RPC failed: {e}")))?
    }

    pub async fn page(
        &self,
        user_id: Option<String>,
        offset: u64,
        limit: u32,
    ) -> Result<HistoryPage, VisadeskError> {
        ractor::call!(self.actor, DbActorMessage::Page, user_id, offset, limit)
            .map_err(|e| VisadeskError::RactorError(format!("DbActor Page RPC failed: {e}")))?
    }

    pub async fn stats(&self) -> Result<HistoryStats, VisadeskError> {
        ractor::call!(self.actor, DbActorMessage::Stats)
            .map_err(|e| VisadeskError::RactorError(format!("DbActor Stats RPC failed: {e}")))?
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<DbExchange>, VisadeskError> {
        ractor::call!(self.actor, DbActorMessage::GetById, id)
            .map_err(|e| VisadeskError::RactorError(format!("DbActor GetById RPC failed: {e}")))?
    }

    /// Stops the actor and closes the pool.
    /// Later calls on any clone fail with a persistence error.
    pub async fn shutdown(&self) -> Result<(), VisadeskError> {
        self.actor
            .stop_and_wait(None, Some(Duration::from_secs(5)))
            .await
            .map_err(|e| VisadeskError::RactorError(format!("DbActor stop failed: {e}")))
    }
}

struct DbActorState {
    pool: SqlitePool,
    /// `created_at` of the newest row; new rows never get an earlier timestamp.
    last_created_at: Option<DateTime<Utc>>,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        // All access is serialized by this actor; one long-lived connection also
        // keeps `sqlite::memory:` databases alive for the life of the pool.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        let last_created_at: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT created_at FROM exchanges ORDER BY id DESC LIMIT 1")
                .fetch_optional(&pool)
                .await
                .map_err(|e| ActorProcessingErr::from(format!("db bootstrap failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState {
            pool,
            last_created_at,
        })
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        state.pool.close().await;
        info!("DbActor stopped");
        Ok(())
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DbActorMessage::Append(create, reply) => {
                let res = self.append(state, create).await;
                let _ = reply.send(res);
            }
            DbActorMessage::List(user_id, offset, limit, reply) => {
                let res = self
                    .list(&state.pool, user_id.as_deref(), offset, limit)
                    .await;
                let _ = reply.send(res);
            }
            DbActorMessage::Count(user_id, reply) => {
                let res = self.count(&state.pool, user_id.as_deref()).await;
                let _ = reply.send(res);
            }
            DbActorMessage::Page(user_id, offset, limit, reply) => {
                let res = self
                    .page(&state.pool, user_id.as_deref(), offset, limit)
                    .await;
                let _ = reply.send(res);
            }
            DbActorMessage::Stats(reply) => {
                let res = self.stats(&state.pool).await;
                let _ = reply.send(res);
            }
            DbActorMessage::GetById(id, reply) => {
                let res = self.get_by_id(&state.pool, id).await;
                let _ = reply.send(res);
            }
        }
        Ok(())
    }
}

impl DbActor {
    async fn append(
        &self,
        state: &mut DbActorState,
        create: ExchangeCreate,
    ) -> Result<DbExchange, VisadeskError> {
        let created_at = clamp_created_at(state.last_created_at, Utc::now());

        let sql = format!(
            r#"
        INSERT INTO exchanges (
            question, answer, user_id, success, response_time_ms, metadata, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING {EXCHANGE_COLUMNS}
        "#
        );
        let row = sqlx::query_as::<_, DbExchange>(&sql)
            .bind(create.question)
            .bind(create.answer)
            .bind(create.user_id)
            .bind(create.success)
            .bind(create.response_time_ms)
            .bind(create.metadata.map(Json))
            .bind(created_at)
            .fetch_one(&state.pool)
            .await?;

        state.last_created_at = Some(row.created_at);
        debug!(id = row.id, success = row.success, "Exchange appended");
        Ok(row)
    }

    async fn list(
        &self,
        pool: &SqlitePool,
        user_id: Option<&str>,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<DbExchange>, VisadeskError> {
        let limit = i64::from(limit.clamp(1, MAX_PAGE_SIZE));
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);

        let rows = match user_id {
            Some(user_id) => {
                let sql = format!(
                    r#"
                SELECT {EXCHANGE_COLUMNS}
                FROM exchanges
                WHERE user_id = ?
                ORDER BY created_at DESC, id DESC
                LIMIT ? OFFSET ?
                "#
                );
                sqlx::query_as::<_, DbExchange>(&sql)
                    .bind(user_id)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await?
            }
            None => {
                let sql = format!(
                    r#"
                SELECT {EXCHANGE_COLUMNS}
                FROM exchanges
                ORDER BY created_at DESC, id DESC
                LIMIT ? OFFSET ?
                "#
                );
                sqlx::query_as::<_, DbExchange>(&sql)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await?
            }
        };

        Ok(rows)
    }

    async fn count(&self, pool: &SqlitePool, user_id: Option<&str>) -> Result<i64, VisadeskError> {
        let count: i64 = match user_id {
            Some(user_id) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM exchanges WHERE user_id = ?")
                    .bind(user_id)
                    .fetch_one(pool)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM exchanges")
                    .fetch_one(pool)
                    .await?
            }
        };
        Ok(count)
    }

    async fn page(
        &self,
        pool: &SqlitePool,
        user_id: Option<&str>,
        offset: u64,
        limit: u32,
    ) -> Result<HistoryPage, VisadeskError> {
        let total_count = self.count(pool, user_id).await?;
        let exchanges = self.list(pool, user_id, offset, limit).await?;
        Ok(HistoryPage {
            exchanges,
            total_count,
        })
    }

    async fn stats(&self, pool: &SqlitePool) -> Result<HistoryStats, VisadeskError> {
        let stats = sqlx::query_as::<_, HistoryStats>(
            r#"
        SELECT
            COUNT(*) AS total_exchanges,
            COALESCE(SUM(CASE WHEN success = 0 THEN 1 ELSE 0 END), 0) AS failed_exchanges,
            AVG(LENGTH(answer)) AS avg_answer_chars,
            AVG(response_time_ms) AS avg_response_time_ms,
            MIN(created_at) AS earliest_at,
            MAX(created_at) AS latest_at
        FROM exchanges
        "#,
        )
        .fetch_one(pool)
        .await?;

        Ok(stats)
    }

    async fn get_by_id(
        &self,
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<DbExchange>, VisadeskError> {
        let sql = format!("SELECT {EXCHANGE_COLUMNS} FROM exchanges WHERE id = ?");
        let row = sqlx::query_as::<_, DbExchange>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row)
    }
}

/// Never hand out a timestamp earlier than the newest stored row.
fn clamp_created_at(last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match last {
        Some(last) if last > now => last,
        _ => now,
    }
}

/// Spawn the history store actor and return a cloneable handle.
///
/// The actor is unnamed, so several stores may live in one process.
pub async fn spawn(database_url: &str) -> Result<DbActorHandle, VisadeskError> {
    let (actor, _jh) = ractor::Actor::spawn(None, DbActor, database_url.to_string())
        .await
        .map_err(|e| VisadeskError::RactorError(format!("failed to spawn DbActor: {e}")))?;

    Ok(DbActorHandle { actor })
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), VisadeskError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
