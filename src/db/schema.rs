//! SQL DDL for initializing the database schema.

/// SQLite schema:
/// - `exchanges` table, one row per question/answer pair, append-only
/// - listing index matching the `(created_at DESC, id DESC)` page order
/// - per-user filter index
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS exchanges (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    question TEXT NOT NULL CHECK (length(trim(question)) > 0),
    answer TEXT NOT NULL,
    user_id TEXT NULL,
    success INTEGER NOT NULL DEFAULT 1,
    response_time_ms INTEGER NULL,
    metadata TEXT NULL, -- JSON
    created_at TEXT NOT NULL -- RFC3339, UTC
);

CREATE INDEX IF NOT EXISTS idx_exchanges_created_at ON exchanges(created_at DESC, id DESC);

CREATE INDEX IF NOT EXISTS idx_exchanges_user_id ON exchanges(user_id);
"#;
