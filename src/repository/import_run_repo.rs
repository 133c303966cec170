// ==========================================
// PF 缴存记录系统 - 导入运行台账仓储
// ==========================================
// 对齐: import_run 表
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::report::{ErrorPolicy, ImportRun, ImportStats};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const IMPORT_RUN_COLUMNS: &str = "run_id, policy, sources_processed, sources_skipped, stats_json, \
     overall_success, messages_json, elapsed_ms, finished_at";

/// 写入一条运行台账（供导入仓储复用同一连接）
pub(crate) fn insert_import_run_tx(conn: &Connection, run: &ImportRun) -> RepositoryResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO import_run ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            IMPORT_RUN_COLUMNS
        ),
        params![
            run.run_id,
            run.policy.as_str(),
            serde_json::to_string(&run.sources_processed)?,
            serde_json::to_string(&run.sources_skipped)?,
            serde_json::to_string(&run.stats)?,
            run.overall_success as i32,
            serde_json::to_string(&run.messages)?,
            run.elapsed_ms as i64,
            run.finished_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn json_column<T: serde::de::DeserializeOwned>(row: &Row, idx: usize) -> SqliteResult<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn map_import_run_row(row: &Row) -> SqliteResult<ImportRun> {
    let finished_at: String = row.get(8)?;
    let finished_at = DateTime::parse_from_rfc3339(&finished_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?;

    Ok(ImportRun {
        run_id: row.get(0)?,
        policy: ErrorPolicy::from_str(&row.get::<_, String>(1)?),
        sources_processed: json_column(row, 2)?,
        sources_skipped: json_column(row, 3)?,
        stats: json_column::<ImportStats>(row, 4)?,
        overall_success: row.get::<_, i32>(5)? != 0,
        messages: json_column(row, 6)?,
        elapsed_ms: row.get::<_, i64>(7)?.max(0) as u64,
        finished_at,
    })
}

// ==========================================
// ImportRunRepository
// ==========================================
pub struct ImportRunRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ImportRunRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, run: &ImportRun) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_import_run_tx(&conn, run)
    }

    pub fn find_by_id(&self, run_id: &str) -> RepositoryResult<Option<ImportRun>> {
        let conn = self.get_conn()?;
        let run = conn
            .query_row(
                &format!("SELECT {} FROM import_run WHERE run_id = ?1", IMPORT_RUN_COLUMNS),
                params![run_id],
                map_import_run_row,
            )
            .optional()?;
        Ok(run)
    }

    /// 最近的运行记录（按完成时间倒序）
    pub fn find_recent(&self, limit: u32) -> RepositoryResult<Vec<ImportRun>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM import_run ORDER BY finished_at DESC LIMIT ?1",
            IMPORT_RUN_COLUMNS
        ))?;

        let runs = stmt
            .query_map(params![limit], map_import_run_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(runs)
    }
}
