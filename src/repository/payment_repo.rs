// ==========================================
// PF 缴存记录系统 - 缴存数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::payment::PfPayment;
use crate::repository::codec::{from_minor_units, parse_date_column};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub(crate) const PAYMENT_COLUMNS: &str =
    "id, employee_id, month, employee_contribution, employer_contribution, total_contribution";

pub(crate) fn map_payment_row(row: &Row) -> SqliteResult<PfPayment> {
    Ok(PfPayment {
        id: row.get(0)?,
        employee_id: row.get(1)?,
        month: parse_date_column(2, &row.get::<_, String>(2)?)?,
        employee_contribution: from_minor_units(row.get(3)?),
        employer_contribution: from_minor_units(row.get(4)?),
        total_contribution: from_minor_units(row.get(5)?),
    })
}

// ==========================================
// PfPaymentRepository - 缴存仓储
// ==========================================
pub struct PfPaymentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PfPaymentRepository {
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

    /// 查询职工的缴存记录（按月份升序）
    pub fn list_by_employee(&self, employee_id: i64) -> RepositoryResult<Vec<PfPayment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM pf_payment WHERE employee_id = ?1 ORDER BY month ASC",
            PAYMENT_COLUMNS
        ))?;

        let payments = stmt
            .query_map(params![employee_id], map_payment_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(payments)
    }

    /// 查询全部缴存记录
    pub fn list_all(&self) -> RepositoryResult<Vec<PfPayment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM pf_payment ORDER BY employee_id ASC, month ASC",
            PAYMENT_COLUMNS
        ))?;

        let payments = stmt
            .query_map([], map_payment_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(payments)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM pf_payment", [], |row| row.get(0))?;
        Ok(count)
    }
}
