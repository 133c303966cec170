// ==========================================
// PF 缴存记录系统 - 职工数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::employee::Employee;
use crate::repository::codec::parse_date_column;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub(crate) const EMPLOYEE_COLUMNS: &str = "id, company_id, pf_number, name, date_of_joining";

pub(crate) fn map_employee_row(row: &Row) -> SqliteResult<Employee> {
    Ok(Employee {
        id: row.get(0)?,
        company_id: row.get(1)?,
        pf_number: row.get(2)?,
        name: row.get(3)?,
        date_of_joining: parse_date_column(4, &row.get::<_, String>(4)?)?,
    })
}

// ==========================================
// EmployeeRepository - 职工仓储
// ==========================================
pub struct EmployeeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EmployeeRepository {
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

    /// 查询单位下的职工（按姓名排序）
    pub fn list_by_company(&self, company_id: i64) -> RepositoryResult<Vec<Employee>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM employee WHERE company_id = ?1 ORDER BY name ASC, pf_number ASC",
            EMPLOYEE_COLUMNS
        ))?;

        let employees = stmt
            .query_map(params![company_id], map_employee_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(employees)
    }

    pub fn find_by_id(&self, employee_id: i64) -> RepositoryResult<Option<Employee>> {
        let conn = self.get_conn()?;
        let employee = conn
            .query_row(
                &format!("SELECT {} FROM employee WHERE id = ?1", EMPLOYEE_COLUMNS),
                params![employee_id],
                map_employee_row,
            )
            .optional()?;
        Ok(employee)
    }

    pub fn find_by_pf_number(&self, pf_number: &str) -> RepositoryResult<Option<Employee>> {
        let conn = self.get_conn()?;
        let employee = conn
            .query_row(
                &format!("SELECT {} FROM employee WHERE pf_number = ?1", EMPLOYEE_COLUMNS),
                params![pf_number],
                map_employee_row,
            )
            .optional()?;
        Ok(employee)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM employee", [], |row| row.get(0))?;
        Ok(count)
    }
}
