// ==========================================
// PF 缴存记录系统 - 单位数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::company::Company;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub(crate) const COMPANY_COLUMNS: &str =
    "id, registration_number, name, address, pf_account_number";

pub(crate) fn map_company_row(row: &Row) -> SqliteResult<Company> {
    Ok(Company {
        id: row.get(0)?,
        registration_number: row.get(1)?,
        name: row.get(2)?,
        address: row.get(3)?,
        pf_account_number: row.get(4)?,
    })
}

// ==========================================
// CompanyRepository - 单位仓储
// ==========================================
/// 职责: company 表的查询与删除（创建走导入仓储的 upsert-if-absent）
pub struct CompanyRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CompanyRepository {
    /// 创建新的 CompanyRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询全部单位（按名称排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<Company>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM company ORDER BY name ASC",
            COMPANY_COLUMNS
        ))?;

        let companies = stmt
            .query_map([], map_company_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(companies)
    }

    /// 按主键查询
    pub fn find_by_id(&self, company_id: i64) -> RepositoryResult<Option<Company>> {
        let conn = self.get_conn()?;
        let company = conn
            .query_row(
                &format!("SELECT {} FROM company WHERE id = ?1", COMPANY_COLUMNS),
                params![company_id],
                map_company_row,
            )
            .optional()?;
        Ok(company)
    }

    /// 按注册号查询
    pub fn find_by_registration_number(
        &self,
        registration_number: &str,
    ) -> RepositoryResult<Option<Company>> {
        let conn = self.get_conn()?;
        let company = conn
            .query_row(
                &format!(
                    "SELECT {} FROM company WHERE registration_number = ?1",
                    COMPANY_COLUMNS
                ),
                params![registration_number],
                map_company_row,
            )
            .optional()?;
        Ok(company)
    }

    /// 按注册号删除单位（级联删除其职工与缴存记录）
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): 单位不存在
    pub fn delete_by_registration_number(&self, registration_number: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM company WHERE registration_number = ?1",
            params![registration_number],
        )?;
        Ok(affected > 0)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM company", [], |row| row.get(0))?;
        Ok(count)
    }
}
