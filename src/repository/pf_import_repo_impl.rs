// ==========================================
// PF 缴存记录系统 - 导入仓储实现
// ==========================================
// 职责: 实现导入相关数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::open_and_init;
use crate::domain::company::{Company, NewCompany};
use crate::domain::employee::{Employee, NewEmployee};
use crate::domain::payment::{NewPfPayment, PfPayment};
use crate::domain::report::ImportRun;
use crate::repository::codec::{format_date, to_minor_units};
use crate::repository::company_repo::{map_company_row, COMPANY_COLUMNS};
use crate::repository::employee_repo::{map_employee_row, EMPLOYEE_COLUMNS};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::import_run_repo::insert_import_run_tx;
use crate::repository::payment_repo::{map_payment_row, PAYMENT_COLUMNS};
use crate::repository::pf_import_repo::{PfImportRepository, Upserted};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use tracing::debug;

// ==========================================
// PfImportRepositoryImpl
// ==========================================
pub struct PfImportRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl PfImportRepositoryImpl {
    /// 打开数据库（建表幂等）并创建仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_and_init(db_path)?;
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
}

impl PfImportRepository for PfImportRepositoryImpl {
    fn find_company_by_registration_number(
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

    fn create_company_if_absent(&self, company: &NewCompany) -> RepositoryResult<Upserted<Company>> {
        let select_sql = format!(
            "SELECT {} FROM company WHERE registration_number = ?1",
            COMPANY_COLUMNS
        );

        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        // 先按注册号查找：单位另有 name/pf_account_number 唯一约束，已存在的行不应触发它们
        let existing = tx
            .query_row(&select_sql, params![company.registration_number], map_company_row)
            .optional()?;
        if let Some(existing) = existing {
            tx.commit()?;
            return Ok(Upserted::Existing(existing));
        }

        let inserted = tx.execute(
            r#"
            INSERT INTO company (registration_number, name, address, pf_account_number)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(registration_number) DO NOTHING
            "#,
            params![
                company.registration_number,
                company.name,
                company.address,
                company.pf_account_number,
            ],
        )?;

        let row = tx.query_row(&select_sql, params![company.registration_number], map_company_row)?;

        tx.commit()?;

        debug!(
            registration_number = %company.registration_number,
            created = inserted > 0,
            "单位 upsert-if-absent"
        );

        Ok(if inserted > 0 {
            Upserted::Created(row)
        } else {
            Upserted::Existing(row)
        })
    }

    fn find_employee_by_pf_number(&self, pf_number: &str) -> RepositoryResult<Option<Employee>> {
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

    fn create_employee_if_absent(
        &self,
        employee: &NewEmployee,
    ) -> RepositoryResult<Upserted<Employee>> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let inserted = tx.execute(
            r#"
            INSERT INTO employee (company_id, name, pf_number, date_of_joining)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(pf_number) DO NOTHING
            "#,
            params![
                employee.company_id,
                employee.name,
                employee.pf_number,
                format_date(employee.date_of_joining),
            ],
        )?;

        let row = tx.query_row(
            &format!("SELECT {} FROM employee WHERE pf_number = ?1", EMPLOYEE_COLUMNS),
            params![employee.pf_number],
            map_employee_row,
        )?;

        tx.commit()?;

        debug!(
            pf_number = %employee.pf_number,
            created = inserted > 0,
            "职工 upsert-if-absent"
        );

        Ok(if inserted > 0 {
            Upserted::Created(row)
        } else {
            Upserted::Existing(row)
        })
    }

    fn create_payment_if_absent(
        &self,
        payment: &NewPfPayment,
    ) -> RepositoryResult<Upserted<PfPayment>> {
        let employee_minor =
            to_minor_units("employee_contribution", payment.employee_contribution())?;
        let employer_minor =
            to_minor_units("employer_contribution", payment.employer_contribution())?;
        let total_minor = to_minor_units("total_contribution", payment.total_contribution())?;
        let month = format_date(payment.month());

        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let inserted = tx.execute(
            r#"
            INSERT INTO pf_payment (
                employee_id, month,
                employee_contribution, employer_contribution, total_contribution
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(employee_id, month) DO NOTHING
            "#,
            params![
                payment.employee_id(),
                month,
                employee_minor,
                employer_minor,
                total_minor,
            ],
        )?;

        let row = tx.query_row(
            &format!(
                "SELECT {} FROM pf_payment WHERE employee_id = ?1 AND month = ?2",
                PAYMENT_COLUMNS
            ),
            params![payment.employee_id(), month],
            map_payment_row,
        )?;

        // 读回复核派生字段
        if !row.is_consistent() {
            return Err(RepositoryError::CheckConstraintViolation(format!(
                "pf_payment id={} total_contribution 与缴存之和不一致",
                row.id
            )));
        }

        tx.commit()?;

        debug!(
            employee_id = payment.employee_id(),
            month = %month,
            created = inserted > 0,
            "缴存 upsert-if-absent"
        );

        Ok(if inserted > 0 {
            Upserted::Created(row)
        } else {
            Upserted::Existing(row)
        })
    }

    fn insert_import_run(&self, run: &ImportRun) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_import_run_tx(&conn, run)
    }
}
