// ==========================================
// PF 缴存记录系统 - 导入仓储 Trait
// ==========================================
// 职责: 定义导入所需的数据访问接口（不包含业务逻辑）
// 约定: 自然键查询 + 原子化的“不存在则创建”
// ==========================================

use crate::domain::company::{Company, NewCompany};
use crate::domain::employee::{Employee, NewEmployee};
use crate::domain::payment::{NewPfPayment, PfPayment};
use crate::domain::report::ImportRun;
use crate::repository::error::RepositoryResult;

// ==========================================
// Upserted - upsert-if-absent 结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upserted<T> {
    /// 本次新建
    Created(T),
    /// 已存在，未做任何修改
    Existing(T),
}

impl<T> Upserted<T> {
    pub fn was_created(&self) -> bool {
        matches!(self, Upserted::Created(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Upserted::Created(v) | Upserted::Existing(v) => v,
        }
    }

    pub fn get(&self) -> &T {
        match self {
            Upserted::Created(v) | Upserted::Existing(v) => v,
        }
    }
}

// ==========================================
// PfImportRepository Trait
// ==========================================
// 实现者: PfImportRepositoryImpl（rusqlite）
//
// create_*_if_absent 在单个事务内完成“插入(冲突则忽略) + 读回”，
// 已存在的行不做任何字段更新。并发导入若在存在性检查与插入之间
// 与其他唯一字段冲突，返回 UniqueConstraintViolation，不会静默重复。
pub trait PfImportRepository {
    fn find_company_by_registration_number(
        &self,
        registration_number: &str,
    ) -> RepositoryResult<Option<Company>>;

    fn create_company_if_absent(&self, company: &NewCompany) -> RepositoryResult<Upserted<Company>>;

    fn find_employee_by_pf_number(&self, pf_number: &str) -> RepositoryResult<Option<Employee>>;

    fn create_employee_if_absent(
        &self,
        employee: &NewEmployee,
    ) -> RepositoryResult<Upserted<Employee>>;

    /// 缴存记录唯一创建路径；合计金额取自 NewPfPayment 的计算结果，并由库表 CHECK 复核
    fn create_payment_if_absent(
        &self,
        payment: &NewPfPayment,
    ) -> RepositoryResult<Upserted<PfPayment>>;

    /// 写入运行台账
    fn insert_import_run(&self, run: &ImportRun) -> RepositoryResult<()>;
}
