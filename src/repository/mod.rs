// ==========================================
// PF 缴存记录系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口，屏蔽数据库细节
// 约束: 所有查询使用参数化，防止 SQL 注入
// ==========================================

pub mod codec;
pub mod company_repo;
pub mod employee_repo;
pub mod error;
pub mod import_run_repo;
pub mod payment_repo;
pub mod pf_import_repo;
pub mod pf_import_repo_impl;

pub use company_repo::CompanyRepository;
pub use employee_repo::EmployeeRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use import_run_repo::ImportRunRepository;
pub use payment_repo::PfPaymentRepository;
pub use pf_import_repo::{PfImportRepository, Upserted};
pub use pf_import_repo_impl::PfImportRepositoryImpl;
