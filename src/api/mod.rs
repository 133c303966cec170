// ==========================================
// PF 缴存记录系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供命令行调用
// ==========================================

pub mod error;
pub mod import_api;
pub mod pf_query_api;

pub use error::{ApiError, ApiResult};
pub use import_api::ImportApi;
pub use pf_query_api::{CompanyDetail, EmployeeDetail, PfQueryApi};
