// ==========================================
// PF 缴存记录系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、导入记录形态、导入报告
// 红线: 不含数据访问逻辑
// ==========================================

pub mod company;
pub mod employee;
pub mod payment;
pub mod record;
pub mod report;

pub use company::{Company, NewCompany};
pub use employee::{Employee, NewEmployee};
pub use payment::{NewPfPayment, PfPayment};
pub use record::{RawRecord, RecordKind, SourceBatch, SourceKind};
pub use report::{ErrorPolicy, ImportReport, ImportRun, ImportStats};
