// ==========================================
// PF 缴存记录系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 单位 → 职工 → 月度缴存 的幂等导入与查询
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与导入记录
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 启动配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 启动装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    Company, Employee, ErrorPolicy, ImportReport, ImportStats, NewPfPayment, PfPayment,
};

// 导入
pub use importer::{ImportError, ImportSources, LiteralSource, PfImporter};

// API
pub use api::{ApiError, ImportApi, PfQueryApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "PF 缴存记录系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
