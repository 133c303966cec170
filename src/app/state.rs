// ==========================================
// PF 缴存记录系统 - 应用状态
// ==========================================
// 职责: 启动时按配置装配 仓储 → API，共享同一数据库连接
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ApiError, ApiResult, ImportApi, PfQueryApi};
use crate::config::AppConfig;
use crate::db::open_and_init;
use crate::repository::{
    CompanyRepository, EmployeeRepository, ImportRunRepository, PfImportRepositoryImpl,
    PfPaymentRepository,
};

/// 应用状态
pub struct AppState {
    /// 启动配置
    pub config: AppConfig,

    /// 导入 API
    pub import_api: Arc<ImportApi>,

    /// 查询 API
    pub query_api: Arc<PfQueryApi>,
}

impl AppState {
    /// 创建新的 AppState 实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并建表（幂等）
    /// 2. 基于共享连接初始化所有 Repository
    /// 3. 创建 API 实例
    pub fn new(config: AppConfig) -> ApiResult<Self> {
        tracing::info!("初始化AppState，数据库路径: {}", config.db_path);

        let conn = open_and_init(&config.db_path).map_err(|e| {
            ApiError::DatabaseConnectionError(format!("无法打开数据库 {}: {}", config.db_path, e))
        })?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let import_repo = PfImportRepositoryImpl::from_connection(conn.clone());
        let run_repo = ImportRunRepository::from_connection(conn.clone());
        let company_repo = CompanyRepository::from_connection(conn.clone());
        let employee_repo = EmployeeRepository::from_connection(conn.clone());
        let payment_repo = PfPaymentRepository::from_connection(conn);

        // ==========================================
        // 创建API实例
        // ==========================================
        let import_api = Arc::new(ImportApi::new(config.clone(), import_repo, run_repo));
        let query_api = Arc::new(PfQueryApi::new(company_repo, employee_repo, payment_repo));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            config,
            import_api,
            query_api,
        })
    }
}
