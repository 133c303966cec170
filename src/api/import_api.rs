// ==========================================
// PF 缴存记录系统 - 导入 API
// ==========================================
// 职责: 封装"执行导入"操作及运行台账查询
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::AppConfig;
use crate::domain::report::{ErrorPolicy, ImportReport, ImportRun};
use crate::importer::{ImportSources, LiteralSource, PfImporter};
use crate::repository::{ImportRunRepository, PfImportRepositoryImpl};
use std::path::Path;
use tracing::info;

/// 台账查询条数上限
const MAX_RUN_LIMIT: u32 = 1000;

pub struct ImportApi {
    config: AppConfig,
    importer: PfImporter<PfImportRepositoryImpl>,
    run_repo: ImportRunRepository,
}

impl ImportApi {
    pub fn new(
        config: AppConfig,
        import_repo: PfImportRepositoryImpl,
        run_repo: ImportRunRepository,
    ) -> Self {
        Self {
            config,
            importer: PfImporter::new(import_repo),
            run_repo,
        }
    }

    /// 按配置的数据源与策略执行导入
    pub fn run_import(&self) -> ApiResult<ImportReport> {
        self.run_import_with(&self.config.sources(), self.config.policy)
    }

    /// 指定数据源与策略执行导入
    ///
    /// # 返回
    /// - Ok(ImportReport): 运行完成；`overall_success` 为 false 时 `messages` 列出失败记录
    /// - Err(ApiError::ImportError): 运行级致命错误或快速失败中止
    pub fn run_import_with(
        &self,
        sources: &ImportSources,
        policy: ErrorPolicy,
    ) -> ApiResult<ImportReport> {
        let report = self.importer.run(sources, policy)?;
        info!(run_id = %report.run_id, success = report.overall_success, "导入 API 调用完成");
        Ok(report)
    }

    /// 写入演示数据
    pub fn seed_sample(&self) -> ApiResult<ImportReport> {
        Ok(self
            .importer
            .import_literal(&LiteralSource::sample(), self.config.policy)?)
    }

    /// 导入 JSON 载荷（模拟 API 数据）
    pub fn import_json_payload(&self, payload: &str) -> ApiResult<ImportReport> {
        let source = LiteralSource::from_json_str(payload)?;
        Ok(self.importer.import_literal(&source, self.config.policy)?)
    }

    pub fn import_json_file(&self, path: &Path) -> ApiResult<ImportReport> {
        let source = LiteralSource::from_json_file(path)?;
        Ok(self.importer.import_literal(&source, self.config.policy)?)
    }

    /// 最近的运行台账（按完成时间倒序）
    pub fn recent_runs(&self, limit: u32) -> ApiResult<Vec<ImportRun>> {
        if limit == 0 || limit > MAX_RUN_LIMIT {
            return Err(ApiError::InvalidInput(format!(
                "limit 应在 1-{} 之间，实际为 {}",
                MAX_RUN_LIMIT, limit
            )));
        }
        Ok(self.run_repo.find_recent(limit)?)
    }

    pub fn find_run(&self, run_id: &str) -> ApiResult<ImportRun> {
        self.run_repo
            .find_by_id(run_id)?
            .ok_or_else(|| ApiError::NotFound(format!("导入运行 {} 不存在", run_id)))
    }
}
