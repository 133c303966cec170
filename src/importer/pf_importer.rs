// ==========================================
// PF 缴存记录系统 - 导入编排
// ==========================================
// 职责: 数据源发现 → 解析 → 对账 → 运行台账
// 顺序: Excel 先于 XML，两者独立处理；不存在的数据源跳过（非失败）
// ==========================================

use crate::domain::record::{SourceBatch, SourceKind};
use crate::domain::report::{ErrorPolicy, ImportReport, ImportRun, ImportStats};
use crate::importer::error::ImportResult;
use crate::importer::excel_parser::ExcelSourceParser;
use crate::importer::literal_source::LiteralSource;
use crate::importer::reconciler::Reconciler;
use crate::importer::source_parser::SourceParser;
use crate::importer::xml_parser::XmlSourceParser;
use crate::repository::PfImportRepository;
use chrono::Utc;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// 本次运行启用的文件型数据源
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSources {
    pub excel_path: Option<PathBuf>,
    pub xml_path: Option<PathBuf>,
}

impl ImportSources {
    pub fn new(excel_path: impl Into<PathBuf>, xml_path: impl Into<PathBuf>) -> Self {
        Self {
            excel_path: Some(excel_path.into()),
            xml_path: Some(xml_path.into()),
        }
    }

    pub fn excel_only(excel_path: impl Into<PathBuf>) -> Self {
        Self {
            excel_path: Some(excel_path.into()),
            xml_path: None,
        }
    }
}

/// 单次运行的累计结果
#[derive(Debug, Default)]
struct RunProgress {
    stats: ImportStats,
    messages: Vec<String>,
    sources_processed: Vec<SourceKind>,
    sources_skipped: Vec<String>,
}

impl RunProgress {
    fn apply<R: PfImportRepository>(
        &mut self,
        reconciler: &Reconciler<'_, R>,
        run_id: &str,
        batch: &SourceBatch,
    ) -> ImportResult<()> {
        let outcome = reconciler.reconcile(batch).map_err(|e| {
            error!(run_id = %run_id, source = %batch.source, error = %e, "导入中止");
            e
        })?;
        self.stats.merge(&outcome.stats);
        self.messages.extend(outcome.messages);
        self.sources_processed.push(batch.source);
        Ok(())
    }
}

// ==========================================
// PfImporter
// ==========================================
pub struct PfImporter<R: PfImportRepository> {
    repo: R,
}

impl<R: PfImportRepository> PfImporter<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// 执行一次导入
    ///
    /// # 返回
    /// - Ok(ImportReport): 运行完成（弹性模式下可能含记录级失败）
    /// - Err: 运行级致命错误，或快速失败模式下的首个记录失败
    #[instrument(skip(self, sources), fields(run_id))]
    pub fn run(&self, sources: &ImportSources, policy: ErrorPolicy) -> ImportResult<ImportReport> {
        let start = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());
        info!(run_id = %run_id, policy = %policy, "开始导入 PF 数据");

        let reconciler = Reconciler::new(&self.repo, policy);
        let mut progress = RunProgress::default();

        let candidates: [(&Option<PathBuf>, &dyn SourceParser); 2] = [
            (&sources.excel_path, &ExcelSourceParser),
            (&sources.xml_path, &XmlSourceParser),
        ];
        for (path, parser) in candidates {
            let Some(path) = path else { continue };
            if !path.exists() {
                warn!(source = %parser.source_kind(), path = %path.display(), "数据源不存在，跳过");
                progress.sources_skipped.push(path.display().to_string());
                continue;
            }
            // 逐源解析并对账；后一数据源失败不回滚前一数据源已写入的记录
            let batch = parser.parse(path).map_err(|e| {
                error!(source = %parser.source_kind(), error = %e, "数据源解析失败");
                e
            })?;
            progress.apply(&reconciler, &run_id, &batch)?;
        }

        self.finish(run_id, policy, progress, start)
    }

    /// 弹性模式（主入口）
    pub fn run_resilient(&self, sources: &ImportSources) -> ImportResult<ImportReport> {
        self.run(sources, ErrorPolicy::Resilient)
    }

    /// 快速失败模式：首个记录失败即中止
    pub fn run_fail_fast(&self, sources: &ImportSources) -> ImportResult<ImportReport> {
        self.run(sources, ErrorPolicy::FailFast)
    }

    /// 导入字面量数据源（演示数据 / 模拟 API 载荷）
    #[instrument(skip(self, source))]
    pub fn import_literal(
        &self,
        source: &LiteralSource,
        policy: ErrorPolicy,
    ) -> ImportResult<ImportReport> {
        let start = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        info!(run_id = %run_id, companies = source.companies.len(), "开始导入字面量数据");

        let reconciler = Reconciler::new(&self.repo, policy);
        let mut progress = RunProgress::default();
        progress.apply(&reconciler, &run_id, &source.to_batch())?;

        self.finish(run_id, policy, progress, start)
    }

    /// 生成报告并写入台账
    fn finish(
        &self,
        run_id: String,
        policy: ErrorPolicy,
        progress: RunProgress,
        start: Instant,
    ) -> ImportResult<ImportReport> {
        let RunProgress {
            stats,
            messages,
            sources_processed,
            sources_skipped,
        } = progress;

        let report = ImportReport {
            run_id,
            policy,
            overall_success: stats.failed_records == 0,
            messages,
            sources_processed,
            sources_skipped,
            stats,
            elapsed_ms: start.elapsed().as_millis() as u64,
        };

        self.repo
            .insert_import_run(&ImportRun::from_report(&report, Utc::now()))?;

        info!(
            run_id = %report.run_id,
            created = report.stats.created_total(),
            failed = report.stats.failed_records,
            elapsed_ms = report.elapsed_ms,
            "{}",
            report.summary_line()
        );
        Ok(report)
    }
}
