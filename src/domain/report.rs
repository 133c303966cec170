// ==========================================
// PF 缴存记录系统 - 导入结果
// ==========================================
// 职责: 错误策略、运行统计、导入报告、运行台账
// ==========================================

use crate::domain::record::SourceKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// ErrorPolicy - 记录级错误处理策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorPolicy {
    /// 逐条隔离：失败记录收集为消息，继续处理后续记录
    #[default]
    Resilient,
    /// 首个失败即中止整个运行
    FailFast,
}

impl ErrorPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorPolicy::Resilient => "RESILIENT",
            ErrorPolicy::FailFast => "FAIL_FAST",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "FAIL_FAST" => ErrorPolicy::FailFast,
            _ => ErrorPolicy::Resilient,
        }
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// ImportStats - 运行统计
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImportStats {
    pub companies_created: usize,
    pub companies_existing: usize, // 已存在，跳过
    pub employees_created: usize,
    pub employees_existing: usize,
    pub payments_created: usize,
    pub payments_existing: usize,
    pub failed_records: usize,
}

impl ImportStats {
    pub fn created_total(&self) -> usize {
        self.companies_created + self.employees_created + self.payments_created
    }

    pub fn merge(&mut self, other: &ImportStats) {
        self.companies_created += other.companies_created;
        self.companies_existing += other.companies_existing;
        self.employees_created += other.employees_created;
        self.employees_existing += other.employees_existing;
        self.payments_created += other.payments_created;
        self.payments_existing += other.payments_existing;
        self.failed_records += other.failed_records;
    }
}

// ==========================================
// ImportReport - 导入报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub run_id: String,
    pub policy: ErrorPolicy,
    pub overall_success: bool,         // 无记录级失败
    pub messages: Vec<String>,         // 按发生顺序的失败消息
    pub sources_processed: Vec<SourceKind>,
    pub sources_skipped: Vec<String>,  // 不存在的数据源（非失败）
    pub stats: ImportStats,
    pub elapsed_ms: u64,
}

impl ImportReport {
    /// 终端输出用的一行摘要
    pub fn summary_line(&self) -> String {
        if self.sources_processed.is_empty() {
            return "未发现可导入的数据源，未处理任何记录".to_string();
        }

        let sources = self
            .sources_processed
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" 和 ");

        if self.overall_success {
            format!("已成功从 {} 获取并保存 PF 数据", sources)
        } else {
            format!(
                "已从 {} 导入 PF 数据，{} 条记录失败",
                sources, self.stats.failed_records
            )
        }
    }
}

// ==========================================
// ImportRun - 运行台账（import_run 表）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRun {
    pub run_id: String,
    pub policy: ErrorPolicy,
    pub sources_processed: Vec<String>,
    pub sources_skipped: Vec<String>,
    pub stats: ImportStats,
    pub overall_success: bool,
    pub messages: Vec<String>,
    pub elapsed_ms: u64,
    pub finished_at: DateTime<Utc>,
}

impl ImportRun {
    pub fn from_report(report: &ImportReport, finished_at: DateTime<Utc>) -> Self {
        Self {
            run_id: report.run_id.clone(),
            policy: report.policy,
            sources_processed: report
                .sources_processed
                .iter()
                .map(|s| s.as_str().to_string())
                .collect(),
            sources_skipped: report.sources_skipped.clone(),
            stats: report.stats,
            overall_success: report.overall_success,
            messages: report.messages.clone(),
            elapsed_ms: report.elapsed_ms,
            finished_at,
        }
    }
}
