// ==========================================
// PF 缴存记录系统 - 应用配置
// ==========================================
// 职责: 显式配置结构，启动时构建后传入各层，无全局状态
// 覆写顺序: 默认值 → 环境变量 → 命令行参数
// ==========================================

use crate::domain::report::ErrorPolicy;
use crate::importer::ImportSources;
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "pf_tracker.db";
pub const DEFAULT_EXCEL_PATH: &str = "pf_sample.xlsx";
pub const DEFAULT_XML_PATH: &str = "pf_details.xml";

/// 环境变量名
pub mod env_keys {
    pub const DB_PATH: &str = "PF_TRACKER_DB_PATH";
    pub const EXCEL_PATH: &str = "PF_TRACKER_EXCEL_PATH";
    pub const XML_PATH: &str = "PF_TRACKER_XML_PATH";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: String,
    pub excel_path: PathBuf,
    pub xml_path: PathBuf,
    pub policy: ErrorPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            excel_path: PathBuf::from(DEFAULT_EXCEL_PATH),
            xml_path: PathBuf::from(DEFAULT_XML_PATH),
            policy: ErrorPolicy::Resilient,
        }
    }
}

impl AppConfig {
    /// 默认值 + 环境变量覆写（空值忽略）
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(path) = env_value(env_keys::DB_PATH) {
            config.db_path = path;
        }
        if let Some(path) = env_value(env_keys::EXCEL_PATH) {
            config.excel_path = PathBuf::from(path);
        }
        if let Some(path) = env_value(env_keys::XML_PATH) {
            config.xml_path = PathBuf::from(path);
        }
        config
    }

    pub fn with_db_path(mut self, db_path: impl Into<String>) -> Self {
        self.db_path = db_path.into();
        self
    }

    pub fn with_excel_path(mut self, excel_path: impl Into<PathBuf>) -> Self {
        self.excel_path = excel_path.into();
        self
    }

    pub fn with_xml_path(mut self, xml_path: impl Into<PathBuf>) -> Self {
        self.xml_path = xml_path.into();
        self
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 本次运行的数据源集合（Excel 与 XML 均启用，缺失时由导入器跳过）
    pub fn sources(&self) -> ImportSources {
        ImportSources::new(self.excel_path.clone(), self.xml_path.clone())
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
