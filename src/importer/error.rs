// ==========================================
// PF 缴存记录系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 记录级错误（可收集） / 运行级错误（致命）
// ==========================================

use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 数据源错误（运行级） =====
    #[error("数据源不存在: {0}")]
    SourceNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xlsm/.xls/.ods）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("工作表不存在: {0}")]
    SheetNotFound(String),

    #[error("XML 解析失败: {0}")]
    XmlParseError(String),

    /// 节点缺失不可恢复：该文档按格式错误处理
    #[error("XML 节点缺失: 第 {position} 个 <{parent}> 缺少 <{node}>")]
    MissingXmlNode {
        parent: String,
        position: usize,
        node: String,
    },

    #[error("JSON 载荷解析失败: {0}")]
    PayloadParseError(String),

    // ===== 记录级错误（弹性模式下收集） =====
    #[error("必填字段缺失: {field}")]
    MissingField { field: String },

    #[error("字段解析失败 (字段 {field}, 值 {value:?}): {message}")]
    ParseError {
        field: String,
        value: String,
        message: String,
    },

    #[error("字段校验失败 (字段 {field}): {message}")]
    ValidationError { field: String, message: String },

    #[error("引用的{entity}不存在: {key}（{referenced_by}）")]
    ReferenceNotFound {
        entity: String,
        key: String,
        referenced_by: String,
    },

    /// 快速失败模式下，首个失败记录中止运行
    #[error("{record}: {source}")]
    RecordFailed {
        record: String,
        #[source]
        source: Box<ImportError>,
    },

    // ===== 存储错误（运行级） =====
    #[error("存储约束冲突: {0}")]
    ConstraintViolation(String),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl ImportError {
    /// 是否为记录级错误（弹性模式下收集而不中止）
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            ImportError::MissingField { .. }
                | ImportError::ParseError { .. }
                | ImportError::ValidationError { .. }
                | ImportError::ReferenceNotFound { .. }
        )
    }
}

// 唯一/CHECK 约束冲突始终上抛为致命错误
impl From<RepositoryError> for ImportError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UniqueConstraintViolation(msg)
            | RepositoryError::CheckConstraintViolation(msg) => ImportError::ConstraintViolation(msg),
            other => ImportError::Repository(other),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::PayloadParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_level_classification() {
        assert!(ImportError::MissingField {
            field: "pf_number".to_string()
        }
        .is_record_level());
        assert!(ImportError::ReferenceNotFound {
            entity: "单位".to_string(),
            key: "C9".to_string(),
            referenced_by: "PF 号 P2".to_string(),
        }
        .is_record_level());
        assert!(!ImportError::ConstraintViolation("x".to_string()).is_record_level());
        assert!(!ImportError::XmlParseError("x".to_string()).is_record_level());
    }

    #[test]
    fn test_unique_violation_becomes_constraint_violation() {
        let err: ImportError =
            RepositoryError::UniqueConstraintViolation("UNIQUE constraint failed".to_string()).into();
        assert!(matches!(err, ImportError::ConstraintViolation(_)));
    }
}
