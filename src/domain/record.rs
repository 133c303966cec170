// ==========================================
// PF 缴存记录系统 - 导入记录（规范形态）
// ==========================================
// 职责: 定义各数据源适配器输出的统一记录形态
// 流程: 适配器 → RawRecord(字段名 → 原始值) → FieldMapper → 类型化记录
// ==========================================

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 规范字段名（与数据源列名/节点名解耦）
pub mod fields {
    pub const REGISTRATION_NUMBER: &str = "registration_number";
    pub const COMPANY_NAME: &str = "company_name";
    pub const ADDRESS: &str = "address";
    pub const PF_ACCOUNT_NUMBER: &str = "pf_account_number";
    pub const COMPANY_REGISTRATION_NUMBER: &str = "company_registration_number";
    pub const PF_NUMBER: &str = "pf_number";
    pub const EMPLOYEE_NAME: &str = "employee_name";
    pub const DATE_OF_JOINING: &str = "date_of_joining";
    pub const MONTH: &str = "month";
    pub const EMPLOYEE_CONTRIBUTION: &str = "employee_contribution";
    pub const EMPLOYER_CONTRIBUTION: &str = "employer_contribution";
}

// ==========================================
// SourceKind - 数据源类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Excel,   // 表格（三个命名工作表）
    Xml,     // 层级标记文档
    Literal, // 内存字面量 / 模拟 API 载荷
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Excel => "Excel",
            SourceKind::Xml => "XML",
            SourceKind::Literal => "Literal",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Company,
    Employee,
    Payment,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordKind::Company => "单位",
            RecordKind::Employee => "职工",
            RecordKind::Payment => "缴存",
        };
        f.write_str(s)
    }
}

// ==========================================
// RawRecord - 原始记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawRecord {
    pub source: SourceKind,
    pub kind: RecordKind,
    pub position: usize, // Excel 为数据行号（表头为第 1 行），XML/字面量为出现序号
    pub fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn new(source: SourceKind, kind: RecordKind, position: usize) -> Self {
        Self {
            source,
            kind,
            position,
            fields: HashMap::new(),
        }
    }

    /// 设置字段（链式）
    pub fn with_field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// 读取字段（去首尾空白，空串视为缺失）
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// 定位描述，用于失败消息
    pub fn locator(&self) -> String {
        format!("{} {} #{}", self.source, self.kind, self.position)
    }
}

// ==========================================
// SourceBatch - 单个数据源的全部记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceBatch {
    pub source: SourceKind,
    pub companies: Vec<RawRecord>,
    pub employees: Vec<RawRecord>,
    pub payments: Vec<RawRecord>,
}

impl SourceBatch {
    pub fn new(source: SourceKind) -> Self {
        Self {
            source,
            companies: Vec::new(),
            employees: Vec::new(),
            payments: Vec::new(),
        }
    }

    pub fn total_records(&self) -> usize {
        self.companies.len() + self.employees.len() + self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_records() == 0
    }
}

// ==========================================
// 类型化记录（FieldMapper 输出）
// ==========================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyRecord {
    pub registration_number: String,
    pub name: String,
    pub address: Option<String>,
    pub pf_account_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRecord {
    pub company_registration_number: String,
    pub pf_number: String,
    pub name: String,
    pub date_of_joining: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRecord {
    pub pf_number: String,
    pub month: NaiveDate,
    pub employee_contribution: Decimal,
    pub employer_contribution: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_treats_blank_as_missing() {
        let record = RawRecord::new(SourceKind::Excel, RecordKind::Company, 2)
            .with_field(fields::REGISTRATION_NUMBER, "  C1 ")
            .with_field(fields::ADDRESS, "   ");

        assert_eq!(record.get(fields::REGISTRATION_NUMBER), Some("C1"));
        assert_eq!(record.get(fields::ADDRESS), None);
        assert_eq!(record.get(fields::COMPANY_NAME), None);
        assert_eq!(record.locator(), "Excel 单位 #2");
    }
}
