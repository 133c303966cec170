// ==========================================
// PF 缴存记录系统 - 字面量数据源
// ==========================================
// 用途: 演示数据 / 模拟 API 载荷（JSON）
// 输出: 与文件型数据源相同的 SourceBatch，经同一 Reconciler 入库
// ==========================================

use crate::domain::record::{fields, RawRecord, RecordKind, SourceBatch, SourceKind};
use crate::importer::error::{ImportError, ImportResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralPayment {
    pub month: NaiveDate,
    pub employee_contribution: Decimal,
    pub employer_contribution: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralEmployee {
    pub pf_number: String,
    pub name: String,
    pub date_of_joining: NaiveDate,
    #[serde(default)]
    pub payments: Vec<LiteralPayment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralCompany {
    pub registration_number: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub pf_account_number: Option<String>,
    #[serde(default)]
    pub employees: Vec<LiteralEmployee>,
}

/// 内存中的嵌套数据源
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LiteralSource {
    pub companies: Vec<LiteralCompany>,
}

impl LiteralSource {
    pub fn new(companies: Vec<LiteralCompany>) -> Self {
        Self { companies }
    }

    /// 解析 JSON 载荷（顶层为单位数组）
    pub fn from_json_str(payload: &str) -> ImportResult<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn from_json_file(path: &Path) -> ImportResult<Self> {
        if !path.exists() {
            return Err(ImportError::SourceNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// 演示载荷
    pub fn sample() -> Self {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
        Self::new(vec![LiteralCompany {
            registration_number: "COMP12345".to_string(),
            name: "Tech Innovations Pvt Ltd".to_string(),
            address: Some("123 Tech Park, Bangalore".to_string()),
            pf_account_number: None,
            employees: vec![LiteralEmployee {
                pf_number: "PF98765".to_string(),
                name: "John Doe".to_string(),
                date_of_joining: date(2020, 1, 15),
                payments: vec![LiteralPayment {
                    month: date(2024, 1, 1),
                    employee_contribution: Decimal::new(150000, 2),
                    employer_contribution: Decimal::new(150000, 2),
                }],
            }],
        }])
    }

    /// 展开为规范记录；职工/缴存记录继承父级自然键
    pub fn to_batch(&self) -> SourceBatch {
        let mut batch = SourceBatch::new(SourceKind::Literal);

        for company in &self.companies {
            let mut record = RawRecord::new(
                SourceKind::Literal,
                RecordKind::Company,
                batch.companies.len() + 1,
            )
            .with_field(fields::REGISTRATION_NUMBER, company.registration_number.as_str())
            .with_field(fields::COMPANY_NAME, company.name.as_str());
            if let Some(address) = &company.address {
                record = record.with_field(fields::ADDRESS, address.as_str());
            }
            if let Some(account) = &company.pf_account_number {
                record = record.with_field(fields::PF_ACCOUNT_NUMBER, account.as_str());
            }
            batch.companies.push(record);

            for employee in &company.employees {
                batch.employees.push(
                    RawRecord::new(
                        SourceKind::Literal,
                        RecordKind::Employee,
                        batch.employees.len() + 1,
                    )
                    .with_field(
                        fields::COMPANY_REGISTRATION_NUMBER,
                        company.registration_number.as_str(),
                    )
                    .with_field(fields::PF_NUMBER, employee.pf_number.as_str())
                    .with_field(fields::EMPLOYEE_NAME, employee.name.as_str())
                    .with_field(fields::DATE_OF_JOINING, employee.date_of_joining.to_string()),
                );

                for payment in &employee.payments {
                    batch.payments.push(
                        RawRecord::new(
                            SourceKind::Literal,
                            RecordKind::Payment,
                            batch.payments.len() + 1,
                        )
                        .with_field(fields::PF_NUMBER, employee.pf_number.as_str())
                        .with_field(fields::MONTH, payment.month.to_string())
                        .with_field(
                            fields::EMPLOYEE_CONTRIBUTION,
                            payment.employee_contribution.to_string(),
                        )
                        .with_field(
                            fields::EMPLOYER_CONTRIBUTION,
                            payment.employer_contribution.to_string(),
                        ),
                    );
                }
            }
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_batch_shape() {
        let batch = LiteralSource::sample().to_batch();
        assert_eq!(batch.source, SourceKind::Literal);
        assert_eq!(batch.companies.len(), 1);
        assert_eq!(batch.employees.len(), 1);
        assert_eq!(batch.payments.len(), 1);
        assert_eq!(
            batch.employees[0].get(fields::COMPANY_REGISTRATION_NUMBER),
            Some("COMP12345")
        );
        assert_eq!(batch.payments[0].get(fields::MONTH), Some("2024-01-01"));
        assert_eq!(batch.payments[0].get(fields::EMPLOYEE_CONTRIBUTION), Some("1500.00"));
    }

    #[test]
    fn test_from_json_payload() {
        let payload = r#"[
            {
                "registration_number": "J1",
                "name": "Json Co",
                "employees": [
                    {
                        "pf_number": "JP1",
                        "name": "Ravi",
                        "date_of_joining": "2022-03-10",
                        "payments": [
                            {"month": "2024-03-01", "employee_contribution": "800.25", "employer_contribution": 800.25}
                        ]
                    }
                ]
            }
        ]"#;

        let source = LiteralSource::from_json_str(payload).unwrap();
        assert_eq!(source.companies.len(), 1);
        assert_eq!(source.companies[0].address, None);
        let payment = &source.companies[0].employees[0].payments[0];
        assert_eq!(payment.employee_contribution, Decimal::new(80025, 2));
        assert_eq!(payment.employer_contribution, Decimal::new(80025, 2));
    }

    #[test]
    fn test_malformed_payload() {
        let err = LiteralSource::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ImportError::PayloadParseError(_)));
    }
}
