// ==========================================
// PF 缴存记录系统 - 字段映射器
// ==========================================
// 职责: RawRecord（规范字段名 → 原始值）→ 类型化记录
// 规则: 日期统一解析为日历日期，金额解析为精确小数
// 约束: 名称 ≤ 200 字符；注册号/PF 号 ≤ 50 字符；金额非负且 < 10^8
// ==========================================

use crate::domain::payment::{normalize_month, round_amount, AMOUNT_LIMIT};
use crate::domain::record::{fields, CompanyRecord, EmployeeRecord, PaymentRecord, RawRecord};
use crate::importer::error::{ImportError, ImportResult};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;

const MAX_NAME_LEN: usize = 200;
const MAX_KEY_LEN: usize = 50;

/// 表格日期序列号的纪元（1900 日期系统）
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// 序列号上限（9999-12-31）
const MAX_SERIAL: f64 = 2_958_465.0;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

pub struct FieldMapper;

impl FieldMapper {
    pub fn map_company(&self, record: &RawRecord) -> ImportResult<CompanyRecord> {
        let registration_number = self.required_key(record, fields::REGISTRATION_NUMBER)?;
        let name = self.required_text(record, fields::COMPANY_NAME, MAX_NAME_LEN)?;
        let pf_account_number = match record.get(fields::PF_ACCOUNT_NUMBER) {
            Some(v) => Some(check_len(fields::PF_ACCOUNT_NUMBER, v, MAX_KEY_LEN)?),
            None => None,
        };

        Ok(CompanyRecord {
            registration_number,
            name,
            address: record.get(fields::ADDRESS).map(str::to_string),
            pf_account_number,
        })
    }

    pub fn map_employee(&self, record: &RawRecord) -> ImportResult<EmployeeRecord> {
        Ok(EmployeeRecord {
            company_registration_number: self
                .required_key(record, fields::COMPANY_REGISTRATION_NUMBER)?,
            pf_number: self.required_key(record, fields::PF_NUMBER)?,
            name: self.required_text(record, fields::EMPLOYEE_NAME, MAX_NAME_LEN)?,
            date_of_joining: self.required_date(record, fields::DATE_OF_JOINING)?,
        })
    }

    pub fn map_payment(&self, record: &RawRecord) -> ImportResult<PaymentRecord> {
        let month = self.required_month(record, fields::MONTH)?;
        Ok(PaymentRecord {
            pf_number: self.required_key(record, fields::PF_NUMBER)?,
            month,
            employee_contribution: self.required_amount(record, fields::EMPLOYEE_CONTRIBUTION)?,
            employer_contribution: self.required_amount(record, fields::EMPLOYER_CONTRIBUTION)?,
        })
    }

    /// 提取必填字段
    fn required<'a>(&self, record: &'a RawRecord, key: &str) -> ImportResult<&'a str> {
        record.get(key).ok_or_else(|| ImportError::MissingField {
            field: key.to_string(),
        })
    }

    fn required_key(&self, record: &RawRecord, key: &str) -> ImportResult<String> {
        let value = self.required(record, key)?;
        check_len(key, normalize_key(value), MAX_KEY_LEN)
    }

    fn required_text(&self, record: &RawRecord, key: &str, max_len: usize) -> ImportResult<String> {
        check_len(key, self.required(record, key)?, max_len)
    }

    fn required_date(&self, record: &RawRecord, key: &str) -> ImportResult<NaiveDate> {
        let value = self.required(record, key)?;
        parse_date_value(value).ok_or_else(|| ImportError::ParseError {
            field: key.to_string(),
            value: value.to_string(),
            message: "无法解析为日期".to_string(),
        })
    }

    fn required_month(&self, record: &RawRecord, key: &str) -> ImportResult<NaiveDate> {
        let value = self.required(record, key)?;
        parse_month_value(value).ok_or_else(|| ImportError::ParseError {
            field: key.to_string(),
            value: value.to_string(),
            message: "无法解析为月份".to_string(),
        })
    }

    fn required_amount(&self, record: &RawRecord, key: &str) -> ImportResult<Decimal> {
        let value = self.required(record, key)?;
        let amount = parse_amount_value(value)
            .map(round_amount)
            .ok_or_else(|| ImportError::ParseError {
                field: key.to_string(),
                value: value.to_string(),
                message: "无法解析为金额".to_string(),
            })?;

        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(ImportError::ValidationError {
                field: key.to_string(),
                message: format!("金额不能为负: {}", amount),
            });
        }
        if amount.abs() >= Decimal::from(AMOUNT_LIMIT) {
            return Err(ImportError::ValidationError {
                field: key.to_string(),
                message: format!("金额超出上限 (最多 8 位整数): {}", amount),
            });
        }
        Ok(amount)
    }
}

fn check_len(field: &str, value: &str, max_len: usize) -> ImportResult<String> {
    if value.chars().count() > max_len {
        return Err(ImportError::ValidationError {
            field: field.to_string(),
            message: format!("长度超过 {} 个字符", max_len),
        });
    }
    Ok(value.to_string())
}

/// 自然键归一：表格中纯数字的键可能以浮点形式读出（如 "12345.0"）
fn normalize_key(value: &str) -> &str {
    match value.strip_suffix(".0") {
        Some(head) if !head.is_empty() && head.chars().all(|c| c.is_ascii_digit()) => head,
        _ => value,
    }
}

// ==========================================
// 值解析（公开供适配器与测试复用）
// ==========================================

/// 解析日期：ISO 日期 / 日期时间（取日期部分）/ 月-日-年 / 表格序列号
pub fn parse_date_value(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    s.parse::<f64>().ok().and_then(serial_to_date)
}

/// 解析月份（额外支持 YYYY-MM），结果归一到当月 1 日
pub fn parse_month_value(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    let date = parse_date_value(s)
        .or_else(|| NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").ok())?;
    Some(normalize_month(date))
}

/// 解析金额（支持千分位逗号与科学计数法）
pub fn parse_amount_value(raw: &str) -> Option<Decimal> {
    let s: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(&s)
        .or_else(|_| Decimal::from_scientific(&s))
        .ok()
}

/// 表格日期序列号 → 日期（小数部分为时间，忽略）
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_SERIAL).contains(&serial) {
        return None;
    }
    let (y, m, d) = SERIAL_EPOCH;
    NaiveDate::from_ymd_opt(y, m, d)?.checked_add_signed(Duration::days(serial.floor() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::{RecordKind, SourceKind};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn payment_record(month: &str, ee: &str, er: &str) -> RawRecord {
        RawRecord::new(SourceKind::Excel, RecordKind::Payment, 2)
            .with_field(fields::PF_NUMBER, "P1")
            .with_field(fields::MONTH, month)
            .with_field(fields::EMPLOYEE_CONTRIBUTION, ee)
            .with_field(fields::EMPLOYER_CONTRIBUTION, er)
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date_value("2020-01-15"), Some(date(2020, 1, 15)));
        assert_eq!(parse_date_value("2020-01-15 00:00:00"), Some(date(2020, 1, 15)));
        assert_eq!(parse_date_value("2020-01-15T08:30:00"), Some(date(2020, 1, 15)));
        assert_eq!(parse_date_value("01/15/2020"), Some(date(2020, 1, 15)));
        assert_eq!(parse_date_value("not a date"), None);
        assert_eq!(parse_date_value(""), None);
    }

    #[test]
    fn test_parse_date_from_serial() {
        // 43845 = 2020-01-15
        assert_eq!(parse_date_value("43845"), Some(date(2020, 1, 15)));
        assert_eq!(parse_date_value("45292.5"), Some(date(2024, 1, 1)));
        assert_eq!(parse_date_value("-3"), None);
    }

    #[test]
    fn test_parse_month_normalizes_to_first_day() {
        assert_eq!(parse_month_value("2024-01-01"), Some(date(2024, 1, 1)));
        assert_eq!(parse_month_value("2024-02-20"), Some(date(2024, 2, 1)));
        assert_eq!(parse_month_value("2024-03"), Some(date(2024, 3, 1)));
    }

    #[test]
    fn test_parse_amount_exact() {
        assert_eq!(parse_amount_value("1500"), Some(Decimal::from(1500)));
        assert_eq!(parse_amount_value("1,500.50"), Some(Decimal::new(150050, 2)));
        assert_eq!(parse_amount_value("1.5e3"), Some(Decimal::from(1500)));
        assert_eq!(parse_amount_value("abc"), None);
    }

    #[test]
    fn test_map_payment_ok() {
        let mapped = FieldMapper
            .map_payment(&payment_record("2024-01-01", "1500", "1500.0"))
            .unwrap();
        assert_eq!(mapped.pf_number, "P1");
        assert_eq!(mapped.month, date(2024, 1, 1));
        assert_eq!(
            mapped.employee_contribution + mapped.employer_contribution,
            Decimal::from(3000)
        );
    }

    #[test]
    fn test_map_payment_bad_amount_is_parse_error() {
        let err = FieldMapper
            .map_payment(&payment_record("2024-01-01", "lots", "1500"))
            .unwrap_err();
        assert!(matches!(err, ImportError::ParseError { ref field, .. } if field == fields::EMPLOYEE_CONTRIBUTION));
        assert!(err.is_record_level());
    }

    #[test]
    fn test_map_payment_negative_amount_rejected() {
        let err = FieldMapper
            .map_payment(&payment_record("2024-01-01", "-1", "1500"))
            .unwrap_err();
        assert!(matches!(err, ImportError::ValidationError { .. }));
    }

    #[test]
    fn test_map_payment_amount_limit_checked_after_rounding() {
        let err = FieldMapper
            .map_payment(&payment_record("2024-01-01", "99999999.995", "0"))
            .unwrap_err();
        assert!(matches!(err, ImportError::ValidationError { ref field, .. } if field == fields::EMPLOYEE_CONTRIBUTION));

        let mapped = FieldMapper
            .map_payment(&payment_record("2024-01-01", "99999999.994", "0"))
            .unwrap();
        assert_eq!(mapped.employee_contribution, Decimal::new(9_999_999_999, 2));
    }

    #[test]
    fn test_map_employee_missing_field() {
        let record = RawRecord::new(SourceKind::Xml, RecordKind::Employee, 1)
            .with_field(fields::COMPANY_REGISTRATION_NUMBER, "C1")
            .with_field(fields::PF_NUMBER, "P1")
            .with_field(fields::DATE_OF_JOINING, "2020-01-15");

        let err = FieldMapper.map_employee(&record).unwrap_err();
        assert!(matches!(err, ImportError::MissingField { ref field } if field == fields::EMPLOYEE_NAME));
    }

    #[test]
    fn test_map_company_normalizes_numeric_key() {
        let record = RawRecord::new(SourceKind::Excel, RecordKind::Company, 2)
            .with_field(fields::REGISTRATION_NUMBER, "12345.0")
            .with_field(fields::COMPANY_NAME, "Acme");

        let mapped = FieldMapper.map_company(&record).unwrap();
        assert_eq!(mapped.registration_number, "12345");
        assert_eq!(mapped.address, None);
    }

    #[test]
    fn test_map_company_name_too_long() {
        let record = RawRecord::new(SourceKind::Excel, RecordKind::Company, 2)
            .with_field(fields::REGISTRATION_NUMBER, "C1")
            .with_field(fields::COMPANY_NAME, "x".repeat(201));

        assert!(matches!(
            FieldMapper.map_company(&record),
            Err(ImportError::ValidationError { .. })
        ));
    }
}
