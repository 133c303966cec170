// ==========================================
// PF 缴存记录系统 - 列值编解码
// ==========================================
// 日期: TEXT 'YYYY-MM-DD'
// 金额: INTEGER 分（paise），领域层为 2 位小数 Decimal
// ==========================================

use crate::domain::payment::{round_amount, AMOUNT_SCALE};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// 解析日期列；格式错误作为列转换失败返回，不做静默回退
pub fn parse_date_column(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// 金额 → 分
pub fn to_minor_units(field: &str, value: Decimal) -> RepositoryResult<i64> {
    (round_amount(value) * Decimal::from(100))
        .to_i64()
        .ok_or_else(|| RepositoryError::FieldValueError {
            field: field.to_string(),
            message: format!("金额超出可存储范围: {}", value),
        })
}

/// 分 → 金额
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, AMOUNT_SCALE)
}
