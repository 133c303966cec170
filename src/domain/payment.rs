// ==========================================
// PF 缴存记录系统 - 月度缴存（PFPayment）领域模型
// ==========================================
// 对齐: pf_payment 表
// 唯一: (employee_id, month)
// 派生: total_contribution = employee_contribution + employer_contribution
// ==========================================

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 金额小数位数
pub const AMOUNT_SCALE: u32 = 2;

/// 金额上限（max_digits=10, decimal_places=2 → 整数部分最多 8 位）
pub const AMOUNT_LIMIT: i64 = 100_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PfPayment {
    pub id: i64,
    pub employee_id: i64,
    pub month: NaiveDate, // 缴存月份（当月 1 日）
    pub employee_contribution: Decimal,
    pub employer_contribution: Decimal,
    pub total_contribution: Decimal, // 派生字段
}

impl PfPayment {
    /// 派生字段是否与两项缴存之和一致
    pub fn is_consistent(&self) -> bool {
        self.total_contribution == self.employee_contribution + self.employer_contribution
    }
}

// ==========================================
// NewPfPayment - 待创建缴存记录
// ==========================================
// 缴存记录的唯一创建入口；合计金额不可外部设置，只能由此计算
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPfPayment {
    employee_id: i64,
    month: NaiveDate,
    employee_contribution: Decimal,
    employer_contribution: Decimal,
}

impl NewPfPayment {
    /// 创建待写入记录（月份归一到当月 1 日，金额按 2 位小数取整）
    pub fn new(
        employee_id: i64,
        month: NaiveDate,
        employee_contribution: Decimal,
        employer_contribution: Decimal,
    ) -> Self {
        Self {
            employee_id,
            month: normalize_month(month),
            employee_contribution: round_amount(employee_contribution),
            employer_contribution: round_amount(employer_contribution),
        }
    }

    pub fn employee_id(&self) -> i64 {
        self.employee_id
    }

    pub fn month(&self) -> NaiveDate {
        self.month
    }

    pub fn employee_contribution(&self) -> Decimal {
        self.employee_contribution
    }

    pub fn employer_contribution(&self) -> Decimal {
        self.employer_contribution
    }

    /// 合计缴存（精确小数相加）
    pub fn total_contribution(&self) -> Decimal {
        self.employee_contribution + self.employer_contribution
    }
}

/// 月份归一到当月 1 日
pub fn normalize_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// 金额取整到 2 位小数（四舍五入，远离零）
pub fn round_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(
        AMOUNT_SCALE,
        rust_decimal::RoundingStrategy::MidpointAwayFromZero,
    )
}
