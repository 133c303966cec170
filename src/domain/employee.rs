// ==========================================
// PF 缴存记录系统 - 职工（Employee）领域模型
// ==========================================
// 对齐: employee 表
// 自然键: pf_number
// 归属: company（级联删除）
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub company_id: i64,            // 所属单位
    pub pf_number: String,          // PF 号（唯一）
    pub name: String,               // 姓名
    pub date_of_joining: NaiveDate, // 入职日期
}

/// 待创建的职工（单位引用已解析为 company_id）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub company_id: i64,
    pub pf_number: String,
    pub name: String,
    pub date_of_joining: NaiveDate,
}

impl std::fmt::Display for Employee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.pf_number)
    }
}
