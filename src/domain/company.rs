// ==========================================
// PF 缴存记录系统 - 单位（Company）领域模型
// ==========================================
// 对齐: company 表
// 自然键: registration_number
// ==========================================

use serde::{Deserialize, Serialize};

/// 注册单位
///
/// 首次导入时按注册号创建，此后导入不再更新非键字段（首次写入为准）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub registration_number: String,       // 注册号（唯一）
    pub name: String,                      // 单位名称（唯一）
    pub address: Option<String>,           // 地址（可空）
    pub pf_account_number: Option<String>, // PF 账号（非空时唯一）
}

/// 待创建的单位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompany {
    pub registration_number: String,
    pub name: String,
    pub address: Option<String>,
    pub pf_account_number: Option<String>,
}

impl std::fmt::Display for Company {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
