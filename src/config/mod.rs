// ==========================================
// PF 缴存记录系统 - 配置层
// ==========================================

pub mod app_config;

pub use app_config::{env_keys, AppConfig};
