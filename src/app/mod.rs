// ==========================================
// PF 缴存记录系统 - 应用层
// ==========================================
// 职责: 配置 → 仓储 → API 的启动装配
// ==========================================

pub mod state;

pub use state::AppState;
