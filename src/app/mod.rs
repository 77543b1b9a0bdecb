// ==========================================
// 物流ERP资源调度系统 - 应用层
// ==========================================
// 职责: 组装共享状态,连接外层应用与调度核心
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
