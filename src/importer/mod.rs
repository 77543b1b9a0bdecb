// ==========================================
// 物流ERP资源调度系统 - 导入层
// ==========================================
// 职责: 外部数据导入,生成内部数据
// 支持: CSV (资源花名册 / HR 休假导出)
// 口径: 逐行校验,单行失败不中断整批;汇总逐行错误供人工复核
// ==========================================

// 模块声明
pub mod error;
pub mod leave_importer;
pub mod roster_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use leave_importer::LeaveImporter;
pub use roster_importer::RosterImporter;
pub use roster_importer::{ImportSummary, RowError};
