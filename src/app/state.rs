// ==========================================
// 物流ERP资源调度系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::SchedulingApi;
use crate::config::ConfigManager;
use crate::importer::{LeaveImporter, RosterImporter};
use crate::repository::{AvailabilityRepository, ResourceRepository};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 调度业务API
    pub scheduling_api: Arc<SchedulingApi>,

    /// 配置管理器
    pub config: Arc<ConfigManager>,

    /// 花名册导入器
    pub roster_importer: Arc<RosterImporter>,

    /// HR 休假导入器
    pub leave_importer: Arc<LeaveImporter>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享数据库连接并应用统一 PRAGMA
    /// 2. 幂等初始化调度域 schema
    /// 3. 初始化 Repository / Engine / API 实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        // 创建数据库连接（共享连接）
        let conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        crate::db::init_schema(&conn).map_err(|e| format!("schema初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let resource_repo = Arc::new(ResourceRepository::from_connection(Arc::clone(&conn)));
        let availability_repo = Arc::new(AvailabilityRepository::from_connection(Arc::clone(&conn)));

        // ==========================================
        // 初始化配置与API层
        // ==========================================
        let config = Arc::new(
            ConfigManager::from_connection(Arc::clone(&conn))
                .map_err(|e| format!("配置管理器初始化失败: {}", e))?,
        );
        let scheduling_api = Arc::new(
            SchedulingApi::new(Arc::clone(&conn))
                .map_err(|e| format!("调度API初始化失败: {}", e))?,
        );

        // ==========================================
        // 初始化导入层
        // ==========================================
        let roster_importer = Arc::new(RosterImporter::new(Arc::clone(&resource_repo)));
        let leave_importer = Arc::new(LeaveImporter::new(
            Arc::clone(&resource_repo),
            Arc::clone(&availability_repo),
        ));

        tracing::info!("AppState初始化成功");
        Ok(Self {
            db_path,
            scheduling_api,
            config,
            roster_importer,
            leave_importer,
        })
    }
}

/// 获取默认数据库路径
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("RESOURCE_APS_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    // 先给一个默认回退值，后续如果能拿到 data_dir 再覆盖。
    let mut path = PathBuf::from("./resource_aps.db");

    // 尝试获取用户数据目录
    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("resource-aps-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("resource-aps");
        }

        // 确保目录存在
        std::fs::create_dir_all(&path).ok();
        path = path.join("resource_aps.db");
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    // 注意：AppState::new() 的测试需要真实的数据库文件
    // 这些测试应该在集成测试中进行
}
