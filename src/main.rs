// ==========================================
// 物流ERP资源调度系统 - 主入口
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 决策支持系统
// 说明: 前端壳层由外部 ERP 承载,本入口用于库模式自检与数据初始化
// ==========================================

use resource_aps::app::{get_default_db_path, AppState};

fn main() {
    // 初始化日志系统
    resource_aps::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 决策支持系统", resource_aps::APP_NAME);
    tracing::info!("系统版本: {}", resource_aps::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    // 创建AppState(含 schema 幂等初始化)
    tracing::info!("正在初始化AppState...");
    let app_state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("无法初始化AppState: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("AppState初始化成功");
    tracing::info!("数据库就绪: {}", app_state.db_path);
    tracing::info!("调度核心以库模式提供服务:");
    tracing::info!("use resource_aps::app::AppState;");
    tracing::info!("use resource_aps::api::SchedulingApi;");
}
