// ==========================================
// 物流ERP资源调度系统 - 调度配置读取 Trait
// ==========================================
// 职责: 定义调度引擎所需的配置读取接口(不包含实现)
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use chrono::NaiveDate;
use std::error::Error;

// ==========================================
// SchedulingConfigReader Trait
// ==========================================
// 用途: 调度引擎所需的配置读取接口
// 实现者: ConfigManager(从 config_kv 表读取)
#[async_trait]
pub trait SchedulingConfigReader: Send + Sync {
    // ===== 工作日历配置 =====

    /// 获取周末(非工作日)的星期编号列表
    ///
    /// # 返回
    /// - Vec<u32>: chrono 星期编号(Mon=0..Sun=6)
    ///
    /// # 默认值
    /// - [5, 6] (周六、周日)
    async fn get_weekend_weekdays(&self) -> Result<Vec<u32>, Box<dyn Error>>;

    /// 获取已登记的节假日列表
    ///
    /// # 返回
    /// - Vec<NaiveDate>: 节假日日期
    ///
    /// # 默认值
    /// - 空列表
    async fn get_holidays(&self) -> Result<Vec<NaiveDate>, Box<dyn Error>>;

    // ===== 容量配置 =====

    /// 获取默认日容量(小时)
    ///
    /// # 默认值
    /// - 8.0
    ///
    /// # 用途
    /// - 建资源时未显式给定日容量的兜底值
    async fn get_default_daily_capacity_h(&self) -> Result<f64, Box<dyn Error>>;

    // ===== 资质配置 =====

    /// 获取证书临期预警窗口(天)
    ///
    /// # 默认值
    /// - 30
    ///
    /// # 用途
    /// - 到期日落在 today+N 天内的证书判定为 EXPIRING_SOON
    async fn get_cert_expiry_horizon_days(&self) -> Result<i64, Box<dyn Error>>;
}
