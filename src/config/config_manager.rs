// ==========================================
// 物流ERP资源调度系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、快照管理
// 存储: config_kv 表 (key-value + scope)
// 口径: 配置缺失或格式非法时回退默认值,不让读取失败阻断调度
// ==========================================

use crate::config::scheduling_config_trait::SchedulingConfigReader;
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入配置值（scope_id='global'，UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 变更调度参数前记录配置快照,便于审计回溯
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }
}

// ==========================================
// SchedulingConfigReader Trait 实现
// ==========================================
#[async_trait]
impl SchedulingConfigReader for ConfigManager {
    // ===== 工作日历配置 =====

    async fn get_weekend_weekdays(&self) -> Result<Vec<u32>, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::WEEKEND_WEEKDAYS, "5,6")?;

        let days: Vec<u32> = value
            .split(',')
            .filter_map(|s| s.trim().parse::<u32>().ok())
            .filter(|&d| d <= 6)
            .collect();

        if days.is_empty() {
            Ok(vec![5, 6]) // 默认双休
        } else {
            Ok(days)
        }
    }

    async fn get_holidays(&self) -> Result<Vec<NaiveDate>, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::HOLIDAYS, "")?;

        let holidays: Vec<NaiveDate> = value
            .split(',')
            .filter_map(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
            .collect();

        Ok(holidays)
    }

    // ===== 容量配置 =====

    async fn get_default_daily_capacity_h(&self) -> Result<f64, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::DEFAULT_DAILY_CAPACITY_H, "8.0")?;
        Ok(value.parse::<f64>().unwrap_or(8.0))
    }

    // ===== 资质配置 =====

    async fn get_cert_expiry_horizon_days(&self) -> Result<i64, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::CERT_EXPIRY_HORIZON_DAYS, "30")?;
        Ok(value.parse::<i64>().unwrap_or(30))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 工作日历
    pub const WEEKEND_WEEKDAYS: &str = "weekend_weekdays";
    pub const HOLIDAYS: &str = "holidays";

    // 容量
    pub const DEFAULT_DAILY_CAPACITY_H: &str = "default_daily_capacity_h";

    // 资质
    pub const CERT_EXPIRY_HORIZON_DAYS: &str = "cert_expiry_horizon_days";
}
