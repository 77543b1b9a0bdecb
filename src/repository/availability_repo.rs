// ==========================================
// 物流ERP资源调度系统 - 资源可用性数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: (resource_id, date) 唯一,重复登记走 UPSERT 覆盖
// 口径: 删除记录即恢复该日默认可用(稀疏表示)
// ==========================================

use crate::domain::availability::ResourceAvailability;
use crate::domain::types::UnavailabilityType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// AvailabilityRepository - 资源可用性仓储
// ==========================================

/// 资源可用性仓储
/// 职责: 管理 resource_availability 表的数据访问
pub struct AvailabilityRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AvailabilityRepository {
    /// 创建新的可用性仓储实例
    pub fn new(db_path: String) -> RepositoryResult<Self> {
        let conn = Connection::open(&db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    const SELECT_COLUMNS: &'static str = r#"
        resource_id, date, is_available, available_hours, unavailability_type,
        note, created_at, updated_at
    "#;

    /// 行映射
    fn map_row(row: &Row) -> SqliteResult<ResourceAvailability> {
        let type_str: String = row.get(4)?;
        let unavailability_type = UnavailabilityType::from_str(&type_str).ok_or_else(|| {
            rusqlite::Error::InvalidColumnType(
                4,
                "unavailability_type".to_string(),
                rusqlite::types::Type::Text,
            )
        })?;

        Ok(ResourceAvailability {
            resource_id: row.get(0)?,
            date: Self::parse_date(&row.get::<_, String>(1)?),
            is_available: row.get(2)?,
            available_hours: row.get(3)?,
            unavailability_type,
            note: row.get(5)?,
            created_at: Self::parse_timestamp(&row.get::<_, String>(6)?),
            updated_at: Self::parse_timestamp(&row.get::<_, String>(7)?),
        })
    }

    fn parse_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
    }

    fn parse_timestamp(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    /// 插入或更新可用性记录(UPSERT)
    pub fn upsert(&self, record: &ResourceAvailability) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO resource_availability (
                resource_id, date, is_available, available_hours,
                unavailability_type, note, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(resource_id, date) DO UPDATE SET
                is_available = ?3,
                available_hours = ?4,
                unavailability_type = ?5,
                note = ?6,
                updated_at = ?8
            "#,
            params![
                record.resource_id,
                record.date.format("%Y-%m-%d").to_string(),
                record.is_available,
                record.available_hours,
                record.unavailability_type.to_db_str(),
                record.note,
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 按 (资源, 日期) 查询单条记录
    pub fn find_by_resource_and_date(
        &self,
        resource_id: &str,
        date: NaiveDate,
    ) -> RepositoryResult<Option<ResourceAvailability>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM resource_availability WHERE resource_id = ?1 AND date = ?2",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let record = stmt
            .query_row(
                params![resource_id, date.format("%Y-%m-%d").to_string()],
                Self::map_row,
            )
            .optional()?;
        Ok(record)
    }

    /// 查询资源在窗口内的全部记录
    pub fn find_in_window(
        &self,
        resource_id: &str,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> RepositoryResult<Vec<ResourceAvailability>> {
        let conn = self.get_conn()?;
        Self::find_in_window_with(&conn, resource_id, window_start, window_end)
    }

    /// 在既有连接/事务上执行窗口查询
    pub fn find_in_window_with(
        conn: &Connection,
        resource_id: &str,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> RepositoryResult<Vec<ResourceAvailability>> {
        let sql = format!(
            r#"
            SELECT {} FROM resource_availability
            WHERE resource_id = ?1
              AND date BETWEEN ?2 AND ?3
            ORDER BY date
            "#,
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(
                params![
                    resource_id,
                    window_start.format("%Y-%m-%d").to_string(),
                    window_end.format("%Y-%m-%d").to_string(),
                ],
                Self::map_row,
            )?
            .collect::<SqliteResult<Vec<ResourceAvailability>>>()?;
        Ok(records)
    }

    /// 删除记录(恢复该日默认可用)
    pub fn remove(&self, resource_id: &str, date: NaiveDate) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM resource_availability WHERE resource_id = ?1 AND date = ?2",
            params![resource_id, date.format("%Y-%m-%d").to_string()],
        )?;
        Ok(affected > 0)
    }
}
