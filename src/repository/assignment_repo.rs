// ==========================================
// 物流ERP资源调度系统 - 资源指派数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: 指派无 DELETE 路径,取消通过 status 变更表达(保留审计历史)
// ==========================================

use crate::domain::assignment::ResourceAssignment;
use crate::domain::types::AssignmentStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// AssignmentRepository - 资源指派仓储
// ==========================================

/// 资源指派仓储
/// 职责: 管理 resource_assignment 表的数据访问
pub struct AssignmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AssignmentRepository {
    /// 创建新的指派仓储实例
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
        assignment_id, resource_id, target_id, start_date, end_date,
        planned_hours, status, created_at, updated_at
    "#;

    /// 行映射
    fn map_row(row: &Row) -> SqliteResult<ResourceAssignment> {
        let status_str: String = row.get(6)?;
        let status = AssignmentStatus::from_str(&status_str).ok_or_else(|| {
            rusqlite::Error::InvalidColumnType(
                6,
                "status".to_string(),
                rusqlite::types::Type::Text,
            )
        })?;

        Ok(ResourceAssignment {
            assignment_id: row.get(0)?,
            resource_id: row.get(1)?,
            target_id: row.get(2)?,
            start_date: Self::parse_date(&row.get::<_, String>(3)?),
            end_date: Self::parse_date(&row.get::<_, String>(4)?),
            planned_hours: row.get(5)?,
            status,
            created_at: Self::parse_timestamp(&row.get::<_, String>(7)?),
            updated_at: Self::parse_timestamp(&row.get::<_, String>(8)?),
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

    /// 插入指派记录
    pub fn insert(&self, assignment: &ResourceAssignment) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::insert_with(&conn, assignment)
    }

    /// 在既有连接/事务上插入指派记录
    ///
    /// 供预订工作流在"检测-插入"同一事务内复用
    pub fn insert_with(conn: &Connection, assignment: &ResourceAssignment) -> RepositoryResult<()> {
        if assignment.end_date < assignment.start_date {
            return Err(RepositoryError::FieldValueError {
                field: "end_date".to_string(),
                message: "结束日期不能早于起始日期".to_string(),
            });
        }

        conn.execute(
            r#"
            INSERT INTO resource_assignment (
                assignment_id, resource_id, target_id, start_date, end_date,
                planned_hours, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                assignment.assignment_id,
                assignment.resource_id,
                assignment.target_id,
                assignment.start_date.format("%Y-%m-%d").to_string(),
                assignment.end_date.format("%Y-%m-%d").to_string(),
                assignment.planned_hours,
                assignment.status.to_db_str(),
                assignment.created_at.to_rfc3339(),
                assignment.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 按ID查询指派
    pub fn find_by_id(&self, assignment_id: &str) -> RepositoryResult<Option<ResourceAssignment>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM resource_assignment WHERE assignment_id = ?1",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let assignment = stmt
            .query_row(params![assignment_id], Self::map_row)
            .optional()?;
        Ok(assignment)
    }

    /// 查询资源的全部指派(含历史状态,按起始日期排序)
    pub fn find_by_resource(&self, resource_id: &str) -> RepositoryResult<Vec<ResourceAssignment>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM resource_assignment WHERE resource_id = ?1 ORDER BY start_date, assignment_id",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let assignments = stmt
            .query_map(params![resource_id], Self::map_row)?
            .collect::<SqliteResult<Vec<ResourceAssignment>>>()?;
        Ok(assignments)
    }

    /// 查询资源在窗口内的活动指派
    ///
    /// 大数据量场景下的预过滤入口: 状态活动且区间与窗口相交
    pub fn find_active_in_window(
        &self,
        resource_id: &str,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> RepositoryResult<Vec<ResourceAssignment>> {
        let conn = self.get_conn()?;
        Self::find_active_in_window_with(&conn, resource_id, window_start, window_end)
    }

    /// 在既有连接/事务上执行窗口查询
    pub fn find_active_in_window_with(
        conn: &Connection,
        resource_id: &str,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> RepositoryResult<Vec<ResourceAssignment>> {
        let sql = format!(
            r#"
            SELECT {} FROM resource_assignment
            WHERE resource_id = ?1
              AND status IN ('SCHEDULED', 'IN_PROGRESS')
              AND start_date <= ?3
              AND end_date >= ?2
            ORDER BY start_date, assignment_id
            "#,
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let assignments = stmt
            .query_map(
                params![
                    resource_id,
                    window_start.format("%Y-%m-%d").to_string(),
                    window_end.format("%Y-%m-%d").to_string(),
                ],
                Self::map_row,
            )?
            .collect::<SqliteResult<Vec<ResourceAssignment>>>()?;
        Ok(assignments)
    }

    /// 状态转换(生命周期变更入口)
    ///
    /// # 说明
    /// 非法转换返回 InvalidStateTransition;
    /// 取消走本入口(status=CANCELLED),不存在物理删除
    pub fn transition_status(
        &self,
        assignment_id: &str,
        target: AssignmentStatus,
    ) -> RepositoryResult<ResourceAssignment> {
        let current = self
            .find_by_id(assignment_id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "ResourceAssignment".to_string(),
                id: assignment_id.to_string(),
            })?;

        if !current.status.can_transition_to(target) {
            return Err(RepositoryError::InvalidStateTransition {
                from: current.status.to_string(),
                to: target.to_string(),
            });
        }

        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE resource_assignment SET status = ?2, updated_at = ?3 WHERE assignment_id = ?1",
            params![
                assignment_id,
                target.to_db_str(),
                Utc::now().to_rfc3339()
            ],
        )?;

        Ok(ResourceAssignment {
            status: target,
            updated_at: Utc::now(),
            ..current
        })
    }
}
