// ==========================================
// 物流ERP资源调度系统 - 工程资源数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: 编码序号的读取与插入必须在同一事务内完成,
//       否则并发建档会产生重复编码
// ==========================================

use crate::domain::resource::{Certification, EngineeringResource};
use crate::domain::types::ResourceType;
use crate::engine::code_generator::ResourceCodeGenerator;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// ResourceRepository - 工程资源仓储
// ==========================================

/// 工程资源仓储
/// 职责: 管理 engineering_resource 表的数据访问
pub struct ResourceRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ResourceRepository {
    /// 创建新的资源仓储实例
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

    /// 行映射
    fn map_row(row: &Row) -> SqliteResult<EngineeringResource> {
        let type_str: String = row.get(3)?;
        let resource_type = ResourceType::from_str(&type_str).ok_or_else(|| {
            rusqlite::Error::InvalidColumnType(
                3,
                "resource_type".to_string(),
                rusqlite::types::Type::Text,
            )
        })?;
        let skills_json: String = row.get(5)?;
        let certs_json: String = row.get(6)?;

        Ok(EngineeringResource {
            resource_id: row.get(0)?,
            resource_code: row.get(1)?,
            name: row.get(2)?,
            resource_type,
            daily_capacity_h: row.get(4)?,
            skills: serde_json::from_str::<Vec<String>>(&skills_json).unwrap_or_default(),
            certifications: serde_json::from_str::<Vec<Certification>>(&certs_json)
                .unwrap_or_default(),
            is_available: row.get(7)?,
            is_active: row.get(8)?,
            created_at: Self::parse_timestamp(&row.get::<_, String>(9)?),
            updated_at: Self::parse_timestamp(&row.get::<_, String>(10)?),
        })
    }

    fn parse_timestamp(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    const SELECT_COLUMNS: &'static str = r#"
        resource_id, resource_code, name, resource_type, daily_capacity_h,
        skills, certifications, is_available, is_active, created_at, updated_at
    "#;

    /// 插入资源记录(编码已由调用方确定)
    pub fn insert(&self, resource: &EngineeringResource) -> RepositoryResult<()> {
        if resource.daily_capacity_h <= 0.0 {
            return Err(RepositoryError::FieldValueError {
                field: "daily_capacity_h".to_string(),
                message: "日容量必须为正数".to_string(),
            });
        }
        if !resource.code_matches_type() {
            return Err(RepositoryError::FieldValueError {
                field: "resource_code".to_string(),
                message: format!(
                    "编码 {} 与资源类型 {} 前缀不符",
                    resource.resource_code, resource.resource_type
                ),
            });
        }

        let conn = self.get_conn()?;
        Self::insert_with(&conn, resource)?;
        Ok(())
    }

    fn insert_with(conn: &Connection, resource: &EngineeringResource) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO engineering_resource (
                resource_id, resource_code, name, resource_type, daily_capacity_h,
                skills, certifications, is_available, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                resource.resource_id,
                resource.resource_code,
                resource.name,
                resource.resource_type.to_db_str(),
                resource.daily_capacity_h,
                serde_json::to_string(&resource.skills)
                    .map_err(|e| RepositoryError::InternalError(e.to_string()))?,
                serde_json::to_string(&resource.certifications)
                    .map_err(|e| RepositoryError::InternalError(e.to_string()))?,
                resource.is_available,
                resource.is_active,
                resource.created_at.to_rfc3339(),
                resource.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 建档并生成编码(原子操作)
    ///
    /// # 说明
    /// 读取既有编码、推导序号、插入新记录在同一事务内完成,
    /// 并发建档时后到者会在写锁上等待,不会产生重复编码
    pub fn create_with_generated_code(
        &self,
        name: &str,
        resource_type: ResourceType,
        daily_capacity_h: f64,
        skills: Vec<String>,
        certifications: Vec<Certification>,
    ) -> RepositoryResult<EngineeringResource> {
        if daily_capacity_h <= 0.0 {
            return Err(RepositoryError::FieldValueError {
                field: "daily_capacity_h".to_string(),
                message: "日容量必须为正数".to_string(),
            });
        }

        let conn = self.get_conn()?;

        // BEGIN IMMEDIATE: 序号读取与插入需要持有写锁
        conn.execute("BEGIN IMMEDIATE TRANSACTION", [])?;

        let result = (|| -> RepositoryResult<EngineeringResource> {
            let codes = Self::list_codes_by_type_with(&conn, resource_type)?;
            let sequence = ResourceCodeGenerator::next_sequence(&codes, resource_type);
            let code = ResourceCodeGenerator::generate_code(resource_type, sequence);

            let now = Utc::now();
            let resource = EngineeringResource {
                resource_id: Uuid::new_v4().to_string(),
                resource_code: code,
                name: name.to_string(),
                resource_type,
                daily_capacity_h,
                skills,
                certifications,
                is_available: true,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            Self::insert_with(&conn, &resource)?;
            Ok(resource)
        })();

        match result {
            Ok(resource) => {
                conn.execute("COMMIT", [])?;
                Ok(resource)
            }
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                Err(e)
            }
        }
    }

    /// 按ID查询资源
    pub fn find_by_id(&self, resource_id: &str) -> RepositoryResult<Option<EngineeringResource>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM engineering_resource WHERE resource_id = ?1",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let resource = stmt
            .query_row(params![resource_id], Self::map_row)
            .optional()?;
        Ok(resource)
    }

    /// 按编码查询资源(导入场景以编码对账)
    pub fn find_by_code(&self, resource_code: &str) -> RepositoryResult<Option<EngineeringResource>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM engineering_resource WHERE resource_code = ?1",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let resource = stmt
            .query_row(params![resource_code], Self::map_row)
            .optional()?;
        Ok(resource)
    }

    /// 查询全部在役资源
    pub fn find_all_active(&self) -> RepositoryResult<Vec<EngineeringResource>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM engineering_resource WHERE is_active = 1 ORDER BY resource_code",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let resources = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<EngineeringResource>>>()?;
        Ok(resources)
    }

    /// 列出指定类型的全部资源编码(含退役资源,编码不复用)
    pub fn list_codes_by_type(&self, resource_type: ResourceType) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        Self::list_codes_by_type_with(&conn, resource_type)
    }

    fn list_codes_by_type_with(
        conn: &Connection,
        resource_type: ResourceType,
    ) -> RepositoryResult<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT resource_code FROM engineering_resource WHERE resource_type = ?1",
        )?;
        let codes = stmt
            .query_map(params![resource_type.to_db_str()], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<SqliteResult<Vec<String>>>()?;
        Ok(codes)
    }

    /// 更新在役标志(退役/复役)
    pub fn set_active(&self, resource_id: &str, is_active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE engineering_resource SET is_active = ?2, updated_at = ?3 WHERE resource_id = ?1",
            params![resource_id, is_active, Utc::now().to_rfc3339()],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "EngineeringResource".to_string(),
                id: resource_id.to_string(),
            });
        }
        Ok(())
    }
}
