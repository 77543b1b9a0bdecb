// ==========================================
// 物流ERP资源调度系统 - 调度业务接口
// ==========================================
// 职责: 预订工作流(校验 → 冲突检测 → 事务内插入)与日历/利用率查询
// 红线: 检测与插入构成 check-then-act 序列,提交前必须在同一事务内
//       重新执行冲突检测(乐观并发),命中即以可重试的预订冲突错误中止
// 红线: 超配为预警不阻断;是否放行由调用方决定
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, SchedulingConfigReader};
use crate::domain::assignment::ResourceAssignment;
use crate::domain::availability::ResourceAvailability;
use crate::domain::resource::{Certification, EngineeringResource};
use crate::domain::types::{AssignmentStatus, CertificationStatus, ResourceType, UnavailabilityType};
use crate::engine::availability::{AvailabilityEngine, UtilizationSummary};
use crate::engine::availability_core::{CalendarCell, DailyAvailability};
use crate::engine::conflict::ConflictDetector;
use crate::engine::conflict_core::ConflictCore;
use crate::engine::skill_filter::SkillFilter;
use crate::engine::validation::{
    validate_assignment_input, validate_unavailability_input, AssignmentInput, UnavailabilityInput,
};
use crate::repository::assignment_repo::AssignmentRepository;
use crate::repository::availability_repo::AvailabilityRepository;
use crate::repository::resource_repo::ResourceRepository;
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::instrument;
use uuid::Uuid;

// ==========================================
// BookingOutcome - 预订结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingOutcome {
    pub assignment: ResourceAssignment,
    /// 超配等预警信息(不阻断预订)
    pub warnings: Vec<String>,
}

// ==========================================
// SchedulingApi - 调度业务接口
// ==========================================
pub struct SchedulingApi {
    conn: Arc<Mutex<Connection>>,
    resource_repo: Arc<ResourceRepository>,
    assignment_repo: Arc<AssignmentRepository>,
    availability_repo: Arc<AvailabilityRepository>,
    config: Arc<ConfigManager>,
    conflict_detector: ConflictDetector,
    availability_engine: AvailabilityEngine<ConfigManager>,
}

fn db_err(err: rusqlite::Error) -> ApiError {
    ApiError::from(crate::repository::error::RepositoryError::from(err))
}

fn engine_err(err: Box<dyn std::error::Error>) -> ApiError {
    ApiError::InternalError(err.to_string())
}

impl SchedulingApi {
    /// 基于共享连接创建调度接口
    pub fn new(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        let config = Arc::new(
            ConfigManager::from_connection(Arc::clone(&conn))
                .map_err(|e| ApiError::InternalError(e.to_string()))?,
        );

        Ok(Self {
            resource_repo: Arc::new(ResourceRepository::from_connection(Arc::clone(&conn))),
            assignment_repo: Arc::new(AssignmentRepository::from_connection(Arc::clone(&conn))),
            availability_repo: Arc::new(AvailabilityRepository::from_connection(Arc::clone(&conn))),
            conflict_detector: ConflictDetector::new(),
            availability_engine: AvailabilityEngine::new(Arc::clone(&config)),
            config,
            conn,
        })
    }

    fn load_resource(&self, resource_id: &str) -> ApiResult<EngineeringResource> {
        self.resource_repo
            .find_by_id(resource_id)?
            .ok_or_else(|| ApiError::NotFound(format!("EngineeringResource(id={})不存在", resource_id)))
    }

    // ==========================================
    // 资源建档
    // ==========================================

    /// 建立资源档案(编码自动生成,读取序号与插入原子完成)
    #[instrument(skip(self, skills, certifications))]
    pub async fn create_resource(
        &self,
        name: &str,
        resource_type: &str,
        daily_capacity_h: Option<f64>,
        skills: Vec<String>,
        certifications: Vec<Certification>,
    ) -> ApiResult<EngineeringResource> {
        let resource_type = ResourceType::from_str(resource_type)
            .ok_or_else(|| ApiError::InvalidInput(format!("未知的资源类型: {}", resource_type)))?;

        let capacity = match daily_capacity_h {
            Some(hours) => hours,
            None => self
                .config
                .get_default_daily_capacity_h()
                .await
                .map_err(engine_err)?,
        };

        let resource = self.resource_repo.create_with_generated_code(
            name,
            resource_type,
            capacity,
            skills,
            certifications,
        )?;

        tracing::info!(
            resource_id = %resource.resource_id,
            resource_code = %resource.resource_code,
            "资源建档完成"
        );
        Ok(resource)
    }

    // ==========================================
    // 预订工作流
    // ==========================================

    /// 预订资源(创建指派)
    ///
    /// # 流程
    /// 1. 结构校验(累积全部字段错误)
    /// 2. 资源存在性与可接单检查
    /// 3. 事务内: 加载快照 → 冲突检测 → 插入
    ///    提交前的再次检测命中 → BookingConflict(可重试)
    /// 4. 超配检查仅产生预警,不阻断
    #[instrument(skip(self, input), fields(resource_id = %input.resource_id))]
    pub async fn book_assignment(&self, input: &AssignmentInput) -> ApiResult<BookingOutcome> {
        // === 步骤 1: 结构校验 ===
        let report = validate_assignment_input(input);
        if !report.is_valid {
            return Err(ApiError::ValidationFailed {
                reason: format!("{}个字段违规", report.errors.len()),
                errors: report.errors,
            });
        }
        let (start_date, end_date) = match (input.start_date, input.end_date) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(ApiError::InternalError(
                    "校验通过的输入缺失日期".to_string(),
                ))
            }
        };

        // === 步骤 2: 资源检查 ===
        let resource = self.load_resource(&input.resource_id)?;
        if !resource.accepts_new_assignments() {
            return Err(ApiError::BusinessRuleViolation(format!(
                "资源{}已停用或退役,不可接受新指派",
                resource.resource_code
            )));
        }

        let now = Utc::now();
        let assignment = ResourceAssignment {
            assignment_id: Uuid::new_v4().to_string(),
            resource_id: input.resource_id.clone(),
            target_id: input.target_id.clone(),
            start_date,
            end_date,
            planned_hours: input.planned_hours,
            status: AssignmentStatus::Scheduled,
            created_at: now,
            updated_at: now,
        };

        // === 步骤 3: 超配预警(事务外,只读) ===
        let warnings = self
            .over_allocation_warnings(&resource, &assignment)
            .await?;

        // === 步骤 4: 事务内检测并插入 ===
        {
            let conn = self
                .conn
                .lock()
                .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;

            conn.execute("BEGIN IMMEDIATE TRANSACTION", [])
                .map_err(db_err)?;

            let result = (|| -> ApiResult<()> {
                // 同一事务内重新加载快照并再次检测(乐观并发)
                let assignments = AssignmentRepository::find_active_in_window_with(
                    &conn,
                    &input.resource_id,
                    start_date,
                    end_date,
                )?;
                let unavailability = AvailabilityRepository::find_in_window_with(
                    &conn,
                    &input.resource_id,
                    start_date,
                    end_date,
                )?;

                let conflict_report = ConflictCore::detect_conflicts(
                    &input.resource_id,
                    start_date,
                    end_date,
                    &assignments,
                    &unavailability,
                );
                if conflict_report.has_conflict {
                    return Err(ApiError::BookingConflict {
                        resource_id: input.resource_id.clone(),
                        conflict_count: conflict_report.conflicts.len(),
                        conflicts: conflict_report.conflicts,
                    });
                }

                AssignmentRepository::insert_with(&conn, &assignment)?;
                Ok(())
            })();

            match result {
                Ok(()) => {
                    conn.execute("COMMIT", []).map_err(db_err)?;
                }
                Err(e) => {
                    let _ = conn.execute("ROLLBACK", []);
                    return Err(e);
                }
            }
        }

        tracing::info!(
            assignment_id = %assignment.assignment_id,
            "预订成功: [{} ~ {}], 预警{}条",
            start_date,
            end_date,
            warnings.len()
        );
        Ok(BookingOutcome {
            assignment,
            warnings,
        })
    }

    /// 逐日超配预警(预警不阻断)
    async fn over_allocation_warnings(
        &self,
        resource: &EngineeringResource,
        candidate: &ResourceAssignment,
    ) -> ApiResult<Vec<String>> {
        let assignments = self.assignment_repo.find_active_in_window(
            &resource.resource_id,
            candidate.start_date,
            candidate.end_date,
        )?;
        let unavailability = self.availability_repo.find_in_window(
            &resource.resource_id,
            candidate.start_date,
            candidate.end_date,
        )?;

        let mut warnings = Vec::new();
        let cells = self
            .availability_engine
            .resource_calendar(
                resource,
                candidate.start_date,
                candidate.end_date,
                &assignments,
                &unavailability,
            )
            .await
            .map_err(engine_err)?;

        for cell in cells {
            let additional = self
                .availability_engine
                .candidate_hours_on(resource, candidate, cell.date)
                .await
                .map_err(engine_err)?;
            if additional <= 0.0 {
                continue;
            }
            let check = self
                .availability_engine
                .detect_over_allocation(
                    resource,
                    cell.date,
                    additional,
                    &assignments,
                    &unavailability,
                )
                .await
                .map_err(engine_err)?;
            if check.is_over_allocated {
                warnings.push(format!(
                    "OVER_ALLOCATION: {} 超出可用工时 {:.1}h",
                    cell.date, check.excess_hours
                ));
            }
        }
        Ok(warnings)
    }

    /// 指派状态转换(开工/完工/取消)
    #[instrument(skip(self))]
    pub async fn transition_assignment(
        &self,
        assignment_id: &str,
        target_status: &str,
    ) -> ApiResult<ResourceAssignment> {
        let target = AssignmentStatus::from_str(target_status)
            .ok_or_else(|| ApiError::InvalidInput(format!("未知的指派状态: {}", target_status)))?;
        Ok(self.assignment_repo.transition_status(assignment_id, target)?)
    }

    /// 取消指派(状态变更,不物理删除)
    pub async fn cancel_assignment(&self, assignment_id: &str) -> ApiResult<ResourceAssignment> {
        Ok(self
            .assignment_repo
            .transition_status(assignment_id, AssignmentStatus::Cancelled)?)
    }

    // ==========================================
    // 不可用登记
    // ==========================================

    /// 登记不可用(休假/维保/节假日),按日 UPSERT
    #[instrument(skip(self, input), fields(resource_id = %input.resource_id))]
    pub async fn register_unavailability(&self, input: &UnavailabilityInput) -> ApiResult<usize> {
        let report = validate_unavailability_input(input);
        if !report.is_valid {
            return Err(ApiError::ValidationFailed {
                reason: format!("{}个字段违规", report.errors.len()),
                errors: report.errors,
            });
        }
        let unavailability_type = UnavailabilityType::from_str(&input.unavailability_type)
            .ok_or_else(|| {
                ApiError::InternalError("校验通过的输入携带未知不可用类型".to_string())
            })?;

        // 资源必须存在
        self.load_resource(&input.resource_id)?;

        let mut count = 0;
        for &date in &input.dates {
            let record = if input.is_available {
                ResourceAvailability::reduced_hours(
                    input.resource_id.clone(),
                    date,
                    input.available_hours,
                    unavailability_type,
                )
            } else {
                ResourceAvailability::full_day_off(
                    input.resource_id.clone(),
                    date,
                    unavailability_type,
                )
            };
            self.availability_repo.upsert(&record)?;
            count += 1;
        }

        tracing::info!("不可用登记完成: {}天", count);
        Ok(count)
    }

    /// 撤销不可用登记(恢复该日默认可用)
    pub async fn remove_unavailability(
        &self,
        resource_id: &str,
        date: NaiveDate,
    ) -> ApiResult<bool> {
        Ok(self.availability_repo.remove(resource_id, date)?)
    }

    // ==========================================
    // 日历与利用率查询
    // ==========================================

    /// 查询资源单日可用性
    pub async fn check_availability(
        &self,
        resource_id: &str,
        date: NaiveDate,
    ) -> ApiResult<DailyAvailability> {
        let resource = self.load_resource(resource_id)?;
        let assignments = self
            .assignment_repo
            .find_active_in_window(resource_id, date, date)?;
        let unavailability = self.availability_repo.find_in_window(resource_id, date, date)?;

        self.availability_engine
            .check_availability(&resource, date, &assignments, &unavailability)
            .await
            .map_err(engine_err)
    }

    /// 生成资源日历(供前端日历视图渲染)
    pub async fn get_resource_calendar(
        &self,
        resource_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> ApiResult<Vec<CalendarCell>> {
        let resource = self.load_resource(resource_id)?;
        let assignments = self
            .assignment_repo
            .find_active_in_window(resource_id, start_date, end_date)?;
        let unavailability = self
            .availability_repo
            .find_in_window(resource_id, start_date, end_date)?;

        self.availability_engine
            .resource_calendar(&resource, start_date, end_date, &assignments, &unavailability)
            .await
            .map_err(engine_err)
    }

    /// 批量生成多资源日历(排程看板的按组视图)
    ///
    /// 单个资源失败不拖垮整组,失败项以 NotFound/DatabaseError 跳过并记日志
    pub async fn get_group_calendar(
        &self,
        resource_ids: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> ApiResult<Vec<Vec<CalendarCell>>> {
        use futures::future::join_all;

        let results = join_all(
            resource_ids
                .iter()
                .map(|rid| self.get_resource_calendar(rid, start_date, end_date)),
        )
        .await;

        let mut calendars = Vec::with_capacity(results.len());
        for (rid, result) in resource_ids.iter().zip(results) {
            match result {
                Ok(cells) => calendars.push(cells),
                Err(e) => {
                    tracing::warn!(resource_id = %rid, "看板跳过资源: {}", e);
                }
            }
        }
        Ok(calendars)
    }

    /// 查询资源区间利用率汇总
    pub async fn get_utilization_summary(
        &self,
        resource_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> ApiResult<UtilizationSummary> {
        let resource = self.load_resource(resource_id)?;
        let assignments = self
            .assignment_repo
            .find_active_in_window(resource_id, start_date, end_date)?;
        let unavailability = self
            .availability_repo
            .find_in_window(resource_id, start_date, end_date)?;

        self.availability_engine
            .utilization_summary(&resource, start_date, end_date, &assignments, &unavailability)
            .await
            .map_err(engine_err)
    }

    /// 预估整段区间的计划工时(工作日 × 日容量)
    pub async fn estimate_planned_hours(
        &self,
        resource_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> ApiResult<f64> {
        let resource = self.load_resource(resource_id)?;
        self.availability_engine
            .planned_hours_for_range(&resource, start_date, end_date)
            .await
            .map_err(engine_err)
    }

    // ==========================================
    // 资源选择
    // ==========================================

    /// 按要求技能筛选在役资源 (AND 语义)
    pub async fn find_resources_by_skills(
        &self,
        required_skills: &[String],
    ) -> ApiResult<Vec<EngineeringResource>> {
        let resources = self.resource_repo.find_all_active()?;
        Ok(SkillFilter::filter_resources_by_skills(
            &resources,
            required_skills,
        ))
    }

    /// 资质预警: 列出持有临期/过期证书的在役资源
    pub async fn certification_warnings(
        &self,
        today: NaiveDate,
    ) -> ApiResult<Vec<(String, String, CertificationStatus)>> {
        let horizon = self
            .config
            .get_cert_expiry_horizon_days()
            .await
            .map_err(engine_err)?;
        let resources = self.resource_repo.find_all_active()?;
        Ok(SkillFilter::resources_with_expiring_certifications(
            &resources, today, horizon,
        ))
    }

    /// 对外暴露冲突检测(只读,供预订表单即时反馈)
    pub async fn detect_conflicts(
        &self,
        resource_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> ApiResult<crate::engine::conflict_core::ConflictReport> {
        let assignments = self
            .assignment_repo
            .find_active_in_window(resource_id, start_date, end_date)?;
        let unavailability = self
            .availability_repo
            .find_in_window(resource_id, start_date, end_date)?;

        Ok(self.conflict_detector.detect(
            resource_id,
            start_date,
            end_date,
            &assignments,
            &unavailability,
        ))
    }
}
