// ==========================================
// 物流ERP资源调度系统 - 可用性与利用率引擎
// ==========================================
// 职责: 按日/按区间计算可用工时、占用工时、利用率与超配预警
// 输入: 资源 + 指派快照 + 不可用记录快照
// 红线: 不直接读写库,只计算和返回结果
// 红线: 工作日历口径由配置决定,引擎内不得硬编码
// ==========================================

use crate::config::SchedulingConfigReader;
use crate::domain::assignment::ResourceAssignment;
use crate::domain::availability::ResourceAvailability;
use crate::domain::resource::EngineeringResource;
use crate::engine::availability_core::{
    AvailabilityCore, CalendarCell, DailyAvailability, OverAllocationCheck,
};
use crate::engine::calendar::WorkCalendar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;
use tracing::instrument;

// ==========================================
// UtilizationSummary - 区间利用率汇总
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtilizationSummary {
    pub resource_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_available_hours: f64,
    pub total_assigned_hours: f64,
    /// 区间总利用率(总占用/总可用,除零饱和为0)
    pub utilization_pct: f64,
    /// 超配日期列表(按日利用率 > 100%)
    pub over_allocated_dates: Vec<NaiveDate>,
}

// ==========================================
// AvailabilityEngine - 可用性与利用率引擎
// ==========================================
pub struct AvailabilityEngine<C>
where
    C: SchedulingConfigReader,
{
    config: Arc<C>,
}

impl<C> AvailabilityEngine<C>
where
    C: SchedulingConfigReader,
{
    /// 创建新的 AvailabilityEngine 实例
    pub fn new(config: Arc<C>) -> Self {
        Self { config }
    }

    /// 按配置口径构建工作日历
    async fn build_calendar(&self) -> Result<WorkCalendar, Box<dyn Error>> {
        let weekend = self.config.get_weekend_weekdays().await?;
        let holidays = self.config.get_holidays().await?;

        let mut calendar = WorkCalendar::with_weekend_days(&weekend);
        calendar.add_holidays(&holidays);
        Ok(calendar)
    }

    /// 计算资源在指定日期的可用性
    #[instrument(skip(self, resource, assignments, unavailability), fields(resource_id = %resource.resource_id))]
    pub async fn check_availability(
        &self,
        resource: &EngineeringResource,
        date: NaiveDate,
        assignments: &[ResourceAssignment],
        unavailability: &[ResourceAvailability],
    ) -> Result<DailyAvailability, Box<dyn Error>> {
        let calendar = self.build_calendar().await?;
        Ok(AvailabilityCore::check_availability(
            resource,
            date,
            assignments,
            unavailability,
            &calendar,
        ))
    }

    /// 检测新增工时后是否超配(预警,不阻断)
    pub async fn detect_over_allocation(
        &self,
        resource: &EngineeringResource,
        date: NaiveDate,
        additional_hours: f64,
        assignments: &[ResourceAssignment],
        unavailability: &[ResourceAvailability],
    ) -> Result<OverAllocationCheck, Box<dyn Error>> {
        let calendar = self.build_calendar().await?;
        let check = AvailabilityCore::detect_over_allocation(
            resource,
            date,
            additional_hours,
            assignments,
            unavailability,
            &calendar,
        );
        if check.is_over_allocated {
            tracing::warn!(
                resource_id = %resource.resource_id,
                excess_hours = check.excess_hours,
                "检测到超配: {} 超出 {:.1}h",
                date,
                check.excess_hours
            );
        }
        Ok(check)
    }

    /// 生成资源日历(区间内逐日单元格)
    #[instrument(skip(self, resource, assignments, unavailability), fields(resource_id = %resource.resource_id))]
    pub async fn resource_calendar(
        &self,
        resource: &EngineeringResource,
        start_date: NaiveDate,
        end_date: NaiveDate,
        assignments: &[ResourceAssignment],
        unavailability: &[ResourceAvailability],
    ) -> Result<Vec<CalendarCell>, Box<dyn Error>> {
        let calendar = self.build_calendar().await?;
        Ok(WorkCalendar::expand_range(start_date, end_date)
            .into_iter()
            .map(|date| {
                AvailabilityCore::generate_calendar_cell(
                    resource,
                    date,
                    assignments,
                    unavailability,
                    &calendar,
                )
            })
            .collect())
    }

    /// 计算区间利用率汇总
    pub async fn utilization_summary(
        &self,
        resource: &EngineeringResource,
        start_date: NaiveDate,
        end_date: NaiveDate,
        assignments: &[ResourceAssignment],
        unavailability: &[ResourceAvailability],
    ) -> Result<UtilizationSummary, Box<dyn Error>> {
        let cells = self
            .resource_calendar(resource, start_date, end_date, assignments, unavailability)
            .await?;

        let total_available_hours: f64 = cells.iter().map(|c| c.available_hours).sum();
        let total_assigned_hours: f64 = cells.iter().map(|c| c.assigned_hours).sum();
        let over_allocated_dates: Vec<NaiveDate> = cells
            .iter()
            .filter(|c| c.is_over_allocated)
            .map(|c| c.date)
            .collect();

        Ok(UtilizationSummary {
            resource_id: resource.resource_id.clone(),
            start_date,
            end_date,
            total_available_hours,
            total_assigned_hours,
            utilization_pct: AvailabilityCore::calculate_utilization(
                total_assigned_hours,
                total_available_hours,
            ),
            over_allocated_dates,
        })
    }

    /// 计算候选指派在指定日期上的占用工时(按配置日历口径)
    pub async fn candidate_hours_on(
        &self,
        resource: &EngineeringResource,
        candidate: &ResourceAssignment,
        date: NaiveDate,
    ) -> Result<f64, Box<dyn Error>> {
        let calendar = self.build_calendar().await?;
        Ok(AvailabilityCore::assignment_hours_on(
            candidate,
            date,
            resource.daily_capacity_h,
            &calendar,
        ))
    }

    /// 按配置日历计算整段区间的计划工时
    pub async fn planned_hours_for_range(
        &self,
        resource: &EngineeringResource,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<f64, Box<dyn Error>> {
        let calendar = self.build_calendar().await?;
        Ok(AvailabilityCore::calculate_planned_hours(
            start_date,
            end_date,
            resource.daily_capacity_h,
            &calendar,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{AssignmentStatus, ResourceType, UnavailabilityType};
    use chrono::Utc;

    // ==========================================
    // Mock ConfigReader
    // ==========================================
    struct MockConfigReader {
        holidays: Vec<NaiveDate>,
    }

    impl MockConfigReader {
        fn plain() -> Self {
            Self { holidays: vec![] }
        }
    }

    #[async_trait::async_trait]
    impl SchedulingConfigReader for MockConfigReader {
        async fn get_weekend_weekdays(&self) -> Result<Vec<u32>, Box<dyn Error>> {
            Ok(vec![5, 6])
        }

        async fn get_holidays(&self) -> Result<Vec<NaiveDate>, Box<dyn Error>> {
            Ok(self.holidays.clone())
        }

        async fn get_default_daily_capacity_h(&self) -> Result<f64, Box<dyn Error>> {
            Ok(8.0)
        }

        async fn get_cert_expiry_horizon_days(&self) -> Result<i64, Box<dyn Error>> {
            Ok(30)
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn resource() -> EngineeringResource {
        EngineeringResource {
            resource_id: "R001".to_string(),
            resource_code: "VEH0001".to_string(),
            name: "集装箱卡车1号".to_string(),
            resource_type: ResourceType::Vehicle,
            daily_capacity_h: 8.0,
            skills: vec![],
            certifications: vec![],
            is_available: true,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn assignment(start: NaiveDate, end: NaiveDate, hours: Option<f64>) -> ResourceAssignment {
        ResourceAssignment {
            assignment_id: "A001".to_string(),
            resource_id: "R001".to_string(),
            target_id: "JOB-001".to_string(),
            start_date: start,
            end_date: end,
            planned_hours: hours,
            status: AssignmentStatus::Scheduled,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_resource_calendar_week() {
        let engine = AvailabilityEngine::new(Arc::new(MockConfigReader::plain()));
        let r = resource();
        let assignments = vec![assignment(d(2025, 6, 2), d(2025, 6, 6), None)];

        let cells = engine
            .resource_calendar(&r, d(2025, 6, 2), d(2025, 6, 8), &assignments, &[])
            .await
            .unwrap();

        assert_eq!(cells.len(), 7);
        // 工作日: 满占用
        assert_eq!(cells[0].assigned_hours, 8.0);
        assert_eq!(cells[0].remaining_hours, 0.0);
        // 周六: 不可用且无占用
        assert!(!cells[5].is_available);
        assert_eq!(cells[5].assigned_hours, 0.0);
    }

    #[tokio::test]
    async fn test_utilization_summary() {
        let engine = AvailabilityEngine::new(Arc::new(MockConfigReader::plain()));
        let r = resource();
        // 每个工作日4h占用(20h均摊到5个工作日)
        let assignments = vec![assignment(d(2025, 6, 2), d(2025, 6, 6), Some(20.0))];

        let summary = engine
            .utilization_summary(&r, d(2025, 6, 2), d(2025, 6, 8), &assignments, &[])
            .await
            .unwrap();

        assert_eq!(summary.total_available_hours, 40.0);
        assert_eq!(summary.total_assigned_hours, 20.0);
        assert_eq!(summary.utilization_pct, 50.0);
        assert!(summary.over_allocated_dates.is_empty());
    }

    #[tokio::test]
    async fn test_utilization_summary_flags_over_allocated_dates() {
        let engine = AvailabilityEngine::new(Arc::new(MockConfigReader::plain()));
        let r = resource();
        let assignments = vec![
            assignment(d(2025, 6, 3), d(2025, 6, 3), Some(6.0)),
            ResourceAssignment {
                assignment_id: "A002".to_string(),
                ..assignment(d(2025, 6, 3), d(2025, 6, 3), Some(5.0))
            },
        ];

        let summary = engine
            .utilization_summary(&r, d(2025, 6, 2), d(2025, 6, 6), &assignments, &[])
            .await
            .unwrap();

        // 6/3 占用 11h > 8h
        assert_eq!(summary.over_allocated_dates, vec![d(2025, 6, 3)]);
    }

    #[tokio::test]
    async fn test_holiday_from_config_zeroes_availability() {
        let engine = AvailabilityEngine::new(Arc::new(MockConfigReader {
            holidays: vec![d(2025, 6, 4)],
        }));
        let r = resource();

        let result = engine
            .check_availability(&r, d(2025, 6, 4), &[], &[])
            .await
            .unwrap();
        assert!(!result.is_available);
        assert_eq!(result.available_hours, 0.0);
    }

    #[tokio::test]
    async fn test_planned_hours_for_range() {
        let engine = AvailabilityEngine::new(Arc::new(MockConfigReader::plain()));
        let r = resource();
        let hours = engine
            .planned_hours_for_range(&r, d(2025, 6, 2), d(2025, 6, 6))
            .await
            .unwrap();
        assert_eq!(hours, 40.0);
    }

    #[tokio::test]
    async fn test_detect_over_allocation_unavailable_day() {
        let engine = AvailabilityEngine::new(Arc::new(MockConfigReader::plain()));
        let r = resource();
        let off = vec![ResourceAvailability::full_day_off(
            "R001",
            d(2025, 6, 3),
            UnavailabilityType::Maintenance,
        )];

        // 可用0h,新增2h → 超配2h
        let check = engine
            .detect_over_allocation(&r, d(2025, 6, 3), 2.0, &[], &off)
            .await
            .unwrap();
        assert!(check.is_over_allocated);
        assert_eq!(check.excess_hours, 2.0);
    }
}
