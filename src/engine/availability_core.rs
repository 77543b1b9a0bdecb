// ==========================================
// 物流ERP资源调度系统 - Availability Core 纯函数库
// ==========================================
// 职责: 提供按日可用工时、占用工时、利用率、超配判定的纯逻辑
// 红线: 无状态、无副作用、无 I/O 操作
// 红线: remaining_hours = available_hours - assigned_hours 恒成立
// 红线: 利用率除零采用饱和策略(返回0),不是错误
// ==========================================

use crate::domain::assignment::ResourceAssignment;
use crate::domain::availability::ResourceAvailability;
use crate::domain::resource::EngineeringResource;
use crate::domain::types::UnavailabilityType;
use crate::engine::calendar::WorkCalendar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// DailyAvailability - 单日可用性结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyAvailability {
    pub is_available: bool,
    pub available_hours: f64,
    pub assigned_hours: f64,
    pub remaining_hours: f64,
    /// 存在显式不可用记录时的原因分类
    pub unavailability_type: Option<UnavailabilityType>,
}

// ==========================================
// OverAllocationCheck - 超配检查结果
// ==========================================
// 超配为预警性质,不硬性阻断,是否拒绝由调用方决定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverAllocationCheck {
    pub is_over_allocated: bool,
    /// 超出可用工时的小时数(仅超配时为正值)
    pub excess_hours: f64,
}

// ==========================================
// CalendarCell - 日历单元格投影
// ==========================================
// 供前端日历视图直接渲染的按日汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarCell {
    pub resource_id: String,
    pub date: NaiveDate,
    pub is_available: bool,
    pub available_hours: f64,
    pub assigned_hours: f64,
    pub remaining_hours: f64,
    pub unavailability_type: Option<UnavailabilityType>,
    pub is_over_allocated: bool,
}

// ==========================================
// AvailabilityCore - 纯函数工具类
// ==========================================
pub struct AvailabilityCore;

impl AvailabilityCore {
    /// 计算指派在指定日期上占用的工时
    ///
    /// # 规则
    /// 1. 未覆盖该日期或状态非活动 → 0
    /// 2. 单日指派且显式给定 planned_hours → 原样计入(即使该日为非工作日)
    /// 3. 非工作日 → 区间型指派不计入占用
    /// 4. 有 planned_hours 的区间指派 → 均摊到区间内的工作日
    /// 5. 无 planned_hours → 按资源日容量推导
    ///
    /// # 参数
    /// - daily_capacity_h: 资源日容量(工时推导基准)
    pub fn assignment_hours_on(
        assignment: &ResourceAssignment,
        date: NaiveDate,
        daily_capacity_h: f64,
        calendar: &WorkCalendar,
    ) -> f64 {
        if !assignment.status.is_active() || !assignment.covers(date) {
            return 0.0;
        }

        // 单日指派显式钉定工时,不受工作日历限制
        if assignment.is_single_day() {
            if let Some(hours) = assignment.planned_hours {
                return hours;
            }
        }

        if !calendar.is_working_day(date) {
            return 0.0;
        }

        match assignment.planned_hours {
            Some(total) => {
                let working_days =
                    calendar.working_days_in_range(assignment.start_date, assignment.end_date);
                if working_days <= 0 {
                    // 纯非工作日区间无法均摊,饱和为0
                    0.0
                } else {
                    total / working_days as f64
                }
            }
            None => daily_capacity_h,
        }
    }

    /// 汇总指定资源在指定日期的占用工时
    pub fn assigned_hours_on(
        resource: &EngineeringResource,
        date: NaiveDate,
        assignments: &[ResourceAssignment],
        calendar: &WorkCalendar,
    ) -> f64 {
        assignments
            .iter()
            .filter(|a| a.resource_id == resource.resource_id)
            .map(|a| Self::assignment_hours_on(a, date, resource.daily_capacity_h, calendar))
            .sum()
    }

    /// 计算指定资源在指定日期的可用性
    ///
    /// # 规则
    /// 1. 存在 (resource, date) 不可用记录 → 记录覆盖日历口径
    ///    (is_available=false 时可用工时为0; 部分可用时为记录值)
    /// 2. 无记录且为工作日 → 按日容量全量可用
    /// 3. 无记录且为非工作日 → 不可用,可用工时为0
    /// 4. remaining_hours = available_hours - assigned_hours (恒等式)
    pub fn check_availability(
        resource: &EngineeringResource,
        date: NaiveDate,
        assignments: &[ResourceAssignment],
        unavailability: &[ResourceAvailability],
        calendar: &WorkCalendar,
    ) -> DailyAvailability {
        let record = unavailability
            .iter()
            .find(|r| r.resource_id == resource.resource_id && r.date == date);

        let (is_available, available_hours, unavailability_type) = match record {
            Some(record) => {
                let hours = if record.is_available {
                    record.available_hours
                } else {
                    0.0
                };
                (
                    record.is_available && hours > 0.0,
                    hours,
                    Some(record.unavailability_type),
                )
            }
            None => {
                if calendar.is_working_day(date) {
                    (true, resource.daily_capacity_h, None)
                } else {
                    (false, 0.0, None)
                }
            }
        };

        let assigned_hours = Self::assigned_hours_on(resource, date, assignments, calendar);

        DailyAvailability {
            is_available,
            available_hours,
            assigned_hours,
            remaining_hours: available_hours - assigned_hours,
            unavailability_type,
        }
    }

    /// 计算利用率百分比
    ///
    /// # 规则
    /// - available <= 0 → 0 (饱和策略,避免除零;这是既定口径,不是错误)
    /// - 否则 → (assigned / available) * 100
    pub fn calculate_utilization(assigned_hours: f64, available_hours: f64) -> f64 {
        if available_hours <= 0.0 {
            return 0.0;
        }
        (assigned_hours / available_hours) * 100.0
    }

    /// 利用率是否超配
    ///
    /// 严格大于100%才算超配,恰好100%为满载
    pub fn is_over_allocated(utilization_pct: f64) -> bool {
        utilization_pct > 100.0
    }

    /// 检测新增工时后是否超配(预警,不阻断)
    ///
    /// # 规则
    /// - excess = assigned + additional - available
    /// - excess > 0 → 超配,返回超出工时
    /// - 否则 → 不超配, excess_hours=0
    pub fn detect_over_allocation(
        resource: &EngineeringResource,
        date: NaiveDate,
        additional_hours: f64,
        assignments: &[ResourceAssignment],
        unavailability: &[ResourceAvailability],
        calendar: &WorkCalendar,
    ) -> OverAllocationCheck {
        let availability =
            Self::check_availability(resource, date, assignments, unavailability, calendar);
        let excess =
            availability.assigned_hours + additional_hours - availability.available_hours;

        if excess > 0.0 {
            OverAllocationCheck {
                is_over_allocated: true,
                excess_hours: excess,
            }
        } else {
            OverAllocationCheck {
                is_over_allocated: false,
                excess_hours: 0.0,
            }
        }
    }

    /// 生成日历单元格投影
    pub fn generate_calendar_cell(
        resource: &EngineeringResource,
        date: NaiveDate,
        assignments: &[ResourceAssignment],
        unavailability: &[ResourceAvailability],
        calendar: &WorkCalendar,
    ) -> CalendarCell {
        let availability =
            Self::check_availability(resource, date, assignments, unavailability, calendar);
        let utilization = Self::calculate_utilization(
            availability.assigned_hours,
            availability.available_hours,
        );

        CalendarCell {
            resource_id: resource.resource_id.clone(),
            date,
            is_available: availability.is_available,
            available_hours: availability.available_hours,
            assigned_hours: availability.assigned_hours,
            remaining_hours: availability.remaining_hours,
            unavailability_type: availability.unavailability_type,
            is_over_allocated: Self::is_over_allocated(utilization),
        }
    }

    /// 计算整段指派区间的计划工时
    ///
    /// # 规则
    /// planned_hours = 区间内工作日天数 × 日容量
    /// 日容量为0 → 无论区间多长,计划工时为0
    pub fn calculate_planned_hours(
        start_date: NaiveDate,
        end_date: NaiveDate,
        daily_capacity_h: f64,
        calendar: &WorkCalendar,
    ) -> f64 {
        if daily_capacity_h <= 0.0 {
            return 0.0;
        }
        calendar.working_days_in_range(start_date, end_date) as f64 * daily_capacity_h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{AssignmentStatus, ResourceType};
    use chrono::Utc;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn resource(daily_capacity_h: f64) -> EngineeringResource {
        EngineeringResource {
            resource_id: "R001".to_string(),
            resource_code: "EQP0001".to_string(),
            name: "25吨汽车吊".to_string(),
            resource_type: ResourceType::Equipment,
            daily_capacity_h,
            skills: vec![],
            certifications: vec![],
            is_available: true,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn assignment(
        id: &str,
        start: NaiveDate,
        end: NaiveDate,
        planned_hours: Option<f64>,
    ) -> ResourceAssignment {
        ResourceAssignment {
            assignment_id: id.to_string(),
            resource_id: "R001".to_string(),
            target_id: "JOB-2025-001".to_string(),
            start_date: start,
            end_date: end,
            planned_hours,
            status: AssignmentStatus::Scheduled,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    // ==========================================
    // 测试 1: 计划工时计算
    // ==========================================

    #[test]
    fn test_calculate_planned_hours_full_week() {
        let cal = WorkCalendar::default();
        // 2025-06-02(周一) ~ 2025-06-06(周五): 5个工作日 × 8h = 40h
        assert_eq!(
            AvailabilityCore::calculate_planned_hours(d(2025, 6, 2), d(2025, 6, 6), 8.0, &cal),
            40.0
        );
    }

    #[test]
    fn test_calculate_planned_hours_zero_capacity() {
        let cal = WorkCalendar::default();
        assert_eq!(
            AvailabilityCore::calculate_planned_hours(d(2025, 6, 2), d(2025, 6, 30), 0.0, &cal),
            0.0
        );
    }

    // ==========================================
    // 测试 2: 单日占用工时
    // ==========================================

    #[test]
    fn test_assignment_hours_derived_from_capacity() {
        let cal = WorkCalendar::default();
        let a = assignment("A001", d(2025, 6, 2), d(2025, 6, 6), None);
        // 无 planned_hours → 工作日按日容量计
        assert_eq!(
            AvailabilityCore::assignment_hours_on(&a, d(2025, 6, 3), 8.0, &cal),
            8.0
        );
        // 周末不计入
        assert_eq!(
            AvailabilityCore::assignment_hours_on(&a, d(2025, 6, 7), 8.0, &cal),
            0.0
        );
    }

    #[test]
    fn test_assignment_hours_spread_over_working_days() {
        let cal = WorkCalendar::default();
        // 2025-06-02 ~ 2025-06-08 覆盖5个工作日,20h 均摊 → 每工作日4h
        let a = assignment("A001", d(2025, 6, 2), d(2025, 6, 8), Some(20.0));
        assert_eq!(
            AvailabilityCore::assignment_hours_on(&a, d(2025, 6, 4), 8.0, &cal),
            4.0
        );
        // 区间内的周六不计入
        assert_eq!(
            AvailabilityCore::assignment_hours_on(&a, d(2025, 6, 7), 8.0, &cal),
            0.0
        );
    }

    #[test]
    fn test_single_day_assignment_pins_hours_on_weekend() {
        let cal = WorkCalendar::default();
        // 单日指派带显式工时 → 周六照常计入
        let a = assignment("A001", d(2025, 6, 7), d(2025, 6, 7), Some(6.0));
        assert_eq!(
            AvailabilityCore::assignment_hours_on(&a, d(2025, 6, 7), 8.0, &cal),
            6.0
        );
        // 单日但无显式工时 → 非工作日不计入
        let a = assignment("A002", d(2025, 6, 7), d(2025, 6, 7), None);
        assert_eq!(
            AvailabilityCore::assignment_hours_on(&a, d(2025, 6, 7), 8.0, &cal),
            0.0
        );
    }

    #[test]
    fn test_weekend_only_range_with_hours_saturates() {
        let cal = WorkCalendar::default();
        // 纯周末区间带总工时,无工作日可均摊 → 0 而非除零
        let a = assignment("A001", d(2025, 6, 7), d(2025, 6, 8), Some(16.0));
        assert_eq!(
            AvailabilityCore::assignment_hours_on(&a, d(2025, 6, 7), 8.0, &cal),
            0.0
        );
    }

    // ==========================================
    // 测试 3: 按日可用性
    // ==========================================

    #[test]
    fn test_check_availability_default_full_capacity() {
        let cal = WorkCalendar::default();
        let r = resource(8.0);
        let result = AvailabilityCore::check_availability(&r, d(2025, 6, 3), &[], &[], &cal);
        assert!(result.is_available);
        assert_eq!(result.available_hours, 8.0);
        assert_eq!(result.assigned_hours, 0.0);
        assert_eq!(result.remaining_hours, 8.0);
        assert_eq!(result.unavailability_type, None);
    }

    #[test]
    fn test_check_availability_weekend_default_zero() {
        let cal = WorkCalendar::default();
        let r = resource(8.0);
        let result = AvailabilityCore::check_availability(&r, d(2025, 6, 7), &[], &[], &cal);
        assert!(!result.is_available);
        assert_eq!(result.available_hours, 0.0);
    }

    #[test]
    fn test_check_availability_record_overrides() {
        let cal = WorkCalendar::default();
        let r = resource(8.0);

        // 整日休假
        let off = vec![ResourceAvailability::full_day_off(
            "R001",
            d(2025, 6, 3),
            UnavailabilityType::Leave,
        )];
        let result = AvailabilityCore::check_availability(&r, d(2025, 6, 3), &[], &off, &cal);
        assert!(!result.is_available);
        assert_eq!(result.available_hours, 0.0);
        assert_eq!(result.unavailability_type, Some(UnavailabilityType::Leave));

        // 半日维保
        let partial = vec![ResourceAvailability::reduced_hours(
            "R001",
            d(2025, 6, 3),
            4.0,
            UnavailabilityType::Maintenance,
        )];
        let result = AvailabilityCore::check_availability(&r, d(2025, 6, 3), &[], &partial, &cal);
        assert!(result.is_available);
        assert_eq!(result.available_hours, 4.0);
        assert_eq!(
            result.unavailability_type,
            Some(UnavailabilityType::Maintenance)
        );
    }

    #[test]
    fn test_remaining_hours_identity_holds() {
        let cal = WorkCalendar::default();
        let r = resource(8.0);
        let assignments = vec![
            assignment("A001", d(2025, 6, 2), d(2025, 6, 6), None),
            assignment("A002", d(2025, 6, 4), d(2025, 6, 4), Some(3.0)),
        ];
        let unavailability = vec![ResourceAvailability::reduced_hours(
            "R001",
            d(2025, 6, 5),
            4.0,
            UnavailabilityType::Maintenance,
        )];

        // 区间内逐日验证恒等式
        for date in WorkCalendar::expand_range(d(2025, 6, 1), d(2025, 6, 10)) {
            let result = AvailabilityCore::check_availability(
                &r,
                date,
                &assignments,
                &unavailability,
                &cal,
            );
            assert_eq!(
                result.remaining_hours,
                result.available_hours - result.assigned_hours,
                "remaining = available - assigned 必须恒成立 ({})",
                date
            );
        }
    }

    // ==========================================
    // 测试 4: 利用率与超配
    // ==========================================

    #[test]
    fn test_calculate_utilization() {
        assert_eq!(AvailabilityCore::calculate_utilization(4.0, 8.0), 50.0);
        assert_eq!(AvailabilityCore::calculate_utilization(8.0, 8.0), 100.0);
        assert_eq!(AvailabilityCore::calculate_utilization(12.0, 8.0), 150.0);
        // 除零饱和
        assert_eq!(AvailabilityCore::calculate_utilization(5.0, 0.0), 0.0);
        assert_eq!(AvailabilityCore::calculate_utilization(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_is_over_allocated_threshold() {
        assert!(!AvailabilityCore::is_over_allocated(99.9));
        assert!(!AvailabilityCore::is_over_allocated(100.0)); // 恰好满载不算超配
        assert!(AvailabilityCore::is_over_allocated(100.1));
    }

    #[test]
    fn test_detect_over_allocation() {
        let cal = WorkCalendar::default();
        let r = resource(8.0);
        let assignments = vec![assignment("A001", d(2025, 6, 3), d(2025, 6, 3), Some(6.0))];

        // 6 + 2 = 8 → 满载但不超配
        let check = AvailabilityCore::detect_over_allocation(
            &r,
            d(2025, 6, 3),
            2.0,
            &assignments,
            &[],
            &cal,
        );
        assert!(!check.is_over_allocated);
        assert_eq!(check.excess_hours, 0.0);

        // 6 + 5 = 11 → 超配3h
        let check = AvailabilityCore::detect_over_allocation(
            &r,
            d(2025, 6, 3),
            5.0,
            &assignments,
            &[],
            &cal,
        );
        assert!(check.is_over_allocated);
        assert_eq!(check.excess_hours, 3.0);
    }

    // ==========================================
    // 测试 5: 日历单元格
    // ==========================================

    #[test]
    fn test_generate_calendar_cell() {
        let cal = WorkCalendar::default();
        let r = resource(8.0);
        let assignments = vec![assignment("A001", d(2025, 6, 3), d(2025, 6, 3), Some(10.0))];

        let cell =
            AvailabilityCore::generate_calendar_cell(&r, d(2025, 6, 3), &assignments, &[], &cal);
        assert_eq!(cell.resource_id, "R001");
        assert_eq!(cell.date, d(2025, 6, 3));
        assert_eq!(cell.available_hours, 8.0);
        assert_eq!(cell.assigned_hours, 10.0);
        assert_eq!(cell.remaining_hours, -2.0);
        assert!(cell.is_over_allocated); // 10/8 = 125%
    }
}
