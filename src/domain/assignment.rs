// ==========================================
// 物流ERP资源调度系统 - 资源指派领域模型
// ==========================================
// 职责: 定义日期区间上的资源占用记录
// 红线: 闭区间语义 [start_date, end_date],含两端
// 红线: 记录永不物理删除,取消通过状态变更表达
// ==========================================

use crate::domain::types::AssignmentStatus;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ResourceAssignment - 资源指派
// ==========================================
// target_id 指向工单/项目/任务,对调度核心不透明
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceAssignment {
    // ===== 主键 =====
    pub assignment_id: String,            // 指派ID (uuid)

    // ===== 关联 =====
    pub resource_id: String,              // 资源ID
    pub target_id: String,                // 工作对象ID(对核心不透明)

    // ===== 占用区间 =====
    pub start_date: NaiveDate,            // 起始日期(含)
    pub end_date: NaiveDate,              // 结束日期(含), end_date >= start_date
    pub planned_hours: Option<f64>,       // 计划工时(缺失时按资源日容量推导)

    // ===== 状态 =====
    pub status: AssignmentStatus,

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResourceAssignment {
    /// 指派是否覆盖指定日期(闭区间)
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// 区间总天数(闭区间,含两端)
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// 是否为单日指派
    ///
    /// 单日指派的工时视为显式钉在该日期上,
    /// 即使该日期是非工作日也照常计入占用
    pub fn is_single_day(&self) -> bool {
        self.start_date == self.end_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(start: (i32, u32, u32), end: (i32, u32, u32)) -> ResourceAssignment {
        ResourceAssignment {
            assignment_id: "A001".to_string(),
            resource_id: "R001".to_string(),
            target_id: "JOB-2025-001".to_string(),
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            planned_hours: None,
            status: AssignmentStatus::Scheduled,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_covers_closed_interval() {
        let a = assignment((2025, 6, 1), (2025, 6, 10));
        assert!(a.covers(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()));
        assert!(a.covers(NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()));
        assert!(a.covers(NaiveDate::from_ymd_opt(2025, 6, 5).unwrap()));
        assert!(!a.covers(NaiveDate::from_ymd_opt(2025, 5, 31).unwrap()));
        assert!(!a.covers(NaiveDate::from_ymd_opt(2025, 6, 11).unwrap()));
    }

    #[test]
    fn test_duration_days_inclusive() {
        assert_eq!(assignment((2025, 6, 1), (2025, 6, 10)).duration_days(), 10);
        assert_eq!(assignment((2025, 6, 1), (2025, 6, 1)).duration_days(), 1);
    }

    #[test]
    fn test_single_day() {
        assert!(assignment((2025, 6, 1), (2025, 6, 1)).is_single_day());
        assert!(!assignment((2025, 6, 1), (2025, 6, 2)).is_single_day());
    }
}
