// ==========================================
// 物流ERP资源调度系统 - 冲突检测引擎
// ==========================================
// 职责: 候选排期区间的冲突检测入口
// 输入: 既有指派快照 + 不可用记录快照(由调用方按资源/窗口预过滤加载)
// 输出: 冲突报告(含逐条原因)
// 红线: 不直接读写库,只计算和返回结果
// 红线: 正常输入(空集合、无预订)下永不失败,冲突只通过返回值表达
// ==========================================

use crate::domain::assignment::ResourceAssignment;
use crate::domain::availability::ResourceAvailability;
use crate::engine::conflict_core::{ConflictCore, ConflictReport};
use chrono::NaiveDate;
use tracing::instrument;

// ==========================================
// ConflictDetector - 冲突检测引擎
// ==========================================
// 无内部状态,全部判定委托给 ConflictCore 纯函数,
// 引擎层补充决策原因的结构化日志
#[derive(Debug, Default)]
pub struct ConflictDetector;

impl ConflictDetector {
    /// 创建新的 ConflictDetector 实例
    pub fn new() -> Self {
        Self
    }

    /// 检测候选区间在指定资源上的排期冲突
    ///
    /// # 参数
    /// - resource_id: 目标资源
    /// - start_date/end_date: 候选闭区间
    /// - assignments/unavailability: 数据快照
    ///
    /// # 返回
    /// - ConflictReport: 冲突标志 + 逐条冲突明细
    #[instrument(skip(self, assignments, unavailability), fields(resource_id = %resource_id))]
    pub fn detect(
        &self,
        resource_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        assignments: &[ResourceAssignment],
        unavailability: &[ResourceAvailability],
    ) -> ConflictReport {
        let report = ConflictCore::detect_conflicts(
            resource_id,
            start_date,
            end_date,
            assignments,
            unavailability,
        );

        if report.has_conflict {
            tracing::debug!(
                conflict_count = report.conflicts.len(),
                "候选区间 [{} ~ {}] 检出冲突",
                start_date,
                end_date
            );
            for conflict in &report.conflicts {
                tracing::debug!("  - {}", conflict.reason);
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{AssignmentStatus, ConflictType, UnavailabilityType};
    use chrono::Utc;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn assignment(id: &str, start: NaiveDate, end: NaiveDate) -> ResourceAssignment {
        ResourceAssignment {
            assignment_id: id.to_string(),
            resource_id: "R001".to_string(),
            target_id: "JOB-001".to_string(),
            start_date: start,
            end_date: end,
            planned_hours: None,
            status: AssignmentStatus::Scheduled,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_detect_reports_assignment_conflict() {
        let detector = ConflictDetector::new();
        let existing = vec![assignment("A001", d(2025, 6, 1), d(2025, 6, 10))];

        let report = detector.detect("R001", d(2025, 6, 5), d(2025, 6, 7), &existing, &[]);
        assert!(report.has_conflict);
        assert_eq!(report.conflicts[0].conflict_type, ConflictType::Assignment);

        let report = detector.detect("R001", d(2025, 7, 1), d(2025, 7, 5), &existing, &[]);
        assert!(!report.has_conflict);
    }

    #[test]
    fn test_detect_reports_unavailability_conflict() {
        let detector = ConflictDetector::new();
        let off = vec![ResourceAvailability::full_day_off(
            "R001",
            d(2025, 6, 15),
            UnavailabilityType::Leave,
        )];

        let report = detector.detect("R001", d(2025, 6, 15), d(2025, 6, 15), &[], &off);
        assert!(report.has_conflict);
        assert_eq!(
            report.conflicts[0].unavailability_type,
            Some(UnavailabilityType::Leave)
        );
    }

    #[test]
    fn test_detect_never_fails_on_empty_input() {
        let detector = ConflictDetector::new();
        let report = detector.detect("R001", d(2025, 6, 1), d(2025, 6, 30), &[], &[]);
        assert!(!report.has_conflict);
        assert!(report.conflicts.is_empty());
    }
}
