// ==========================================
// 物流ERP资源调度系统 - Conflict Core 纯函数库
// ==========================================
// 职责: 提供区间重叠判定与排期冲突检测的纯逻辑
// 红线: 无状态、无副作用、无 I/O 操作
// 红线: 闭区间语义,同日交接视为冲突
// ==========================================

use crate::domain::assignment::ResourceAssignment;
use crate::domain::availability::ResourceAvailability;
use crate::domain::types::{ConflictType, UnavailabilityType};
use crate::engine::calendar::WorkCalendar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ScheduleConflict - 单条冲突明细
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConflict {
    pub conflict_type: ConflictType,
    /// 冲突指派ID(仅 ASSIGNMENT 类型)
    pub assignment_id: Option<String>,
    /// 冲突日期(仅 UNAVAILABILITY 类型)
    pub date: Option<NaiveDate>,
    /// 不可用原因(仅 UNAVAILABILITY 类型)
    pub unavailability_type: Option<UnavailabilityType>,
    /// 冲突原因说明
    pub reason: String,
}

// ==========================================
// ConflictReport - 冲突检测结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictReport {
    pub has_conflict: bool,
    pub conflicts: Vec<ScheduleConflict>,
}

// ==========================================
// ConflictCore - 纯函数工具类
// ==========================================
pub struct ConflictCore;

impl ConflictCore {
    /// 闭区间重叠判定
    ///
    /// # 规则
    /// [a,b] 与 [c,d] 重叠 当且仅当 a <= d 且 c <= b
    /// 边界口径: 一段指派的结束日等于另一段的起始日 → 重叠(同日交接视为冲突)
    /// 需要背靠背排期的调用方应使用相邻但不重叠的日期(昨日结束/今日开始)
    pub fn ranges_overlap(
        a_start: NaiveDate,
        a_end: NaiveDate,
        b_start: NaiveDate,
        b_end: NaiveDate,
    ) -> bool {
        a_start <= b_end && b_start <= a_end
    }

    /// 检测候选区间在指定资源上的排期冲突
    ///
    /// # 规则
    /// 1. 仅 resource_id 匹配且状态为活动(SCHEDULED/IN_PROGRESS)的指派参与检测
    /// 2. 闭区间重叠的指派逐条记为 ASSIGNMENT 冲突
    /// 3. 候选区间逐日展开,存在 is_available=false 记录的日期记为 UNAVAILABILITY 冲突
    /// 4. 两类冲突可同时出现; 输出顺序确定: 指派冲突在前,不可用冲突按日期升序在后
    /// 5. 无指派且无不可用记录 → 无冲突(无数据即可用)
    ///
    /// # 参数
    /// - resource_id: 目标资源
    /// - start_date/end_date: 候选闭区间
    /// - assignments: 既有指派快照(可含其他资源,内部过滤)
    /// - unavailability: 不可用记录快照(可含其他资源,内部过滤)
    pub fn detect_conflicts(
        resource_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        assignments: &[ResourceAssignment],
        unavailability: &[ResourceAvailability],
    ) -> ConflictReport {
        let mut conflicts = Vec::new();

        // === 步骤 1: 指派重叠检测 ===
        for assignment in assignments {
            if assignment.resource_id != resource_id || !assignment.status.is_active() {
                continue;
            }
            if Self::ranges_overlap(
                start_date,
                end_date,
                assignment.start_date,
                assignment.end_date,
            ) {
                conflicts.push(ScheduleConflict {
                    conflict_type: ConflictType::Assignment,
                    assignment_id: Some(assignment.assignment_id.clone()),
                    date: None,
                    unavailability_type: None,
                    reason: format!(
                        "ASSIGNMENT_OVERLAP: {} [{} ~ {}] status={}",
                        assignment.assignment_id,
                        assignment.start_date,
                        assignment.end_date,
                        assignment.status
                    ),
                });
            }
        }

        // === 步骤 2: 显式不可用检测(逐日) ===
        for date in WorkCalendar::expand_range(start_date, end_date) {
            let record = unavailability
                .iter()
                .find(|r| r.resource_id == resource_id && r.date == date);
            if let Some(record) = record {
                if !record.is_available {
                    conflicts.push(ScheduleConflict {
                        conflict_type: ConflictType::Unavailability,
                        assignment_id: None,
                        date: Some(date),
                        unavailability_type: Some(record.unavailability_type),
                        reason: format!(
                            "UNAVAILABLE: {} type={}",
                            date, record.unavailability_type
                        ),
                    });
                }
            }
        }

        ConflictReport {
            has_conflict: !conflicts.is_empty(),
            conflicts,
        }
    }
}
