// ==========================================
// 物流ERP资源调度系统 - 资源可用性领域模型
// ==========================================
// 职责: 定义按日粒度的显式不可用记录
// 红线: 每个 (resource_id, date) 至多一条记录
// 红线: 无记录即默认可用(稀疏表示),不要求预填整本日历
// ==========================================

use crate::domain::types::UnavailabilityType;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ResourceAvailability - 资源可用性例外记录
// ==========================================
// is_available=false 表示该日完全不可用;
// is_available=true 且 available_hours 低于日容量表示部分可用
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceAvailability {
    // ===== 主键 (resource_id, date) =====
    pub resource_id: String,                     // 资源ID
    pub date: NaiveDate,                         // 日期

    // ===== 可用性 =====
    pub is_available: bool,                      // 该日是否可用
    pub available_hours: f64,                    // 该日可用工时(可为0)
    pub unavailability_type: UnavailabilityType, // 不可用原因分类

    // ===== 备注 =====
    pub note: Option<String>,

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResourceAvailability {
    /// 构造整日不可用记录
    pub fn full_day_off(
        resource_id: impl Into<String>,
        date: NaiveDate,
        unavailability_type: UnavailabilityType,
    ) -> Self {
        let now = Utc::now();
        Self {
            resource_id: resource_id.into(),
            date,
            is_available: false,
            available_hours: 0.0,
            unavailability_type,
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 构造部分可用记录(如半天维保)
    pub fn reduced_hours(
        resource_id: impl Into<String>,
        date: NaiveDate,
        available_hours: f64,
        unavailability_type: UnavailabilityType,
    ) -> Self {
        let now = Utc::now();
        Self {
            resource_id: resource_id.into(),
            date,
            is_available: available_hours > 0.0,
            available_hours,
            unavailability_type,
            note: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_day_off() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let rec = ResourceAvailability::full_day_off("R001", date, UnavailabilityType::Leave);
        assert!(!rec.is_available);
        assert_eq!(rec.available_hours, 0.0);
        assert_eq!(rec.unavailability_type, UnavailabilityType::Leave);
    }

    #[test]
    fn test_reduced_hours() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        let rec =
            ResourceAvailability::reduced_hours("R001", date, 4.0, UnavailabilityType::Maintenance);
        assert!(rec.is_available);
        assert_eq!(rec.available_hours, 4.0);

        // 0小时的"部分可用"等价于整日不可用
        let rec = ResourceAvailability::reduced_hours("R001", date, 0.0, UnavailabilityType::Other);
        assert!(!rec.is_available);
    }
}
