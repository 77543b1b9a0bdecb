// ==========================================
// 物流ERP资源调度系统 - 工程资源领域模型
// ==========================================
// 职责: 定义可调度资源实体与资格证书
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

use crate::domain::types::{CertificationStatus, ResourceType};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Certification - 资格证书
// ==========================================
// 无到期日期的证书视为长期有效
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    pub name: String,                     // 证书名称
    pub issue_date: Option<NaiveDate>,    // 发证日期
    pub expiry_date: Option<NaiveDate>,   // 到期日期
}

impl Certification {
    /// 计算证书在指定日期的状态
    ///
    /// # 规则
    /// 1. 无到期日期 → VALID (长期有效)
    /// 2. expiry_date < today → EXPIRED
    /// 3. expiry_date <= today + horizon_days → EXPIRING_SOON
    /// 4. 否则 → VALID
    ///
    /// # 参数
    /// - today: 当前日期
    /// - horizon_days: 临期预警窗口(天)
    pub fn status_on(&self, today: NaiveDate, horizon_days: i64) -> CertificationStatus {
        let Some(expiry) = self.expiry_date else {
            return CertificationStatus::Valid;
        };

        if expiry < today {
            CertificationStatus::Expired
        } else if expiry <= today + Duration::days(horizon_days) {
            CertificationStatus::ExpiringSoon
        } else {
            CertificationStatus::Valid
        }
    }
}

// ==========================================
// EngineeringResource - 工程资源
// ==========================================
// 红线: daily_capacity_h > 0
// 红线: 编码前缀必须匹配资源类型
// 停用资源不参与新指派,但保留历史指派
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineeringResource {
    // ===== 主键 =====
    pub resource_id: String,              // 资源ID
    pub resource_code: String,            // 资源编码(类型前缀+序号,全局唯一)

    // ===== 基础属性 =====
    pub name: String,                     // 资源名称
    pub resource_type: ResourceType,      // 资源类型
    pub daily_capacity_h: f64,            // 单日容量(小时)

    // ===== 能力属性 =====
    pub skills: Vec<String>,              // 技能标签
    pub certifications: Vec<Certification>, // 资格证书

    // ===== 状态标志 =====
    pub is_available: bool,               // 可用标志
    pub is_active: bool,                  // 在役标志(false=已退役)

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EngineeringResource {
    /// 是否具备全部要求技能 (AND 语义)
    ///
    /// 空要求列表视为无约束,恒为 true
    pub fn has_all_skills(&self, required: &[String]) -> bool {
        required
            .iter()
            .all(|skill| self.skills.iter().any(|s| s == skill))
    }

    /// 编码前缀是否与资源类型一致
    pub fn code_matches_type(&self) -> bool {
        self.resource_code
            .starts_with(self.resource_type.code_prefix())
    }

    /// 是否可接受新指派
    pub fn accepts_new_assignments(&self) -> bool {
        self.is_active && self.is_available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cert(expiry: Option<NaiveDate>) -> Certification {
        Certification {
            name: "危险品运输资格".to_string(),
            issue_date: None,
            expiry_date: expiry,
        }
    }

    #[test]
    fn test_certification_no_expiry_is_valid() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(cert(None).status_on(today, 30), CertificationStatus::Valid);
    }

    #[test]
    fn test_certification_expired() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let expiry = NaiveDate::from_ymd_opt(2025, 5, 31).unwrap();
        assert_eq!(
            cert(Some(expiry)).status_on(today, 30),
            CertificationStatus::Expired
        );
    }

    #[test]
    fn test_certification_expiring_soon_boundary() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        // 刚好落在窗口边界(today+30)
        let expiry = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        assert_eq!(
            cert(Some(expiry)).status_on(today, 30),
            CertificationStatus::ExpiringSoon
        );

        // 窗口外一天
        let expiry = NaiveDate::from_ymd_opt(2025, 7, 2).unwrap();
        assert_eq!(
            cert(Some(expiry)).status_on(today, 30),
            CertificationStatus::Valid
        );

        // 当天到期仍属临期而非过期
        assert_eq!(
            cert(Some(today)).status_on(today, 30),
            CertificationStatus::ExpiringSoon
        );
    }

    #[test]
    fn test_has_all_skills_and_semantics() {
        let mut resource = EngineeringResource {
            resource_id: "R001".to_string(),
            resource_code: "EMP0001".to_string(),
            name: "张师傅".to_string(),
            resource_type: ResourceType::Personnel,
            daily_capacity_h: 8.0,
            skills: vec!["起重".to_string(), "焊接".to_string()],
            certifications: vec![],
            is_available: true,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(resource.has_all_skills(&[]));
        assert!(resource.has_all_skills(&["起重".to_string()]));
        assert!(resource.has_all_skills(&["起重".to_string(), "焊接".to_string()]));
        assert!(!resource.has_all_skills(&["起重".to_string(), "电工".to_string()]));

        resource.skills.clear();
        assert!(resource.has_all_skills(&[]));
        assert!(!resource.has_all_skills(&["起重".to_string()]));
    }

    #[test]
    fn test_code_matches_type() {
        let resource = EngineeringResource {
            resource_id: "R002".to_string(),
            resource_code: "VEH0012".to_string(),
            name: "平板拖车12号".to_string(),
            resource_type: ResourceType::Vehicle,
            daily_capacity_h: 10.0,
            skills: vec![],
            certifications: vec![],
            is_available: true,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(resource.code_matches_type());

        let mut wrong = resource.clone();
        wrong.resource_code = "EQP0012".to_string();
        assert!(!wrong.code_matches_type());
    }
}
