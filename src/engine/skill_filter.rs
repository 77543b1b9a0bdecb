// ==========================================
// 物流ERP资源调度系统 - 技能/资质筛选器
// ==========================================
// 职责: 按技能要求筛选资源,评估资格证书有效性
// 红线: 无状态、无副作用、无 I/O 操作
// 口径: 技能匹配为 AND 语义(必须具备全部要求技能),不是 ANY
// ==========================================

use crate::domain::resource::{Certification, EngineeringResource};
use crate::domain::types::CertificationStatus;
use chrono::NaiveDate;

// ==========================================
// SkillFilter - 纯函数工具类
// ==========================================
pub struct SkillFilter;

impl SkillFilter {
    /// 按要求技能筛选资源 (AND 语义)
    ///
    /// # 规则
    /// - 资源必须具备 required 中的每一个技能标签才入选
    /// - 空要求列表为恒真过滤,原样返回全部资源
    pub fn filter_resources_by_skills(
        resources: &[EngineeringResource],
        required: &[String],
    ) -> Vec<EngineeringResource> {
        if required.is_empty() {
            return resources.to_vec();
        }
        resources
            .iter()
            .filter(|r| r.has_all_skills(required))
            .cloned()
            .collect()
    }

    /// 计算证书状态(纯函数,无数据库查询)
    ///
    /// # 规则
    /// - 无到期日期 → VALID
    /// - 已过期 → EXPIRED
    /// - 到期日落在 today + horizon_days 窗口内 → EXPIRING_SOON
    /// - 否则 → VALID
    pub fn certification_status(
        certification: &Certification,
        today: NaiveDate,
        horizon_days: i64,
    ) -> CertificationStatus {
        certification.status_on(today, horizon_days)
    }

    /// 列出持有临期或过期证书的资源及证书名
    ///
    /// 供驾驶舱的资质预警视图使用
    pub fn resources_with_expiring_certifications(
        resources: &[EngineeringResource],
        today: NaiveDate,
        horizon_days: i64,
    ) -> Vec<(String, String, CertificationStatus)> {
        let mut findings = Vec::new();
        for resource in resources {
            for cert in &resource.certifications {
                let status = cert.status_on(today, horizon_days);
                if status != CertificationStatus::Valid {
                    findings.push((resource.resource_id.clone(), cert.name.clone(), status));
                }
            }
        }
        findings
    }
}
