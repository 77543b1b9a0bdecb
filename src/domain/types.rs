// ==========================================
// 物流ERP资源调度系统 - 领域类型定义
// ==========================================
// 职责: 定义调度核心的封闭枚举集合
// 红线: 枚举集合与前端/数据库契约保持一致,不得私自扩展
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 资源类型 (Resource Type)
// ==========================================
// 每种类型对应唯一的编码前缀,前缀表为全量映射
// 资源编码必须以所属类型的前缀开头
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    Personnel, // 人员
    Vehicle,   // 车辆
    Equipment, // 设备
    Facility,  // 场地设施
}

impl ResourceType {
    /// 资源编码前缀(全量映射表)
    pub fn code_prefix(&self) -> &'static str {
        match self {
            ResourceType::Personnel => "EMP",
            ResourceType::Vehicle => "VEH",
            ResourceType::Equipment => "EQP",
            ResourceType::Facility => "FAC",
        }
    }

    /// 全部资源类型(用于遍历前缀表)
    pub const ALL: [ResourceType; 4] = [
        ResourceType::Personnel,
        ResourceType::Vehicle,
        ResourceType::Equipment,
        ResourceType::Facility,
    ];

    /// 从字符串解析资源类型
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PERSONNEL" => Some(ResourceType::Personnel),
            "VEHICLE" => Some(ResourceType::Vehicle),
            "EQUIPMENT" => Some(ResourceType::Equipment),
            "FACILITY" => Some(ResourceType::Facility),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ResourceType::Personnel => "PERSONNEL",
            ResourceType::Vehicle => "VEHICLE",
            ResourceType::Equipment => "EQUIPMENT",
            ResourceType::Facility => "FACILITY",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 指派状态 (Assignment Status)
// ==========================================
// 生命周期: SCHEDULED -> IN_PROGRESS -> COMPLETED
//           SCHEDULED/IN_PROGRESS -> CANCELLED
// 红线: 指派记录永不物理删除,取消即状态变更(保留审计历史)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Scheduled,  // 已排定
    InProgress, // 执行中
    Completed,  // 已完成
    Cancelled,  // 已取消
}

impl AssignmentStatus {
    /// 是否参与冲突检测与占用计算
    ///
    /// COMPLETED/CANCELLED 为历史状态,对未来排期不再占用资源
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            AssignmentStatus::Scheduled | AssignmentStatus::InProgress
        )
    }

    /// 判断状态转换是否合法
    pub fn can_transition_to(&self, target: AssignmentStatus) -> bool {
        match (self, target) {
            (AssignmentStatus::Scheduled, AssignmentStatus::InProgress) => true,
            (AssignmentStatus::Scheduled, AssignmentStatus::Cancelled) => true,
            (AssignmentStatus::InProgress, AssignmentStatus::Completed) => true,
            (AssignmentStatus::InProgress, AssignmentStatus::Cancelled) => true,
            _ => false,
        }
    }

    /// 从字符串解析指派状态
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "SCHEDULED" => Some(AssignmentStatus::Scheduled),
            "IN_PROGRESS" => Some(AssignmentStatus::InProgress),
            "COMPLETED" => Some(AssignmentStatus::Completed),
            "CANCELLED" => Some(AssignmentStatus::Cancelled),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Scheduled => "SCHEDULED",
            AssignmentStatus::InProgress => "IN_PROGRESS",
            AssignmentStatus::Completed => "COMPLETED",
            AssignmentStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 不可用类型 (Unavailability Type)
// ==========================================
// 显式不可用记录的原因分类,按部署口径固定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnavailabilityType {
    Leave,       // 休假
    Maintenance, // 维保
    Holiday,     // 法定假日
    Other,       // 其他
}

impl UnavailabilityType {
    /// 从字符串解析不可用类型
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "LEAVE" => Some(UnavailabilityType::Leave),
            "MAINTENANCE" => Some(UnavailabilityType::Maintenance),
            "HOLIDAY" => Some(UnavailabilityType::Holiday),
            "OTHER" => Some(UnavailabilityType::Other),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            UnavailabilityType::Leave => "LEAVE",
            UnavailabilityType::Maintenance => "MAINTENANCE",
            UnavailabilityType::Holiday => "HOLIDAY",
            UnavailabilityType::Other => "OTHER",
        }
    }
}

impl fmt::Display for UnavailabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 资格证书状态 (Certification Status)
// ==========================================
// 由当前日期与到期日期纯函数推导,无到期日视为长期有效
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificationStatus {
    Valid,        // 有效
    ExpiringSoon, // 临期
    Expired,      // 已过期
}

impl fmt::Display for CertificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertificationStatus::Valid => write!(f, "VALID"),
            CertificationStatus::ExpiringSoon => write!(f, "EXPIRING_SOON"),
            CertificationStatus::Expired => write!(f, "EXPIRED"),
        }
    }
}

// ==========================================
// 冲突类型 (Conflict Type)
// ==========================================
// 冲突检测的两类输出: 指派重叠 / 显式不可用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictType {
    Assignment,     // 与既有指派的日期区间重叠
    Unavailability, // 候选区间内存在显式不可用日期
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictType::Assignment => write!(f, "ASSIGNMENT"),
            ConflictType::Unavailability => write!(f, "UNAVAILABILITY"),
        }
    }
}
