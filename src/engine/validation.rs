// ==========================================
// 物流ERP资源调度系统 - 输入校验器
// ==========================================
// 职责: 指派/不可用登记请求的结构化校验
// 红线: 校验函数永不抛错,以结构化结果返回全部违规
// 红线: 逐项累积错误(不短路),调用方可一次性展示全部问题
// 红线: 每次调用纯函数、无状态,调用间不残留错误
// ==========================================

use crate::domain::types::UnavailabilityType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// FieldError - 字段级错误
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// 违规字段名
    pub field: String,
    /// 错误说明
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

// ==========================================
// ValidationReport - 校验结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<FieldError>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

// ==========================================
// AssignmentInput - 指派创建请求
// ==========================================
// 日期缺失以 None 表达(表单未填)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentInput {
    pub resource_id: String,
    pub target_id: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub planned_hours: Option<f64>,
}

// ==========================================
// UnavailabilityInput - 不可用登记请求
// ==========================================
// unavailability_type 以原始字符串到达,由校验器把关枚举归属
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnavailabilityInput {
    pub resource_id: String,
    pub dates: Vec<NaiveDate>,
    pub is_available: bool,
    pub available_hours: f64,
    pub unavailability_type: String,
}

// ==========================================
// 校验函数
// ==========================================

/// 校验指派创建请求
///
/// # 规则
/// 1. resource_id / target_id 非空
/// 2. start_date 必填
/// 3. end_date 必填且 end_date >= start_date (违规记在 end_date 上)
/// 4. planned_hours 若给定必须为正的有限数
pub fn validate_assignment_input(input: &AssignmentInput) -> ValidationReport {
    let mut errors = Vec::new();

    if input.resource_id.trim().is_empty() {
        errors.push(FieldError::new("resource_id", "资源ID不能为空"));
    }
    if input.target_id.trim().is_empty() {
        errors.push(FieldError::new("target_id", "工作对象ID不能为空"));
    }

    match input.start_date {
        None => errors.push(FieldError::new("start_date", "起始日期不能为空")),
        Some(start) => match input.end_date {
            None => errors.push(FieldError::new("end_date", "结束日期不能为空")),
            Some(end) if end < start => {
                errors.push(FieldError::new("end_date", "结束日期不能早于起始日期"));
            }
            Some(_) => {}
        },
    }

    if let Some(hours) = input.planned_hours {
        if !hours.is_finite() || hours <= 0.0 {
            errors.push(FieldError::new("planned_hours", "计划工时必须为正数"));
        }
    }

    ValidationReport::from_errors(errors)
}

/// 校验不可用登记请求
///
/// # 规则
/// 1. resource_id 非空
/// 2. dates 列表非空
/// 3. unavailability_type 必须属于固定枚举
/// 4. 部分可用时 available_hours 必须为非负的有限数
pub fn validate_unavailability_input(input: &UnavailabilityInput) -> ValidationReport {
    let mut errors = Vec::new();

    if input.resource_id.trim().is_empty() {
        errors.push(FieldError::new("resource_id", "资源ID不能为空"));
    }
    if input.dates.is_empty() {
        errors.push(FieldError::new("dates", "日期列表不能为空"));
    }
    if UnavailabilityType::from_str(&input.unavailability_type).is_none() {
        errors.push(FieldError::new(
            "unavailability_type",
            format!("未知的不可用类型: {}", input.unavailability_type),
        ));
    }
    if !input.available_hours.is_finite() || input.available_hours < 0.0 {
        errors.push(FieldError::new("available_hours", "可用工时不能为负数"));
    }

    ValidationReport::from_errors(errors)
}
