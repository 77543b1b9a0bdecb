// ==========================================
// 物流ERP资源调度系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为用户友好的错误消息
// 口径: 预订冲突(可重试)与校验失败(不可重试)必须是可区分的错误类型
// ==========================================

use crate::engine::conflict_core::ScheduleConflict;
use crate::engine::validation::FieldError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
/// 所有错误信息必须包含显式原因
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    /// 输入校验失败(带逐字段明细,不可重试)
    #[error("输入校验失败: {reason}")]
    ValidationFailed {
        reason: String,
        errors: Vec<FieldError>,
    },

    // ==========================================
    // 并发控制错误
    // ==========================================
    /// 预订冲突(提交时再次检测命中;重新加载快照后可重试)
    #[error("预订冲突: resource_id={resource_id}, {conflict_count}条冲突")]
    BookingConflict {
        resource_id: String,
        conflict_count: usize,
        conflicts: Vec<ScheduleConflict>,
    },

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 是否为可重试错误
    ///
    /// 预订冲突源于"检测-插入"间隙被并发抢占,
    /// 重新加载快照后重试即可;校验失败则需要修改输入
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::BookingConflict { .. })
    }
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将Repository层的技术错误转换为用户友好的业务错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // 数据库错误
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }

            // 业务规则错误
            RepositoryError::BusinessRuleViolation(msg) => ApiError::BusinessRuleViolation(msg),
            RepositoryError::InvalidStateTransition { from, to } => {
                ApiError::InvalidStateTransition { from, to }
            }

            // 数据质量错误
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }

            // 通用错误
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_conflict_is_retryable() {
        let err = ApiError::BookingConflict {
            resource_id: "R001".to_string(),
            conflict_count: 1,
            conflicts: vec![],
        };
        assert!(err.is_retryable());

        let err = ApiError::ValidationFailed {
            reason: "2个字段违规".to_string(),
            errors: vec![],
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::NotFound {
            entity: "EngineeringResource".to_string(),
            id: "R001".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("EngineeringResource"));
                assert!(msg.contains("R001"));
            }
            _ => panic!("Expected NotFound"),
        }

        let repo_err = RepositoryError::InvalidStateTransition {
            from: "COMPLETED".to_string(),
            to: "SCHEDULED".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        assert!(matches!(api_err, ApiError::InvalidStateTransition { .. }));
    }
}
