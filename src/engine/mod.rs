// ==========================================
// 物流ERP资源调度系统 - 引擎层
// ==========================================
// 职责: 实现调度业务规则,不拼 SQL
// 红线: Engine 不拼 SQL, 冲突与超配必须输出 reason
// 红线: *_core 模块为纯函数库,无状态、无副作用、无 I/O
// ==========================================

pub mod availability;
pub mod availability_core;
pub mod calendar;
pub mod code_generator;
pub mod conflict;
pub mod conflict_core;
pub mod skill_filter;
pub mod validation;

// 重导出核心引擎
pub use availability::{AvailabilityEngine, UtilizationSummary};
pub use availability_core::{
    AvailabilityCore, CalendarCell, DailyAvailability, OverAllocationCheck,
};
pub use calendar::WorkCalendar;
pub use code_generator::ResourceCodeGenerator;
pub use conflict::ConflictDetector;
pub use conflict_core::{ConflictCore, ConflictReport, ScheduleConflict};
pub use skill_filter::SkillFilter;
pub use validation::{
    validate_assignment_input, validate_unavailability_input, AssignmentInput, FieldError,
    UnavailabilityInput, ValidationReport,
};
