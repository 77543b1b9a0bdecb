// ==========================================
// 物流ERP资源调度系统 - HR 休假导入器
// ==========================================
// 职责: 从 HR 系统导出的 CSV 批量登记不可用记录
// 文件格式: resource_code,date,unavailability_type,available_hours
//   - date: YYYY-MM-DD
//   - unavailability_type: LEAVE/MAINTENANCE/HOLIDAY/OTHER
//   - available_hours: 0 表示整日不可用,>0 表示部分可用
// 口径: 以资源编码对账(HR 侧不持有内部资源ID);
//       重复日期走 UPSERT 覆盖
// ==========================================

use crate::domain::availability::ResourceAvailability;
use crate::domain::types::UnavailabilityType;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::roster_importer::{ImportSummary, RowError};
use crate::repository::availability_repo::AvailabilityRepository;
use crate::repository::resource_repo::ResourceRepository;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::path::Path;
use std::sync::Arc;
use tracing::instrument;

// ==========================================
// LeaveImporter - 休假导入器
// ==========================================
pub struct LeaveImporter {
    resource_repo: Arc<ResourceRepository>,
    availability_repo: Arc<AvailabilityRepository>,
}

impl LeaveImporter {
    pub fn new(
        resource_repo: Arc<ResourceRepository>,
        availability_repo: Arc<AvailabilityRepository>,
    ) -> Self {
        Self {
            resource_repo,
            availability_repo,
        }
    }

    /// 导入 HR 休假 CSV
    #[instrument(skip(self))]
    pub fn import_file(&self, path: &str) -> ImportResult<ImportSummary> {
        if !Path::new(path).exists() {
            return Err(ImportError::FileNotFound(path.to_string()));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut summary = ImportSummary {
            total_rows: 0,
            ok_count: 0,
            failed_count: 0,
            errors: Vec::new(),
        };

        for (idx, record) in reader.records().enumerate() {
            let row = idx + 1;
            summary.total_rows += 1;

            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    summary.failed_count += 1;
                    summary.errors.push(RowError {
                        row,
                        message: format!("CSV行解析失败: {}", e),
                    });
                    continue;
                }
            };

            match self.import_row(row, &record) {
                Ok(()) => summary.ok_count += 1,
                Err(e) => {
                    summary.failed_count += 1;
                    summary.errors.push(RowError {
                        row,
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            total = summary.total_rows,
            ok = summary.ok_count,
            failed = summary.failed_count,
            "休假导入完成"
        );
        Ok(summary)
    }

    fn import_row(&self, row: usize, record: &csv::StringRecord) -> ImportResult<()> {
        let code = record
            .get(0)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ImportError::FieldMappingError {
                row,
                message: "resource_code 为空".to_string(),
            })?;

        let resource = self
            .resource_repo
            .find_by_code(code)
            .map_err(|e| ImportError::DatabaseQueryError(e.to_string()))?
            .ok_or_else(|| ImportError::FieldMappingError {
                row,
                message: format!("资源编码不存在: {}", code),
            })?;

        let date_str = record.get(1).unwrap_or("");
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| {
            ImportError::DateFormatError {
                row,
                field: "date".to_string(),
                value: date_str.to_string(),
            }
        })?;

        let type_str = record.get(2).unwrap_or("");
        let unavailability_type = UnavailabilityType::from_str(type_str).ok_or_else(|| {
            ImportError::FieldMappingError {
                row,
                message: format!("未知的不可用类型: {}", type_str),
            }
        })?;

        let hours_str = record.get(3).unwrap_or("0");
        let available_hours =
            hours_str
                .parse::<f64>()
                .map_err(|_| ImportError::FieldMappingError {
                    row,
                    message: format!("可用工时格式错误: {}", hours_str),
                })?;
        if available_hours < 0.0 {
            return Err(ImportError::FieldMappingError {
                row,
                message: format!("可用工时不能为负数: {}", available_hours),
            });
        }

        let record = if available_hours > 0.0 {
            ResourceAvailability::reduced_hours(
                resource.resource_id,
                date,
                available_hours,
                unavailability_type,
            )
        } else {
            ResourceAvailability::full_day_off(resource.resource_id, date, unavailability_type)
        };

        self.availability_repo
            .upsert(&record)
            .map_err(|e| ImportError::DatabaseQueryError(e.to_string()))?;
        Ok(())
    }
}
