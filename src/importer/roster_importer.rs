// ==========================================
// 物流ERP资源调度系统 - 资源花名册导入器
// ==========================================
// 职责: 从 CSV 批量建立资源档案
// 文件格式: name,resource_type,daily_capacity_h,skills
//   - resource_type: PERSONNEL/VEHICLE/EQUIPMENT/FACILITY
//   - skills: 分号分隔的技能标签,可为空
// 口径: 单行失败不中断整批,逐行错误进入汇总
// ==========================================

use crate::domain::types::ResourceType;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::resource_repo::ResourceRepository;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::instrument;

// ==========================================
// RowError - 逐行错误
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowError {
    /// 数据行号(1起,不含表头)
    pub row: usize,
    pub message: String,
}

// ==========================================
// ImportSummary - 导入汇总
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub ok_count: usize,
    pub failed_count: usize,
    pub errors: Vec<RowError>,
}

// ==========================================
// RosterImporter - 花名册导入器
// ==========================================
pub struct RosterImporter {
    resource_repo: Arc<ResourceRepository>,
}

impl RosterImporter {
    pub fn new(resource_repo: Arc<ResourceRepository>) -> Self {
        Self { resource_repo }
    }

    /// 导入资源花名册 CSV
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
            "花名册导入完成"
        );
        Ok(summary)
    }

    fn import_row(&self, row: usize, record: &csv::StringRecord) -> ImportResult<()> {
        let name = record
            .get(0)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ImportError::FieldMappingError {
                row,
                message: "name 为空".to_string(),
            })?;

        let type_str = record.get(1).unwrap_or("");
        let resource_type = ResourceType::from_str(type_str).ok_or_else(|| {
            ImportError::FieldMappingError {
                row,
                message: format!("未知的资源类型: {}", type_str),
            }
        })?;

        let capacity_str = record.get(2).unwrap_or("");
        let daily_capacity_h =
            capacity_str
                .parse::<f64>()
                .map_err(|_| ImportError::FieldMappingError {
                    row,
                    message: format!("日容量格式错误: {}", capacity_str),
                })?;
        if daily_capacity_h <= 0.0 {
            return Err(ImportError::FieldMappingError {
                row,
                message: format!("日容量必须为正数: {}", daily_capacity_h),
            });
        }

        let skills: Vec<String> = record
            .get(3)
            .unwrap_or("")
            .split(';')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        self.resource_repo
            .create_with_generated_code(name, resource_type, daily_capacity_h, skills, vec![])
            .map_err(|e| ImportError::DatabaseQueryError(e.to_string()))?;
        Ok(())
    }
}
