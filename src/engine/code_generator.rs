// ==========================================
// 物流ERP资源调度系统 - 资源编码生成器
// ==========================================
// 职责: 按资源类型生成确定性、无碰撞的资源编码
// 红线: 无状态、无副作用,序号的一致性读取由仓储层事务保证
// 编码格式: 类型前缀 + 零填充序号 (如 EMP0001 / VEH0012)
// ==========================================

use crate::domain::types::ResourceType;

/// 序号零填充宽度
pub const DEFAULT_SEQUENCE_WIDTH: usize = 4;

// ==========================================
// ResourceCodeGenerator - 编码生成器
// ==========================================
pub struct ResourceCodeGenerator;

impl ResourceCodeGenerator {
    /// 生成资源编码
    ///
    /// # 规则
    /// - 编码 = 类型前缀 + 零填充序号
    /// - 同类型不同序号的编码必然不同
    /// - 序号超出填充宽度时自然扩展,不截断
    ///
    /// # 参数
    /// - resource_type: 资源类型
    /// - sequence: 序号(从1起)
    pub fn generate_code(resource_type: ResourceType, sequence: i64) -> String {
        format!(
            "{}{:0width$}",
            resource_type.code_prefix(),
            sequence,
            width = DEFAULT_SEQUENCE_WIDTH
        )
    }

    /// 从既有编码集合推导下一序号
    ///
    /// # 规则
    /// - 仅统计以该类型前缀开头且后缀为纯数字的编码
    /// - 返回 max(既有序号) + 1; 无既有编码时返回 1
    ///
    /// # 说明
    /// 并发创建场景下,本函数必须在与插入同一事务的
    /// 一致性读取之上调用,否则可能产生重复编码
    pub fn next_sequence(existing_codes: &[String], resource_type: ResourceType) -> i64 {
        let prefix = resource_type.code_prefix();
        existing_codes
            .iter()
            .filter_map(|code| code.strip_prefix(prefix))
            .filter_map(|suffix| suffix.parse::<i64>().ok())
            .max()
            .map(|max| max + 1)
            .unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_code_format() {
        assert_eq!(
            ResourceCodeGenerator::generate_code(ResourceType::Personnel, 1),
            "EMP0001"
        );
        assert_eq!(
            ResourceCodeGenerator::generate_code(ResourceType::Vehicle, 12),
            "VEH0012"
        );
        assert_eq!(
            ResourceCodeGenerator::generate_code(ResourceType::Equipment, 9999),
            "EQP9999"
        );
        // 超出填充宽度自然扩展
        assert_eq!(
            ResourceCodeGenerator::generate_code(ResourceType::Facility, 12345),
            "FAC12345"
        );
    }

    #[test]
    fn test_generate_code_distinct_sequences() {
        let codes: Vec<String> = (1..=50)
            .map(|seq| ResourceCodeGenerator::generate_code(ResourceType::Personnel, seq))
            .collect();
        for (i, a) in codes.iter().enumerate() {
            assert!(a.starts_with("EMP"));
            for b in codes.iter().skip(i + 1) {
                assert_ne!(a, b, "同类型不同序号必须产生不同编码");
            }
        }
    }

    #[test]
    fn test_next_sequence_empty() {
        assert_eq!(
            ResourceCodeGenerator::next_sequence(&[], ResourceType::Personnel),
            1
        );
    }

    #[test]
    fn test_next_sequence_max_plus_one() {
        let codes = vec![
            "EMP0001".to_string(),
            "EMP0007".to_string(),
            "EMP0003".to_string(),
        ];
        assert_eq!(
            ResourceCodeGenerator::next_sequence(&codes, ResourceType::Personnel),
            8
        );
    }

    #[test]
    fn test_next_sequence_ignores_other_prefixes() {
        let codes = vec![
            "EMP0002".to_string(),
            "VEH0099".to_string(),
            "EQP0050".to_string(),
        ];
        assert_eq!(
            ResourceCodeGenerator::next_sequence(&codes, ResourceType::Personnel),
            3
        );
        assert_eq!(
            ResourceCodeGenerator::next_sequence(&codes, ResourceType::Vehicle),
            100
        );
        assert_eq!(
            ResourceCodeGenerator::next_sequence(&codes, ResourceType::Facility),
            1
        );
    }

    #[test]
    fn test_next_sequence_ignores_malformed_codes() {
        let codes = vec![
            "EMP0004".to_string(),
            "EMPX001".to_string(), // 非数字后缀
            "EMP".to_string(),     // 无后缀
        ];
        assert_eq!(
            ResourceCodeGenerator::next_sequence(&codes, ResourceType::Personnel),
            5
        );
    }

    #[test]
    fn test_generate_then_next_sequence_roundtrip() {
        let sequences = [3_i64, 11, 42];
        let codes: Vec<String> = sequences
            .iter()
            .map(|&seq| ResourceCodeGenerator::generate_code(ResourceType::Equipment, seq))
            .collect();
        assert_eq!(
            ResourceCodeGenerator::next_sequence(&codes, ResourceType::Equipment),
            43
        );
    }
}
