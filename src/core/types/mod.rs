// 核心类型系统模块
//
// 包含查询改写核心使用的基础类型定义：数据类型、求值级别与确定性格

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod lattice;

pub use lattice::{Determinism, EvaluationLevel};

/// 统一的数据类型枚举
///
/// 由解析/解析器阶段写入节点，本模块只读
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DataType {
    Null,
    Boolean,
    Integer,
    Long,
    Double,
    String,
    Date,
    Timestamp,
    #[default]
    Object,
}

impl DataType {
    /// 类型的 SQL 名称
    pub fn sql_name(&self) -> &'static str {
        match self {
            DataType::Null => "null",
            DataType::Boolean => "boolean",
            DataType::Integer => "integer",
            DataType::Long => "long",
            DataType::Double => "double",
            DataType::String => "string",
            DataType::Date => "date",
            DataType::Timestamp => "timestamp",
            DataType::Object => "object",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Long | DataType::Double)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}
