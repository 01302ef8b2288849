//! 元数据访问错误
//!
//! 分析过程中遇到无法解析的元数据引用时返回，对当前分析调用是致命的

use thiserror::Error;

use crate::core::error::codes::ErrorCode;

/// 元数据操作结果类型别名
pub type MetadataResult<T> = Result<T, MetadataError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("未知的组: {0}")]
    UnknownGroup(String),

    #[error("组未绑定到模型: {0}")]
    UnknownModel(String),

    #[error("无法解析的函数: {0}")]
    UnresolvedFunction(String),
}

impl MetadataError {
    pub fn to_error_code(&self) -> ErrorCode {
        ErrorCode::MetadataNotFound
    }
}
