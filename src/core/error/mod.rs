//! 统一错误处理
//!
//! 1. **分层转换**：子模块错误通过 `#[from]` 自动转换为 `RewriteError`
//! 2. **统一接口**：`RewriteResult<T>` 提供统一的返回类型
//!
//! 未映射的符号不是错误，由映射访问器以列表形式返回

use thiserror::Error;

pub mod codes;
pub mod metadata;
pub mod translate;

pub use codes::ErrorCode;
pub use metadata::{MetadataError, MetadataResult};
pub use translate::{TranslateError, TranslateResult};

/// 改写核心的统一错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewriteError {
    #[error("元数据错误: {0}")]
    Metadata(#[from] MetadataError),

    #[error("条件翻译错误: {0}")]
    Translate(#[from] TranslateError),

    #[error("配置错误: {0}")]
    Config(String),
}

/// 统一的结果类型
pub type RewriteResult<T> = Result<T, RewriteError>;

impl RewriteError {
    pub fn to_error_code(&self) -> ErrorCode {
        match self {
            RewriteError::Metadata(e) => e.to_error_code(),
            RewriteError::Translate(e) => e.to_error_code(),
            RewriteError::Config(_) => ErrorCode::InvalidArgument,
        }
    }
}
