//! 条件翻译错误

use thiserror::Error;

use crate::core::error::codes::ErrorCode;

/// 条件翻译结果类型别名
pub type TranslateResult<T> = Result<T, TranslateError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// 被选中的合取项仍引用映射中不存在的元素
    #[error("合取项 {criteria} 中的元素未映射: {element}")]
    UnmappedElement { element: String, criteria: String },

    /// 选择器指定了不可选择的条件类型
    #[error("无效的条件选择器: {0}")]
    InvalidSelector(String),

    /// 选择器元素不在符号映射的键中
    #[error("选择器元素不在符号映射中: {0}")]
    UnknownSelectorElement(String),

    /// 显式翻译不是 `元素 = 表达式` 形式
    #[error("无效的显式翻译: {0}")]
    InvalidTranslation(String),
}

impl TranslateError {
    pub fn to_error_code(&self) -> ErrorCode {
        match self {
            TranslateError::UnmappedElement { .. } => ErrorCode::MetadataNotFound,
            TranslateError::InvalidSelector(_)
            | TranslateError::UnknownSelectorElement(_)
            | TranslateError::InvalidTranslation(_) => ErrorCode::InvalidArgument,
        }
    }
}
