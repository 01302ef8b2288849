//! 对外错误码定义
//!
//! 错误码格式: XXYY
//! - XX: 错误类别 (03=验证, 05=资源)
//! - YY: 具体错误

use serde::{Deserialize, Serialize};
use std::fmt;

/// 对外错误码，供上层规划器或协议层使用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // ==================== 验证错误 (03xx) ====================
    /// 调用方传入的参数无效
    InvalidArgument = 302,

    // ==================== 资源错误 (05xx) ====================
    /// 元数据对象未找到
    MetadataNotFound = 500,
}

impl ErrorCode {
    /// 数值形式的错误码
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::InvalidArgument.to_string(), "0302");
        assert_eq!(ErrorCode::MetadataNotFound.as_u16(), 500);
    }
}
