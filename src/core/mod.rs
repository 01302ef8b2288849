pub mod error;
pub mod metadata;
pub mod types;
pub mod value;

// 错误和结果类型
pub use error::{
    ErrorCode, MetadataError, MetadataResult, RewriteError, RewriteResult, TranslateError,
    TranslateResult,
};

// 元数据协作接口
pub use metadata::{
    BasicCapabilitiesFinder, BasicMetadata, CapabilitiesFinder, FunctionDescriptor, GroupKind,
    MetadataId, PushDown, QueryMetadata,
};

// 核心数据类型
pub use types::{DataType, Determinism, EvaluationLevel};
pub use value::Value;
