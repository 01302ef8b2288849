//! 元数据协作接口
//!
//! 改写核心只以只读方式访问元数据目录：
//! - `QueryMetadata`：组分类（物理表/视图/临时表/标量伪组）、所属模型、函数描述符
//! - `CapabilitiesFinder`：模型 -> 支持下推的函数集合
//!
//! 具体实现由外部目录提供；`registry` 子模块给出按编译实例构造的内存实现，
//! 通过构造函数注入组件，不使用进程级全局注册表。

pub mod registry;

pub use registry::{BasicCapabilitiesFinder, BasicMetadata};

use crate::core::error::MetadataError;
use crate::core::types::{DataType, Determinism};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 元数据对象标识
///
/// 由解析器写入节点，按值比较
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MetadataId(String);

impl MetadataId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetadataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MetadataId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// 组（表/视图）的分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKind {
    /// 数据源上的物理表
    Physical,
    /// 虚拟视图
    Virtual,
    /// 引擎内的临时表
    Temp,
    /// 表示单个运行时值的伪组（过程变量、输入参数等）
    Scalar,
}

impl GroupKind {
    /// 该组的列是否只能在引擎运行时取值
    pub fn is_runtime_value(&self) -> bool {
        matches!(self, GroupKind::Temp | GroupKind::Scalar)
    }
}

/// 函数下推策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PushDown {
    /// 引擎与数据源均可求值
    CanPushdown,
    /// 只能在引擎求值
    CannotPushdown,
    /// 引擎没有本地实现，必须下推
    MustPushdown,
}

/// 已解析的函数描述符
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub determinism: Determinism,
    pub pushdown: PushDown,
    pub return_type: DataType,
}

impl FunctionDescriptor {
    pub fn new(name: impl Into<String>, return_type: DataType) -> Self {
        Self {
            name: name.into(),
            determinism: Determinism::Deterministic,
            pushdown: PushDown::CanPushdown,
            return_type,
        }
    }

    pub fn with_determinism(mut self, determinism: Determinism) -> Self {
        self.determinism = determinism;
        self
    }

    pub fn with_pushdown(mut self, pushdown: PushDown) -> Self {
        self.pushdown = pushdown;
        self
    }

    pub fn is_deterministic(&self) -> bool {
        self.determinism == Determinism::Deterministic
    }
}

/// 查询元数据只读访问接口
pub trait QueryMetadata {
    /// 组的分类
    fn group_kind(&self, group_id: &MetadataId) -> Result<GroupKind, MetadataError>;

    /// 组所属的模型（数据源）
    fn model_id(&self, group_id: &MetadataId) -> Result<MetadataId, MetadataError>;

    /// 按名称查找函数描述符，名称不区分大小写
    fn function_descriptor(&self, name: &str) -> Result<FunctionDescriptor, MetadataError>;
}

/// 数据源能力查找接口
pub trait CapabilitiesFinder {
    /// 模型是否支持下推指定的标量函数
    fn supports_function(&self, model_id: &MetadataId, function_name: &str) -> bool;
}
