//! 内存元数据与能力注册表
//!
//! 每次查询编译构造一份，显式传入需要它的组件

use super::{CapabilitiesFinder, FunctionDescriptor, GroupKind, MetadataId, PushDown, QueryMetadata};
use crate::core::error::MetadataError;
use crate::core::types::{DataType, Determinism};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
struct GroupInfo {
    kind: GroupKind,
    model: Option<MetadataId>,
}

/// 基于 HashMap 的元数据实现
#[derive(Debug, Clone, Default)]
pub struct BasicMetadata {
    groups: HashMap<MetadataId, GroupInfo>,
    functions: HashMap<String, FunctionDescriptor>,
}

impl BasicMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置常用系统函数的注册表
    pub fn with_system_functions() -> Self {
        let mut metadata = Self::new();
        for op in ["+", "-", "*", "/"] {
            metadata.add_function(FunctionDescriptor::new(op, DataType::Double));
        }
        for name in ["concat", "upper", "lower", "trim", "substring"] {
            metadata.add_function(FunctionDescriptor::new(name, DataType::String));
        }
        metadata.add_function(FunctionDescriptor::new("abs", DataType::Double));
        metadata.add_function(
            FunctionDescriptor::new("rand", DataType::Double)
                .with_determinism(Determinism::Nondeterministic),
        );
        metadata.add_function(
            FunctionDescriptor::new("now", DataType::Timestamp)
                .with_determinism(Determinism::CommandDeterministic),
        );
        metadata.add_function(
            FunctionDescriptor::new("user", DataType::String)
                .with_determinism(Determinism::CommandDeterministic)
                .with_pushdown(PushDown::CannotPushdown),
        );
        metadata
    }

    /// 注册一个组
    pub fn add_group(&mut self, id: impl Into<MetadataId>, kind: GroupKind, model: Option<MetadataId>) {
        self.groups.insert(id.into(), GroupInfo { kind, model });
    }

    pub fn with_group(mut self, id: impl Into<MetadataId>, kind: GroupKind, model: Option<MetadataId>) -> Self {
        self.add_group(id, kind, model);
        self
    }

    /// 注册一个函数描述符，重复注册时覆盖
    pub fn add_function(&mut self, descriptor: FunctionDescriptor) {
        self.functions
            .insert(descriptor.name.to_ascii_lowercase(), descriptor);
    }

    pub fn with_function(mut self, descriptor: FunctionDescriptor) -> Self {
        self.add_function(descriptor);
        self
    }
}

impl QueryMetadata for BasicMetadata {
    fn group_kind(&self, group_id: &MetadataId) -> Result<GroupKind, MetadataError> {
        self.groups
            .get(group_id)
            .map(|info| info.kind)
            .ok_or_else(|| MetadataError::UnknownGroup(group_id.to_string()))
    }

    fn model_id(&self, group_id: &MetadataId) -> Result<MetadataId, MetadataError> {
        let info = self
            .groups
            .get(group_id)
            .ok_or_else(|| MetadataError::UnknownGroup(group_id.to_string()))?;
        info.model
            .clone()
            .ok_or_else(|| MetadataError::UnknownModel(group_id.to_string()))
    }

    fn function_descriptor(&self, name: &str) -> Result<FunctionDescriptor, MetadataError> {
        self.functions
            .get(&name.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| MetadataError::UnresolvedFunction(name.to_string()))
    }
}

/// 基于 HashMap 的能力查找实现
#[derive(Debug, Clone, Default)]
pub struct BasicCapabilitiesFinder {
    supported_functions: HashMap<MetadataId, HashSet<String>>,
}

impl BasicCapabilitiesFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 声明模型支持的函数
    pub fn with_functions<I, S>(mut self, model_id: impl Into<MetadataId>, functions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entry = self.supported_functions.entry(model_id.into()).or_default();
        for name in functions {
            entry.insert(name.as_ref().to_ascii_lowercase());
        }
        self
    }
}

impl CapabilitiesFinder for BasicCapabilitiesFinder {
    fn supports_function(&self, model_id: &MetadataId, function_name: &str) -> bool {
        self.supported_functions
            .get(model_id)
            .map_or(false, |set| set.contains(&function_name.to_ascii_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_group_is_error() {
        let metadata = BasicMetadata::new();
        let err = metadata.group_kind(&MetadataId::new("pm1.g1")).unwrap_err();
        assert_eq!(err, MetadataError::UnknownGroup("pm1.g1".to_string()));
    }

    #[test]
    fn test_function_lookup_is_case_insensitive() {
        let metadata = BasicMetadata::with_system_functions();
        let desc = metadata.function_descriptor("UPPER").expect("upper 应已注册");
        assert_eq!(desc.determinism, Determinism::Deterministic);
        assert!(metadata.function_descriptor("no_such_fn").is_err());
    }

    #[test]
    fn test_model_lookup() {
        let metadata = BasicMetadata::new()
            .with_group("pm1.g1", GroupKind::Physical, Some(MetadataId::new("pm1")))
            .with_group("vm1.v1", GroupKind::Virtual, None);
        assert_eq!(
            metadata.model_id(&MetadataId::new("pm1.g1")).unwrap(),
            MetadataId::new("pm1")
        );
        assert!(matches!(
            metadata.model_id(&MetadataId::new("vm1.v1")),
            Err(MetadataError::UnknownModel(_))
        ));
    }

    #[test]
    fn test_capabilities() {
        let caps = BasicCapabilitiesFinder::new().with_functions("pm1", ["UPPER", "concat"]);
        assert!(caps.supports_function(&MetadataId::new("pm1"), "upper"));
        assert!(!caps.supports_function(&MetadataId::new("pm1"), "rand"));
        assert!(!caps.supports_function(&MetadataId::new("pm2"), "upper"));
    }
}
