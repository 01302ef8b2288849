//! 符号节点：组（表/视图）、元素（列）以及投影包装符号
//!
//! 符号映射按值相等作为键，因此 `GroupSymbol` 与 `ElementSymbol` 手动实现
//! `PartialEq`/`Hash`：名称不区分大小写，并比较元数据标识与所属组

use crate::core::metadata::MetadataId;
use crate::core::types::DataType;
use crate::query::sql::expression::Expression;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// 已绑定的表或视图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSymbol {
    /// 查询中使用的名称（有别名时为别名）
    pub name: String,
    /// 使用别名时的原始定义名称
    pub definition: Option<String>,
    pub metadata_id: Option<MetadataId>,
}

impl GroupSymbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: None,
            metadata_id: None,
        }
    }

    /// 带别名的组，`definition` 为原始名称
    pub fn aliased(alias: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            name: alias.into(),
            definition: Some(definition.into()),
            metadata_id: None,
        }
    }

    pub fn with_metadata_id(mut self, id: impl Into<MetadataId>) -> Self {
        self.metadata_id = Some(id.into());
        self
    }

    /// 非别名时的名称，别名时的原始定义
    pub fn non_correlation_name(&self) -> &str {
        self.definition.as_deref().unwrap_or(&self.name)
    }
}

impl PartialEq for GroupSymbol {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name) && self.metadata_id == other.metadata_id
    }
}

impl Eq for GroupSymbol {}

impl Hash for GroupSymbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.to_ascii_lowercase().hash(state);
        self.metadata_id.hash(state);
    }
}

/// 已绑定的列引用
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementSymbol {
    /// 短名称（不含组前缀）
    pub name: String,
    /// 投影时的输出名称，缺省使用短名称
    pub output_name: Option<String>,
    pub group: Option<GroupSymbol>,
    pub data_type: DataType,
    pub metadata_id: Option<MetadataId>,
    /// 元素是否代表聚合结果
    pub is_aggregate: bool,
    /// 元素是否引用外层查询（相关子查询）
    pub is_external_reference: bool,
}

impl ElementSymbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output_name: None,
            group: None,
            data_type: DataType::default(),
            metadata_id: None,
            is_aggregate: false,
            is_external_reference: false,
        }
    }

    /// 以 `group.name` 形式构造，组的元数据标识与组名相同
    pub fn qualified(group: impl Into<String>, name: impl Into<String>) -> Self {
        let group = group.into();
        let name = name.into();
        let metadata_id = MetadataId::new(format!("{}.{}", group, name));
        Self::new(name)
            .with_group(GroupSymbol::new(group.clone()).with_metadata_id(group.as_str()))
            .with_metadata_id(metadata_id)
    }

    pub fn with_group(mut self, group: GroupSymbol) -> Self {
        self.group = Some(group);
        self
    }

    pub fn with_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn with_metadata_id(mut self, id: impl Into<MetadataId>) -> Self {
        self.metadata_id = Some(id.into());
        self
    }

    pub fn with_output_name(mut self, output_name: impl Into<String>) -> Self {
        self.output_name = Some(output_name.into());
        self
    }

    /// 标记为外层查询引用
    pub fn external(mut self) -> Self {
        self.is_external_reference = true;
        self
    }

    pub fn short_name(&self) -> &str {
        &self.name
    }

    pub fn output_name(&self) -> &str {
        self.output_name.as_deref().unwrap_or(&self.name)
    }

    /// 带组前缀的完整名称
    pub fn full_name(&self) -> String {
        match &self.group {
            Some(group) => format!("{}.{}", group.name, self.name),
            None => self.name.clone(),
        }
    }
}

impl PartialEq for ElementSymbol {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self.group == other.group
            && self.metadata_id == other.metadata_id
    }
}

impl Eq for ElementSymbol {}

impl Hash for ElementSymbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.to_ascii_lowercase().hash(state);
        self.group.hash(state);
        self.metadata_id.hash(state);
    }
}

/// 为投影符号附加输出名称
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AliasSymbol {
    pub name: String,
    pub symbol: Box<Expression>,
}

impl AliasSymbol {
    pub fn new(name: impl Into<String>, symbol: Expression) -> Self {
        Self {
            name: name.into(),
            symbol: Box::new(symbol),
        }
    }
}

/// 将任意表达式包装为可投影的符号
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpressionSymbol {
    pub name: String,
    pub expression: Box<Expression>,
}

impl ExpressionSymbol {
    pub fn new(name: impl Into<String>, expression: Expression) -> Self {
        Self {
            name: name.into(),
            expression: Box::new(expression),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_element_equality_ignores_case_and_type() {
        let a = ElementSymbol::qualified("pm1.g1", "e1").with_type(DataType::String);
        let mut b = ElementSymbol::qualified("pm1.g1", "e1");
        b.name = "E1".to_string();
        assert_eq!(a, b);

        let set: HashSet<ElementSymbol> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_element_equality_respects_group() {
        let a = ElementSymbol::new("e1").with_group(GroupSymbol::new("g1"));
        let b = ElementSymbol::new("e1").with_group(GroupSymbol::new("g2"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_aliased_group() {
        let g = GroupSymbol::aliased("x", "pm1.g1");
        assert_eq!(g.name, "x");
        assert_eq!(g.non_correlation_name(), "pm1.g1");
    }
}
