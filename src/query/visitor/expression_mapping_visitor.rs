//! 表达式映射访问器
//!
//! 按符号映射以后序方式原地替换表达式，用于视图展开后把虚拟符号替换为物理表达式。
//! 投影列表中的符号额外保证输出名称不变：
//! - 非符号的替换值包装为 `ExpressionSymbol`
//! - 输出名称变化时再包装一层 `AliasSymbol`，名称取原符号的短名称
//!
//! 没有映射项的元素不视为错误，按首次出现顺序记录在未映射列表中

use crate::config::AnalysisConfig;
use crate::query::sql::{AliasSymbol, Constant, ElementSymbol, Expression, ExpressionSymbol};
use crate::query::visitor::language_visitor::{ExpressionSlot, LanguageVisitorMut};
use crate::query::visitor::navigator::{NavigableMut, NavigatorMut, TraversalOrder};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

/// 符号映射：虚拟符号 -> 物理表达式，按值相等作为键
pub type SymbolMap = HashMap<Expression, Expression>;

pub struct ExpressionMappingVisitor<'m> {
    symbol_map: Cow<'m, SymbolMap>,
    clone_on_substitute: bool,
    create_aliases: bool,
    expression_symbol_name: String,
    deep: bool,
    value_guard: Option<HashSet<Expression>>,
    unmapped: Vec<ElementSymbol>,
    seen_unmapped: HashSet<ElementSymbol>,
    substitutions: usize,
}

impl<'m> ExpressionMappingVisitor<'m> {
    /// 借用映射，每次替换都复制映射值
    pub fn new(symbol_map: &'m SymbolMap) -> Self {
        Self::from_cow(Cow::Borrowed(symbol_map))
    }

    /// 持有映射；关闭 `clone_on_substitute` 后映射值在首次使用时被移入树中
    pub fn with_owned_map(symbol_map: SymbolMap) -> ExpressionMappingVisitor<'static> {
        ExpressionMappingVisitor::from_cow(Cow::Owned(symbol_map))
    }

    fn from_cow(symbol_map: Cow<'m, SymbolMap>) -> Self {
        let defaults = AnalysisConfig::default();
        Self {
            symbol_map,
            clone_on_substitute: defaults.clone_on_substitute,
            create_aliases: defaults.create_aliases,
            expression_symbol_name: defaults.expression_symbol_name,
            deep: defaults.deep_traversal,
            value_guard: None,
            unmapped: Vec::new(),
            seen_unmapped: HashSet::new(),
            substitutions: 0,
        }
    }

    pub fn with_config(mut self, config: &AnalysisConfig) -> Self {
        self.clone_on_substitute = config.clone_on_substitute;
        self.create_aliases = config.create_aliases;
        self.expression_symbol_name = config.expression_symbol_name.clone();
        self.deep = config.deep_traversal;
        self
    }

    pub fn clone_on_substitute(mut self, clone_on_substitute: bool) -> Self {
        self.clone_on_substitute = clone_on_substitute;
        self
    }

    pub fn create_aliases(mut self, create_aliases: bool) -> Self {
        self.create_aliases = create_aliases;
        self
    }

    pub fn expression_symbol_name(mut self, name: impl Into<String>) -> Self {
        self.expression_symbol_name = name.into();
        self
    }

    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    /// 跳过本身已经是映射值的槽位
    pub fn with_value_guard(mut self) -> Self {
        self.value_guard = Some(self.symbol_map.values().cloned().collect());
        self
    }

    /// 对节点执行替换
    pub fn map<T: NavigableMut + ?Sized>(&mut self, node: &mut T) {
        let deep = self.deep;
        NavigatorMut::new(self, TraversalOrder::PostOrder)
            .deep(deep)
            .walk(node);
        log::debug!(
            "表达式映射完成: 替换 {} 处, 未映射元素 {} 个",
            self.substitutions,
            self.unmapped.len()
        );
    }

    /// 按首次出现顺序去重后的未映射元素
    pub fn unmapped_symbols(&self) -> &[ElementSymbol] {
        &self.unmapped
    }

    pub fn into_unmapped_symbols(self) -> Vec<ElementSymbol> {
        self.unmapped
    }

    pub fn substitution_count(&self) -> usize {
        self.substitutions
    }

    fn lookup(&mut self, expr: &Expression) -> Option<Expression> {
        match &mut self.symbol_map {
            Cow::Owned(map) if !self.clone_on_substitute => map.remove(expr),
            map => map.get(expr).cloned(),
        }
    }

    fn record_unmapped(&mut self, expr: &Expression) {
        if let Expression::Element(element) = expr {
            if self.seen_unmapped.insert(element.clone()) {
                self.unmapped.push(element.clone());
            }
        }
    }

    fn map_operand(&mut self, expr: &mut Expression) {
        match self.lookup(expr) {
            Some(replacement) => {
                log::debug!("替换表达式: {} -> {}", expr, replacement);
                *expr = replacement;
                self.substitutions += 1;
            }
            None => self.record_unmapped(expr),
        }
    }

    fn map_projected(&mut self, expr: &mut Expression) {
        let name = match &mut *expr {
            // 别名与表达式符号的操作数已在后序遍历中替换过，这里只整理包装层
            Expression::Alias(alias) => {
                if let Expression::Alias(inner) = alias.symbol.as_mut() {
                    let symbol = std::mem::replace(inner.symbol.as_mut(), Constant::null().into());
                    *alias.symbol = symbol;
                }
                if !alias.symbol.is_projectable_symbol() {
                    let inner = std::mem::replace(alias.symbol.as_mut(), Constant::null().into());
                    *alias.symbol =
                        ExpressionSymbol::new(self.expression_symbol_name.clone(), inner).into();
                }
                return;
            }
            Expression::ExpressionSymbol(_) => return,
            Expression::Element(element) => element.output_name().to_string(),
            _ => return self.map_operand(expr),
        };

        let Some(replacement) = self.lookup(expr) else {
            self.record_unmapped(expr);
            return;
        };

        let replacement = match replacement {
            Expression::Alias(alias) => *alias.symbol,
            other => other,
        };
        let replacement = if replacement.is_projectable_symbol() {
            replacement
        } else {
            ExpressionSymbol::new(self.expression_symbol_name.clone(), replacement).into()
        };
        let replacement = if self.create_aliases && replacement.output_name() != Some(name.as_str()) {
            AliasSymbol::new(name, replacement).into()
        } else {
            replacement
        };

        log::debug!("替换投影符号: {} -> {}", expr, replacement);
        *expr = replacement;
        self.substitutions += 1;
    }
}

impl LanguageVisitorMut for ExpressionMappingVisitor<'_> {
    fn should_descend(&mut self, expr: &Expression) -> bool {
        self.value_guard
            .as_ref()
            .map_or(true, |values| !values.contains(expr))
    }

    fn visit_expression_mut(&mut self, expr: &mut Expression, slot: ExpressionSlot) {
        match slot {
            ExpressionSlot::Projected => self.map_projected(expr),
            ExpressionSlot::Operand => self.map_operand(expr),
        }
    }

    fn visit_element_target_mut(&mut self, element: &mut ElementSymbol) {
        let key = Expression::Element(element.clone());
        if !matches!(self.symbol_map.get(&key), Some(Expression::Element(_))) {
            return;
        }
        if let Some(Expression::Element(replacement)) = self.lookup(&key) {
            log::debug!("替换目标元素: {} -> {}", element, replacement);
            *element = replacement;
            self.substitutions += 1;
        }
    }
}

/// 以持有的映射替换节点中的表达式，返回未映射元素
pub fn map_expressions<T: NavigableMut + ?Sized>(
    node: &mut T,
    symbol_map: SymbolMap,
    clone_on_substitute: bool,
) -> Vec<ElementSymbol> {
    let mut visitor = ExpressionMappingVisitor::with_owned_map(symbol_map)
        .clone_on_substitute(clone_on_substitute);
    visitor.map(node);
    visitor.into_unmapped_symbols()
}

/// 以借用的映射替换节点中的表达式，返回未映射元素
pub fn map_expressions_ref<T: NavigableMut + ?Sized>(
    node: &mut T,
    symbol_map: &SymbolMap,
) -> Vec<ElementSymbol> {
    let mut visitor = ExpressionMappingVisitor::new(symbol_map);
    visitor.map(node);
    visitor.into_unmapped_symbols()
}
