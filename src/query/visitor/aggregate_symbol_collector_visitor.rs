//! AggregateSymbolCollectorVisitor - 收集聚合函数及聚合之外的元素
//!
//! 使用聚合截断导航：聚合与窗口函数本身被收集，但不进入其参数，
//! 因此 `other_elements` 中只有出现在聚合之外的元素。
//! 与分组列相等的表达式记入 `grouping_columns_used`，且不再向下遍历

use crate::config::AnalysisConfig;
use crate::query::sql::{AggregateSymbol, ElementSymbol, Expression, WindowFunction};
use crate::query::visitor::collection::Collected;
use crate::query::visitor::language_visitor::LanguageVisitor;
use crate::query::visitor::navigator::{Navigable, Navigator, TraversalOrder};
use std::collections::HashSet;

#[derive(Debug)]
pub struct AggregateSymbolCollectorVisitor {
    aggregates: Collected<AggregateSymbol>,
    window_functions: Collected<WindowFunction>,
    other_elements: Collected<ElementSymbol>,
    grouping_columns: HashSet<Expression>,
    grouping_columns_used: Collected<Expression>,
    deep: bool,
}

/// 一次收集的全部结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateCollection {
    pub aggregates: Vec<AggregateSymbol>,
    pub window_functions: Vec<WindowFunction>,
    pub other_elements: Vec<ElementSymbol>,
    pub grouping_columns_used: Vec<Expression>,
}

impl AggregateSymbolCollectorVisitor {
    pub fn new(remove_duplicates: bool) -> Self {
        Self {
            aggregates: Collected::new(remove_duplicates),
            window_functions: Collected::new(remove_duplicates),
            other_elements: Collected::new(remove_duplicates),
            grouping_columns: HashSet::new(),
            grouping_columns_used: Collected::new(true),
            deep: false,
        }
    }

    pub fn with_config(config: &AnalysisConfig) -> Self {
        Self::new(config.remove_duplicates).deep(config.deep_traversal)
    }

    /// 进入嵌套命令，子查询中的聚合与元素一并收集
    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    pub fn with_grouping_columns<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = Expression>,
    {
        self.grouping_columns.extend(columns);
        self
    }

    pub fn collect<T: Navigable + ?Sized>(&mut self, node: &T) {
        let deep = self.deep;
        Navigator::new(self, TraversalOrder::PreOrder)
            .aggregate_stop(true)
            .deep(deep)
            .walk(node);
    }

    pub fn aggregates(&self) -> &[AggregateSymbol] {
        self.aggregates.items()
    }

    pub fn other_elements(&self) -> &[ElementSymbol] {
        self.other_elements.items()
    }

    pub fn into_collection(self) -> AggregateCollection {
        AggregateCollection {
            aggregates: self.aggregates.into_vec(),
            window_functions: self.window_functions.into_vec(),
            other_elements: self.other_elements.into_vec(),
            grouping_columns_used: self.grouping_columns_used.into_vec(),
        }
    }
}

impl LanguageVisitor for AggregateSymbolCollectorVisitor {
    fn should_descend(&mut self, expr: &Expression) -> bool {
        if self.grouping_columns.contains(expr) {
            self.grouping_columns_used.push(expr);
            return false;
        }
        true
    }

    fn visit_aggregate(&mut self, aggregate: &AggregateSymbol) {
        self.aggregates.push(aggregate);
    }

    fn visit_window_function(&mut self, window: &WindowFunction) {
        self.window_functions.push(window);
    }

    fn visit_element(&mut self, element: &ElementSymbol) {
        self.other_elements.push(element);
    }
}

pub fn get_aggregates<T: Navigable + ?Sized>(node: &T, remove_duplicates: bool) -> Vec<AggregateSymbol> {
    let mut visitor = AggregateSymbolCollectorVisitor::new(remove_duplicates);
    visitor.collect(node);
    visitor.into_collection().aggregates
}

/// 按分组列收集聚合、窗口函数与聚合之外的元素
pub fn get_aggregates_and_elements<T: Navigable + ?Sized>(
    node: &T,
    grouping_columns: &[Expression],
) -> AggregateCollection {
    let mut visitor = AggregateSymbolCollectorVisitor::new(true)
        .with_grouping_columns(grouping_columns.iter().cloned());
    visitor.collect(node);
    visitor.into_collection()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::sql::{
        AggregateKind, Command, Constant, FromList, Function, GroupSymbol, Query, ScalarSubquery,
        Select, WindowSpecification,
    };

    fn e(name: &str) -> ElementSymbol {
        ElementSymbol::qualified("pm1.g1", name)
    }

    fn sum(name: &str) -> AggregateSymbol {
        AggregateSymbol::new(AggregateKind::Sum, Some(e(name).into()))
    }

    #[test]
    fn test_aggregate_operands_are_opaque() {
        let symbols: Vec<Expression> = vec![
            Function::new("+", vec![sum("e1").into(), e("e2").into()]).into(),
            AggregateSymbol::count_star().into(),
        ];
        let collection = get_aggregates_and_elements(&symbols, &[]);
        assert_eq!(collection.aggregates, vec![sum("e1"), AggregateSymbol::count_star()]);
        assert_eq!(collection.other_elements, vec![e("e2")]);
    }

    #[test]
    fn test_grouping_columns_are_diverted() {
        let grouped: Expression = Function::new("concat", vec![e("e1").into(), e("e2").into()]).into();
        let symbols: Vec<Expression> = vec![
            grouped.clone(),
            Function::new("+", vec![e("e3").into(), Constant::new(1).into()]).into(),
        ];
        let collection = get_aggregates_and_elements(&symbols, &[grouped.clone()]);
        assert_eq!(collection.grouping_columns_used, vec![grouped]);
        assert_eq!(collection.other_elements, vec![e("e3")]);
    }

    #[test]
    fn test_window_functions_collected_separately() {
        let window = WindowFunction::new(
            sum("e1"),
            WindowSpecification {
                partition: vec![e("e2").into()],
                order_by: None,
            },
        );
        let symbols: Vec<Expression> = vec![Expression::Window(window.clone())];
        let collection = get_aggregates_and_elements(&symbols, &[]);
        assert!(collection.aggregates.is_empty());
        assert_eq!(collection.window_functions, vec![window]);
        assert!(collection.other_elements.is_empty());
    }

    #[test]
    fn test_deep_and_duplicate_flags() {
        let nested = Command::Query(Query::new(
            Select::new(vec![sum("e3").into()]),
            Some(FromList::groups(vec![GroupSymbol::new("pm1.g2")])),
        ));
        let symbols: Vec<Expression> = vec![
            sum("e1").into(),
            sum("e1").into(),
            Expression::ScalarSubquery(ScalarSubquery::new(nested)),
        ];

        let mut shallow = AggregateSymbolCollectorVisitor::new(false);
        shallow.collect(&symbols);
        assert_eq!(shallow.aggregates(), &[sum("e1"), sum("e1")]);

        let config = AnalysisConfig::default();
        let mut deep = AggregateSymbolCollectorVisitor::with_config(&config);
        deep.collect(&symbols);
        assert_eq!(deep.aggregates(), &[sum("e1"), sum("e3")]);
    }
}
