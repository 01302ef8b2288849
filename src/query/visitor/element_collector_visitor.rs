//! ElementCollectorVisitor - 收集树中所有元素符号的访问器
//!
//! 包括表达式中的列引用，以及 INSERT 列清单、UPDATE 赋值目标等元素槽位。
//! 引用（`Reference`）包装的外层元素不属于当前命令，不会被收集

use crate::config::AnalysisConfig;
use crate::query::sql::ElementSymbol;
use crate::query::visitor::collection::Collected;
use crate::query::visitor::language_visitor::LanguageVisitor;
use crate::query::visitor::navigator::{pre_order, Navigable};

#[derive(Debug)]
pub struct ElementCollectorVisitor {
    elements: Collected<ElementSymbol>,
    deep: bool,
}

impl ElementCollectorVisitor {
    pub fn new(remove_duplicates: bool) -> Self {
        Self {
            elements: Collected::new(remove_duplicates),
            deep: false,
        }
    }

    pub fn with_config(config: &AnalysisConfig) -> Self {
        Self::new(config.remove_duplicates).deep(config.deep_traversal)
    }

    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    pub fn collect<T: Navigable + ?Sized>(&mut self, node: &T) {
        let deep = self.deep;
        pre_order(node, self, deep);
    }

    pub fn elements(&self) -> &[ElementSymbol] {
        self.elements.items()
    }

    pub fn into_elements(self) -> Vec<ElementSymbol> {
        self.elements.into_vec()
    }
}

impl LanguageVisitor for ElementCollectorVisitor {
    fn visit_element(&mut self, element: &ElementSymbol) {
        self.elements.push(element);
    }
}

/// 收集元素，不进入嵌套命令
pub fn get_elements<T: Navigable + ?Sized>(node: &T, remove_duplicates: bool) -> Vec<ElementSymbol> {
    let mut visitor = ElementCollectorVisitor::new(remove_duplicates);
    visitor.collect(node);
    visitor.into_elements()
}

/// 收集元素，包括嵌套命令中的元素
pub fn get_elements_deep<T: Navigable + ?Sized>(
    node: &T,
    remove_duplicates: bool,
) -> Vec<ElementSymbol> {
    let mut visitor = ElementCollectorVisitor::new(remove_duplicates).deep(true);
    visitor.collect(node);
    visitor.into_elements()
}
