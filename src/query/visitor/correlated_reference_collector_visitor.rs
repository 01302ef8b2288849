//! CorrelatedReferenceCollectorVisitor - 收集子查询中指向外层组的引用
//!
//! 只收集包装元素且元素所属组在外层组集合中的引用，默认进入更深的嵌套命令

use crate::config::AnalysisConfig;
use crate::query::sql::{GroupSymbol, Reference};
use crate::query::visitor::collection::Collected;
use crate::query::visitor::language_visitor::LanguageVisitor;
use crate::query::visitor::navigator::{pre_order, Navigable};
use std::collections::HashSet;

#[derive(Debug)]
pub struct CorrelatedReferenceCollectorVisitor {
    outer_groups: HashSet<GroupSymbol>,
    references: Collected<Reference>,
    deep: bool,
}

impl CorrelatedReferenceCollectorVisitor {
    pub fn new<I>(outer_groups: I) -> Self
    where
        I: IntoIterator<Item = GroupSymbol>,
    {
        Self {
            outer_groups: outer_groups.into_iter().collect(),
            references: Collected::new(true),
            deep: true,
        }
    }

    pub fn with_config(self, config: &AnalysisConfig) -> Self {
        self.remove_duplicates(config.remove_duplicates)
            .deep(config.deep_traversal)
    }

    /// 默认去重
    pub fn remove_duplicates(mut self, remove_duplicates: bool) -> Self {
        self.references = Collected::new(remove_duplicates);
        self
    }

    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    pub fn collect<T: Navigable + ?Sized>(&mut self, node: &T) {
        let deep = self.deep;
        pre_order(node, self, deep);
    }

    pub fn into_references(self) -> Vec<Reference> {
        self.references.into_vec()
    }
}

impl LanguageVisitor for CorrelatedReferenceCollectorVisitor {
    fn visit_reference(&mut self, reference: &Reference) {
        let is_outer = reference
            .element()
            .and_then(|element| element.group.as_ref())
            .map_or(false, |group| self.outer_groups.contains(group));
        if is_outer {
            self.references.push(reference);
        }
    }
}

pub fn get_correlated_references<T, I>(node: &T, outer_groups: I) -> Vec<Reference>
where
    T: Navigable + ?Sized,
    I: IntoIterator<Item = GroupSymbol>,
{
    let mut visitor = CorrelatedReferenceCollectorVisitor::new(outer_groups);
    visitor.collect(node);
    visitor.into_references()
}
