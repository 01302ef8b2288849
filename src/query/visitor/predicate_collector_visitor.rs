//! PredicateCollectorVisitor - 收集谓词
//!
//! `Compound` 与 `Not` 只是连接结构，不作为谓词返回

use crate::query::sql::Criteria;
use crate::query::visitor::collection::Collected;
use crate::query::visitor::language_visitor::LanguageVisitor;
use crate::query::visitor::navigator::{pre_order, Navigable};

#[derive(Debug)]
pub struct PredicateCollectorVisitor {
    predicates: Collected<Criteria>,
    deep: bool,
}

impl PredicateCollectorVisitor {
    pub fn new(remove_duplicates: bool) -> Self {
        Self {
            predicates: Collected::new(remove_duplicates),
            deep: false,
        }
    }

    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    pub fn collect<T: Navigable + ?Sized>(&mut self, node: &T) {
        let deep = self.deep;
        pre_order(node, self, deep);
    }

    pub fn into_predicates(self) -> Vec<Criteria> {
        self.predicates.into_vec()
    }
}

impl LanguageVisitor for PredicateCollectorVisitor {
    fn visit_criteria(&mut self, criteria: &Criteria) {
        if criteria.kind().is_predicate() {
            self.predicates.push(criteria);
        }
    }
}

pub fn get_predicates<T: Navigable + ?Sized>(node: &T) -> Vec<Criteria> {
    let mut visitor = PredicateCollectorVisitor::new(false);
    visitor.collect(node);
    visitor.into_predicates()
}
