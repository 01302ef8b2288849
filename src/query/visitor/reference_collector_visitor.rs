//! ReferenceCollectorVisitor - 收集绑定参数与外层引用

use crate::query::sql::Reference;
use crate::query::visitor::collection::Collected;
use crate::query::visitor::language_visitor::LanguageVisitor;
use crate::query::visitor::navigator::{pre_order, Navigable};

#[derive(Debug)]
pub struct ReferenceCollectorVisitor {
    references: Collected<Reference>,
    deep: bool,
}

impl ReferenceCollectorVisitor {
    pub fn new(remove_duplicates: bool) -> Self {
        Self {
            references: Collected::new(remove_duplicates),
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

    pub fn into_references(self) -> Vec<Reference> {
        self.references.into_vec()
    }
}

impl LanguageVisitor for ReferenceCollectorVisitor {
    fn visit_reference(&mut self, reference: &Reference) {
        self.references.push(reference);
    }
}

pub fn get_references<T: Navigable + ?Sized>(node: &T, remove_duplicates: bool) -> Vec<Reference> {
    let mut visitor = ReferenceCollectorVisitor::new(remove_duplicates);
    visitor.collect(node);
    visitor.into_references()
}
