//! FunctionCollectorVisitor - 收集函数调用，可按名称过滤（不区分大小写）

use crate::query::sql::Function;
use crate::query::visitor::collection::Collected;
use crate::query::visitor::language_visitor::LanguageVisitor;
use crate::query::visitor::navigator::{pre_order, Navigable};

#[derive(Debug)]
pub struct FunctionCollectorVisitor {
    functions: Collected<Function>,
    name_filter: Option<String>,
    deep: bool,
}

impl FunctionCollectorVisitor {
    pub fn new(remove_duplicates: bool) -> Self {
        Self {
            functions: Collected::new(remove_duplicates),
            name_filter: None,
            deep: false,
        }
    }

    /// 只收集指定名称的函数
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name_filter = Some(name.into());
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

    pub fn into_functions(self) -> Vec<Function> {
        self.functions.into_vec()
    }
}

impl LanguageVisitor for FunctionCollectorVisitor {
    fn visit_function(&mut self, function: &Function) {
        let accepted = self
            .name_filter
            .as_deref()
            .map_or(true, |name| function.name.eq_ignore_ascii_case(name));
        if accepted {
            self.functions.push(function);
        }
    }
}

pub fn get_functions<T: Navigable + ?Sized>(node: &T, remove_duplicates: bool) -> Vec<Function> {
    let mut visitor = FunctionCollectorVisitor::new(remove_duplicates);
    visitor.collect(node);
    visitor.into_functions()
}

pub fn get_functions_named<T: Navigable + ?Sized>(node: &T, name: &str) -> Vec<Function> {
    let mut visitor = FunctionCollectorVisitor::new(false).with_name(name);
    visitor.collect(node);
    visitor.into_functions()
}
