//! GroupCollectorVisitor - 收集 FROM 子句与 DML 目标中的组
//!
//! FROM 子查询的内联视图组默认不收集，可通过 `include_inline_groups` 打开

use crate::config::AnalysisConfig;
use crate::query::sql::{GroupSymbol, SubqueryFromClause};
use crate::query::visitor::collection::Collected;
use crate::query::visitor::language_visitor::LanguageVisitor;
use crate::query::visitor::navigator::{pre_order, Navigable};

#[derive(Debug)]
pub struct GroupCollectorVisitor {
    groups: Collected<GroupSymbol>,
    include_inline_groups: bool,
    deep: bool,
}

impl GroupCollectorVisitor {
    pub fn new(remove_duplicates: bool) -> Self {
        Self {
            groups: Collected::new(remove_duplicates),
            include_inline_groups: false,
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

    pub fn include_inline_groups(mut self, include: bool) -> Self {
        self.include_inline_groups = include;
        self
    }

    pub fn collect<T: Navigable + ?Sized>(&mut self, node: &T) {
        let deep = self.deep;
        pre_order(node, self, deep);
    }

    pub fn groups(&self) -> &[GroupSymbol] {
        self.groups.items()
    }

    pub fn into_groups(self) -> Vec<GroupSymbol> {
        self.groups.into_vec()
    }
}

impl LanguageVisitor for GroupCollectorVisitor {
    fn visit_group(&mut self, group: &GroupSymbol) {
        self.groups.push(group);
    }

    fn visit_subquery_from_clause(&mut self, clause: &SubqueryFromClause) {
        if self.include_inline_groups {
            self.groups.push(&clause.group);
        }
    }
}

pub fn get_groups<T: Navigable + ?Sized>(node: &T, remove_duplicates: bool) -> Vec<GroupSymbol> {
    let mut visitor = GroupCollectorVisitor::new(remove_duplicates);
    visitor.collect(node);
    visitor.into_groups()
}

pub fn get_groups_with_inline_views<T: Navigable + ?Sized>(
    node: &T,
    remove_duplicates: bool,
) -> Vec<GroupSymbol> {
    let mut visitor = GroupCollectorVisitor::new(remove_duplicates).include_inline_groups(true);
    visitor.collect(node);
    visitor.into_groups()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::sql::{
        Command, ElementSymbol, FromClause, FromList, JoinPredicate, JoinType, Query, Select,
        UnaryFromClause,
    };

    fn query_with_inline_view() -> Command {
        let inner = Command::Query(Query::new(
            Select::new(vec![ElementSymbol::new("e1").into()]),
            Some(FromList::groups(vec![GroupSymbol::new("pm1.g2")])),
        ));
        let from = FromList::new(vec![FromClause::Join(JoinPredicate {
            left: Box::new(FromClause::Unary(UnaryFromClause::new(GroupSymbol::new("pm1.g1")))),
            right: Box::new(FromClause::Subquery(SubqueryFromClause {
                group: GroupSymbol::new("v"),
                command: Box::new(inner),
                lateral: false,
            })),
            join_type: JoinType::Cross,
            criteria: vec![],
        })]);
        Command::Query(Query::new(Select::new(vec![ElementSymbol::new("e1").into()]), Some(from)))
    }

    #[test]
    fn test_inline_views_are_optional() {
        let command = query_with_inline_view();
        assert_eq!(get_groups(&command, true), vec![GroupSymbol::new("pm1.g1")]);
        assert_eq!(
            get_groups_with_inline_views(&command, true),
            vec![GroupSymbol::new("pm1.g1"), GroupSymbol::new("v")]
        );

        let mut deep = GroupCollectorVisitor::new(true).deep(true);
        deep.collect(&command);
        assert_eq!(
            deep.groups(),
            &[GroupSymbol::new("pm1.g1"), GroupSymbol::new("pm1.g2")]
        );
    }
}
