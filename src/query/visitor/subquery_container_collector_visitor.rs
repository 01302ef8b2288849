//! SubqueryContainerCollectorVisitor - 收集承载子查询的节点
//!
//! 标量子查询、EXISTS、IN 子查询、量化比较以及 FROM 中的内联视图

use crate::config::AnalysisConfig;
use crate::query::sql::{
    Command, ExistsCriteria, ScalarSubquery, SubqueryCompareCriteria, SubqueryFromClause,
    SubquerySetCriteria,
};
use crate::query::visitor::collection::Collected;
use crate::query::visitor::language_visitor::LanguageVisitor;
use crate::query::visitor::navigator::{pre_order, Navigable};

/// 子查询容器
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubqueryContainer {
    Scalar(ScalarSubquery),
    Exists(ExistsCriteria),
    In(SubquerySetCriteria),
    Compare(SubqueryCompareCriteria),
    From(SubqueryFromClause),
}

impl SubqueryContainer {
    /// 容器内的子命令
    pub fn command(&self) -> &Command {
        match self {
            SubqueryContainer::Scalar(s) => &s.command,
            SubqueryContainer::Exists(c) => &c.command,
            SubqueryContainer::In(c) => &c.command,
            SubqueryContainer::Compare(c) => &c.command,
            SubqueryContainer::From(c) => &c.command,
        }
    }
}

#[derive(Debug)]
pub struct SubqueryContainerCollectorVisitor {
    containers: Collected<SubqueryContainer>,
    deep: bool,
}

impl SubqueryContainerCollectorVisitor {
    pub fn new(remove_duplicates: bool) -> Self {
        Self {
            containers: Collected::new(remove_duplicates),
            deep: false,
        }
    }

    pub fn with_config(config: &AnalysisConfig) -> Self {
        Self::new(config.remove_duplicates).deep(config.deep_traversal)
    }

    /// 进入子查询，收集任意层级的容器
    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    pub fn collect<T: Navigable + ?Sized>(&mut self, node: &T) {
        let deep = self.deep;
        pre_order(node, self, deep);
    }

    pub fn containers(&self) -> &[SubqueryContainer] {
        self.containers.items()
    }

    pub fn into_containers(self) -> Vec<SubqueryContainer> {
        self.containers.into_vec()
    }
}

impl LanguageVisitor for SubqueryContainerCollectorVisitor {
    fn visit_scalar_subquery(&mut self, subquery: &ScalarSubquery) {
        self.containers.push(&SubqueryContainer::Scalar(subquery.clone()));
    }

    fn visit_exists(&mut self, criteria: &ExistsCriteria) {
        self.containers.push(&SubqueryContainer::Exists(criteria.clone()));
    }

    fn visit_subquery_set(&mut self, criteria: &SubquerySetCriteria) {
        self.containers.push(&SubqueryContainer::In(criteria.clone()));
    }

    fn visit_subquery_compare(&mut self, criteria: &SubqueryCompareCriteria) {
        self.containers.push(&SubqueryContainer::Compare(criteria.clone()));
    }

    fn visit_subquery_from_clause(&mut self, clause: &SubqueryFromClause) {
        self.containers.push(&SubqueryContainer::From(clause.clone()));
    }
}

/// 当前命令层级中的子查询容器，不进入子查询内部
pub fn get_subquery_containers<T: Navigable + ?Sized>(node: &T) -> Vec<SubqueryContainer> {
    let mut visitor = SubqueryContainerCollectorVisitor::new(false);
    visitor.collect(node);
    visitor.into_containers()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::sql::{
        CompareOp, Criteria, ElementSymbol, Expression, FromClause, FromList, GroupSymbol, Query,
        Select,
    };

    fn simple_query(group: &str) -> Command {
        Command::Query(Query::new(
            Select::new(vec![ElementSymbol::new("e1").into()]),
            Some(FromList::groups(vec![GroupSymbol::new(group)])),
        ))
    }

    #[test]
    fn test_collects_each_container_kind() {
        let scalar = ScalarSubquery::new(simple_query("g2"));
        let inline_view = SubqueryFromClause {
            group: GroupSymbol::new("v"),
            command: Box::new(simple_query("g3")),
            lateral: false,
        };
        let query = Query::new(
            Select::new(vec![Expression::ScalarSubquery(scalar.clone())]),
            Some(FromList::new(vec![FromClause::Subquery(inline_view.clone())])),
        )
        .with_criteria(Criteria::and(vec![
            Criteria::exists(simple_query("g4")),
            Criteria::compare(ElementSymbol::new("e1"), CompareOp::Gt, ElementSymbol::new("e2")),
        ]));

        let containers = get_subquery_containers(&Command::Query(query));
        assert_eq!(containers.len(), 3);
        assert_eq!(containers[0], SubqueryContainer::Scalar(scalar));
        assert_eq!(containers[1], SubqueryContainer::From(inline_view));
        assert!(matches!(containers[2], SubqueryContainer::Exists(_)));
        assert_eq!(containers[2].command(), &simple_query("g4"));
    }

    #[test]
    fn test_deep_and_duplicate_flags() {
        let innermost = Criteria::exists(simple_query("g3"));
        let nested = Command::Query(
            Query::new(
                Select::new(vec![ElementSymbol::new("e1").into()]),
                Some(FromList::groups(vec![GroupSymbol::new("g2")])),
            )
            .with_criteria(innermost.clone()),
        );
        let criteria = Criteria::and(vec![
            Criteria::exists(nested.clone()),
            Criteria::exists(nested),
        ]);

        assert_eq!(get_subquery_containers(&criteria).len(), 2);

        let mut unique = SubqueryContainerCollectorVisitor::new(true);
        unique.collect(&criteria);
        assert_eq!(unique.containers().len(), 1);

        let mut deep = SubqueryContainerCollectorVisitor::new(true).deep(true);
        deep.collect(&criteria);
        let Criteria::Exists(innermost) = innermost else {
            panic!("应为 EXISTS");
        };
        assert_eq!(deep.containers().len(), 2);
        assert_eq!(deep.containers()[1], SubqueryContainer::Exists(innermost));
    }
}
