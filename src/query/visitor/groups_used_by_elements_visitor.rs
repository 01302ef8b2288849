//! GroupsUsedByElementsVisitor - 收集元素所引用的组
//!
//! 与 `GroupCollectorVisitor` 不同，这里只关心表达式实际用到的组

use crate::config::AnalysisConfig;
use crate::query::sql::{ElementSymbol, GroupSymbol};
use crate::query::visitor::collection::Collected;
use crate::query::visitor::language_visitor::LanguageVisitor;
use crate::query::visitor::navigator::{pre_order, Navigable};

#[derive(Debug)]
pub struct GroupsUsedByElementsVisitor {
    groups: Collected<GroupSymbol>,
    deep: bool,
}

impl GroupsUsedByElementsVisitor {
    pub fn new(remove_duplicates: bool) -> Self {
        Self {
            groups: Collected::new(remove_duplicates),
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

    pub fn into_groups(self) -> Vec<GroupSymbol> {
        self.groups.into_vec()
    }
}

impl Default for GroupsUsedByElementsVisitor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl LanguageVisitor for GroupsUsedByElementsVisitor {
    fn visit_element(&mut self, element: &ElementSymbol) {
        if let Some(group) = &element.group {
            self.groups.push(group);
        }
    }
}

/// 元素引用的组，去重且保持首次出现顺序
pub fn get_groups_used_by_elements<T: Navigable + ?Sized>(node: &T) -> Vec<GroupSymbol> {
    let mut visitor = GroupsUsedByElementsVisitor::new(true);
    visitor.collect(node);
    visitor.into_groups()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::sql::{CompareOp, Criteria};

    #[test]
    fn test_groups_from_elements() {
        let criteria = Criteria::and(vec![
            Criteria::compare(
                ElementSymbol::qualified("pm1.g1", "e1"),
                CompareOp::Eq,
                ElementSymbol::qualified("pm1.g2", "e1"),
            ),
            Criteria::is_null(ElementSymbol::qualified("pm1.g1", "e2")),
            Criteria::is_null(ElementSymbol::new("unbound")),
        ]);
        let groups: Vec<String> = get_groups_used_by_elements(&criteria)
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(groups, vec!["pm1.g1", "pm1.g2"]);
    }

    #[test]
    fn test_deep_and_duplicate_flags() {
        use crate::query::sql::{Command, FromList, Query, Select};

        let nested = Command::Query(Query::new(
            Select::new(vec![ElementSymbol::qualified("pm1.g3", "e1").into()]),
            Some(FromList::groups(vec![GroupSymbol::new("pm1.g3")])),
        ));
        let criteria = Criteria::and(vec![
            Criteria::is_null(ElementSymbol::qualified("pm1.g1", "e1")),
            Criteria::is_null(ElementSymbol::qualified("pm1.g1", "e2")),
            Criteria::exists(nested),
        ]);

        let group = |name: &str| GroupSymbol::new(name).with_metadata_id(name);

        let mut all = GroupsUsedByElementsVisitor::new(false);
        all.collect(&criteria);
        assert_eq!(
            all.into_groups(),
            vec![group("pm1.g1"), group("pm1.g1")]
        );

        let mut deep = GroupsUsedByElementsVisitor::with_config(&AnalysisConfig::default());
        deep.collect(&criteria);
        assert_eq!(
            deep.into_groups(),
            vec![group("pm1.g1"), group("pm1.g3")]
        );
    }
}
