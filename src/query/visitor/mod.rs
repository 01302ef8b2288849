//! 访问器模块
//!
//! - 导航器与访问器契约：`navigator`、`language_visitor`
//! - 改写：`expression_mapping_visitor`、`criteria_translator_visitor`
//! - 分析：`evaluatable_visitor`
//! - 收集器：各类 `*_collector_visitor`

mod collection;

pub mod aggregate_symbol_collector_visitor;
pub mod command_collector_visitor;
pub mod correlated_reference_collector_visitor;
pub mod criteria_translator_visitor;
pub mod element_collector_visitor;
pub mod evaluatable_visitor;
pub mod expression_mapping_visitor;
pub mod function_collector_visitor;
pub mod group_collector_visitor;
pub mod groups_used_by_elements_visitor;
pub mod language_visitor;
pub mod navigator;
pub mod predicate_collector_visitor;
pub mod reference_collector_visitor;
pub mod subquery_container_collector_visitor;

pub use language_visitor::{ExpressionSlot, LanguageVisitor, LanguageVisitorMut};
pub use navigator::{
    post_order, pre_order, Navigable, NavigableMut, Navigator, NavigatorMut, TraversalOrder,
};

pub use expression_mapping_visitor::{
    map_expressions, map_expressions_ref, ExpressionMappingVisitor, SymbolMap,
};
pub use criteria_translator_visitor::{
    translate_criteria, CriteriaSelector, CriteriaTranslatorVisitor, TranslatedCriteria,
};
pub use evaluatable_visitor::{
    determinism_of, is_fully_evaluatable, is_pushdown_evaluatable, EvaluatableVisitor,
};

pub use aggregate_symbol_collector_visitor::{
    get_aggregates, get_aggregates_and_elements, AggregateCollection,
    AggregateSymbolCollectorVisitor,
};
pub use command_collector_visitor::{get_commands, get_commands_deep, CommandCollectorVisitor};
pub use correlated_reference_collector_visitor::{
    get_correlated_references, CorrelatedReferenceCollectorVisitor,
};
pub use element_collector_visitor::{get_elements, get_elements_deep, ElementCollectorVisitor};
pub use function_collector_visitor::{get_functions, get_functions_named, FunctionCollectorVisitor};
pub use group_collector_visitor::{get_groups, get_groups_with_inline_views, GroupCollectorVisitor};
pub use groups_used_by_elements_visitor::{
    get_groups_used_by_elements, GroupsUsedByElementsVisitor,
};
pub use predicate_collector_visitor::{get_predicates, PredicateCollectorVisitor};
pub use reference_collector_visitor::{get_references, ReferenceCollectorVisitor};
pub use subquery_container_collector_visitor::{
    get_subquery_containers, SubqueryContainer, SubqueryContainerCollectorVisitor,
};
