//! EvaluatableVisitor - 求值级别与确定性分析
//!
//! 遍历一棵子树，记录其中各节点要求的求值级别集合以及最不确定的确定性级别：
//! - 函数的确定性与下推策略来自函数描述符，节点上没有时按名称查元数据
//! - 普通列要求 `PushDown`，运行时单值组（临时表、标量伪组）的列要求 `Processing`
//! - 指定下推模型时，属于其他模型的物理表列要求 `Processing`
//! - 引用、依赖集合条件只能在引擎运行时取值
//! - 子查询与存储过程在 `should_evaluate` 时要求 `Processing`
//!
//! 提供目标级别时，一旦某个要求超过目标立即中止遍历。
//! 元数据错误会中止遍历并由 `analyze` 返回

use crate::config::AnalysisConfig;
use crate::core::error::{MetadataError, MetadataResult};
use crate::core::metadata::{
    CapabilitiesFinder, GroupKind, MetadataId, PushDown, QueryMetadata,
};
use crate::core::types::{Determinism, EvaluationLevel};
use crate::query::sql::{
    AggregateSymbol, AliasSymbol, DependentSetCriteria, ElementSymbol, ExistsCriteria,
    ExpressionSymbol, Function, Reference, ScalarSubquery, StoredProcedure,
    SubqueryCompareCriteria, SubquerySetCriteria, WindowFunction,
};
use crate::query::visitor::language_visitor::LanguageVisitor;
use crate::query::visitor::navigator::{pre_order, Navigable};
use std::collections::BTreeSet;

pub struct EvaluatableVisitor<'a> {
    metadata: &'a dyn QueryMetadata,
    capabilities: Option<&'a dyn CapabilitiesFinder>,
    model_id: Option<MetadataId>,
    target_level: Option<EvaluationLevel>,
    deep: bool,
    levels: BTreeSet<EvaluationLevel>,
    determinism: Determinism,
    has_correlated_references: bool,
    exceeded: bool,
    error: Option<MetadataError>,
}

impl<'a> EvaluatableVisitor<'a> {
    pub fn new(metadata: &'a dyn QueryMetadata) -> Self {
        Self {
            metadata,
            capabilities: None,
            model_id: None,
            target_level: None,
            deep: AnalysisConfig::default().deep_traversal,
            levels: BTreeSet::new(),
            determinism: Determinism::Deterministic,
            has_correlated_references: false,
            exceeded: false,
            error: None,
        }
    }

    pub fn with_config(mut self, config: &AnalysisConfig) -> Self {
        self.deep = config.deep_traversal;
        self
    }

    /// 下推目标模型
    pub fn with_model(mut self, model_id: impl Into<MetadataId>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_capabilities(mut self, capabilities: &'a dyn CapabilitiesFinder) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// 目标级别，超过时提前中止
    pub fn with_target_level(mut self, level: EvaluationLevel) -> Self {
        self.target_level = Some(level);
        self
    }

    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    /// 分析节点，状态在多次调用之间累积，需要时先调用 `reset`
    pub fn analyze<T: Navigable + ?Sized>(&mut self, node: &T) -> MetadataResult<()> {
        let deep = self.deep;
        pre_order(node, self, deep);
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// 清空累积状态，保留元数据、目标模型与目标级别
    pub fn reset(&mut self) {
        self.levels.clear();
        self.determinism = Determinism::Deterministic;
        self.has_correlated_references = false;
        self.exceeded = false;
        self.error = None;
    }

    /// 所有要求都不超过 `level` 时为真
    pub fn is_evaluatable_at(&self, level: EvaluationLevel) -> bool {
        self.max_level().map_or(true, |max| max <= level)
    }

    /// 限制最强的要求，没有任何要求时为 `None`
    pub fn max_level(&self) -> Option<EvaluationLevel> {
        self.levels.iter().next_back().copied()
    }

    pub fn required_levels(&self) -> impl Iterator<Item = EvaluationLevel> + '_ {
        self.levels.iter().copied()
    }

    pub fn determinism(&self) -> Determinism {
        self.determinism
    }

    pub fn has_correlated_references(&self) -> bool {
        self.has_correlated_references
    }

    fn in_pushdown_context(&self) -> bool {
        self.model_id.is_some() || self.target_level == Some(EvaluationLevel::PushDown)
    }

    fn require(&mut self, level: EvaluationLevel) {
        self.levels.insert(level);
        if let Some(target) = self.target_level {
            if level > target && !self.exceeded {
                log::debug!("求值级别 {} 超过目标 {}，提前终止分析", level, target);
                self.exceeded = true;
            }
        }
    }

    fn floor_determinism(&mut self, determinism: Determinism) {
        self.determinism = self.determinism.combine(determinism);
    }

    fn fail(&mut self, err: MetadataError) {
        log::debug!("求值分析失败: {}", err);
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn mark_correlated(&mut self) {
        self.has_correlated_references = true;
        if self.in_pushdown_context() {
            self.floor_determinism(Determinism::Nondeterministic);
        }
    }

    /// 物理表的列只能下推到其所属模型，其他模型的列需要引擎取值
    fn require_source_affinity(&mut self, group_id: &MetadataId) {
        let Some(target) = self.model_id.clone() else {
            self.require(EvaluationLevel::PushDown);
            return;
        };
        match self.metadata.model_id(group_id) {
            Ok(model) if model == target => self.require(EvaluationLevel::PushDown),
            Ok(model) => {
                log::debug!("组 {} 属于模型 {}，不能下推到 {}", group_id, model, target);
                self.require(EvaluationLevel::Processing);
            }
            Err(err) => self.fail(err),
        }
    }

    fn require_for_subquery(&mut self, should_evaluate: bool) {
        if should_evaluate {
            self.require(EvaluationLevel::Processing);
        } else {
            self.require(EvaluationLevel::PushDown);
        }
    }
}

impl LanguageVisitor for EvaluatableVisitor<'_> {
    fn should_abort(&self) -> bool {
        self.exceeded || self.error.is_some()
    }

    fn visit_function(&mut self, function: &Function) {
        let descriptor = match &function.descriptor {
            Some(descriptor) => descriptor.clone(),
            None => match self.metadata.function_descriptor(&function.name) {
                Ok(descriptor) => descriptor,
                Err(err) => return self.fail(err),
            },
        };
        self.floor_determinism(descriptor.determinism);
        match descriptor.pushdown {
            PushDown::MustPushdown => {
                let supported = match (self.capabilities, &self.model_id) {
                    (Some(capabilities), Some(model_id)) => {
                        capabilities.supports_function(model_id, &function.name)
                    }
                    _ => false,
                };
                if supported {
                    self.require(EvaluationLevel::PushDown);
                } else {
                    self.require(EvaluationLevel::Processing);
                }
            }
            PushDown::CannotPushdown => self.require(EvaluationLevel::Processing),
            PushDown::CanPushdown => {
                if descriptor.determinism == Determinism::Nondeterministic {
                    self.require(EvaluationLevel::PushDown);
                }
            }
        }
    }

    fn visit_element(&mut self, element: &ElementSymbol) {
        if element.is_external_reference {
            self.mark_correlated();
        }
        let Some(group) = &element.group else {
            self.require(EvaluationLevel::Processing);
            return;
        };
        let group_id = group
            .metadata_id
            .clone()
            .unwrap_or_else(|| MetadataId::new(group.non_correlation_name()));
        match self.metadata.group_kind(&group_id) {
            Ok(kind) if kind.is_runtime_value() => self.require(EvaluationLevel::Processing),
            Ok(GroupKind::Physical) => self.require_source_affinity(&group_id),
            Ok(_) => self.require(EvaluationLevel::PushDown),
            Err(err) => self.fail(err),
        }
    }

    fn visit_alias(&mut self, _alias: &AliasSymbol) {
        self.require(EvaluationLevel::PushDown);
    }

    fn visit_expression_symbol(&mut self, _symbol: &ExpressionSymbol) {
        self.require(EvaluationLevel::PushDown);
    }

    fn visit_aggregate(&mut self, _aggregate: &AggregateSymbol) {
        self.require(EvaluationLevel::PushDown);
    }

    fn visit_window_function(&mut self, _window: &WindowFunction) {
        self.require(EvaluationLevel::PushDown);
    }

    fn visit_reference(&mut self, reference: &Reference) {
        self.require(EvaluationLevel::Processing);
        if reference.is_positional() {
            self.floor_determinism(Determinism::CommandDeterministic);
        }
        if reference.correlated {
            self.mark_correlated();
        }
    }

    fn visit_stored_procedure(&mut self, procedure: &StoredProcedure) {
        self.require_for_subquery(procedure.should_evaluate);
    }

    fn visit_scalar_subquery(&mut self, subquery: &ScalarSubquery) {
        self.require_for_subquery(subquery.should_evaluate);
    }

    fn visit_exists(&mut self, criteria: &ExistsCriteria) {
        self.require_for_subquery(criteria.should_evaluate);
    }

    fn visit_subquery_set(&mut self, criteria: &SubquerySetCriteria) {
        self.require_for_subquery(criteria.should_evaluate);
    }

    fn visit_subquery_compare(&mut self, criteria: &SubqueryCompareCriteria) {
        self.require_for_subquery(criteria.should_evaluate);
    }

    fn visit_dependent_set(&mut self, _criteria: &DependentSetCriteria) {
        self.require(EvaluationLevel::Processing);
        self.floor_determinism(Determinism::Nondeterministic);
    }
}

// ==================== 静态入口 ====================

/// 能否整体下推到 `model_id` 对应的数据源
pub fn is_pushdown_evaluatable<T: Navigable + ?Sized>(
    node: &T,
    model_id: &MetadataId,
    metadata: &dyn QueryMetadata,
    capabilities: &dyn CapabilitiesFinder,
) -> MetadataResult<bool> {
    let mut visitor = EvaluatableVisitor::new(metadata)
        .with_model(model_id.clone())
        .with_capabilities(capabilities)
        .with_target_level(EvaluationLevel::PushDown);
    visitor.analyze(node)?;
    Ok(visitor.is_evaluatable_at(EvaluationLevel::PushDown))
}

/// 能否在引擎内完成求值：计划阶段以 `Planning` 为上限，否则以 `Processing` 为上限
pub fn is_fully_evaluatable<T: Navigable + ?Sized>(
    node: &T,
    metadata: &dyn QueryMetadata,
    during_planning: bool,
) -> MetadataResult<bool> {
    let target = if during_planning {
        EvaluationLevel::Planning
    } else {
        EvaluationLevel::Processing
    };
    let mut visitor = EvaluatableVisitor::new(metadata).with_target_level(target);
    visitor.analyze(node)?;
    Ok(visitor.is_evaluatable_at(target))
}

/// 子树的确定性级别
pub fn determinism_of<T: Navigable + ?Sized>(
    node: &T,
    metadata: &dyn QueryMetadata,
) -> MetadataResult<Determinism> {
    let mut visitor = EvaluatableVisitor::new(metadata);
    visitor.analyze(node)?;
    Ok(visitor.determinism())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::{BasicCapabilitiesFinder, BasicMetadata, FunctionDescriptor};
    use crate::core::types::DataType;
    use crate::query::sql::{
        Command, CompareOp, Constant, Criteria, DependentSetCriteria, Expression, GroupSymbol,
        Quantifier, Query, Select, WindowSpecification,
    };

    fn metadata() -> BasicMetadata {
        BasicMetadata::with_system_functions()
            .with_group("pm1.g1", GroupKind::Physical, Some(MetadataId::new("pm1")))
            .with_group("pm2.g1", GroupKind::Physical, Some(MetadataId::new("pm2")))
            .with_group("orphan", GroupKind::Physical, None)
            .with_group("#temp", GroupKind::Temp, None)
            .with_function(
                FunctionDescriptor::new("source_hash", DataType::String)
                    .with_pushdown(PushDown::MustPushdown),
            )
    }

    fn col(name: &str) -> ElementSymbol {
        ElementSymbol::qualified("pm1.g1", name)
    }

    fn func(name: &str, args: Vec<Expression>) -> Expression {
        Function::new(name, args).into()
    }

    fn select_constant() -> Command {
        Command::Query(Query::new(Select::new(vec![Constant::new(1).into()]), None))
    }

    /// 浅层分析后的最高求值级别
    fn shallow_max_level<T: Navigable + ?Sized>(node: &T) -> Option<EvaluationLevel> {
        let metadata = metadata();
        let mut visitor = EvaluatableVisitor::new(&metadata).deep(false);
        visitor.analyze(node).unwrap();
        visitor.max_level()
    }

    #[test]
    fn test_column_is_pushdown() {
        let metadata = metadata();
        let mut visitor = EvaluatableVisitor::new(&metadata);
        visitor.analyze(&Expression::from(col("e1"))).unwrap();
        assert_eq!(visitor.max_level(), Some(EvaluationLevel::PushDown));
        assert!(visitor.is_evaluatable_at(EvaluationLevel::PushDown));
        assert_eq!(visitor.determinism(), Determinism::Deterministic);
    }

    #[test]
    fn test_runtime_groups_need_processing() {
        let metadata = metadata();
        let temp = ElementSymbol::qualified("#temp", "x");
        let ungrouped = ElementSymbol::new("v");
        for element in [temp, ungrouped] {
            let mut visitor = EvaluatableVisitor::new(&metadata);
            visitor.analyze(&Expression::from(element)).unwrap();
            assert!(!visitor.is_evaluatable_at(EvaluationLevel::PushDown));
            assert!(visitor.is_evaluatable_at(EvaluationLevel::Processing));
        }
    }

    #[test]
    fn test_unknown_group_is_error() {
        let metadata = metadata();
        let element = ElementSymbol::new("e1").with_group(GroupSymbol::new("nowhere.g"));
        let err = EvaluatableVisitor::new(&metadata)
            .analyze(&Expression::from(element))
            .unwrap_err();
        assert_eq!(err, MetadataError::UnknownGroup("nowhere.g".to_string()));
    }

    #[test]
    fn test_unresolved_function_is_error() {
        let metadata = metadata();
        let err = EvaluatableVisitor::new(&metadata)
            .analyze(&func("no_such_fn", vec![]))
            .unwrap_err();
        assert_eq!(err, MetadataError::UnresolvedFunction("no_such_fn".to_string()));
    }

    #[test]
    fn test_node_descriptor_wins_over_lookup() {
        let metadata = BasicMetadata::new();
        let expr: Expression = Function::new("custom", vec![])
            .with_descriptor(
                FunctionDescriptor::new("custom", DataType::Integer)
                    .with_determinism(Determinism::CommandDeterministic),
            )
            .into();
        assert_eq!(
            determinism_of(&expr, &metadata).unwrap(),
            Determinism::CommandDeterministic
        );
    }

    #[test]
    fn test_must_pushdown_depends_on_capabilities() {
        let metadata = metadata();
        let expr = func("source_hash", vec![col("e1").into()]);
        let caps = BasicCapabilitiesFinder::new().with_functions("pm1", ["source_hash"]);

        let mut supported = EvaluatableVisitor::new(&metadata)
            .with_model("pm1")
            .with_capabilities(&caps);
        supported.analyze(&expr).unwrap();
        assert!(supported.is_evaluatable_at(EvaluationLevel::PushDown));

        let mut no_caps = EvaluatableVisitor::new(&metadata).with_model("pm1");
        no_caps.analyze(&expr).unwrap();
        assert_eq!(no_caps.max_level(), Some(EvaluationLevel::Processing));

        let mut other_model = EvaluatableVisitor::new(&metadata)
            .with_model("pm2")
            .with_capabilities(&caps);
        other_model.analyze(&expr).unwrap();
        assert!(!other_model.is_evaluatable_at(EvaluationLevel::PushDown));
    }

    #[test]
    fn test_cannot_pushdown_and_nondeterministic_functions() {
        let metadata = metadata();

        let mut visitor = EvaluatableVisitor::new(&metadata);
        visitor.analyze(&func("user", vec![])).unwrap();
        assert_eq!(visitor.max_level(), Some(EvaluationLevel::Processing));
        assert_eq!(visitor.determinism(), Determinism::CommandDeterministic);

        visitor.reset();
        visitor.analyze(&func("rand", vec![])).unwrap();
        assert_eq!(visitor.max_level(), Some(EvaluationLevel::PushDown));
        assert_eq!(visitor.determinism(), Determinism::Nondeterministic);
    }

    #[test]
    fn test_positional_reference() {
        let metadata = metadata();
        let criteria = Criteria::compare(col("e1"), CompareOp::Eq, Reference::positional(0));
        let mut visitor = EvaluatableVisitor::new(&metadata);
        visitor.analyze(&criteria).unwrap();
        assert_eq!(visitor.max_level(), Some(EvaluationLevel::Processing));
        assert_eq!(visitor.determinism(), Determinism::CommandDeterministic);
        assert!(!visitor.has_correlated_references());
    }

    #[test]
    fn test_dependent_set_is_nondeterministic() {
        let metadata = metadata();
        let criteria = Criteria::DependentSet(DependentSetCriteria {
            expression: col("e1").into(),
            value_expression: None,
            context_symbol: "dep".to_string(),
        });
        let mut visitor = EvaluatableVisitor::new(&metadata);
        visitor.analyze(&criteria).unwrap();
        assert!(!visitor.is_evaluatable_at(EvaluationLevel::PushDown));
        assert_eq!(visitor.determinism(), Determinism::Nondeterministic);
    }

    #[test]
    fn test_early_abort_skips_rest_of_tree() {
        let metadata = metadata();
        let unknown = ElementSymbol::new("e9").with_group(GroupSymbol::new("nowhere.g"));
        let criteria = Criteria::and(vec![
            Criteria::compare(col("e1"), CompareOp::Eq, Reference::positional(0)),
            Criteria::compare(unknown, CompareOp::Eq, Constant::new(1)),
        ]);
        let mut visitor =
            EvaluatableVisitor::new(&metadata).with_target_level(EvaluationLevel::PushDown);
        assert!(visitor.analyze(&criteria).is_ok());
        assert!(visitor.should_abort());
        assert!(!visitor.is_evaluatable_at(EvaluationLevel::PushDown));

        visitor.reset();
        assert!(!visitor.should_abort());
        assert_eq!(visitor.max_level(), None);
    }

    #[test]
    fn test_static_entry_points() {
        let metadata = metadata();
        let caps = BasicCapabilitiesFinder::new();
        let model = MetadataId::new("pm1");
        let upper = func("upper", vec![col("e1").into()]);
        assert!(is_pushdown_evaluatable(&upper, &model, &metadata, &caps).unwrap());

        let with_param = Criteria::compare(col("e1"), CompareOp::Eq, Reference::positional(0));
        assert!(!is_pushdown_evaluatable(&with_param, &model, &metadata, &caps).unwrap());
        assert!(is_fully_evaluatable(&with_param, &metadata, false).unwrap());
        assert!(is_fully_evaluatable(&with_param, &metadata, true).unwrap());
    }

    #[test]
    fn test_aliased_group_uses_definition() {
        let metadata = metadata();
        let element = ElementSymbol::new("e1").with_group(GroupSymbol::aliased("x", "pm1.g1"));
        let mut visitor = EvaluatableVisitor::new(&metadata).with_model("pm1");
        visitor.analyze(&Expression::from(element)).unwrap();
        assert_eq!(visitor.max_level(), Some(EvaluationLevel::PushDown));
    }

    #[test]
    fn test_column_of_other_model_needs_processing() {
        let metadata = metadata();
        let foreign = Expression::from(ElementSymbol::qualified("pm2.g1", "e1"));

        let mut same_model = EvaluatableVisitor::new(&metadata).with_model("pm2");
        same_model.analyze(&foreign).unwrap();
        assert_eq!(same_model.max_level(), Some(EvaluationLevel::PushDown));

        let mut other_model = EvaluatableVisitor::new(&metadata).with_model("pm1");
        other_model.analyze(&foreign).unwrap();
        assert_eq!(other_model.max_level(), Some(EvaluationLevel::Processing));

        let mut no_model = EvaluatableVisitor::new(&metadata);
        no_model.analyze(&foreign).unwrap();
        assert_eq!(no_model.max_level(), Some(EvaluationLevel::PushDown));
    }

    #[test]
    fn test_physical_group_without_model_is_error() {
        let metadata = metadata();
        let element = Expression::from(ElementSymbol::qualified("orphan", "e1"));
        let err = EvaluatableVisitor::new(&metadata)
            .with_model("pm1")
            .analyze(&element)
            .unwrap_err();
        assert_eq!(err, MetadataError::UnknownModel("orphan".to_string()));
    }

    #[test]
    fn test_should_evaluate_escalates_to_processing() {
        let mut scalar = ScalarSubquery::new(select_constant());
        let mut exists = ExistsCriteria {
            command: Box::new(select_constant()),
            negated: false,
            should_evaluate: false,
        };
        let mut in_subquery = SubquerySetCriteria {
            expression: Constant::new(1).into(),
            command: Box::new(select_constant()),
            negated: false,
            should_evaluate: false,
        };
        let mut compare = SubqueryCompareCriteria {
            left: Constant::new(1).into(),
            op: CompareOp::Eq,
            quantifier: Quantifier::Any,
            command: Box::new(select_constant()),
            should_evaluate: false,
        };
        let mut procedure = StoredProcedure::new("pm1.sp1", vec![]);

        let pushed = EvaluationLevel::PushDown;
        assert_eq!(shallow_max_level(&Expression::ScalarSubquery(scalar.clone())), Some(pushed));
        assert_eq!(shallow_max_level(&Criteria::Exists(exists.clone())), Some(pushed));
        assert_eq!(shallow_max_level(&Criteria::SubquerySet(in_subquery.clone())), Some(pushed));
        assert_eq!(shallow_max_level(&Criteria::SubqueryCompare(compare.clone())), Some(pushed));
        assert_eq!(shallow_max_level(&Command::StoredProcedure(procedure.clone())), Some(pushed));

        scalar.should_evaluate = true;
        exists.should_evaluate = true;
        in_subquery.should_evaluate = true;
        compare.should_evaluate = true;
        procedure.should_evaluate = true;

        let processing = Some(EvaluationLevel::Processing);
        assert_eq!(shallow_max_level(&Expression::ScalarSubquery(scalar)), processing);
        assert_eq!(shallow_max_level(&Criteria::Exists(exists)), processing);
        assert_eq!(shallow_max_level(&Criteria::SubquerySet(in_subquery)), processing);
        assert_eq!(shallow_max_level(&Criteria::SubqueryCompare(compare)), processing);
        assert_eq!(shallow_max_level(&Command::StoredProcedure(procedure)), processing);
    }

    #[test]
    fn test_symbol_wrappers_and_aggregates_require_pushdown() {
        assert_eq!(shallow_max_level(&Expression::from(Constant::new(1))), None);

        let wrapped: Vec<Expression> = vec![
            AliasSymbol::new("a", Constant::new(1).into()).into(),
            ExpressionSymbol::new("expr", Constant::new(1).into()).into(),
            AggregateSymbol::count_star().into(),
            Expression::Window(WindowFunction::new(
                AggregateSymbol::count_star(),
                WindowSpecification::default(),
            )),
        ];
        for expr in &wrapped {
            assert_eq!(shallow_max_level(expr), Some(EvaluationLevel::PushDown), "{}", expr);
        }
    }
}
