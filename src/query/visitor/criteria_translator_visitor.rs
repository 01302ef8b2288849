//! 条件翻译
//!
//! 从虚拟层条件中挑出满足选择器的合取项，按视图的符号映射改写为物理层条件，
//! 再把其中的引用改名为输入组 `$INPUT` 下的合成元素：
//! 1. 按 AND 拆分合取项
//! 2. 按选择器（条件种类、比较运算符、元素集合）筛选
//! 3. 以符号映射改写，显式翻译优先于映射
//! 4. 引用改名，原引用按合成名记录在旁表中
//!
//! 没有合取项被选中时结果为恒真条件 `1 = 1`

use crate::config::AnalysisConfig;
use crate::core::error::{TranslateError, TranslateResult};
use crate::query::sql::{
    combine_with_and, separate_by_and, true_criteria, CompareCriteria, CompareOp, Criteria,
    CriteriaKind, ElementSymbol, Expression, GroupSymbol, Reference, ReferenceBinding,
};
use crate::query::visitor::element_collector_visitor::get_elements;
use crate::query::visitor::expression_mapping_visitor::{ExpressionMappingVisitor, SymbolMap};
use crate::query::visitor::language_visitor::{ExpressionSlot, LanguageVisitorMut};
use crate::query::visitor::navigator::{NavigatorMut, TraversalOrder};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};

// ==================== 选择器 ====================

/// 合取项选择器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriteriaSelector {
    kinds: HashSet<CriteriaKind>,
    compare_op: Option<CompareOp>,
    elements: Option<HashSet<ElementSymbol>>,
}

impl CriteriaSelector {
    pub fn new<I>(kinds: I) -> Self
    where
        I: IntoIterator<Item = CriteriaKind>,
    {
        Self {
            kinds: kinds.into_iter().collect(),
            compare_op: None,
            elements: None,
        }
    }

    /// 选择所有谓词种类
    pub fn any() -> Self {
        Self::new(CriteriaKind::PREDICATES)
    }

    /// 比较条件只选择该运算符
    pub fn with_compare_op(mut self, op: CompareOp) -> Self {
        self.compare_op = Some(op);
        self
    }

    /// 合取项至少引用其中一个元素时才被选中
    pub fn with_elements<I>(mut self, elements: I) -> Self
    where
        I: IntoIterator<Item = ElementSymbol>,
    {
        self.elements = Some(elements.into_iter().collect());
        self
    }

    fn validate(&self, symbol_map: &SymbolMap) -> TranslateResult<()> {
        if let Some(kind) = self.kinds.iter().find(|kind| !kind.is_predicate()) {
            return Err(TranslateError::InvalidSelector(format!("{:?}", kind)));
        }
        if let Some(elements) = &self.elements {
            for element in elements {
                if !symbol_map.contains_key(&Expression::Element(element.clone())) {
                    return Err(TranslateError::UnknownSelectorElement(element.full_name()));
                }
            }
        }
        Ok(())
    }

    pub fn selects(&self, criteria: &Criteria) -> bool {
        if !self.kinds.contains(&criteria.kind()) {
            return false;
        }
        if let (Some(op), Criteria::Compare(compare)) = (self.compare_op, criteria) {
            if compare.op != op {
                return false;
            }
        }
        match &self.elements {
            Some(elements) => get_elements(criteria, true)
                .iter()
                .any(|element| elements.contains(element)),
            None => true,
        }
    }
}

// ==================== 翻译结果 ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedCriteria {
    pub criteria: Criteria,
    /// 合成元素的完整名称 -> 原引用
    pub implicit_params: BTreeMap<String, Reference>,
}

impl TranslatedCriteria {
    pub fn is_true(&self) -> bool {
        crate::query::sql::is_true_criteria(&self.criteria)
    }
}

// ==================== 翻译器 ====================

pub struct CriteriaTranslatorVisitor<'m> {
    symbol_map: &'m SymbolMap,
    input_group_name: String,
    expression_symbol_name: String,
    deep: bool,
}

impl<'m> CriteriaTranslatorVisitor<'m> {
    pub fn new(symbol_map: &'m SymbolMap) -> Self {
        let defaults = AnalysisConfig::default();
        Self {
            symbol_map,
            input_group_name: defaults.input_group_name,
            expression_symbol_name: defaults.expression_symbol_name,
            deep: false,
        }
    }

    pub fn with_config(mut self, config: &AnalysisConfig) -> Self {
        self.input_group_name = config.input_group_name.clone();
        self.expression_symbol_name = config.expression_symbol_name.clone();
        self
    }

    pub fn input_group_name(mut self, name: impl Into<String>) -> Self {
        self.input_group_name = name.into();
        self
    }

    /// 是否改写合取项中嵌套命令的内容
    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    pub fn translate(
        &self,
        criteria: &Criteria,
        selector: &CriteriaSelector,
        explicit_translations: &[CompareCriteria],
    ) -> TranslateResult<TranslatedCriteria> {
        let symbol_map = self.effective_map(explicit_translations)?;
        selector.validate(&symbol_map)?;

        let mut kept = Vec::new();
        let mut implicit_params = BTreeMap::new();
        for conjunct in separate_by_and(criteria) {
            if !selector.selects(&conjunct) {
                log::debug!("丢弃未选中的合取项: {}", conjunct);
                continue;
            }
            let mut translated = conjunct.clone();
            let mut mapper = ExpressionMappingVisitor::new(&symbol_map)
                .create_aliases(false)
                .deep(self.deep);
            mapper.map(&mut translated);
            if let Some(element) = mapper.unmapped_symbols().first() {
                return Err(TranslateError::UnmappedElement {
                    element: element.full_name(),
                    criteria: conjunct.to_string(),
                });
            }

            let mut renamer = ReferenceRenamer {
                input_group: GroupSymbol::new(self.input_group_name.clone()),
                expression_symbol_name: &self.expression_symbol_name,
                params: &mut implicit_params,
            };
            NavigatorMut::new(&mut renamer, TraversalOrder::PostOrder)
                .deep(self.deep)
                .walk(&mut translated);
            kept.push(translated);
        }

        let criteria = combine_with_and(kept).unwrap_or_else(true_criteria);
        log::debug!("条件翻译结果: {}", criteria);
        Ok(TranslatedCriteria {
            criteria,
            implicit_params,
        })
    }

    /// 叠加显式翻译后的映射
    fn effective_map(
        &self,
        explicit_translations: &[CompareCriteria],
    ) -> TranslateResult<Cow<'m, SymbolMap>> {
        if explicit_translations.is_empty() {
            return Ok(Cow::Borrowed(self.symbol_map));
        }
        let mut map = self.symbol_map.clone();
        for translation in explicit_translations {
            if translation.op != CompareOp::Eq || translation.left.as_element().is_none() {
                return Err(TranslateError::InvalidTranslation(
                    Criteria::Compare(translation.clone()).to_string(),
                ));
            }
            map.insert(translation.left.clone(), translation.right.clone());
        }
        Ok(Cow::Owned(map))
    }
}

/// 把引用替换为输入组下的合成元素
struct ReferenceRenamer<'a> {
    input_group: GroupSymbol,
    expression_symbol_name: &'a str,
    params: &'a mut BTreeMap<String, Reference>,
}

impl ReferenceRenamer<'_> {
    fn parameter_name(&self, reference: &Reference) -> String {
        match &reference.binding {
            ReferenceBinding::Named(name) => name.clone(),
            ReferenceBinding::Positional(index) => format!("param{}", index),
            ReferenceBinding::Expression(expr) => match expr.as_element() {
                Some(element) => element.short_name().to_string(),
                None => expr
                    .output_name()
                    .unwrap_or(self.expression_symbol_name)
                    .to_string(),
            },
        }
    }
}

impl LanguageVisitorMut for ReferenceRenamer<'_> {
    fn visit_expression_mut(&mut self, expr: &mut Expression, _slot: ExpressionSlot) {
        let Expression::Reference(reference) = expr else {
            return;
        };
        let reference = reference.clone();
        let base = self.parameter_name(&reference);
        let mut name = base.clone();
        let mut suffix = 0;
        // 合成名称已被其他引用占用时追加序号，同一引用复用同一名称
        loop {
            let element = ElementSymbol::new(name.clone())
                .with_group(self.input_group.clone())
                .with_type(reference.data_type);
            match self.params.get(&element.full_name()) {
                Some(existing) if *existing != reference => {
                    suffix += 1;
                    name = format!("{}_{}", base, suffix);
                }
                Some(_) => {
                    *expr = Expression::Element(element);
                    return;
                }
                None => {
                    log::debug!("引用 {:?} 翻译为 {}", reference.binding, element);
                    self.params.insert(element.full_name(), reference);
                    *expr = Expression::Element(element);
                    return;
                }
            }
        }
    }
}

/// 以默认配置翻译条件
pub fn translate_criteria(
    criteria: &Criteria,
    symbol_map: &SymbolMap,
    selector: &CriteriaSelector,
) -> TranslateResult<TranslatedCriteria> {
    CriteriaTranslatorVisitor::new(symbol_map).translate(criteria, selector, &[])
}
