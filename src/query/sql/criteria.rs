//! 条件（谓词）节点定义
//!
//! 除 `Compound` 与 `Not` 外的变体都是谓词，可被条件选择器单独选中

use crate::query::sql::command::Command;
use crate::query::sql::expression::{Constant, Expression};
use serde::{Deserialize, Serialize};

/// 比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn sql_symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// 子查询比较的量词
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantifier {
    Some,
    Any,
    All,
}

/// 模式匹配方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchMode {
    Like,
    SimilarTo,
    LikeRegex,
}

/// 复合条件的逻辑运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
}

/// 条件种类，供选择器按种类筛选
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CriteriaKind {
    Compare,
    Between,
    Match,
    IsNull,
    Set,
    SubquerySet,
    SubqueryCompare,
    Exists,
    DependentSet,
    Compound,
    Not,
}

impl CriteriaKind {
    /// 谓词种类（可被选择器选中）
    pub const PREDICATES: [CriteriaKind; 9] = [
        CriteriaKind::Compare,
        CriteriaKind::Between,
        CriteriaKind::Match,
        CriteriaKind::IsNull,
        CriteriaKind::Set,
        CriteriaKind::SubquerySet,
        CriteriaKind::SubqueryCompare,
        CriteriaKind::Exists,
        CriteriaKind::DependentSet,
    ];

    pub fn is_predicate(&self) -> bool {
        !matches!(self, CriteriaKind::Compound | CriteriaKind::Not)
    }
}

/// 统一条件类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Criteria {
    Compare(CompareCriteria),
    Between(BetweenCriteria),
    Match(MatchCriteria),
    IsNull(IsNullCriteria),
    Set(SetCriteria),
    SubquerySet(SubquerySetCriteria),
    SubqueryCompare(SubqueryCompareCriteria),
    Exists(ExistsCriteria),
    DependentSet(DependentSetCriteria),
    Compound(CompoundCriteria),
    Not(NotCriteria),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompareCriteria {
    pub left: Expression,
    pub op: CompareOp,
    pub right: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BetweenCriteria {
    pub expression: Expression,
    pub lower: Expression,
    pub upper: Expression,
    pub negated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchCriteria {
    pub left: Expression,
    pub right: Expression,
    pub escape: Option<char>,
    pub negated: bool,
    pub mode: MatchMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IsNullCriteria {
    pub expression: Expression,
    pub negated: bool,
}

/// `expr [NOT] IN (v1, v2, ...)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetCriteria {
    pub expression: Expression,
    pub values: Vec<Expression>,
    pub negated: bool,
}

/// `expr [NOT] IN (subquery)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubquerySetCriteria {
    pub expression: Expression,
    pub command: Box<Command>,
    pub negated: bool,
    pub should_evaluate: bool,
}

/// `expr op {ANY|SOME|ALL} (subquery)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubqueryCompareCriteria {
    pub left: Expression,
    pub op: CompareOp,
    pub quantifier: Quantifier,
    pub command: Box<Command>,
    pub should_evaluate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExistsCriteria {
    pub command: Box<Command>,
    pub negated: bool,
    pub should_evaluate: bool,
}

/// 依赖连接中由另一侧结果集在运行时提供取值的集合条件
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependentSetCriteria {
    pub expression: Expression,
    /// 另一侧提供取值的表达式
    pub value_expression: Option<Expression>,
    /// 运行时值来源的上下文名称
    pub context_symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompoundCriteria {
    pub op: LogicalOp,
    pub criteria: Vec<Criteria>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotCriteria {
    pub criteria: Box<Criteria>,
}

impl Criteria {
    pub fn kind(&self) -> CriteriaKind {
        match self {
            Criteria::Compare(_) => CriteriaKind::Compare,
            Criteria::Between(_) => CriteriaKind::Between,
            Criteria::Match(_) => CriteriaKind::Match,
            Criteria::IsNull(_) => CriteriaKind::IsNull,
            Criteria::Set(_) => CriteriaKind::Set,
            Criteria::SubquerySet(_) => CriteriaKind::SubquerySet,
            Criteria::SubqueryCompare(_) => CriteriaKind::SubqueryCompare,
            Criteria::Exists(_) => CriteriaKind::Exists,
            Criteria::DependentSet(_) => CriteriaKind::DependentSet,
            Criteria::Compound(_) => CriteriaKind::Compound,
            Criteria::Not(_) => CriteriaKind::Not,
        }
    }

    pub fn compare(left: impl Into<Expression>, op: CompareOp, right: impl Into<Expression>) -> Self {
        Criteria::Compare(CompareCriteria {
            left: left.into(),
            op,
            right: right.into(),
        })
    }

    pub fn is_null(expression: impl Into<Expression>) -> Self {
        Criteria::IsNull(IsNullCriteria {
            expression: expression.into(),
            negated: false,
        })
    }

    pub fn and(criteria: Vec<Criteria>) -> Self {
        Criteria::Compound(CompoundCriteria {
            op: LogicalOp::And,
            criteria,
        })
    }

    pub fn or(criteria: Vec<Criteria>) -> Self {
        Criteria::Compound(CompoundCriteria {
            op: LogicalOp::Or,
            criteria,
        })
    }

    pub fn negate(criteria: Criteria) -> Self {
        Criteria::Not(NotCriteria {
            criteria: Box::new(criteria),
        })
    }

    pub fn exists(command: Command) -> Self {
        Criteria::Exists(ExistsCriteria {
            command: Box::new(command),
            negated: false,
            should_evaluate: false,
        })
    }
}

/// 规范化的恒真条件 `1 = 1`
pub fn true_criteria() -> Criteria {
    Criteria::compare(Constant::new(1), CompareOp::Eq, Constant::new(1))
}

pub fn is_true_criteria(criteria: &Criteria) -> bool {
    *criteria == true_criteria()
}

/// 按 AND 拆分为合取项，嵌套的 AND 会被展开
pub fn separate_by_and(criteria: &Criteria) -> Vec<Criteria> {
    let mut parts = Vec::new();
    collect_conjuncts(criteria, &mut parts);
    parts
}

fn collect_conjuncts(criteria: &Criteria, parts: &mut Vec<Criteria>) {
    match criteria {
        Criteria::Compound(CompoundCriteria {
            op: LogicalOp::And,
            criteria,
        }) => {
            for c in criteria {
                collect_conjuncts(c, parts);
            }
        }
        other => parts.push(other.clone()),
    }
}

/// 以 AND 合并合取项；空输入返回 `None`，单个合取项原样返回
pub fn combine_with_and(mut parts: Vec<Criteria>) -> Option<Criteria> {
    match parts.len() {
        0 => None,
        1 => parts.pop(),
        _ => Some(Criteria::and(parts)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::sql::expression::ElementSymbol;

    fn eq(name: &str, v: i64) -> Criteria {
        Criteria::compare(ElementSymbol::new(name), CompareOp::Eq, Constant::new(v))
    }

    #[test]
    fn test_separate_by_and_flattens_nested() {
        let c = Criteria::and(vec![eq("a", 1), Criteria::and(vec![eq("b", 2), eq("c", 3)])]);
        let parts = separate_by_and(&c);
        assert_eq!(parts, vec![eq("a", 1), eq("b", 2), eq("c", 3)]);
    }

    #[test]
    fn test_separate_by_and_keeps_or_whole() {
        let c = Criteria::or(vec![eq("a", 1), eq("b", 2)]);
        assert_eq!(separate_by_and(&c), vec![c.clone()]);
    }

    #[test]
    fn test_combine_with_and() {
        assert_eq!(combine_with_and(vec![]), None);
        assert_eq!(combine_with_and(vec![eq("a", 1)]), Some(eq("a", 1)));
        assert_eq!(
            combine_with_and(vec![eq("a", 1), eq("b", 2)]),
            Some(Criteria::and(vec![eq("a", 1), eq("b", 2)]))
        );
    }

    #[test]
    fn test_true_criteria() {
        assert!(is_true_criteria(&true_criteria()));
        assert!(!is_true_criteria(&eq("a", 1)));
        assert!(!CriteriaKind::Compound.is_predicate());
        assert!(CriteriaKind::PREDICATES.iter().all(|k| k.is_predicate()));
    }
}
