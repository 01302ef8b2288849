//! 表达式节点定义
//!
//! `Expression` 是封闭的和类型，每个变体携带独立的结构体，
//! 访问器据此为每种节点提供单独的回调

use crate::core::metadata::FunctionDescriptor;
use crate::core::types::DataType;
use crate::core::value::Value;
use crate::query::sql::command::{Command, OrderBy};
use crate::query::sql::criteria::Criteria;
pub use crate::query::sql::symbol::{AliasSymbol, ElementSymbol, ExpressionSymbol, GroupSymbol};
use serde::{Deserialize, Serialize};

/// 统一表达式类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expression {
    /// 列引用
    Element(ElementSymbol),

    /// 字面量
    Constant(Constant),

    /// 标量函数调用（包括算术运算符）
    Function(Function),

    /// 聚合函数
    Aggregate(AggregateSymbol),

    /// 窗口函数
    Window(WindowFunction),

    /// `CASE expr WHEN ... END`
    Case(CaseExpression),

    /// `CASE WHEN criteria ... END`
    SearchedCase(SearchedCaseExpression),

    /// 绑定参数或外层引用
    Reference(Reference),

    /// 标量子查询
    ScalarSubquery(ScalarSubquery),

    /// 带别名的投影符号
    Alias(AliasSymbol),

    /// 匿名投影符号
    ExpressionSymbol(ExpressionSymbol),
}

impl Expression {
    /// 是否为可直接投影的符号
    pub fn is_projectable_symbol(&self) -> bool {
        matches!(
            self,
            Expression::Element(_) | Expression::Alias(_) | Expression::ExpressionSymbol(_)
        )
    }

    /// 投影时的输出名称，非符号表达式返回 `None`
    pub fn output_name(&self) -> Option<&str> {
        match self {
            Expression::Element(e) => Some(e.output_name()),
            Expression::Alias(a) => Some(&a.name),
            Expression::ExpressionSymbol(s) => Some(&s.name),
            _ => None,
        }
    }

    /// 去掉别名与投影包装后的表达式
    pub fn unwrap_symbol(&self) -> &Expression {
        match self {
            Expression::Alias(a) => a.symbol.unwrap_symbol(),
            Expression::ExpressionSymbol(s) => s.expression.unwrap_symbol(),
            other => other,
        }
    }

    pub fn as_element(&self) -> Option<&ElementSymbol> {
        match self {
            Expression::Element(e) => Some(e),
            _ => None,
        }
    }

    /// 表达式的解析类型
    pub fn data_type(&self) -> DataType {
        match self {
            Expression::Element(e) => e.data_type,
            Expression::Constant(c) => c.data_type,
            Expression::Function(f) => f.data_type,
            Expression::Aggregate(a) => a.data_type,
            Expression::Window(w) => w.function.data_type,
            Expression::Case(c) => c.data_type,
            Expression::SearchedCase(c) => c.data_type,
            Expression::Reference(r) => r.data_type,
            Expression::ScalarSubquery(_) => DataType::Object,
            Expression::Alias(a) => a.symbol.data_type(),
            Expression::ExpressionSymbol(s) => s.expression.data_type(),
        }
    }

    /// 直接子表达式
    ///
    /// 不包含条件、排序、嵌套命令以及引用所包装的外层表达式，完整遍历使用导航器
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Element(_) | Expression::Constant(_) | Expression::ScalarSubquery(_) => {
                vec![]
            }
            Expression::Function(f) => f.args.iter().collect(),
            Expression::Aggregate(a) => a.expression.iter().map(|e| e.as_ref()).collect(),
            Expression::Window(w) => {
                let mut children: Vec<&Expression> =
                    w.function.expression.iter().map(|e| e.as_ref()).collect();
                children.extend(w.window.partition.iter());
                children
            }
            Expression::Case(c) => {
                let mut children = vec![c.expression.as_ref()];
                for (when, then) in &c.whens {
                    children.push(when);
                    children.push(then);
                }
                if let Some(e) = &c.else_expression {
                    children.push(e.as_ref());
                }
                children
            }
            Expression::SearchedCase(c) => {
                let mut children: Vec<&Expression> = c.whens.iter().map(|(_, then)| then).collect();
                if let Some(e) = &c.else_expression {
                    children.push(e.as_ref());
                }
                children
            }
            Expression::Reference(_) => vec![],
            Expression::Alias(a) => vec![a.symbol.as_ref()],
            Expression::ExpressionSymbol(s) => vec![s.expression.as_ref()],
        }
    }
}

impl From<ElementSymbol> for Expression {
    fn from(e: ElementSymbol) -> Self {
        Expression::Element(e)
    }
}

impl From<Constant> for Expression {
    fn from(c: Constant) -> Self {
        Expression::Constant(c)
    }
}

impl From<Function> for Expression {
    fn from(f: Function) -> Self {
        Expression::Function(f)
    }
}

impl From<AggregateSymbol> for Expression {
    fn from(a: AggregateSymbol) -> Self {
        Expression::Aggregate(a)
    }
}

impl From<Reference> for Expression {
    fn from(r: Reference) -> Self {
        Expression::Reference(r)
    }
}

impl From<AliasSymbol> for Expression {
    fn from(a: AliasSymbol) -> Self {
        Expression::Alias(a)
    }
}

impl From<ExpressionSymbol> for Expression {
    fn from(s: ExpressionSymbol) -> Self {
        Expression::ExpressionSymbol(s)
    }
}

/// 字面量
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constant {
    pub value: Value,
    pub data_type: DataType,
    /// 多值绑定（如 `IN (?)` 展开后的值列表）
    pub multi_valued: bool,
}

impl Constant {
    pub fn new(value: impl Into<Value>) -> Self {
        let value = value.into();
        let data_type = value.data_type();
        Self {
            value,
            data_type,
            multi_valued: false,
        }
    }

    pub fn null() -> Self {
        Self::new(Value::Null)
    }

    pub fn multi_valued(values: Vec<Value>) -> Self {
        let value = Value::List(values);
        let data_type = value.data_type();
        Self {
            value,
            data_type,
            multi_valued: true,
        }
    }
}

/// 标量函数调用
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub args: Vec<Expression>,
    /// 解析器写入的函数描述符，未解析时为 `None`
    pub descriptor: Option<FunctionDescriptor>,
    pub data_type: DataType,
}

impl Function {
    pub fn new(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Self {
            name: name.into(),
            args,
            descriptor: None,
            data_type: DataType::default(),
        }
    }

    pub fn with_descriptor(mut self, descriptor: FunctionDescriptor) -> Self {
        self.data_type = descriptor.return_type;
        self.descriptor = Some(descriptor);
        self
    }

    /// 是否为中缀运算符
    pub fn is_infix(&self) -> bool {
        self.args.len() == 2 && matches!(self.name.as_str(), "+" | "-" | "*" | "/" | "||")
    }

    /// 是否为 XML 构造函数
    pub fn is_xml_construction(&self) -> bool {
        let lower = self.name.to_ascii_lowercase();
        matches!(
            lower.as_str(),
            "xmlelement" | "xmlforest" | "xmlconcat" | "xmlcomment" | "xmlpi" | "xmlattributes"
        )
    }
}

/// 聚合函数种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateKind {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    Every,
    Any,
    StringAgg,
    ArrayAgg,
    XmlAgg,
    RowNumber,
    Rank,
    DenseRank,
}

impl AggregateKind {
    pub fn sql_name(&self) -> &'static str {
        match self {
            AggregateKind::Count => "COUNT",
            AggregateKind::Sum => "SUM",
            AggregateKind::Avg => "AVG",
            AggregateKind::Min => "MIN",
            AggregateKind::Max => "MAX",
            AggregateKind::Every => "EVERY",
            AggregateKind::Any => "ANY",
            AggregateKind::StringAgg => "STRING_AGG",
            AggregateKind::ArrayAgg => "ARRAY_AGG",
            AggregateKind::XmlAgg => "XMLAGG",
            AggregateKind::RowNumber => "ROW_NUMBER",
            AggregateKind::Rank => "RANK",
            AggregateKind::DenseRank => "DENSE_RANK",
        }
    }

    /// 只能作为窗口函数使用的排名函数
    pub fn is_ranking(&self) -> bool {
        matches!(
            self,
            AggregateKind::RowNumber | AggregateKind::Rank | AggregateKind::DenseRank
        )
    }
}

/// 聚合函数
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AggregateSymbol {
    pub kind: AggregateKind,
    pub distinct: bool,
    /// 单个参数，`COUNT(*)` 与排名函数为 `None`
    pub expression: Option<Box<Expression>>,
    pub order_by: Option<OrderBy>,
    /// `FILTER (WHERE ...)` 条件
    pub condition: Option<Box<Criteria>>,
    pub windowed: bool,
    pub data_type: DataType,
}

impl AggregateSymbol {
    pub fn new(kind: AggregateKind, expression: Option<Expression>) -> Self {
        let data_type = match kind {
            AggregateKind::Count
            | AggregateKind::RowNumber
            | AggregateKind::Rank
            | AggregateKind::DenseRank => DataType::Integer,
            _ => expression
                .as_ref()
                .map(|e| e.data_type())
                .unwrap_or_default(),
        };
        Self {
            kind,
            distinct: false,
            expression: expression.map(Box::new),
            order_by: None,
            condition: None,
            windowed: false,
            data_type,
        }
    }

    pub fn count_star() -> Self {
        Self::new(AggregateKind::Count, None)
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn with_condition(mut self, condition: Criteria) -> Self {
        self.condition = Some(Box::new(condition));
        self
    }
}

/// 窗口规格
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct WindowSpecification {
    pub partition: Vec<Expression>,
    pub order_by: Option<OrderBy>,
}

/// 窗口函数
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowFunction {
    pub function: AggregateSymbol,
    pub window: WindowSpecification,
}

impl WindowFunction {
    pub fn new(mut function: AggregateSymbol, window: WindowSpecification) -> Self {
        function.windowed = true;
        Self { function, window }
    }
}

/// `CASE expr WHEN value THEN result ... [ELSE result] END`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseExpression {
    pub expression: Box<Expression>,
    pub whens: Vec<(Expression, Expression)>,
    pub else_expression: Option<Box<Expression>>,
    pub data_type: DataType,
}

/// `CASE WHEN criteria THEN result ... [ELSE result] END`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchedCaseExpression {
    pub whens: Vec<(Criteria, Expression)>,
    pub else_expression: Option<Box<Expression>>,
    pub data_type: DataType,
}

/// 引用的绑定目标
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceBinding {
    /// `?` 位置参数，从 0 开始编号
    Positional(usize),
    /// 过程输入参数等命名绑定
    Named(String),
    /// 包装外层表达式（通常是外层查询的列）
    Expression(Box<Expression>),
}

/// 运行时取值的引用
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub binding: ReferenceBinding,
    /// 是否为相关子查询中的外层引用
    pub correlated: bool,
    pub data_type: DataType,
}

impl Reference {
    pub fn positional(index: usize) -> Self {
        Self {
            binding: ReferenceBinding::Positional(index),
            correlated: false,
            data_type: DataType::default(),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            binding: ReferenceBinding::Named(name.into()),
            correlated: false,
            data_type: DataType::default(),
        }
    }

    /// 引用外层查询的列
    pub fn correlated(element: ElementSymbol) -> Self {
        let data_type = element.data_type;
        Self {
            binding: ReferenceBinding::Expression(Box::new(Expression::Element(element))),
            correlated: true,
            data_type,
        }
    }

    pub fn is_positional(&self) -> bool {
        matches!(self.binding, ReferenceBinding::Positional(_))
    }

    /// 被包装的元素
    pub fn element(&self) -> Option<&ElementSymbol> {
        match &self.binding {
            ReferenceBinding::Expression(e) => e.as_element(),
            _ => None,
        }
    }
}

/// 标量子查询
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScalarSubquery {
    pub command: Box<Command>,
    /// 规划阶段要求在引擎内预先求值
    pub should_evaluate: bool,
}

impl ScalarSubquery {
    pub fn new(command: Command) -> Self {
        Self {
            command: Box::new(command),
            should_evaluate: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projectable_symbol() {
        let e = Expression::from(ElementSymbol::new("e1"));
        assert!(e.is_projectable_symbol());
        let c = Expression::from(Constant::new(1));
        assert!(!c.is_projectable_symbol());
        assert_eq!(c.output_name(), None);
    }

    #[test]
    fn test_unwrap_symbol() {
        let inner = Expression::from(Function::new(
            "+",
            vec![ElementSymbol::new("y").into(), Constant::new(1).into()],
        ));
        let wrapped = Expression::from(AliasSymbol::new(
            "x",
            ExpressionSymbol::new("expr", inner.clone()).into(),
        ));
        assert_eq!(wrapped.unwrap_symbol(), &inner);
        assert_eq!(wrapped.output_name(), Some("x"));
    }

    #[test]
    fn test_correlated_reference_exposes_element() {
        let r = Reference::correlated(ElementSymbol::new("e1"));
        assert!(r.correlated);
        assert_eq!(r.element().map(|e| e.short_name()), Some("e1"));
        assert!(Reference::positional(0).is_positional());
    }
}
