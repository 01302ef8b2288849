//! SQL 抽象语法树
//!
//! 由解析/名称解析阶段构造的已解析 AST，改写核心在其上做分析与替换：
//! - `expression`：表达式与符号
//! - `criteria`：谓词与复合条件
//! - `command`：查询、DML、存储过程与动态 SQL
//! - `procedure`：过程语言语句块
//! - `display`：渲染为 SQL 文本

pub mod command;
pub mod criteria;
mod display;
pub mod expression;
pub mod language_object;
pub mod procedure;
pub mod symbol;

pub use command::{
    Command, CreateProcedure, Delete, DynamicCommand, FromClause, FromList, GroupBy, Insert,
    JoinPredicate, JoinType, Limit, NullOrdering, OrderBy, OrderByItem, ParameterType, Query,
    SPParameter, Select, SetClause, SetOp, SetQuery, StoredProcedure, SubqueryFromClause,
    UnaryFromClause, Update,
};
pub use criteria::{
    combine_with_and, is_true_criteria, separate_by_and, true_criteria, BetweenCriteria,
    CompareCriteria, CompareOp, CompoundCriteria, Criteria, CriteriaKind, DependentSetCriteria,
    ExistsCriteria, IsNullCriteria, LogicalOp, MatchCriteria, MatchMode, NotCriteria, Quantifier,
    SetCriteria, SubqueryCompareCriteria, SubquerySetCriteria,
};
pub use expression::{
    AggregateKind, AggregateSymbol, CaseExpression, Constant, Expression, Function, Reference,
    ReferenceBinding, ScalarSubquery, SearchedCaseExpression, WindowFunction, WindowSpecification,
};
pub use language_object::LanguageObject;
pub use procedure::{
    AssignmentStatement, Block, BranchMode, BranchStatement, CommandStatement, IfStatement,
    LoopStatement, RaiseStatement, Statement, WhileStatement,
};
pub use symbol::{AliasSymbol, ElementSymbol, ExpressionSymbol, GroupSymbol};
