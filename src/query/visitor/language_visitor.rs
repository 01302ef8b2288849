//! 访问器契约
//!
//! `LanguageVisitor` 为每种节点提供一个默认空实现的回调，只读遍历使用；
//! `LanguageVisitorMut` 面向改写，以表达式槽位为单位回调，允许替换整个变体。
//! 遍历顺序与嵌套命令的进入由导航器决定，访问器只关心节点本身

use crate::query::sql::{
    AggregateSymbol, AliasSymbol, AssignmentStatement, BetweenCriteria, Block, BranchStatement,
    CaseExpression, Command, CommandStatement, CompareCriteria, CompoundCriteria, Constant,
    CreateProcedure, Criteria, Delete, DependentSetCriteria, DynamicCommand, ElementSymbol,
    ExistsCriteria, Expression, ExpressionSymbol, FromList, Function, GroupBy, GroupSymbol,
    IfStatement, Insert, IsNullCriteria, JoinPredicate, Limit, LoopStatement, MatchCriteria,
    NotCriteria, OrderBy, OrderByItem, Query, RaiseStatement, Reference, SPParameter,
    ScalarSubquery, SearchedCaseExpression, Select, SetClause, SetCriteria, SetQuery, Statement,
    StoredProcedure, SubqueryCompareCriteria, SubqueryFromClause, SubquerySetCriteria,
    UnaryFromClause, Update, WhileStatement, WindowFunction,
};

/// 只读访问器
///
/// 导航器在每次回调之后检查 `should_abort`，返回 `true` 时立即停止遍历
pub trait LanguageVisitor {
    fn should_abort(&self) -> bool {
        false
    }

    /// 进入表达式之前调用，返回 `false` 时跳过该表达式及其子树
    fn should_descend(&mut self, _expr: &Expression) -> bool {
        true
    }

    /// 遇到嵌套命令边界时调用，与是否深度遍历无关
    fn visit_nested_command(&mut self, _command: &Command) {}

    // ==================== 通用回调 ====================

    /// 任意表达式，在具体种类的回调之前调用
    fn visit_expression(&mut self, _expr: &Expression) {}

    /// 任意条件，在具体种类的回调之前调用
    fn visit_criteria(&mut self, _criteria: &Criteria) {}

    /// 任意命令，在具体种类的回调之前调用
    fn visit_command(&mut self, _command: &Command) {}

    // ==================== 表达式 ====================

    fn visit_element(&mut self, _element: &ElementSymbol) {}
    fn visit_group(&mut self, _group: &GroupSymbol) {}
    fn visit_constant(&mut self, _constant: &Constant) {}
    fn visit_function(&mut self, _function: &Function) {}
    fn visit_aggregate(&mut self, _aggregate: &AggregateSymbol) {}
    fn visit_window_function(&mut self, _window: &WindowFunction) {}
    fn visit_case(&mut self, _case: &CaseExpression) {}
    fn visit_searched_case(&mut self, _case: &SearchedCaseExpression) {}
    fn visit_reference(&mut self, _reference: &Reference) {}
    fn visit_scalar_subquery(&mut self, _subquery: &ScalarSubquery) {}
    fn visit_alias(&mut self, _alias: &AliasSymbol) {}
    fn visit_expression_symbol(&mut self, _symbol: &ExpressionSymbol) {}

    // ==================== 条件 ====================

    fn visit_compare(&mut self, _criteria: &CompareCriteria) {}
    fn visit_between(&mut self, _criteria: &BetweenCriteria) {}
    fn visit_match(&mut self, _criteria: &MatchCriteria) {}
    fn visit_is_null(&mut self, _criteria: &IsNullCriteria) {}
    fn visit_set_criteria(&mut self, _criteria: &SetCriteria) {}
    fn visit_subquery_set(&mut self, _criteria: &SubquerySetCriteria) {}
    fn visit_subquery_compare(&mut self, _criteria: &SubqueryCompareCriteria) {}
    fn visit_exists(&mut self, _criteria: &ExistsCriteria) {}
    fn visit_dependent_set(&mut self, _criteria: &DependentSetCriteria) {}
    fn visit_compound(&mut self, _criteria: &CompoundCriteria) {}
    fn visit_not(&mut self, _criteria: &NotCriteria) {}

    // ==================== 子句 ====================

    fn visit_select(&mut self, _select: &Select) {}
    fn visit_from(&mut self, _from: &FromList) {}
    fn visit_unary_from_clause(&mut self, _clause: &UnaryFromClause) {}
    fn visit_join_predicate(&mut self, _join: &JoinPredicate) {}
    fn visit_subquery_from_clause(&mut self, _clause: &SubqueryFromClause) {}
    fn visit_group_by(&mut self, _group_by: &GroupBy) {}
    fn visit_order_by(&mut self, _order_by: &OrderBy) {}
    fn visit_order_by_item(&mut self, _item: &OrderByItem) {}
    fn visit_limit(&mut self, _limit: &Limit) {}
    fn visit_set_clause(&mut self, _clause: &SetClause) {}
    fn visit_sp_parameter(&mut self, _parameter: &SPParameter) {}

    // ==================== 命令 ====================

    fn visit_query(&mut self, _query: &Query) {}
    fn visit_set_query(&mut self, _query: &SetQuery) {}
    fn visit_insert(&mut self, _insert: &Insert) {}
    fn visit_update(&mut self, _update: &Update) {}
    fn visit_delete(&mut self, _delete: &Delete) {}
    fn visit_stored_procedure(&mut self, _procedure: &StoredProcedure) {}
    fn visit_create_procedure(&mut self, _procedure: &CreateProcedure) {}
    fn visit_dynamic_command(&mut self, _command: &DynamicCommand) {}

    // ==================== 过程语句 ====================

    fn visit_block(&mut self, _block: &Block) {}
    fn visit_statement(&mut self, _statement: &Statement) {}
    fn visit_assignment(&mut self, _statement: &AssignmentStatement) {}
    fn visit_if(&mut self, _statement: &IfStatement) {}
    fn visit_loop(&mut self, _statement: &LoopStatement) {}
    fn visit_while(&mut self, _statement: &WhileStatement) {}
    fn visit_raise(&mut self, _statement: &RaiseStatement) {}
    fn visit_branch(&mut self, _statement: &BranchStatement) {}
    fn visit_command_statement(&mut self, _statement: &CommandStatement) {}
}

/// 表达式槽位所在的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionSlot {
    /// SELECT 列表中的投影符号
    Projected,
    /// 其它任意位置（条件操作数、函数参数、排序键等）
    Operand,
}

/// 可变访问器
///
/// `visit_expression_mut` 拿到的是槽位本身，可以整体替换为其它变体
pub trait LanguageVisitorMut {
    fn should_abort(&self) -> bool {
        false
    }

    /// 进入表达式之前调用，返回 `false` 时跳过该槽位及其子树
    fn should_descend(&mut self, _expr: &Expression) -> bool {
        true
    }

    fn visit_expression_mut(&mut self, _expr: &mut Expression, _slot: ExpressionSlot) {}

    /// 只能容纳元素的槽位：INSERT 列清单、UPDATE 赋值目标、动态 SQL 的列声明
    fn visit_element_target_mut(&mut self, _element: &mut ElementSymbol) {}

    fn visit_criteria_mut(&mut self, _criteria: &mut Criteria) {}

    fn visit_command_mut(&mut self, _command: &mut Command) {}

    fn visit_group_mut(&mut self, _group: &mut GroupSymbol) {}

    fn visit_statement_mut(&mut self, _statement: &mut Statement) {}
}
