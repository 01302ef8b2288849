//! AST 导航器
//!
//! - `Navigator`：只读遍历，支持先序/后序、深度遍历与聚合截断模式
//! - `NavigatorMut`：可变遍历，以槽位为单位交给 `LanguageVisitorMut` 改写
//!
//! 深度遍历会进入以下位置的嵌套命令：EXISTS、子查询比较、IN 子查询、标量子查询、
//! FROM 子查询、视图展开后的定义、`INSERT ... SELECT`、过程中的命令语句与 LOOP 语句。
//! 非深度遍历把嵌套命令视为不透明节点，只触发 `visit_nested_command`。
//! 每次回调之后都会检查 `should_abort`，为真时立即停止

use crate::query::sql::{
    AggregateSymbol, Block, Command, Criteria, ElementSymbol, Expression, FromClause, FromList,
    GroupSymbol, LanguageObject, Limit, OrderBy, Query, SPParameter, SetClause,
    Statement,
};
use crate::query::visitor::language_visitor::{ExpressionSlot, LanguageVisitor, LanguageVisitorMut};

/// 回调相对于子节点的时机
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalOrder {
    /// 先访问节点，再访问子节点
    #[default]
    PreOrder,
    /// 先访问子节点，再访问节点
    PostOrder,
}

/// 只读导航器
pub struct Navigator<'v, V: LanguageVisitor + ?Sized> {
    visitor: &'v mut V,
    order: TraversalOrder,
    deep: bool,
    aggregate_stop: bool,
}

impl<'v, V: LanguageVisitor + ?Sized> Navigator<'v, V> {
    pub fn new(visitor: &'v mut V, order: TraversalOrder) -> Self {
        Self {
            visitor,
            order,
            deep: false,
            aggregate_stop: false,
        }
    }

    /// 是否进入嵌套命令
    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    /// 聚合截断：访问聚合函数与窗口函数本身，但不进入其操作数
    pub fn aggregate_stop(mut self, aggregate_stop: bool) -> Self {
        self.aggregate_stop = aggregate_stop;
        self
    }

    pub fn walk<T: Navigable + ?Sized>(&mut self, node: &T) {
        node.navigate(self);
    }

    fn aborted(&self) -> bool {
        self.visitor.should_abort()
    }

    /// 按遍历顺序在子节点前或后调用 `visit`
    fn node<F, C>(&mut self, visit: F, children: C)
    where
        F: Fn(&mut V),
        C: FnOnce(&mut Self),
    {
        if self.aborted() {
            return;
        }
        if self.order == TraversalOrder::PreOrder {
            visit(&mut *self.visitor);
            if self.aborted() {
                return;
            }
        }
        children(self);
        if self.order == TraversalOrder::PostOrder && !self.aborted() {
            visit(&mut *self.visitor);
        }
    }

    fn walk_nested_command(&mut self, command: &Command) {
        if self.aborted() {
            return;
        }
        self.visitor.visit_nested_command(command);
        if self.deep && !self.aborted() {
            log::trace!("进入嵌套命令: {}", command.type_name());
            self.walk_command(command);
        }
    }

    fn walk_group(&mut self, group: &GroupSymbol) {
        self.node(|v| v.visit_group(group), |_| {});
    }

    fn walk_element_target(&mut self, element: &ElementSymbol) {
        self.node(|v| v.visit_element(element), |_| {});
    }

    // ==================== 表达式 ====================

    pub fn walk_expression(&mut self, expr: &Expression) {
        if self.aborted() || !self.visitor.should_descend(expr) {
            return;
        }
        self.node(|v| dispatch_expression(v, expr), |nav| nav.walk_expression_children(expr));
    }

    fn walk_expression_children(&mut self, expr: &Expression) {
        match expr {
            Expression::Element(_) | Expression::Constant(_) | Expression::Reference(_) => {}
            Expression::Function(f) => {
                for arg in &f.args {
                    self.walk_expression(arg);
                }
            }
            Expression::Aggregate(a) => {
                if !self.aggregate_stop {
                    self.walk_aggregate_operands(a);
                }
            }
            Expression::Window(w) => {
                if !self.aggregate_stop {
                    let function = &w.function;
                    self.node(
                        |v| v.visit_aggregate(function),
                        |nav| nav.walk_aggregate_operands(function),
                    );
                    for e in &w.window.partition {
                        self.walk_expression(e);
                    }
                    if let Some(order_by) = &w.window.order_by {
                        self.walk_order_by(order_by);
                    }
                }
            }
            Expression::Case(c) => {
                self.walk_expression(&c.expression);
                for (when, then) in &c.whens {
                    self.walk_expression(when);
                    self.walk_expression(then);
                }
                if let Some(e) = &c.else_expression {
                    self.walk_expression(e);
                }
            }
            Expression::SearchedCase(c) => {
                for (when, then) in &c.whens {
                    self.walk_criteria(when);
                    self.walk_expression(then);
                }
                if let Some(e) = &c.else_expression {
                    self.walk_expression(e);
                }
            }
            Expression::ScalarSubquery(s) => self.walk_nested_command(&s.command),
            Expression::Alias(a) => self.walk_expression(&a.symbol),
            Expression::ExpressionSymbol(s) => self.walk_expression(&s.expression),
        }
    }

    fn walk_aggregate_operands(&mut self, aggregate: &AggregateSymbol) {
        if let Some(e) = &aggregate.expression {
            self.walk_expression(e);
        }
        if let Some(order_by) = &aggregate.order_by {
            self.walk_order_by(order_by);
        }
        if let Some(condition) = &aggregate.condition {
            self.walk_criteria(condition);
        }
    }

    // ==================== 条件 ====================

    pub fn walk_criteria(&mut self, criteria: &Criteria) {
        self.node(
            |v| dispatch_criteria(v, criteria),
            |nav| match criteria {
                Criteria::Compare(c) => {
                    nav.walk_expression(&c.left);
                    nav.walk_expression(&c.right);
                }
                Criteria::Between(c) => {
                    nav.walk_expression(&c.expression);
                    nav.walk_expression(&c.lower);
                    nav.walk_expression(&c.upper);
                }
                Criteria::Match(c) => {
                    nav.walk_expression(&c.left);
                    nav.walk_expression(&c.right);
                }
                Criteria::IsNull(c) => nav.walk_expression(&c.expression),
                Criteria::Set(c) => {
                    nav.walk_expression(&c.expression);
                    for value in &c.values {
                        nav.walk_expression(value);
                    }
                }
                Criteria::SubquerySet(c) => {
                    nav.walk_expression(&c.expression);
                    nav.walk_nested_command(&c.command);
                }
                Criteria::SubqueryCompare(c) => {
                    nav.walk_expression(&c.left);
                    nav.walk_nested_command(&c.command);
                }
                Criteria::Exists(c) => nav.walk_nested_command(&c.command),
                Criteria::DependentSet(c) => nav.walk_expression(&c.expression),
                Criteria::Compound(c) => {
                    for part in &c.criteria {
                        nav.walk_criteria(part);
                    }
                }
                Criteria::Not(c) => nav.walk_criteria(&c.criteria),
            },
        );
    }

    // ==================== 命令与子句 ====================

    pub fn walk_command(&mut self, command: &Command) {
        self.node(
            |v| dispatch_command(v, command),
            |nav| match command {
                Command::Query(q) => nav.walk_query(q),
                Command::SetQuery(sq) => {
                    nav.walk_command(&sq.left);
                    nav.walk_command(&sq.right);
                    if let Some(order_by) = &sq.order_by {
                        nav.walk_order_by(order_by);
                    }
                    if let Some(limit) = &sq.limit {
                        nav.walk_limit(limit);
                    }
                }
                Command::Insert(insert) => {
                    nav.walk_group(&insert.group);
                    for variable in &insert.variables {
                        nav.walk_element_target(variable);
                    }
                    for value in &insert.values {
                        nav.walk_expression(value);
                    }
                    if let Some(query) = &insert.query_expression {
                        nav.walk_nested_command(query);
                    }
                }
                Command::Update(update) => {
                    nav.walk_group(&update.group);
                    for change in &update.changes {
                        nav.walk_set_clause(change);
                    }
                    if let Some(criteria) = &update.criteria {
                        nav.walk_criteria(criteria);
                    }
                }
                Command::Delete(delete) => {
                    nav.walk_group(&delete.group);
                    if let Some(criteria) = &delete.criteria {
                        nav.walk_criteria(criteria);
                    }
                }
                Command::StoredProcedure(sp) => {
                    if let Some(group) = &sp.group {
                        nav.walk_group(group);
                    }
                    for parameter in &sp.parameters {
                        nav.walk_sp_parameter(parameter);
                    }
                }
                Command::CreateProcedure(cp) => nav.walk_block(&cp.block),
                Command::Dynamic(d) => {
                    nav.walk_expression(&d.sql);
                    for column in &d.as_columns {
                        nav.walk_element_target(column);
                    }
                    if let Some(group) = &d.into_group {
                        nav.walk_group(group);
                    }
                    for clause in &d.using {
                        nav.walk_set_clause(clause);
                    }
                }
            },
        );
    }

    fn walk_query(&mut self, query: &Query) {
        let select = &query.select;
        self.node(
            |v| v.visit_select(select),
            |nav| {
                for symbol in &select.symbols {
                    nav.walk_expression(symbol);
                }
            },
        );
        if let Some(from) = &query.from {
            self.walk_from(from);
        }
        if let Some(criteria) = &query.criteria {
            self.walk_criteria(criteria);
        }
        if let Some(group_by) = &query.group_by {
            self.node(
                |v| v.visit_group_by(group_by),
                |nav| {
                    for symbol in &group_by.symbols {
                        nav.walk_expression(symbol);
                    }
                },
            );
        }
        if let Some(having) = &query.having {
            self.walk_criteria(having);
        }
        if let Some(order_by) = &query.order_by {
            self.walk_order_by(order_by);
        }
        if let Some(limit) = &query.limit {
            self.walk_limit(limit);
        }
    }

    fn walk_from(&mut self, from: &FromList) {
        self.node(
            |v| v.visit_from(from),
            |nav| {
                for clause in &from.clauses {
                    nav.walk_from_clause(clause);
                }
            },
        );
    }

    pub fn walk_from_clause(&mut self, clause: &FromClause) {
        match clause {
            FromClause::Unary(u) => self.node(
                |v| v.visit_unary_from_clause(u),
                |nav| {
                    nav.walk_group(&u.group);
                    if let Some(command) = &u.expanded_command {
                        nav.walk_nested_command(command);
                    }
                },
            ),
            FromClause::Join(j) => self.node(
                |v| v.visit_join_predicate(j),
                |nav| {
                    nav.walk_from_clause(&j.left);
                    nav.walk_from_clause(&j.right);
                    for criteria in &j.criteria {
                        nav.walk_criteria(criteria);
                    }
                },
            ),
            // 子查询的组只通过 visit_subquery_from_clause 暴露
            FromClause::Subquery(s) => self.node(
                |v| v.visit_subquery_from_clause(s),
                |nav| nav.walk_nested_command(&s.command),
            ),
        }
    }

    fn walk_order_by(&mut self, order_by: &OrderBy) {
        self.node(
            |v| v.visit_order_by(order_by),
            |nav| {
                for item in &order_by.items {
                    nav.node(
                        |v| v.visit_order_by_item(item),
                        |nav| nav.walk_expression(&item.symbol),
                    );
                }
            },
        );
    }

    fn walk_limit(&mut self, limit: &Limit) {
        self.node(
            |v| v.visit_limit(limit),
            |nav| {
                if let Some(offset) = &limit.offset {
                    nav.walk_expression(offset);
                }
                if let Some(row_limit) = &limit.row_limit {
                    nav.walk_expression(row_limit);
                }
            },
        );
    }

    fn walk_set_clause(&mut self, clause: &SetClause) {
        self.node(
            |v| v.visit_set_clause(clause),
            |nav| {
                nav.walk_element_target(&clause.symbol);
                nav.walk_expression(&clause.value);
            },
        );
    }

    fn walk_sp_parameter(&mut self, parameter: &SPParameter) {
        self.node(
            |v| v.visit_sp_parameter(parameter),
            |nav| {
                if let Some(e) = &parameter.expression {
                    nav.walk_expression(e);
                }
            },
        );
    }

    // ==================== 过程语句 ====================

    pub fn walk_block(&mut self, block: &Block) {
        self.node(
            |v| v.visit_block(block),
            |nav| {
                for statement in block.statements.iter().chain(&block.exception_statements) {
                    nav.walk_statement(statement);
                }
            },
        );
    }

    pub fn walk_statement(&mut self, statement: &Statement) {
        self.node(
            |v| dispatch_statement(v, statement),
            |nav| match statement {
                Statement::Assignment(a) => {
                    nav.walk_element_target(&a.variable);
                    if let Some(value) = &a.value {
                        nav.walk_expression(value);
                    }
                }
                Statement::If(s) => {
                    nav.walk_criteria(&s.condition);
                    nav.walk_block(&s.if_block);
                    if let Some(else_block) = &s.else_block {
                        nav.walk_block(else_block);
                    }
                }
                Statement::Loop(s) => {
                    nav.walk_nested_command(&s.command);
                    nav.walk_block(&s.block);
                }
                Statement::While(s) => {
                    nav.walk_criteria(&s.condition);
                    nav.walk_block(&s.block);
                }
                Statement::Raise(s) => nav.walk_expression(&s.expression),
                Statement::Branch(_) => {}
                Statement::Command(s) => nav.walk_nested_command(&s.command),
                Statement::Block(b) => {
                    for inner in b.statements.iter().chain(&b.exception_statements) {
                        nav.walk_statement(inner);
                    }
                }
            },
        );
    }
}

fn dispatch_expression<V: LanguageVisitor + ?Sized>(v: &mut V, expr: &Expression) {
    v.visit_expression(expr);
    if v.should_abort() {
        return;
    }
    match expr {
        Expression::Element(e) => v.visit_element(e),
        Expression::Constant(c) => v.visit_constant(c),
        Expression::Function(f) => v.visit_function(f),
        Expression::Aggregate(a) => v.visit_aggregate(a),
        Expression::Window(w) => v.visit_window_function(w),
        Expression::Case(c) => v.visit_case(c),
        Expression::SearchedCase(c) => v.visit_searched_case(c),
        Expression::Reference(r) => v.visit_reference(r),
        Expression::ScalarSubquery(s) => v.visit_scalar_subquery(s),
        Expression::Alias(a) => v.visit_alias(a),
        Expression::ExpressionSymbol(s) => v.visit_expression_symbol(s),
    }
}

fn dispatch_criteria<V: LanguageVisitor + ?Sized>(v: &mut V, criteria: &Criteria) {
    v.visit_criteria(criteria);
    if v.should_abort() {
        return;
    }
    match criteria {
        Criteria::Compare(c) => v.visit_compare(c),
        Criteria::Between(c) => v.visit_between(c),
        Criteria::Match(c) => v.visit_match(c),
        Criteria::IsNull(c) => v.visit_is_null(c),
        Criteria::Set(c) => v.visit_set_criteria(c),
        Criteria::SubquerySet(c) => v.visit_subquery_set(c),
        Criteria::SubqueryCompare(c) => v.visit_subquery_compare(c),
        Criteria::Exists(c) => v.visit_exists(c),
        Criteria::DependentSet(c) => v.visit_dependent_set(c),
        Criteria::Compound(c) => v.visit_compound(c),
        Criteria::Not(c) => v.visit_not(c),
    }
}

fn dispatch_command<V: LanguageVisitor + ?Sized>(v: &mut V, command: &Command) {
    v.visit_command(command);
    if v.should_abort() {
        return;
    }
    match command {
        Command::Query(q) => v.visit_query(q),
        Command::SetQuery(sq) => v.visit_set_query(sq),
        Command::Insert(i) => v.visit_insert(i),
        Command::Update(u) => v.visit_update(u),
        Command::Delete(d) => v.visit_delete(d),
        Command::StoredProcedure(sp) => v.visit_stored_procedure(sp),
        Command::CreateProcedure(cp) => v.visit_create_procedure(cp),
        Command::Dynamic(d) => v.visit_dynamic_command(d),
    }
}

fn dispatch_statement<V: LanguageVisitor + ?Sized>(v: &mut V, statement: &Statement) {
    v.visit_statement(statement);
    if v.should_abort() {
        return;
    }
    match statement {
        Statement::Assignment(s) => v.visit_assignment(s),
        Statement::If(s) => v.visit_if(s),
        Statement::Loop(s) => v.visit_loop(s),
        Statement::While(s) => v.visit_while(s),
        Statement::Raise(s) => v.visit_raise(s),
        Statement::Branch(s) => v.visit_branch(s),
        Statement::Command(s) => v.visit_command_statement(s),
        Statement::Block(b) => v.visit_block(b),
    }
}

/// 可交给只读导航器遍历的节点
pub trait Navigable {
    fn navigate<V: LanguageVisitor + ?Sized>(&self, navigator: &mut Navigator<'_, V>);
}

impl Navigable for Expression {
    fn navigate<V: LanguageVisitor + ?Sized>(&self, navigator: &mut Navigator<'_, V>) {
        navigator.walk_expression(self);
    }
}

impl Navigable for Criteria {
    fn navigate<V: LanguageVisitor + ?Sized>(&self, navigator: &mut Navigator<'_, V>) {
        navigator.walk_criteria(self);
    }
}

impl Navigable for Command {
    fn navigate<V: LanguageVisitor + ?Sized>(&self, navigator: &mut Navigator<'_, V>) {
        navigator.walk_command(self);
    }
}

impl Navigable for Statement {
    fn navigate<V: LanguageVisitor + ?Sized>(&self, navigator: &mut Navigator<'_, V>) {
        navigator.walk_statement(self);
    }
}

impl Navigable for Block {
    fn navigate<V: LanguageVisitor + ?Sized>(&self, navigator: &mut Navigator<'_, V>) {
        navigator.walk_block(self);
    }
}

impl Navigable for FromClause {
    fn navigate<V: LanguageVisitor + ?Sized>(&self, navigator: &mut Navigator<'_, V>) {
        navigator.walk_from_clause(self);
    }
}

impl Navigable for LanguageObject {
    fn navigate<V: LanguageVisitor + ?Sized>(&self, navigator: &mut Navigator<'_, V>) {
        match self {
            LanguageObject::Command(c) => navigator.walk_command(c),
            LanguageObject::Criteria(c) => navigator.walk_criteria(c),
            LanguageObject::Expression(e) => navigator.walk_expression(e),
            LanguageObject::Statement(s) => navigator.walk_statement(s),
        }
    }
}

impl<T: Navigable> Navigable for [T] {
    fn navigate<V: LanguageVisitor + ?Sized>(&self, navigator: &mut Navigator<'_, V>) {
        for node in self {
            node.navigate(navigator);
        }
    }
}

impl<T: Navigable> Navigable for Vec<T> {
    fn navigate<V: LanguageVisitor + ?Sized>(&self, navigator: &mut Navigator<'_, V>) {
        self.as_slice().navigate(navigator);
    }
}

/// 先序遍历
pub fn pre_order<T, V>(node: &T, visitor: &mut V, deep: bool)
where
    T: Navigable + ?Sized,
    V: LanguageVisitor + ?Sized,
{
    Navigator::new(visitor, TraversalOrder::PreOrder)
        .deep(deep)
        .walk(node);
}

/// 后序遍历
pub fn post_order<T, V>(node: &T, visitor: &mut V, deep: bool)
where
    T: Navigable + ?Sized,
    V: LanguageVisitor + ?Sized,
{
    Navigator::new(visitor, TraversalOrder::PostOrder)
        .deep(deep)
        .walk(node);
}

// ==================== 可变导航器 ====================

/// 可变导航器
///
/// 先序模式下，回调替换后的节点会继续被遍历；后序模式下替换后的节点不再被访问
pub struct NavigatorMut<'v, V: LanguageVisitorMut + ?Sized> {
    visitor: &'v mut V,
    order: TraversalOrder,
    deep: bool,
}

impl<'v, V: LanguageVisitorMut + ?Sized> NavigatorMut<'v, V> {
    pub fn new(visitor: &'v mut V, order: TraversalOrder) -> Self {
        Self {
            visitor,
            order,
            deep: false,
        }
    }

    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    pub fn walk<T: NavigableMut + ?Sized>(&mut self, node: &mut T) {
        node.navigate_mut(self);
    }

    fn aborted(&self) -> bool {
        self.visitor.should_abort()
    }

    fn pre(&self) -> bool {
        self.order == TraversalOrder::PreOrder && !self.aborted()
    }

    fn post(&self) -> bool {
        self.order == TraversalOrder::PostOrder && !self.aborted()
    }

    fn walk_nested_command(&mut self, command: &mut Command) {
        if self.deep && !self.aborted() {
            log::trace!("进入嵌套命令: {}", command.type_name());
            self.walk_command(command);
        }
    }

    fn walk_group(&mut self, group: &mut GroupSymbol) {
        if !self.aborted() {
            self.visitor.visit_group_mut(group);
        }
    }

    fn walk_element_target(&mut self, element: &mut ElementSymbol) {
        if !self.aborted() {
            self.visitor.visit_element_target_mut(element);
        }
    }

    pub fn walk_expression(&mut self, expr: &mut Expression, slot: ExpressionSlot) {
        if self.aborted() || !self.visitor.should_descend(expr) {
            return;
        }
        if self.pre() {
            self.visitor.visit_expression_mut(expr, slot);
        }
        self.walk_expression_children(expr);
        if self.post() {
            self.visitor.visit_expression_mut(expr, slot);
        }
    }

    fn operand(&mut self, expr: &mut Expression) {
        self.walk_expression(expr, ExpressionSlot::Operand);
    }

    fn walk_expression_children(&mut self, expr: &mut Expression) {
        if self.aborted() {
            return;
        }
        match expr {
            // 引用包装的外层表达式属于外层查询，不在此处改写
            Expression::Element(_) | Expression::Constant(_) | Expression::Reference(_) => {}
            Expression::Function(f) => {
                for arg in f.args.iter_mut() {
                    self.operand(arg);
                }
            }
            Expression::Aggregate(a) => self.walk_aggregate_operands(a),
            Expression::Window(w) => {
                self.walk_aggregate_operands(&mut w.function);
                for e in w.window.partition.iter_mut() {
                    self.operand(e);
                }
                if let Some(order_by) = &mut w.window.order_by {
                    self.walk_order_by(order_by);
                }
            }
            Expression::Case(c) => {
                self.operand(&mut c.expression);
                for (when, then) in c.whens.iter_mut() {
                    self.operand(when);
                    self.operand(then);
                }
                if let Some(e) = &mut c.else_expression {
                    self.operand(e);
                }
            }
            Expression::SearchedCase(c) => {
                for (when, then) in c.whens.iter_mut() {
                    self.walk_criteria(when);
                    self.operand(then);
                }
                if let Some(e) = &mut c.else_expression {
                    self.operand(e);
                }
            }
            Expression::ScalarSubquery(s) => self.walk_nested_command(&mut s.command),
            Expression::Alias(a) => self.operand(&mut a.symbol),
            Expression::ExpressionSymbol(s) => self.operand(&mut s.expression),
        }
    }

    fn walk_aggregate_operands(&mut self, aggregate: &mut AggregateSymbol) {
        if let Some(e) = &mut aggregate.expression {
            self.operand(e);
        }
        if let Some(order_by) = &mut aggregate.order_by {
            self.walk_order_by(order_by);
        }
        if let Some(condition) = &mut aggregate.condition {
            self.walk_criteria(condition);
        }
    }

    pub fn walk_criteria(&mut self, criteria: &mut Criteria) {
        if self.aborted() {
            return;
        }
        if self.pre() {
            self.visitor.visit_criteria_mut(criteria);
        }
        match criteria {
            Criteria::Compare(c) => {
                self.operand(&mut c.left);
                self.operand(&mut c.right);
            }
            Criteria::Between(c) => {
                self.operand(&mut c.expression);
                self.operand(&mut c.lower);
                self.operand(&mut c.upper);
            }
            Criteria::Match(c) => {
                self.operand(&mut c.left);
                self.operand(&mut c.right);
            }
            Criteria::IsNull(c) => self.operand(&mut c.expression),
            Criteria::Set(c) => {
                self.operand(&mut c.expression);
                for value in c.values.iter_mut() {
                    self.operand(value);
                }
            }
            Criteria::SubquerySet(c) => {
                self.operand(&mut c.expression);
                self.walk_nested_command(&mut c.command);
            }
            Criteria::SubqueryCompare(c) => {
                self.operand(&mut c.left);
                self.walk_nested_command(&mut c.command);
            }
            Criteria::Exists(c) => self.walk_nested_command(&mut c.command),
            Criteria::DependentSet(c) => self.operand(&mut c.expression),
            Criteria::Compound(c) => {
                for part in c.criteria.iter_mut() {
                    self.walk_criteria(part);
                }
            }
            Criteria::Not(c) => self.walk_criteria(&mut c.criteria),
        }
        if self.post() {
            self.visitor.visit_criteria_mut(criteria);
        }
    }

    pub fn walk_command(&mut self, command: &mut Command) {
        if self.aborted() {
            return;
        }
        if self.pre() {
            self.visitor.visit_command_mut(command);
        }
        match command {
            Command::Query(q) => self.walk_query(q),
            Command::SetQuery(sq) => {
                self.walk_command(&mut sq.left);
                self.walk_command(&mut sq.right);
                if let Some(order_by) = &mut sq.order_by {
                    self.walk_order_by(order_by);
                }
                if let Some(limit) = &mut sq.limit {
                    self.walk_limit(limit);
                }
            }
            Command::Insert(insert) => {
                self.walk_group(&mut insert.group);
                for variable in insert.variables.iter_mut() {
                    self.walk_element_target(variable);
                }
                for value in insert.values.iter_mut() {
                    self.operand(value);
                }
                if let Some(query) = &mut insert.query_expression {
                    self.walk_nested_command(query);
                }
            }
            Command::Update(update) => {
                self.walk_group(&mut update.group);
                for change in update.changes.iter_mut() {
                    self.walk_set_clause(change);
                }
                if let Some(criteria) = &mut update.criteria {
                    self.walk_criteria(criteria);
                }
            }
            Command::Delete(delete) => {
                self.walk_group(&mut delete.group);
                if let Some(criteria) = &mut delete.criteria {
                    self.walk_criteria(criteria);
                }
            }
            Command::StoredProcedure(sp) => {
                if let Some(group) = &mut sp.group {
                    self.walk_group(group);
                }
                for parameter in sp.parameters.iter_mut() {
                    if let Some(e) = &mut parameter.expression {
                        self.operand(e);
                    }
                }
            }
            Command::CreateProcedure(cp) => self.walk_block(&mut cp.block),
            Command::Dynamic(d) => {
                self.operand(&mut d.sql);
                for column in d.as_columns.iter_mut() {
                    self.walk_element_target(column);
                }
                if let Some(group) = &mut d.into_group {
                    self.walk_group(group);
                }
                for clause in d.using.iter_mut() {
                    self.walk_set_clause(clause);
                }
            }
        }
        if self.post() {
            self.visitor.visit_command_mut(command);
        }
    }

    fn walk_query(&mut self, query: &mut Query) {
        for symbol in query.select.symbols.iter_mut() {
            self.walk_expression(symbol, ExpressionSlot::Projected);
        }
        if let Some(from) = &mut query.from {
            for clause in from.clauses.iter_mut() {
                self.walk_from_clause(clause);
            }
        }
        if let Some(criteria) = &mut query.criteria {
            self.walk_criteria(criteria);
        }
        if let Some(group_by) = &mut query.group_by {
            for symbol in group_by.symbols.iter_mut() {
                self.operand(symbol);
            }
        }
        if let Some(having) = &mut query.having {
            self.walk_criteria(having);
        }
        if let Some(order_by) = &mut query.order_by {
            self.walk_order_by(order_by);
        }
        if let Some(limit) = &mut query.limit {
            self.walk_limit(limit);
        }
    }

    pub fn walk_from_clause(&mut self, clause: &mut FromClause) {
        if self.aborted() {
            return;
        }
        match clause {
            FromClause::Unary(u) => {
                self.walk_group(&mut u.group);
                if let Some(command) = &mut u.expanded_command {
                    self.walk_nested_command(command);
                }
            }
            FromClause::Join(j) => {
                self.walk_from_clause(&mut j.left);
                self.walk_from_clause(&mut j.right);
                for criteria in j.criteria.iter_mut() {
                    self.walk_criteria(criteria);
                }
            }
            FromClause::Subquery(s) => {
                self.walk_group(&mut s.group);
                self.walk_nested_command(&mut s.command);
            }
        }
    }

    fn walk_order_by(&mut self, order_by: &mut OrderBy) {
        for item in order_by.items.iter_mut() {
            self.operand(&mut item.symbol);
        }
    }

    fn walk_limit(&mut self, limit: &mut Limit) {
        if let Some(offset) = &mut limit.offset {
            self.operand(offset);
        }
        if let Some(row_limit) = &mut limit.row_limit {
            self.operand(row_limit);
        }
    }

    fn walk_set_clause(&mut self, clause: &mut SetClause) {
        self.walk_element_target(&mut clause.symbol);
        self.operand(&mut clause.value);
    }

    pub fn walk_block(&mut self, block: &mut Block) {
        for statement in block
            .statements
            .iter_mut()
            .chain(block.exception_statements.iter_mut())
        {
            self.walk_statement(statement);
        }
    }

    pub fn walk_statement(&mut self, statement: &mut Statement) {
        if self.aborted() {
            return;
        }
        if self.pre() {
            self.visitor.visit_statement_mut(statement);
        }
        match statement {
            Statement::Assignment(a) => {
                self.walk_element_target(&mut a.variable);
                if let Some(value) = &mut a.value {
                    self.operand(value);
                }
            }
            Statement::If(s) => {
                self.walk_criteria(&mut s.condition);
                self.walk_block(&mut s.if_block);
                if let Some(else_block) = &mut s.else_block {
                    self.walk_block(else_block);
                }
            }
            Statement::Loop(s) => {
                self.walk_nested_command(&mut s.command);
                self.walk_block(&mut s.block);
            }
            Statement::While(s) => {
                self.walk_criteria(&mut s.condition);
                self.walk_block(&mut s.block);
            }
            Statement::Raise(s) => self.operand(&mut s.expression),
            Statement::Branch(_) => {}
            Statement::Command(s) => self.walk_nested_command(&mut s.command),
            Statement::Block(b) => self.walk_block(b),
        }
        if self.post() {
            self.visitor.visit_statement_mut(statement);
        }
    }
}

/// 可交给可变导航器遍历的节点
pub trait NavigableMut {
    fn navigate_mut<V: LanguageVisitorMut + ?Sized>(&mut self, navigator: &mut NavigatorMut<'_, V>);
}

impl NavigableMut for Expression {
    fn navigate_mut<V: LanguageVisitorMut + ?Sized>(&mut self, navigator: &mut NavigatorMut<'_, V>) {
        navigator.walk_expression(self, ExpressionSlot::Operand);
    }
}

impl NavigableMut for Criteria {
    fn navigate_mut<V: LanguageVisitorMut + ?Sized>(&mut self, navigator: &mut NavigatorMut<'_, V>) {
        navigator.walk_criteria(self);
    }
}

impl NavigableMut for Command {
    fn navigate_mut<V: LanguageVisitorMut + ?Sized>(&mut self, navigator: &mut NavigatorMut<'_, V>) {
        navigator.walk_command(self);
    }
}

impl NavigableMut for Statement {
    fn navigate_mut<V: LanguageVisitorMut + ?Sized>(&mut self, navigator: &mut NavigatorMut<'_, V>) {
        navigator.walk_statement(self);
    }
}

impl NavigableMut for Block {
    fn navigate_mut<V: LanguageVisitorMut + ?Sized>(&mut self, navigator: &mut NavigatorMut<'_, V>) {
        navigator.walk_block(self);
    }
}

impl NavigableMut for FromClause {
    fn navigate_mut<V: LanguageVisitorMut + ?Sized>(&mut self, navigator: &mut NavigatorMut<'_, V>) {
        navigator.walk_from_clause(self);
    }
}

impl NavigableMut for LanguageObject {
    fn navigate_mut<V: LanguageVisitorMut + ?Sized>(&mut self, navigator: &mut NavigatorMut<'_, V>) {
        match self {
            LanguageObject::Command(c) => navigator.walk_command(c),
            LanguageObject::Criteria(c) => navigator.walk_criteria(c),
            LanguageObject::Expression(e) => navigator.walk_expression(e, ExpressionSlot::Operand),
            LanguageObject::Statement(s) => navigator.walk_statement(s),
        }
    }
}

impl<T: NavigableMut> NavigableMut for [T] {
    fn navigate_mut<V: LanguageVisitorMut + ?Sized>(&mut self, navigator: &mut NavigatorMut<'_, V>) {
        for node in self.iter_mut() {
            node.navigate_mut(navigator);
        }
    }
}

impl<T: NavigableMut> NavigableMut for Vec<T> {
    fn navigate_mut<V: LanguageVisitorMut + ?Sized>(&mut self, navigator: &mut NavigatorMut<'_, V>) {
        self.as_mut_slice().navigate_mut(navigator);
    }
}
