//! 命令与子句节点定义

use crate::core::types::DataType;
use crate::query::sql::criteria::Criteria;
use crate::query::sql::expression::{ElementSymbol, Expression, GroupSymbol};
use crate::query::sql::procedure::Block;
use serde::{Deserialize, Serialize};

/// 统一命令类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    Query(Query),
    SetQuery(SetQuery),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
    StoredProcedure(StoredProcedure),
    CreateProcedure(CreateProcedure),
    Dynamic(DynamicCommand),
}

impl Command {
    /// 命令类型名称，用于日志
    pub fn type_name(&self) -> &'static str {
        match self {
            Command::Query(_) => "QUERY",
            Command::SetQuery(_) => "SET_QUERY",
            Command::Insert(_) => "INSERT",
            Command::Update(_) => "UPDATE",
            Command::Delete(_) => "DELETE",
            Command::StoredProcedure(_) => "STORED_PROCEDURE",
            Command::CreateProcedure(_) => "CREATE_PROCEDURE",
            Command::Dynamic(_) => "DYNAMIC",
        }
    }

    /// 查询命令的投影列表
    pub fn projected_symbols(&self) -> Vec<&Expression> {
        match self {
            Command::Query(q) => q.select.symbols.iter().collect(),
            Command::SetQuery(sq) => sq.left.projected_symbols(),
            _ => vec![],
        }
    }
}

impl From<Query> for Command {
    fn from(q: Query) -> Self {
        Command::Query(q)
    }
}

/// SELECT 子句
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Select {
    pub distinct: bool,
    pub symbols: Vec<Expression>,
}

impl Select {
    pub fn new(symbols: Vec<Expression>) -> Self {
        Self {
            distinct: false,
            symbols,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
    Cross,
}

impl JoinType {
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::LeftOuter => "LEFT OUTER JOIN",
            JoinType::RightOuter => "RIGHT OUTER JOIN",
            JoinType::FullOuter => "FULL OUTER JOIN",
            JoinType::Cross => "CROSS JOIN",
        }
    }
}

/// FROM 子句中的单个条目
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FromClause {
    Unary(UnaryFromClause),
    Join(JoinPredicate),
    Subquery(SubqueryFromClause),
}

/// 单个组，视图展开后 `expanded_command` 保存视图定义
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnaryFromClause {
    pub group: GroupSymbol,
    pub expanded_command: Option<Box<Command>>,
}

impl UnaryFromClause {
    pub fn new(group: GroupSymbol) -> Self {
        Self {
            group,
            expanded_command: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JoinPredicate {
    pub left: Box<FromClause>,
    pub right: Box<FromClause>,
    pub join_type: JoinType,
    /// ON 条件，按合取项保存
    pub criteria: Vec<Criteria>,
}

/// `(subquery) AS name`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubqueryFromClause {
    pub group: GroupSymbol,
    pub command: Box<Command>,
    pub lateral: bool,
}

/// FROM 子句
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct FromList {
    pub clauses: Vec<FromClause>,
}

impl FromList {
    pub fn new(clauses: Vec<FromClause>) -> Self {
        Self { clauses }
    }

    /// 由若干组构造，每个组一个 `UnaryFromClause`
    pub fn groups(groups: Vec<GroupSymbol>) -> Self {
        Self {
            clauses: groups
                .into_iter()
                .map(|g| FromClause::Unary(UnaryFromClause::new(g)))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct GroupBy {
    pub symbols: Vec<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NullOrdering {
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderByItem {
    pub symbol: Expression,
    pub ascending: bool,
    pub null_ordering: Option<NullOrdering>,
}

impl OrderByItem {
    pub fn new(symbol: Expression, ascending: bool) -> Self {
        Self {
            symbol,
            ascending,
            null_ordering: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct OrderBy {
    pub items: Vec<OrderByItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Limit {
    pub offset: Option<Expression>,
    pub row_limit: Option<Expression>,
}

/// SELECT 查询
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Query {
    pub select: Select,
    pub from: Option<FromList>,
    pub criteria: Option<Criteria>,
    pub group_by: Option<GroupBy>,
    pub having: Option<Criteria>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<Limit>,
}

impl Query {
    pub fn new(select: Select, from: Option<FromList>) -> Self {
        Self {
            select,
            from,
            ..Default::default()
        }
    }

    pub fn with_criteria(mut self, criteria: Criteria) -> Self {
        self.criteria = Some(criteria);
        self
    }

    pub fn with_group_by(mut self, symbols: Vec<Expression>) -> Self {
        self.group_by = Some(GroupBy { symbols });
        self
    }

    pub fn with_having(mut self, having: Criteria) -> Self {
        self.having = Some(having);
        self
    }

    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn with_limit(mut self, limit: Limit) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetOp {
    Union,
    Intersect,
    Except,
}

/// UNION / INTERSECT / EXCEPT
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetQuery {
    pub op: SetOp,
    pub all: bool,
    pub left: Box<Command>,
    pub right: Box<Command>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<Limit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Insert {
    pub group: GroupSymbol,
    pub variables: Vec<ElementSymbol>,
    pub values: Vec<Expression>,
    /// `INSERT ... SELECT` 的查询
    pub query_expression: Option<Box<Command>>,
}

/// UPDATE 中的 `symbol = value`，也用于动态 SQL 的 USING 子句
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetClause {
    pub symbol: ElementSymbol,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Update {
    pub group: GroupSymbol,
    pub changes: Vec<SetClause>,
    pub criteria: Option<Criteria>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delete {
    pub group: GroupSymbol,
    pub criteria: Option<Criteria>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterType {
    In,
    Out,
    InOut,
    ReturnValue,
    ResultSet,
}

/// 存储过程参数
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SPParameter {
    pub name: String,
    /// 从 1 开始的参数位置
    pub index: usize,
    pub parameter_type: ParameterType,
    pub data_type: DataType,
    /// 输入参数的取值表达式
    pub expression: Option<Expression>,
}

impl SPParameter {
    pub fn input(name: impl Into<String>, index: usize, expression: Expression) -> Self {
        Self {
            name: name.into(),
            index,
            parameter_type: ParameterType::In,
            data_type: expression.data_type(),
            expression: Some(expression),
        }
    }
}

/// EXEC 存储过程
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoredProcedure {
    pub procedure_name: String,
    /// 过程对应的组（过程关系式调用时使用）
    pub group: Option<GroupSymbol>,
    pub parameters: Vec<SPParameter>,
    /// 规划阶段要求在引擎内预先执行
    pub should_evaluate: bool,
}

impl StoredProcedure {
    pub fn new(procedure_name: impl Into<String>, parameters: Vec<SPParameter>) -> Self {
        Self {
            procedure_name: procedure_name.into(),
            group: None,
            parameters,
            should_evaluate: false,
        }
    }
}

/// 虚拟过程定义
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreateProcedure {
    pub block: Block,
}

/// 动态 SQL：`EXECUTE sql [AS cols] [INTO group] [USING a = b, ...]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DynamicCommand {
    pub sql: Expression,
    pub using: Vec<SetClause>,
    pub as_columns: Vec<ElementSymbol>,
    pub into_group: Option<GroupSymbol>,
}
