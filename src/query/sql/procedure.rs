//! 过程语言节点

use crate::core::types::DataType;
use crate::query::sql::command::Command;
use crate::query::sql::criteria::Criteria;
use crate::query::sql::expression::{ElementSymbol, Expression};
use serde::{Deserialize, Serialize};

/// 语句块
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Block {
    pub label: Option<String>,
    pub statements: Vec<Statement>,
    /// `EXCEPTION` 子句绑定的变量名
    pub exception_group: Option<String>,
    pub exception_statements: Vec<Statement>,
}

impl Block {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            statements,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Statement {
    Assignment(AssignmentStatement),
    If(IfStatement),
    Loop(LoopStatement),
    While(WhileStatement),
    Raise(RaiseStatement),
    Branch(BranchStatement),
    Command(CommandStatement),
    Block(Block),
}

/// 赋值；`declared_type` 为 `Some` 时是 `DECLARE` 语句
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssignmentStatement {
    pub variable: ElementSymbol,
    pub value: Option<Expression>,
    pub declared_type: Option<DataType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IfStatement {
    pub condition: Criteria,
    pub if_block: Block,
    pub else_block: Option<Block>,
}

/// 对游标结果逐行执行的 `LOOP ON (command) AS cursor`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoopStatement {
    pub cursor_name: String,
    pub command: Box<Command>,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WhileStatement {
    pub condition: Criteria,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RaiseStatement {
    pub expression: Expression,
    pub warning: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BranchMode {
    Break,
    Continue,
    Leave,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchStatement {
    pub mode: BranchMode,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandStatement {
    pub command: Box<Command>,
}

impl CommandStatement {
    pub fn new(command: Command) -> Self {
        Self {
            command: Box::new(command),
        }
    }
}
