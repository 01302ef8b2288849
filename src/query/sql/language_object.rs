//! AST 根类型
//!
//! 所有可独立交给访问器的节点都包装为 `LanguageObject`

use crate::query::sql::command::Command;
use crate::query::sql::criteria::Criteria;
use crate::query::sql::expression::Expression;
use crate::query::sql::procedure::Statement;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageObject {
    Command(Command),
    Criteria(Criteria),
    Expression(Expression),
    Statement(Statement),
}

impl LanguageObject {
    pub fn as_command(&self) -> Option<&Command> {
        match self {
            LanguageObject::Command(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_criteria(&self) -> Option<&Criteria> {
        match self {
            LanguageObject::Criteria(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_expression(&self) -> Option<&Expression> {
        match self {
            LanguageObject::Expression(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Command> for LanguageObject {
    fn from(c: Command) -> Self {
        LanguageObject::Command(c)
    }
}

impl From<Criteria> for LanguageObject {
    fn from(c: Criteria) -> Self {
        LanguageObject::Criteria(c)
    }
}

impl From<Expression> for LanguageObject {
    fn from(e: Expression) -> Self {
        LanguageObject::Expression(e)
    }
}

impl From<Statement> for LanguageObject {
    fn from(s: Statement) -> Self {
        LanguageObject::Statement(s)
    }
}
