//! CommandCollectorVisitor - 收集嵌套命令
//!
//! 非深度模式只返回直接嵌套的子命令（子查询、视图定义、过程语句等），
//! 深度模式返回所有层级的子命令。根命令本身不在结果中

use crate::query::sql::Command;
use crate::query::visitor::collection::Collected;
use crate::query::visitor::language_visitor::LanguageVisitor;
use crate::query::visitor::navigator::{pre_order, Navigable};

#[derive(Debug)]
pub struct CommandCollectorVisitor {
    commands: Collected<Command>,
    deep: bool,
}

impl CommandCollectorVisitor {
    pub fn new(remove_duplicates: bool) -> Self {
        Self {
            commands: Collected::new(remove_duplicates),
            deep: false,
        }
    }

    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    pub fn collect<T: Navigable + ?Sized>(&mut self, node: &T) {
        let deep = self.deep;
        pre_order(node, self, deep);
    }

    pub fn into_commands(self) -> Vec<Command> {
        self.commands.into_vec()
    }
}

impl LanguageVisitor for CommandCollectorVisitor {
    fn visit_nested_command(&mut self, command: &Command) {
        self.commands.push(command);
    }
}

/// 直接嵌套的子命令
pub fn get_commands<T: Navigable + ?Sized>(node: &T) -> Vec<Command> {
    let mut visitor = CommandCollectorVisitor::new(false);
    visitor.collect(node);
    visitor.into_commands()
}

/// 所有层级的子命令
pub fn get_commands_deep<T: Navigable + ?Sized>(node: &T) -> Vec<Command> {
    let mut visitor = CommandCollectorVisitor::new(false).deep(true);
    visitor.collect(node);
    visitor.into_commands()
}
