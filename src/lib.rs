//! fedquery - 联邦 SQL 查询引擎的改写与分析核心
//!
//! 在已解析的 SQL 语法树上完成：
//! - 视图展开后的虚拟符号到物理表达式的替换
//! - 表达式最早可求值阶段（下推/运行时/计划）与确定性的分析
//! - 列、组、聚合、函数、嵌套命令、外层引用等结构信息的收集
//! - 按选择器把虚拟层条件翻译为物理层条件

pub mod config;
pub mod core;
pub mod query;
pub mod utils;
