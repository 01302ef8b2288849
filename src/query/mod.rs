// 查询改写与分析模块
//
// - sql: 已解析的 SQL 抽象语法树
// - visitor: 导航器、访问器以及基于它们的映射、分析、收集与条件翻译

pub mod sql;
pub mod visitor;
