//! 集成测试共享工具模块
//!
//! 提供一个小型目录：物理模型 pm1（表 pm1.g1、pm1.g2、t）、虚拟视图 vm1.v、
//! 临时表 #temp，以及视图 V 的符号映射

#![allow(dead_code)]

pub mod assertions;

use fedquery::core::{
    BasicCapabilitiesFinder, BasicMetadata, DataType, FunctionDescriptor, GroupKind, MetadataId,
    PushDown,
};
use fedquery::query::sql::{Constant, ElementSymbol, Expression, Function, GroupSymbol};
use fedquery::query::visitor::SymbolMap;

pub const MODEL: &str = "pm1";

/// 测试用元数据目录
pub fn metadata() -> BasicMetadata {
    let model = Some(MetadataId::new(MODEL));
    BasicMetadata::with_system_functions()
        .with_group("pm1.g1", GroupKind::Physical, model.clone())
        .with_group("pm1.g2", GroupKind::Physical, model.clone())
        .with_group("t", GroupKind::Physical, model)
        .with_group("vm1.v", GroupKind::Virtual, None)
        .with_group("#temp", GroupKind::Temp, None)
        .with_function(
            FunctionDescriptor::new("source_hash", DataType::String)
                .with_pushdown(PushDown::MustPushdown),
        )
}

/// pm1 支持下推的函数
pub fn capabilities() -> BasicCapabilitiesFinder {
    BasicCapabilitiesFinder::new().with_functions(MODEL, ["upper", "concat", "source_hash"])
}

pub fn g1(name: &str) -> ElementSymbol {
    ElementSymbol::qualified("pm1.g1", name)
}

pub fn g2(name: &str) -> ElementSymbol {
    ElementSymbol::qualified("pm1.g2", name)
}

pub fn t(name: &str) -> ElementSymbol {
    ElementSymbol::qualified("t", name)
}

/// 视图 V 的列
pub fn v(name: &str) -> ElementSymbol {
    ElementSymbol::qualified("vm1.v", name)
}

pub fn group(name: &str) -> GroupSymbol {
    GroupSymbol::new(name).with_metadata_id(name)
}

/// 视图 V 的定义 `SELECT t.y + 1 AS x, t.a AS a, t.b AS b FROM t`
pub fn view_v_map() -> SymbolMap {
    let mut map = SymbolMap::new();
    map.insert(
        v("x").into(),
        Function::new("+", vec![t("y").into(), Constant::new(1).into()]).into(),
    );
    map.insert(v("a").into(), t("a").into());
    map.insert(v("b").into(), t("b").into());
    map
}

pub fn func(name: &str, args: Vec<Expression>) -> Expression {
    Function::new(name, args).into()
}
