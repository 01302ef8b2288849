//! 改写集成测试
//!
//! 测试范围:
//! - query::visitor::ExpressionMappingVisitor - 视图展开后的符号替换
//! - query::visitor::CriteriaTranslatorVisitor - 条件选择与翻译
//! - config::Config - 配置驱动的改写行为

mod common;

use common::assertions::{assert_count, assert_err_with, assert_ok};
use common::{g1, t, v, view_v_map};
use fedquery::config::{AnalysisConfig, Config};
use fedquery::core::ErrorCode;
use fedquery::core::RewriteError;
use fedquery::query::sql::{
    AliasSymbol, Command, CompareOp, Constant, Criteria, CriteriaKind, ElementSymbol, Expression, FromList,
    GroupSymbol, Query, Reference, Select,
};
use fedquery::query::visitor::{
    map_expressions, map_expressions_ref, CriteriaSelector, CriteriaTranslatorVisitor,
    ExpressionMappingVisitor,
};

fn select_from_view(symbols: Vec<Expression>, criteria: Option<Criteria>) -> Command {
    let mut query = Query::new(
        Select::new(symbols),
        Some(FromList::groups(vec![GroupSymbol::new("vm1.v")])),
    );
    query.criteria = criteria;
    Command::Query(query)
}

// ==================== 表达式映射测试 ====================

#[test]
fn test_view_column_becomes_aliased_expression() {
    let map = view_v_map();
    let mut command = select_from_view(vec![v("x").into()], None);

    let unmapped = map_expressions_ref(&mut command, &map);

    assert!(unmapped.is_empty(), "视图列应全部被映射: {:?}", unmapped);
    let projected = command.projected_symbols();
    assert_eq!(projected[0].to_string(), "(t.y + 1) AS x");
    assert_eq!(projected[0].output_name(), Some("x"), "输出名称应保持不变");
}

#[test]
fn test_aliased_view_column_is_fully_mapped() {
    let map = view_v_map();
    let aliased = AliasSymbol::new("renamed", v("a").into());
    let mut command = select_from_view(vec![aliased.into()], None);

    let unmapped = map_expressions_ref(&mut command, &map);

    assert!(unmapped.is_empty(), "替换值不应报告为未映射: {:?}", unmapped);
    assert_eq!(command.to_string(), "SELECT t.a AS renamed FROM vm1.v");
}

#[test]
fn test_mapping_is_idempotent_for_physical_values() {
    let map = view_v_map();
    let criteria = Criteria::and(vec![
        Criteria::compare(v("a"), CompareOp::Eq, Constant::new(1)),
        Criteria::compare(v("x"), CompareOp::Gt, v("b")),
    ]);
    let mut command = select_from_view(vec![v("a").into(), v("x").into()], Some(criteria));

    map_expressions_ref(&mut command, &map);
    let once = command.clone();
    map_expressions_ref(&mut command, &map);

    assert_eq!(command, once, "二次映射不应改变结果");
    assert_eq!(
        command.to_string(),
        "SELECT t.a, (t.y + 1) AS x FROM vm1.v WHERE t.a = 1 AND (t.y + 1) > t.b"
    );
}

#[test]
fn test_clone_on_substitute_installs_independent_copies() {
    let map = view_v_map();
    let mut criteria = Criteria::or(vec![
        Criteria::compare(v("x"), CompareOp::Eq, Constant::new(1)),
        Criteria::compare(v("x"), CompareOp::Eq, Constant::new(2)),
    ]);

    let unmapped = map_expressions(&mut criteria, map, true);

    assert!(unmapped.is_empty());
    assert_eq!(criteria.to_string(), "(t.y + 1) = 1 OR (t.y + 1) = 2");
}

#[test]
fn test_unmapped_elements_are_reported_once_in_order() {
    let map = view_v_map();
    let mut criteria = Criteria::and(vec![
        Criteria::compare(g1("e2"), CompareOp::Eq, v("a")),
        Criteria::compare(g1("e1"), CompareOp::Eq, g1("e2")),
    ]);

    let unmapped = map_expressions_ref(&mut criteria, &map);

    assert_eq!(unmapped, vec![g1("e2"), g1("e1")]);
    assert_eq!(criteria.to_string(), "pm1.g1.e2 = t.a AND pm1.g1.e1 = pm1.g1.e2");
}

#[test]
fn test_mapping_follows_analysis_config() {
    let map = view_v_map();
    let config = AnalysisConfig {
        create_aliases: false,
        expression_symbol_name: "calc".to_string(),
        ..AnalysisConfig::default()
    };
    let mut command = select_from_view(vec![v("x").into()], None);

    let mut visitor = ExpressionMappingVisitor::new(&map).with_config(&config);
    visitor.map(&mut command);

    let projected = command.projected_symbols();
    assert_eq!(projected[0].output_name(), Some("calc"));
    assert_eq!(visitor.substitution_count(), 1);
}

// ==================== 条件翻译测试 ====================

#[test]
fn test_translate_selected_conjunct() {
    let map = view_v_map();
    let criteria = Criteria::and(vec![
        Criteria::compare(v("a"), CompareOp::Eq, Constant::new(1)),
        Criteria::compare(v("b"), CompareOp::Eq, Reference::positional(0)),
    ]);
    let selector =
        CriteriaSelector::new([CriteriaKind::Set, CriteriaKind::Compare]).with_elements([v("a")]);

    let result = assert_ok(CriteriaTranslatorVisitor::new(&map).translate(&criteria, &selector, &[]));

    assert_eq!(result.criteria, Criteria::compare(t("a"), CompareOp::Eq, Constant::new(1)));
    assert!(result.implicit_params.is_empty(), "未选中的引用不应进入旁表");
}

#[test]
fn test_translate_all_conjuncts_with_parameters() {
    let map = view_v_map();
    let criteria = Criteria::and(vec![
        Criteria::compare(v("a"), CompareOp::Eq, Constant::new(1)),
        Criteria::compare(v("b"), CompareOp::Eq, Reference::positional(0)),
    ]);

    let result = assert_ok(CriteriaTranslatorVisitor::new(&map).translate(
        &criteria,
        &CriteriaSelector::any(),
        &[],
    ));

    assert_eq!(result.criteria.to_string(), "t.a = 1 AND t.b = $INPUT.param0");
    assert_count(&result.implicit_params.keys().collect::<Vec<_>>(), 1, "隐式参数");
}

#[test]
fn test_translator_totality() {
    let map = view_v_map();
    let criteria = Criteria::and(vec![
        Criteria::compare(v("a"), CompareOp::Eq, Constant::new(1)),
        Criteria::is_null(v("b")),
        Criteria::compare(v("x"), CompareOp::Lt, Reference::named("p")),
    ]);
    let selectors = vec![
        CriteriaSelector::any(),
        CriteriaSelector::new([CriteriaKind::Compare]),
        CriteriaSelector::new([CriteriaKind::IsNull]),
        CriteriaSelector::new([CriteriaKind::Between]),
        CriteriaSelector::new([CriteriaKind::Compare]).with_compare_op(CompareOp::Lt),
        CriteriaSelector::any().with_elements([v("b")]),
        CriteriaSelector::new([CriteriaKind::Not]),
        CriteriaSelector::any().with_elements([ElementSymbol::new("missing")]),
    ];

    for selector in &selectors {
        match CriteriaTranslatorVisitor::new(&map).translate(&criteria, selector, &[]) {
            Ok(result) => {
                let kept = fedquery::query::sql::separate_by_and(&result.criteria);
                assert!(kept.len() <= 3, "翻译结果不应多于输入合取项");
            }
            Err(err) => {
                let err: RewriteError = err.into();
                assert_eq!(err.to_error_code(), ErrorCode::InvalidArgument, "只应出现选择器错误");
            }
        }
    }
}

#[test]
fn test_translate_with_unmapped_element_fails() {
    let map = view_v_map();
    let criteria = Criteria::compare(v("unknown"), CompareOp::Eq, Constant::new(1));
    let result = CriteriaTranslatorVisitor::new(&map).translate(&criteria, &CriteriaSelector::any(), &[]);
    assert_err_with(result, "vm1.v.unknown");
}

#[test]
fn test_translate_uses_configured_input_group() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let path = dir.path().join("fedquery.toml");
    std::fs::write(&path, "[analysis]\ninput_group_name = \"IN\"\n").expect("写入配置失败");

    let config = assert_ok(Config::load(&path));
    let map = view_v_map();
    let criteria = Criteria::compare(v("b"), CompareOp::Eq, Reference::named("key"));
    let result = assert_ok(
        CriteriaTranslatorVisitor::new(&map)
            .with_config(&config.analysis)
            .translate(&criteria, &CriteriaSelector::any(), &[]),
    );

    assert_eq!(result.criteria.to_string(), "t.b = IN.key");
    assert_eq!(result.implicit_params.get("IN.key"), Some(&Reference::named("key")));
}
