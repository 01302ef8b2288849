//! SQL 文本渲染
//!
//! 用于日志、调试输出与测试断言，输出不保证可被解析器重新读入

use crate::query::sql::command::{
    Command, FromClause, FromList, JoinType, Limit, NullOrdering, OrderBy, OrderByItem,
    ParameterType, Query, SetOp,
};
use crate::query::sql::criteria::{Criteria, LogicalOp, MatchMode, Quantifier};
use crate::query::sql::expression::{
    AggregateKind, AggregateSymbol, Expression, ReferenceBinding, WindowSpecification,
};
use crate::query::sql::language_object::LanguageObject;
use crate::query::sql::procedure::{Block, BranchMode, Statement};
use crate::query::sql::symbol::{ElementSymbol, GroupSymbol};
use std::fmt::{self, Display, Formatter};

fn write_list<T: Display>(f: &mut Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn not(negated: bool) -> &'static str {
    if negated {
        "NOT "
    } else {
        ""
    }
}

impl Display for GroupSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.definition {
            Some(definition) => write!(f, "{} AS {}", definition, self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl Display for ElementSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Element(e) => write!(f, "{}", e),
            Expression::Constant(c) => write!(f, "{}", c.value),
            Expression::Function(func) => {
                if func.is_infix() {
                    write!(f, "({} {} {})", func.args[0], func.name, func.args[1])
                } else {
                    write!(f, "{}(", func.name)?;
                    write_list(f, &func.args, ", ")?;
                    f.write_str(")")
                }
            }
            Expression::Aggregate(a) => write!(f, "{}", a),
            Expression::Window(w) => write!(f, "{} OVER ({})", w.function, w.window),
            Expression::Case(c) => {
                write!(f, "CASE {}", c.expression)?;
                for (when, then) in &c.whens {
                    write!(f, " WHEN {} THEN {}", when, then)?;
                }
                if let Some(e) = &c.else_expression {
                    write!(f, " ELSE {}", e)?;
                }
                f.write_str(" END")
            }
            Expression::SearchedCase(c) => {
                f.write_str("CASE")?;
                for (when, then) in &c.whens {
                    write!(f, " WHEN {} THEN {}", when, then)?;
                }
                if let Some(e) = &c.else_expression {
                    write!(f, " ELSE {}", e)?;
                }
                f.write_str(" END")
            }
            Expression::Reference(r) => match &r.binding {
                ReferenceBinding::Positional(_) => f.write_str("?"),
                ReferenceBinding::Named(name) => write!(f, ":{}", name),
                ReferenceBinding::Expression(e) => write!(f, "{}", e),
            },
            Expression::ScalarSubquery(s) => write!(f, "({})", s.command),
            Expression::Alias(a) => write!(f, "{} AS {}", a.symbol, a.name),
            Expression::ExpressionSymbol(s) => write!(f, "{}", s.expression),
        }
    }
}

impl Display for AggregateSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind.sql_name())?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        match &self.expression {
            Some(e) => write!(f, "{}", e)?,
            None if self.kind == AggregateKind::Count => f.write_str("*")?,
            None => {}
        }
        if let Some(order_by) = &self.order_by {
            write!(f, " {}", order_by)?;
        }
        f.write_str(")")?;
        if let Some(condition) = &self.condition {
            write!(f, " FILTER(WHERE {})", condition)?;
        }
        Ok(())
    }
}

impl Display for WindowSpecification {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if !self.partition.is_empty() {
            f.write_str("PARTITION BY ")?;
            write_list(f, &self.partition, ", ")?;
            if self.order_by.is_some() {
                f.write_str(" ")?;
            }
        }
        if let Some(order_by) = &self.order_by {
            write!(f, "{}", order_by)?;
        }
        Ok(())
    }
}

impl Display for Criteria {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Criteria::Compare(c) => write!(f, "{} {} {}", c.left, c.op.sql_symbol(), c.right),
            Criteria::Between(c) => write!(
                f,
                "{} {}BETWEEN {} AND {}",
                c.expression,
                not(c.negated),
                c.lower,
                c.upper
            ),
            Criteria::Match(c) => {
                let keyword = match c.mode {
                    MatchMode::Like => "LIKE",
                    MatchMode::SimilarTo => "SIMILAR TO",
                    MatchMode::LikeRegex => "LIKE_REGEX",
                };
                write!(f, "{} {}{} {}", c.left, not(c.negated), keyword, c.right)?;
                if let Some(escape) = c.escape {
                    write!(f, " ESCAPE '{}'", escape)?;
                }
                Ok(())
            }
            Criteria::IsNull(c) => write!(f, "{} IS {}NULL", c.expression, not(c.negated)),
            Criteria::Set(c) => {
                write!(f, "{} {}IN (", c.expression, not(c.negated))?;
                write_list(f, &c.values, ", ")?;
                f.write_str(")")
            }
            Criteria::SubquerySet(c) => {
                write!(f, "{} {}IN ({})", c.expression, not(c.negated), c.command)
            }
            Criteria::SubqueryCompare(c) => {
                let quantifier = match c.quantifier {
                    Quantifier::Some => "SOME",
                    Quantifier::Any => "ANY",
                    Quantifier::All => "ALL",
                };
                write!(
                    f,
                    "{} {} {} ({})",
                    c.left,
                    c.op.sql_symbol(),
                    quantifier,
                    c.command
                )
            }
            Criteria::Exists(c) => write!(f, "{}EXISTS ({})", not(c.negated), c.command),
            Criteria::DependentSet(c) => {
                write!(f, "{} IN (<dependent values {}>)", c.expression, c.context_symbol)
            }
            Criteria::Compound(c) => {
                let sep = match c.op {
                    LogicalOp::And => " AND ",
                    LogicalOp::Or => " OR ",
                };
                for (i, part) in c.criteria.iter().enumerate() {
                    if i > 0 {
                        f.write_str(sep)?;
                    }
                    match part {
                        Criteria::Compound(_) => write!(f, "({})", part)?,
                        _ => write!(f, "{}", part)?,
                    }
                }
                Ok(())
            }
            Criteria::Not(c) => write!(f, "NOT ({})", c.criteria),
        }
    }
}

impl Display for OrderByItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.symbol {
            Expression::Alias(a) => f.write_str(&a.name)?,
            other => write!(f, "{}", other)?,
        }
        if !self.ascending {
            f.write_str(" DESC")?;
        }
        match self.null_ordering {
            Some(NullOrdering::First) => f.write_str(" NULLS FIRST"),
            Some(NullOrdering::Last) => f.write_str(" NULLS LAST"),
            None => Ok(()),
        }
    }
}

impl Display for OrderBy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("ORDER BY ")?;
        write_list(f, &self.items, ", ")
    }
}

impl Display for Limit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match (&self.offset, &self.row_limit) {
            (Some(offset), Some(limit)) => write!(f, "LIMIT {}, {}", offset, limit),
            (None, Some(limit)) => write!(f, "LIMIT {}", limit),
            (Some(offset), None) => write!(f, "OFFSET {} ROWS", offset),
            (None, None) => Ok(()),
        }
    }
}

impl Display for FromClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FromClause::Unary(u) => write!(f, "{}", u.group),
            FromClause::Join(j) => {
                write!(f, "{} {} {}", j.left, j.join_type.sql_keyword(), j.right)?;
                if !j.criteria.is_empty() && j.join_type != JoinType::Cross {
                    f.write_str(" ON ")?;
                    write_list(f, &j.criteria, " AND ")?;
                }
                Ok(())
            }
            FromClause::Subquery(s) => {
                if s.lateral {
                    f.write_str("LATERAL ")?;
                }
                write!(f, "({}) AS {}", s.command, s.group.name)
            }
        }
    }
}

impl Display for FromList {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("FROM ")?;
        write_list(f, &self.clauses, ", ")
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        if self.select.distinct {
            f.write_str("DISTINCT ")?;
        }
        write_list(f, &self.select.symbols, ", ")?;
        if let Some(from) = &self.from {
            write!(f, " {}", from)?;
        }
        if let Some(criteria) = &self.criteria {
            write!(f, " WHERE {}", criteria)?;
        }
        if let Some(group_by) = &self.group_by {
            f.write_str(" GROUP BY ")?;
            write_list(f, &group_by.symbols, ", ")?;
        }
        if let Some(having) = &self.having {
            write!(f, " HAVING {}", having)?;
        }
        if let Some(order_by) = &self.order_by {
            write!(f, " {}", order_by)?;
        }
        if let Some(limit) = &self.limit {
            write!(f, " {}", limit)?;
        }
        Ok(())
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Command::Query(q) => write!(f, "{}", q),
            Command::SetQuery(sq) => {
                let op = match sq.op {
                    SetOp::Union => "UNION",
                    SetOp::Intersect => "INTERSECT",
                    SetOp::Except => "EXCEPT",
                };
                write!(f, "{} {} ", sq.left, op)?;
                if sq.all {
                    f.write_str("ALL ")?;
                }
                write!(f, "{}", sq.right)?;
                if let Some(order_by) = &sq.order_by {
                    write!(f, " {}", order_by)?;
                }
                if let Some(limit) = &sq.limit {
                    write!(f, " {}", limit)?;
                }
                Ok(())
            }
            Command::Insert(insert) => {
                write!(f, "INSERT INTO {}", insert.group)?;
                if !insert.variables.is_empty() {
                    f.write_str(" (")?;
                    let names: Vec<&str> =
                        insert.variables.iter().map(|v| v.short_name()).collect();
                    write_list(f, &names, ", ")?;
                    f.write_str(")")?;
                }
                match &insert.query_expression {
                    Some(query) => write!(f, " {}", query),
                    None => {
                        f.write_str(" VALUES (")?;
                        write_list(f, &insert.values, ", ")?;
                        f.write_str(")")
                    }
                }
            }
            Command::Update(update) => {
                write!(f, "UPDATE {} SET ", update.group)?;
                for (i, change) in update.changes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} = {}", change.symbol.short_name(), change.value)?;
                }
                if let Some(criteria) = &update.criteria {
                    write!(f, " WHERE {}", criteria)?;
                }
                Ok(())
            }
            Command::Delete(delete) => {
                write!(f, "DELETE FROM {}", delete.group)?;
                if let Some(criteria) = &delete.criteria {
                    write!(f, " WHERE {}", criteria)?;
                }
                Ok(())
            }
            Command::StoredProcedure(sp) => {
                write!(f, "EXEC {}(", sp.procedure_name)?;
                let inputs: Vec<&Expression> = sp
                    .parameters
                    .iter()
                    .filter(|p| matches!(p.parameter_type, ParameterType::In | ParameterType::InOut))
                    .filter_map(|p| p.expression.as_ref())
                    .collect();
                write_list(f, &inputs, ", ")?;
                f.write_str(")")
            }
            Command::CreateProcedure(cp) => write!(f, "CREATE VIRTUAL PROCEDURE {}", cp.block),
            Command::Dynamic(d) => {
                write!(f, "EXECUTE IMMEDIATE {}", d.sql)?;
                if !d.as_columns.is_empty() {
                    f.write_str(" AS ")?;
                    for (i, column) in d.as_columns.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{} {}", column.short_name(), column.data_type)?;
                    }
                }
                if let Some(group) = &d.into_group {
                    write!(f, " INTO {}", group)?;
                }
                if !d.using.is_empty() {
                    f.write_str(" USING ")?;
                    for (i, clause) in d.using.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{} = {}", clause.symbol.short_name(), clause.value)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(label) = &self.label {
            write!(f, "{} : ", label)?;
        }
        f.write_str("BEGIN")?;
        for statement in &self.statements {
            write!(f, " {}", statement)?;
        }
        if let Some(group) = &self.exception_group {
            write!(f, " EXCEPTION {}", group)?;
            for statement in &self.exception_statements {
                write!(f, " {}", statement)?;
            }
        }
        f.write_str(" END")
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Assignment(a) => {
                if let Some(data_type) = a.declared_type {
                    write!(f, "DECLARE {} {}", data_type, a.variable)?;
                } else {
                    write!(f, "{}", a.variable)?;
                }
                if let Some(value) = &a.value {
                    write!(f, " = {}", value)?;
                }
                f.write_str(";")
            }
            Statement::If(s) => {
                write!(f, "IF({}) {}", s.condition, s.if_block)?;
                if let Some(else_block) = &s.else_block {
                    write!(f, " ELSE {}", else_block)?;
                }
                Ok(())
            }
            Statement::Loop(s) => write!(f, "LOOP ON ({}) AS {} {}", s.command, s.cursor_name, s.block),
            Statement::While(s) => write!(f, "WHILE ({}) {}", s.condition, s.block),
            Statement::Raise(s) => {
                f.write_str("RAISE ")?;
                if s.warning {
                    f.write_str("SQLWARNING ")?;
                }
                write!(f, "{};", s.expression)
            }
            Statement::Branch(s) => {
                let keyword = match s.mode {
                    BranchMode::Break => "BREAK",
                    BranchMode::Continue => "CONTINUE",
                    BranchMode::Leave => "LEAVE",
                };
                f.write_str(keyword)?;
                if let Some(label) = &s.label {
                    write!(f, " {}", label)?;
                }
                f.write_str(";")
            }
            Statement::Command(s) => write!(f, "{};", s.command),
            Statement::Block(b) => write!(f, "{}", b),
        }
    }
}

impl Display for LanguageObject {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LanguageObject::Command(c) => write!(f, "{}", c),
            LanguageObject::Criteria(c) => write!(f, "{}", c),
            LanguageObject::Expression(e) => write!(f, "{}", e),
            LanguageObject::Statement(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::query::sql::command::{Command, FromList, Query, Select};
    use crate::query::sql::criteria::{CompareOp, Criteria};
    use crate::query::sql::expression::{
        AggregateSymbol, AliasSymbol, Constant, ElementSymbol, Expression, ExpressionSymbol,
        Function, GroupSymbol, Reference,
    };

    #[test]
    fn test_alias_over_infix_function() {
        let plus = Function::new(
            "+",
            vec![
                ElementSymbol::new("y").with_group(GroupSymbol::new("t")).into(),
                Constant::new(1).into(),
            ],
        );
        let symbol = Expression::from(AliasSymbol::new(
            "x",
            ExpressionSymbol::new("expr", plus.into()).into(),
        ));
        assert_eq!(symbol.to_string(), "(t.y + 1) AS x");
    }

    #[test]
    fn test_query_rendering() {
        let g = GroupSymbol::aliased("g", "pm1.g1");
        let e1 = ElementSymbol::new("e1").with_group(g.clone());
        let query = Query::new(
            Select::new(vec![
                e1.clone().into(),
                AggregateSymbol::count_star().into(),
            ]),
            Some(FromList::groups(vec![g])),
        )
        .with_criteria(Criteria::and(vec![
            Criteria::compare(e1.clone(), CompareOp::Eq, Constant::new("a")),
            Criteria::compare(e1, CompareOp::Gt, Reference::positional(0)),
        ]));
        assert_eq!(
            Command::Query(query).to_string(),
            "SELECT g.e1, COUNT(*) FROM pm1.g1 AS g WHERE g.e1 = 'a' AND g.e1 > ?"
        );
    }

    #[test]
    fn test_nested_compound_is_parenthesized() {
        let a = Criteria::compare(ElementSymbol::new("a"), CompareOp::Eq, Constant::new(1));
        let b = Criteria::compare(ElementSymbol::new("b"), CompareOp::Eq, Constant::new(2));
        let c = Criteria::and(vec![a.clone(), Criteria::or(vec![a, b])]);
        assert_eq!(c.to_string(), "a = 1 AND (a = 1 OR b = 2)");
    }
}
