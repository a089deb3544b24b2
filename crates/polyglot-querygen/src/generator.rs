//! SQL Generator
//!
//! Renders a [`Select`] tree into SQL text and collects the command parameters
//! the text references. Predicates are normalized with
//! [`normalize_predicate`] right before they are written, so the emitted SQL
//! keeps null-aware comparison semantics.
//!
//! A [`Generator`] is single-use: [`Generator::generate`] consumes it, and the
//! normalization it performs is only valid for the parameter values it was
//! created with.

use crate::dialects::DialectType;
use crate::error::{Error, Result};
use crate::expressions::{
    BinaryKind, Case, Exists, Expression, FromSql, In, IsNull, JoinKind, Ordering, Select,
    TableRef, TableSource,
};
use crate::helper::{delimit_identifier, format_literal, next_free_name};
use crate::optimizer::normalize_predicate;
use crate::parameters::{Command, CommandParameter, ParameterValues};
use crate::value::Value;
use std::collections::HashSet;
use tracing::debug;

/// Identifier quote characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierQuoteStyle {
    pub start: char,
    pub end: char,
}

impl IdentifierQuoteStyle {
    /// `"name"`
    pub const DOUBLE_QUOTE: Self = Self {
        start: '"',
        end: '"',
    };
    /// `[name]`
    pub const BRACKET: Self = Self {
        start: '[',
        end: ']',
    };
    /// `` `name` ``
    pub const BACKTICK: Self = Self {
        start: '`',
        end: '`',
    };
}

impl Default for IdentifierQuoteStyle {
    fn default() -> Self {
        Self::DOUBLE_QUOTE
    }
}

/// How row limits and offsets are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimitFetchStyle {
    /// `SELECT TOP(n)` for a bare limit, `OFFSET n ROWS FETCH NEXT m ROWS ONLY`
    /// when an offset is present. An offset requires ORDER BY.
    #[default]
    Top,
    /// Trailing `LIMIT n OFFSET m`
    Limit,
}

/// How byte-sequence literals are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinaryLiteralStyle {
    /// `0x01AB`
    #[default]
    Prefixed,
    /// `X'01AB'`
    Quoted,
    /// `'\x01AB'::bytea`
    Bytea,
}

/// Dialect-specific fragments used by the generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Quote characters for identifiers
    pub identifier_quote_style: IdentifierQuoteStyle,
    /// Prefix of parameter placeholders, e.g. `@` in `@p0`
    pub parameter_prefix: &'static str,
    /// String concatenation operator
    pub concat_operator: &'static str,
    /// Boolean literals compared against in predicate position
    pub true_literal: &'static str,
    pub false_literal: &'static str,
    /// Boolean results of a CASE that turns a condition into a value
    pub typed_true_literal: &'static str,
    pub typed_false_literal: &'static str,
    /// Prefix of string literals, e.g. `N` for `N'text'`
    pub string_literal_prefix: &'static str,
    pub binary_literal_style: BinaryLiteralStyle,
    pub limit_fetch_style: LimitFetchStyle,
    /// With [`LimitFetchStyle::Limit`], the LIMIT value written when only an
    /// offset is given. `None` writes the OFFSET alone.
    pub limit_all_literal: Option<&'static str>,
    /// One indentation step for nested queries
    pub indent: &'static str,
    /// chrono format of date-time literals
    pub datetime_format: &'static str,
    /// chrono format of date-time literals with an offset
    pub datetime_offset_format: &'static str,
    /// Dialect this config was built for
    pub dialect: Option<DialectType>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            identifier_quote_style: IdentifierQuoteStyle::DOUBLE_QUOTE,
            parameter_prefix: "@",
            concat_operator: "+",
            true_literal: "1",
            false_literal: "0",
            typed_true_literal: "CAST(1 AS BIT)",
            typed_false_literal: "CAST(0 AS BIT)",
            string_literal_prefix: "",
            binary_literal_style: BinaryLiteralStyle::Prefixed,
            limit_fetch_style: LimitFetchStyle::Top,
            limit_all_literal: None,
            indent: "    ",
            datetime_format: "%Y-%m-%dT%H:%M:%S%.3f",
            datetime_offset_format: "%Y-%m-%dT%H:%M:%S%.3f%:z",
            dialect: None,
        }
    }
}

/// Placeholder prefix of substituted raw-SQL arguments
const FRESH_PARAMETER_PREFIX: &str = "p";

/// SQL generator for one [`Select`] and one set of parameter values.
pub struct Generator<'a> {
    config: GeneratorConfig,
    values: &'a ParameterValues,
    output: String,
    indent_level: usize,
    parameters: Vec<CommandParameter>,
    seen_parameters: HashSet<String>,
    fresh_counter: usize,
}

impl<'a> Generator<'a> {
    pub fn new(config: GeneratorConfig, values: &'a ParameterValues) -> Self {
        Self {
            config,
            values,
            output: String::new(),
            indent_level: 0,
            parameters: Vec::new(),
            seen_parameters: HashSet::new(),
            fresh_counter: 0,
        }
    }

    /// Render `select` into a command.
    ///
    /// On error no partial output is returned.
    pub fn generate(mut self, select: &Select) -> Result<Command> {
        self.generate_select(select)?;
        debug!(
            dialect = ?self.config.dialect,
            parameters = self.parameters.len(),
            sql_len = self.output.len(),
            "generated SQL command"
        );
        Ok(Command {
            sql: self.output,
            parameters: self.parameters,
        })
    }

    // ===== output buffer =====

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn write_keyword(&mut self, keyword: &str) {
        self.output.push_str(keyword);
    }

    fn write_space(&mut self) {
        self.output.push(' ');
    }

    /// Line break followed by the current indentation.
    fn write_newline(&mut self) {
        self.output.push('\n');
        for _ in 0..self.indent_level {
            self.output.push_str(self.config.indent);
        }
    }

    /// Run `f` one indentation level deeper. The level is restored on error too.
    fn indented<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.indent_level += 1;
        let result = f(self);
        self.indent_level -= 1;
        result
    }

    fn write_identifier(&mut self, name: &str) -> Result<()> {
        let delimited = delimit_identifier(name, self.config.identifier_quote_style)?;
        self.write(&delimited);
        Ok(())
    }

    // ===== SELECT =====

    fn generate_select(&mut self, select: &Select) -> Result<()> {
        match &select.alias {
            Some(alias) => {
                self.write("(");
                self.indented(|g| {
                    g.write_newline();
                    g.generate_select_body(select)
                })?;
                self.write_newline();
                self.write(") ");
                self.write_keyword("AS");
                self.write_space();
                self.write_identifier(alias)
            }
            None => self.generate_select_body(select),
        }
    }

    fn generate_select_body(&mut self, select: &Select) -> Result<()> {
        self.write_keyword("SELECT");
        if select.distinct {
            self.write_space();
            self.write_keyword("DISTINCT");
        }

        let top_style = self.config.limit_fetch_style == LimitFetchStyle::Top;
        if top_style && select.offset.is_some() && select.order_by.is_empty() {
            return Err(Error::OffsetWithoutOrdering);
        }
        if top_style && select.offset.is_none() {
            if let Some(limit) = &select.limit {
                self.write_space();
                self.write_keyword("TOP");
                self.write("(");
                self.generate_value(limit)?;
                self.write(")");
            }
        }

        self.write_space();
        self.generate_projection(select)?;

        if !select.tables.is_empty() {
            self.write_newline();
            self.write_keyword("FROM");
            self.write_space();
            for (i, source) in select.tables.iter().enumerate() {
                match source {
                    TableSource::Join(_) if i == 0 => {
                        return Err(Error::invalid_input(
                            "a join cannot be the first table source",
                        ));
                    }
                    TableSource::Join(_) => self.write_newline(),
                    _ if i > 0 => self.write(", "),
                    _ => {}
                }
                self.generate_table_source(source)?;
            }
        }

        if let Some(predicate) = &select.predicate {
            self.write_newline();
            self.write_keyword("WHERE");
            self.write_space();
            self.generate_predicate(predicate)?;
        }

        if !select.order_by.is_empty() {
            self.write_newline();
            self.write_keyword("ORDER BY");
            self.write_space();
            for (i, ordering) in select.order_by.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.generate_ordering(ordering)?;
            }
        }

        self.generate_paging(select)
    }

    fn generate_projection(&mut self, select: &Select) -> Result<()> {
        if !select.projection.is_empty() {
            for (i, term) in select.projection.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                match term {
                    Expression::Alias(alias) => {
                        self.generate_value(&alias.this)?;
                        if let Some(name) = &alias.alias {
                            self.write_space();
                            self.write_keyword("AS");
                            self.write_space();
                            self.write_identifier(name)?;
                        }
                    }
                    other => self.generate_value(other)?,
                }
            }
            return Ok(());
        }
        if let Some(expr) = &select.projection_expression {
            return self.generate_value(expr);
        }
        if select.project_star && select.tables.len() == 1 {
            let alias = select.tables[0].alias().ok_or_else(|| {
                Error::invalid_input("projected table source has no alias")
            })?;
            self.write_identifier(alias)?;
            self.write(".*");
            return Ok(());
        }
        self.write("1");
        Ok(())
    }

    fn generate_ordering(&mut self, ordering: &Ordering) -> Result<()> {
        match &ordering.this {
            Expression::Alias(alias) => match &alias.alias {
                Some(name) => self.write_identifier(name)?,
                None => self.generate_value(&alias.this)?,
            },
            other => self.generate_value(other)?,
        }
        if ordering.desc {
            self.write_space();
            self.write_keyword("DESC");
        }
        Ok(())
    }

    fn generate_paging(&mut self, select: &Select) -> Result<()> {
        match self.config.limit_fetch_style {
            LimitFetchStyle::Top => {
                if let Some(offset) = &select.offset {
                    self.write_newline();
                    self.write_keyword("OFFSET");
                    self.write_space();
                    self.generate_value(offset)?;
                    self.write_space();
                    self.write_keyword("ROWS");
                    if let Some(limit) = &select.limit {
                        self.write_space();
                        self.write_keyword("FETCH NEXT");
                        self.write_space();
                        self.generate_value(limit)?;
                        self.write_space();
                        self.write_keyword("ROWS ONLY");
                    }
                }
            }
            LimitFetchStyle::Limit => {
                let limit_all = self.config.limit_all_literal;
                match (&select.limit, &select.offset, limit_all) {
                    (Some(limit), _, _) => {
                        self.write_newline();
                        self.write_keyword("LIMIT");
                        self.write_space();
                        self.generate_value(limit)?;
                    }
                    (None, Some(_), Some(all)) => {
                        self.write_newline();
                        self.write_keyword("LIMIT");
                        self.write_space();
                        self.write(all);
                    }
                    _ => {}
                }
                if let Some(offset) = &select.offset {
                    if select.limit.is_some() || limit_all.is_some() {
                        self.write_space();
                    } else {
                        self.write_newline();
                    }
                    self.write_keyword("OFFSET");
                    self.write_space();
                    self.generate_value(offset)?;
                }
            }
        }
        Ok(())
    }

    // ===== table sources =====

    fn generate_table_source(&mut self, source: &TableSource) -> Result<()> {
        match source {
            TableSource::Table(table) => self.generate_table(table),
            TableSource::Subquery(select) => {
                if select.alias.is_none() {
                    return Err(Error::invalid_input("derived table has no alias"));
                }
                self.generate_select(select)
            }
            TableSource::FromSql(from_sql) => self.generate_from_sql(from_sql),
            TableSource::Join(join) => {
                let keyword = match join.kind {
                    JoinKind::Cross => "CROSS JOIN",
                    JoinKind::Inner => "INNER JOIN",
                    JoinKind::Left => "LEFT JOIN",
                };
                self.write_keyword(keyword);
                self.write_space();
                self.generate_table_source(&join.this)?;
                match (join.kind, &join.on) {
                    (JoinKind::Cross, None) => Ok(()),
                    (JoinKind::Cross, Some(_)) => Err(Error::invalid_input(
                        "a cross join cannot have a join condition",
                    )),
                    (_, Some(on)) => {
                        self.write_space();
                        self.write_keyword("ON");
                        self.write_space();
                        self.generate_predicate(on)
                    }
                    (_, None) => Err(Error::invalid_input(format!(
                        "{} requires a join condition",
                        keyword
                    ))),
                }
            }
        }
    }

    fn generate_table(&mut self, table: &TableRef) -> Result<()> {
        if let Some(schema) = &table.schema {
            self.write_identifier(schema)?;
            self.write(".");
        }
        self.write_identifier(&table.name)?;
        self.write_space();
        self.write_keyword("AS");
        self.write_space();
        self.write_identifier(&table.alias)
    }

    /// `(<sql with {i} placeholders substituted>) AS "alias"`.
    fn generate_from_sql(&mut self, from_sql: &FromSql) -> Result<()> {
        self.write("(");
        let mut rest = from_sql.sql.as_str();
        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            let placeholder = after
                .find('}')
                .map(|close| &after[..close])
                .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()));
            match placeholder {
                Some(digits) => {
                    self.write(&rest[..open]);
                    let index: usize = digits.parse().map_err(|_| {
                        Error::invalid_input(format!("invalid placeholder {{{}}}", digits))
                    })?;
                    self.generate_sql_argument(from_sql, index)?;
                    rest = &after[digits.len() + 1..];
                }
                None => {
                    self.write(&rest[..=open]);
                    rest = after;
                }
            }
        }
        self.write(rest);
        self.write(") ");
        self.write_keyword("AS");
        self.write_space();
        self.write_identifier(&from_sql.alias)
    }

    /// Bind argument `index` of a raw SQL table to a fresh parameter name.
    fn generate_sql_argument(&mut self, from_sql: &FromSql, index: usize) -> Result<()> {
        let argument = from_sql.arguments.get(index).ok_or_else(|| {
            Error::invalid_input(format!(
                "placeholder {{{}}} has no argument ({} supplied)",
                index,
                from_sql.arguments.len()
            ))
        })?;
        let value = match argument {
            Expression::Parameter(p) => self.values.require(&p.name)?.clone(),
            Expression::Literal(value) => value.clone(),
            other => {
                return Err(Error::unsupported(
                    other.kind_name(),
                    "as a raw SQL argument",
                ))
            }
        };
        let values = self.values;
        let seen = &self.seen_parameters;
        let name = next_free_name(FRESH_PARAMETER_PREFIX, &mut self.fresh_counter, |n| {
            values.contains(n) || seen.contains(n)
        });
        self.seen_parameters.insert(name.clone());
        self.write(self.config.parameter_prefix);
        self.write(&name);
        self.parameters.push(CommandParameter { name, value });
        Ok(())
    }

    // ===== predicates =====

    /// Normalize and render a filter condition.
    fn generate_predicate(&mut self, predicate: &Expression) -> Result<()> {
        let normalized = normalize_predicate(predicate.clone(), self.values)?;
        self.generate_condition(&normalized)
    }

    /// Render an already normalized expression in a position that expects a
    /// truth value.
    fn generate_condition(&mut self, expr: &Expression) -> Result<()> {
        match expr {
            Expression::Literal(Value::Boolean(b)) => {
                self.write(if *b { "1 = 1" } else { "1 = 0" });
                Ok(())
            }
            Expression::Alias(alias) => self.generate_condition(&alias.this),
            Expression::NotNullable(op) => self.generate_condition(&op.this),
            Expression::Not(op) => {
                self.write_keyword("NOT");
                self.write(" (");
                self.generate_condition(&op.this)?;
                self.write(")");
                Ok(())
            }
            Expression::In(in_expr) => self.generate_in(in_expr),
            Expression::IsNull(is_null) => self.generate_is_null(is_null),
            Expression::Like(like) => {
                self.generate_infix(&like.left, "LIKE", &like.right)
            }
            Expression::Exists(exists) => self.generate_exists(exists),
            other => match other.as_binary() {
                Some((kind, op)) if kind.is_logical() => {
                    self.write("(");
                    self.generate_condition(&op.left)?;
                    self.write(") ");
                    self.write_keyword(if kind == BinaryKind::And { "AND" } else { "OR" });
                    self.write(" (");
                    self.generate_condition(&op.right)?;
                    self.write(")");
                    Ok(())
                }
                Some((kind, op)) if kind.is_comparison() => {
                    let operator = kind.operator().unwrap_or("=");
                    self.generate_infix(&op.left, operator, &op.right)
                }
                // A truth-valued column, parameter, CASE, ... used as a condition
                _ => {
                    self.generate_value(other)?;
                    self.write(" = ");
                    self.write(self.config.true_literal);
                    Ok(())
                }
            },
        }
    }

    fn generate_is_null(&mut self, is_null: &IsNull) -> Result<()> {
        self.generate_value(&is_null.this)?;
        self.write_space();
        self.write_keyword(if is_null.not { "IS NOT NULL" } else { "IS NULL" });
        Ok(())
    }

    /// IN / NOT IN. List-valued entries are expanded and NULL entries are
    /// split off into an IS NULL test.
    fn generate_in(&mut self, in_expr: &In) -> Result<()> {
        let (entries, has_null) = self.resolve_in_entries(&in_expr.expressions)?;

        if has_null {
            let operand = in_expr.this.clone();
            let rewritten = match (entries.is_empty(), in_expr.not) {
                (true, false) => Expression::is_null(operand),
                (true, true) => Expression::is_not_null(operand),
                (false, false) => Expression::or(
                    Expression::in_list(operand.clone(), entries),
                    Expression::is_null(operand),
                ),
                (false, true) => Expression::and(
                    Expression::not(Expression::in_list(operand.clone(), entries)),
                    Expression::not(Expression::is_null(operand)),
                ),
            };
            return self.generate_condition(&rewritten);
        }

        if entries.is_empty() {
            self.write(if in_expr.not { "1 = 1" } else { "1 = 0" });
            return Ok(());
        }

        self.generate_value(&in_expr.this)?;
        self.write_space();
        self.write_keyword(if in_expr.not { "NOT IN" } else { "IN" });
        self.write(" (");
        for (i, entry) in entries.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.generate_value(entry)?;
        }
        self.write(")");
        Ok(())
    }

    /// Flatten IN entries: list literals and list-bound parameters become one
    /// literal per element, NULLs are dropped and reported.
    fn resolve_in_entries(&self, expressions: &[Expression]) -> Result<(Vec<Expression>, bool)> {
        let mut entries = Vec::with_capacity(expressions.len());
        let mut has_null = false;
        let mut push_value = |value: &Value, entries: &mut Vec<Expression>| -> Result<()> {
            match value {
                Value::Null => has_null = true,
                Value::List(_) => {
                    return Err(Error::unsupported("nested list value", "inside an IN list"))
                }
                other => entries.push(Expression::Literal(other.clone())),
            }
            Ok(())
        };
        for expr in expressions {
            match expr {
                Expression::Literal(Value::List(items)) => {
                    for item in items {
                        push_value(item, &mut entries)?;
                    }
                }
                Expression::Literal(value) => push_value(value, &mut entries)?,
                Expression::Parameter(p) => match self.values.require(&p.name)? {
                    Value::List(items) => {
                        for item in items {
                            push_value(item, &mut entries)?;
                        }
                    }
                    Value::Null => push_value(&Value::Null, &mut entries)?,
                    _ => entries.push(expr.clone()),
                },
                other => entries.push(other.clone()),
            }
        }
        Ok((entries, has_null))
    }

    fn generate_exists(&mut self, exists: &Exists) -> Result<()> {
        self.write_keyword("EXISTS");
        self.write(" (");
        self.indented(|g| {
            g.write_newline();
            g.generate_select_body(&exists.query)
        })?;
        self.write_newline();
        self.write(")");
        Ok(())
    }

    // ===== values =====

    /// Render an expression in a position that expects a scalar value.
    fn generate_value(&mut self, expr: &Expression) -> Result<()> {
        match expr {
            Expression::Literal(value) => {
                let sql = format_literal(value, &self.config)?;
                self.write(&sql);
                Ok(())
            }
            Expression::Column(column) => {
                if let Some(table) = &column.table {
                    self.write_identifier(table)?;
                    self.write(".");
                }
                self.write_identifier(&column.name)
            }
            Expression::Parameter(p) => self.generate_parameter(&p.name),
            Expression::Alias(alias) => self.generate_value(&alias.this),
            Expression::NotNullable(op) => self.generate_value(&op.this),
            Expression::Neg(op) => {
                self.write("-");
                if op.this.is_simple() {
                    self.generate_value(&op.this)
                } else {
                    self.write("(");
                    self.generate_value(&op.this)?;
                    self.write(")");
                    Ok(())
                }
            }
            Expression::Case(case) => self.generate_case(case),
            Expression::Count(count) => {
                self.write_keyword("COUNT");
                self.write("(");
                match &count.this {
                    Some(this) => self.generate_value(this)?,
                    None => self.write("*"),
                }
                self.write(")");
                Ok(())
            }
            Expression::Sum(agg) => self.generate_function("SUM", &agg.this),
            Expression::Min(agg) => self.generate_function("MIN", &agg.this),
            Expression::Max(agg) => self.generate_function("MAX", &agg.this),
            Expression::Subquery(select) => {
                self.write("(");
                self.indented(|g| {
                    g.write_newline();
                    g.generate_select_body(select)
                })?;
                self.write_newline();
                self.write(")");
                Ok(())
            }
            Expression::Tuple(_) => Err(Error::unsupported("tuple", "outside an equality")),
            other if other.is_search_condition() => self.generate_condition_as_value(other),
            other => match other.as_binary() {
                Some((BinaryKind::Coalesce, op)) => {
                    self.write_keyword("COALESCE");
                    self.write("(");
                    self.generate_value(&op.left)?;
                    self.write(", ");
                    self.generate_value(&op.right)?;
                    self.write(")");
                    Ok(())
                }
                Some((BinaryKind::Concat, op)) => {
                    let operator = self.config.concat_operator;
                    self.generate_infix(&op.left, operator, &op.right)
                }
                Some((kind, op)) => match kind.operator() {
                    Some(operator) => self.generate_infix(&op.left, operator, &op.right),
                    None => Err(Error::unsupported(other.kind_name(), "as a value")),
                },
                None => Err(Error::unsupported(other.kind_name(), "as a value")),
            },
        }
    }

    /// `<left> <op> <right>`, parenthesizing both operands unless both are
    /// simple.
    fn generate_infix(&mut self, left: &Expression, operator: &str, right: &Expression) -> Result<()> {
        let parens = !left.is_simple() || !right.is_simple();
        self.generate_operand(left, parens)?;
        self.write_space();
        self.write(operator);
        self.write_space();
        self.generate_operand(right, parens)
    }

    fn generate_operand(&mut self, expr: &Expression, parens: bool) -> Result<()> {
        if parens {
            self.write("(");
            self.generate_value(expr)?;
            self.write(")");
            Ok(())
        } else {
            self.generate_value(expr)
        }
    }

    fn generate_function(&mut self, name: &str, arg: &Expression) -> Result<()> {
        self.write_keyword(name);
        self.write("(");
        self.generate_value(arg)?;
        self.write(")");
        Ok(())
    }

    /// A condition used as a value:
    /// `CASE WHEN <condition> THEN <typed true> ELSE <typed false> END`.
    fn generate_condition_as_value(&mut self, condition: &Expression) -> Result<()> {
        self.write_keyword("CASE");
        self.indented(|g| {
            g.write_newline();
            g.write_keyword("WHEN");
            g.write_space();
            g.generate_predicate(condition)?;
            g.write_space();
            g.write_keyword("THEN");
            g.write_space();
            g.write(g.config.typed_true_literal);
            g.write_space();
            g.write_keyword("ELSE");
            g.write_space();
            g.write(g.config.typed_false_literal);
            Ok(())
        })?;
        self.write_newline();
        self.write_keyword("END");
        Ok(())
    }

    fn generate_case(&mut self, case: &Case) -> Result<()> {
        self.write_keyword("CASE");
        if let Some(operand) = &case.operand {
            self.write_space();
            self.generate_value(operand)?;
        }
        self.indented(|g| {
            for (condition, result) in &case.whens {
                g.write_newline();
                g.write_keyword("WHEN");
                g.write_space();
                if case.operand.is_some() {
                    g.generate_value(condition)?;
                } else {
                    g.generate_predicate(condition)?;
                }
                g.write_space();
                g.write_keyword("THEN");
                g.write_space();
                g.generate_value(result)?;
            }
            if let Some(else_) = &case.else_ {
                g.write_newline();
                g.write_keyword("ELSE");
                g.write_space();
                g.generate_value(else_)?;
            }
            Ok(())
        })?;
        self.write_newline();
        self.write_keyword("END");
        Ok(())
    }

    /// `<prefix><name>`; the first reference records the bound value.
    fn generate_parameter(&mut self, name: &str) -> Result<()> {
        let value = self.values.require(name)?;
        if value.is_list() {
            return Err(Error::unsupported(
                format!("list-valued parameter '{}'", name),
                "outside an IN list",
            ));
        }
        if self.seen_parameters.insert(name.to_string()) {
            self.parameters.push(CommandParameter {
                name: name.to_string(),
                value: value.clone(),
            });
        }
        self.write(self.config.parameter_prefix);
        self.write(name);
        Ok(())
    }
}
