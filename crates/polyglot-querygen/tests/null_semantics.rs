//! Null-Safety Property Tests
//!
//! A predicate is evaluated twice for random rows and parameter values: once
//! directly under source-language semantics (`null == null` is true, ordering
//! comparisons against NULL are unknown, Kleene AND/OR/NOT), and once in its
//! normalized form under SQL semantics, the way a database would evaluate the
//! generated WHERE clause. A row passes the filter iff the result is TRUE, so
//! the two must agree on that.

use polyglot_querygen::optimizer::{normalize_predicate, optimize_negation};
use polyglot_querygen::{generate, BinaryKind, DialectType, Expression, ParameterValues, Select, TableSource, Value};
use proptest::prelude::*;

#[derive(Clone, Debug)]
struct TestRow {
    a: Option<i64>,
    b: Option<i64>,
    c: i64,
    p: Option<i64>,
    q: Option<i64>,
}

impl TestRow {
    fn parameters(&self) -> ParameterValues {
        ParameterValues::new().with("p", self.p).with("q", self.q)
    }

    fn value(&self, expr: &Expression) -> Option<i64> {
        match expr {
            Expression::Column(column) => match column.name.as_str() {
                "a" => self.a,
                "b" => self.b,
                "c" => Some(self.c),
                other => panic!("unknown column {}", other),
            },
            Expression::Parameter(p) => match p.name.as_str() {
                "p" => self.p,
                "q" => self.q,
                other => panic!("unknown parameter {}", other),
            },
            Expression::Literal(Value::Integer(i)) => Some(*i),
            Expression::Literal(Value::Null) => None,
            Expression::NotNullable(op) => self.value(&op.this),
            Expression::Alias(alias) => self.value(&alias.this),
            other => panic!("unexpected value node {:?}", other),
        }
    }
}

fn kleene_and(l: Option<bool>, r: Option<bool>) -> Option<bool> {
    match (l, r) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

fn kleene_or(l: Option<bool>, r: Option<bool>) -> Option<bool> {
    match (l, r) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}

fn ordered(kind: BinaryKind, l: Option<i64>, r: Option<i64>) -> Option<bool> {
    let (l, r) = (l?, r?);
    Some(match kind {
        BinaryKind::Eq => l == r,
        BinaryKind::Neq => l != r,
        BinaryKind::Lt => l < r,
        BinaryKind::Lte => l <= r,
        BinaryKind::Gt => l > r,
        BinaryKind::Gte => l >= r,
        other => panic!("not a comparison: {:?}", other),
    })
}

/// Evaluation the query author expects.
fn eval_source(expr: &Expression, row: &TestRow) -> Option<bool> {
    match expr {
        Expression::Literal(Value::Boolean(b)) => Some(*b),
        Expression::Alias(alias) => eval_source(&alias.this, row),
        Expression::Not(op) => eval_source(&op.this, row).map(|b| !b),
        Expression::IsNull(is_null) => Some(row.value(&is_null.this).is_none() != is_null.not),
        Expression::In(in_expr) => {
            let x = row.value(&in_expr.this);
            let found = in_expr.expressions.iter().any(|e| row.value(e) == x);
            Some(found != in_expr.not)
        }
        other => match other.as_binary() {
            Some((BinaryKind::And, op)) => {
                kleene_and(eval_source(&op.left, row), eval_source(&op.right, row))
            }
            Some((BinaryKind::Or, op)) => {
                kleene_or(eval_source(&op.left, row), eval_source(&op.right, row))
            }
            Some((BinaryKind::Eq, op)) => Some(row.value(&op.left) == row.value(&op.right)),
            Some((BinaryKind::Neq, op)) => Some(row.value(&op.left) != row.value(&op.right)),
            Some((kind, op)) => ordered(kind, row.value(&op.left), row.value(&op.right)),
            None => panic!("unexpected predicate node {:?}", other),
        },
    }
}

/// Evaluation a SQL engine performs on the generated text. NULL literals and
/// NULL-bound parameters in an IN list are evaluated in the split form the
/// generator writes; a column entry that is NULL at run time stays in the list
/// and compares as UNKNOWN.
fn eval_sql(expr: &Expression, row: &TestRow) -> Option<bool> {
    match expr {
        Expression::Literal(Value::Boolean(b)) => Some(*b),
        Expression::Alias(alias) => eval_sql(&alias.this, row),
        Expression::Not(op) => eval_sql(&op.this, row).map(|b| !b),
        Expression::IsNull(is_null) => Some(row.value(&is_null.this).is_none() != is_null.not),
        Expression::In(in_expr) => {
            let x = row.value(&in_expr.this);
            let mut has_null = false;
            let mut listed = Vec::new();
            for entry in &in_expr.expressions {
                let value = row.value(entry);
                match entry {
                    Expression::Literal(_) | Expression::Parameter(_) if value.is_none() => {
                        has_null = true
                    }
                    _ => listed.push(value),
                }
            }
            // An empty list renders as `1 = 0`
            let member = listed.iter().fold(Some(false), |acc, v| {
                kleene_or(acc, ordered(BinaryKind::Eq, x, *v))
            });
            match (has_null, in_expr.not) {
                (false, false) => member,
                (false, true) => member.map(|b| !b),
                (true, false) => kleene_or(member, Some(x.is_none())),
                (true, true) => kleene_and(member.map(|b| !b), Some(x.is_some())),
            }
        }
        other => match other.as_binary() {
            Some((BinaryKind::And, op)) => kleene_and(eval_sql(&op.left, row), eval_sql(&op.right, row)),
            Some((BinaryKind::Or, op)) => kleene_or(eval_sql(&op.left, row), eval_sql(&op.right, row)),
            Some((kind, op)) => ordered(kind, row.value(&op.left), row.value(&op.right)),
            None => panic!("unexpected predicate node {:?}", other),
        },
    }
}

fn arb_column() -> impl Strategy<Value = Expression> {
    prop_oneof![
        Just(Expression::nullable_column("t", "a")),
        Just(Expression::nullable_column("t", "b")),
        Just(Expression::column("t", "c")),
    ]
}

fn arb_operand() -> impl Strategy<Value = Expression> {
    prop_oneof![
        Just(Expression::nullable_column("t", "b")),
        Just(Expression::column("t", "c")),
        Just(Expression::parameter("p")),
        Just(Expression::parameter("q")),
        Just(Expression::null()),
        (0i64..3).prop_map(|v| Expression::literal(v)),
    ]
}

fn arb_entries() -> impl Strategy<Value = Vec<Expression>> {
    prop::collection::vec(
        prop_oneof![
            (0i64..3).prop_map(|v| Expression::literal(v)),
            Just(Expression::null()),
            Just(Expression::parameter("p")),
            Just(Expression::nullable_column("t", "b")),
            Just(Expression::column("t", "c")),
        ],
        0..4,
    )
}

fn arb_comparison() -> impl Strategy<Value = BinaryKind> {
    prop_oneof![
        Just(BinaryKind::Eq),
        Just(BinaryKind::Neq),
        Just(BinaryKind::Lt),
        Just(BinaryKind::Lte),
        Just(BinaryKind::Gt),
        Just(BinaryKind::Gte),
    ]
}

fn arb_predicate() -> impl Strategy<Value = Expression> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(Expression::boolean),
        (arb_column(), arb_comparison(), arb_operand())
            .prop_map(|(left, kind, right)| Expression::binary(kind, left, right)),
        arb_column().prop_map(Expression::is_null),
        arb_column().prop_map(Expression::is_not_null),
        (arb_column(), arb_entries()).prop_map(|(x, entries)| Expression::in_list(x, entries)),
        (arb_column(), arb_entries()).prop_map(|(x, entries)| Expression::not_in_list(x, entries)),
    ];

    leaf.prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Expression::and(l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Expression::or(l, r)),
            inner.clone().prop_map(Expression::not),
            inner.prop_map(|p| Expression::alias(p, "m")),
        ]
    })
}

fn arb_row() -> impl Strategy<Value = TestRow> {
    let nullable = || prop::option::of(0i64..3);
    (nullable(), nullable(), 0i64..3, nullable(), nullable())
        .prop_map(|(a, b, c, p, q)| TestRow { a, b, c, p, q })
}

fn passes(result: Option<bool>) -> bool {
    result == Some(true)
}

proptest! {
    #[test]
    fn normalization_preserves_filter_result(predicate in arb_predicate(), row in arb_row()) {
        let normalized = normalize_predicate(predicate.clone(), &row.parameters())
            .expect("normalization should succeed");
        prop_assert_eq!(
            passes(eval_source(&predicate, &row)),
            passes(eval_sql(&normalized, &row)),
            "normalized: {:?}",
            normalized
        );
    }

    #[test]
    fn negation_optimization_is_idempotent(predicate in arb_predicate()) {
        let once = optimize_negation(predicate).unwrap();
        let twice = optimize_negation(once.clone()).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn in_list_with_null_splits_off_null_check(entries in prop::collection::vec(prop::option::of(0i64..5), 1..6)) {
        prop_assume!(entries.iter().any(Option::is_none));

        let select = Select {
            tables: vec![TableSource::table("Things", "t")],
            project_star: true,
            predicate: Some(Expression::in_list(
                Expression::nullable_column("t", "x"),
                entries.iter().map(|e| Expression::literal(*e)).collect(),
            )),
            ..Select::default()
        };
        let sql = generate(&select, &ParameterValues::new(), DialectType::Generic).unwrap().sql;

        let non_null: Vec<String> = entries.iter().flatten().map(|v| v.to_string()).collect();
        let expected = if non_null.is_empty() {
            "WHERE \"t\".\"x\" IS NULL".to_string()
        } else {
            format!(
                "WHERE (\"t\".\"x\" IN ({})) OR (\"t\".\"x\" IS NULL)",
                non_null.join(", ")
            )
        };
        prop_assert!(sql.ends_with(&expected), "{}", sql);
    }
}

#[test]
fn negated_nullable_equality_keeps_null_rows() {
    // NOT (a = 1): a NULL row passes in the source language
    let predicate = Expression::not(Expression::eq(
        Expression::nullable_column("t", "a"),
        Expression::literal(1),
    ));
    let row = TestRow {
        a: None,
        b: None,
        c: 0,
        p: None,
        q: None,
    };
    let normalized = normalize_predicate(predicate.clone(), &row.parameters()).unwrap();
    assert_eq!(eval_source(&predicate, &row), Some(true));
    assert_eq!(eval_sql(&normalized, &row), Some(true));
}

#[test]
fn not_in_nullable_column_entry_keeps_null_rows() {
    // c NOT IN (b) with b NULL: c differs from NULL in the source language
    let predicate = Expression::not_in_list(
        Expression::column("t", "c"),
        vec![Expression::nullable_column("t", "b")],
    );
    let row = TestRow {
        a: None,
        b: None,
        c: 1,
        p: None,
        q: None,
    };
    let normalized = normalize_predicate(predicate.clone(), &row.parameters()).unwrap();
    assert_eq!(eval_source(&predicate, &row), Some(true));
    assert_eq!(eval_sql(&normalized, &row), Some(true));
}

#[test]
fn negated_aliased_equality_keeps_null_rows() {
    let predicate = Expression::not(Expression::alias(
        Expression::eq(Expression::nullable_column("t", "a"), Expression::literal(1)),
        "m",
    ));
    let row = TestRow {
        a: None,
        b: Some(0),
        c: 0,
        p: None,
        q: None,
    };
    let normalized = normalize_predicate(predicate.clone(), &row.parameters()).unwrap();
    assert_eq!(eval_source(&predicate, &row), Some(true));
    assert_eq!(eval_sql(&normalized, &row), Some(true));
}

#[test]
fn both_nullable_equality_matches_null_rows() {
    let predicate = Expression::eq(
        Expression::nullable_column("t", "a"),
        Expression::nullable_column("t", "b"),
    );
    let row = TestRow {
        a: None,
        b: None,
        c: 0,
        p: None,
        q: None,
    };
    let normalized = normalize_predicate(predicate, &row.parameters()).unwrap();
    assert_eq!(eval_sql(&normalized, &row), Some(true));
}
