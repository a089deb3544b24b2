//! Error Handling Tests
//!
//! Every input-contract violation surfaces as a typed error; nothing is
//! silently skipped or rendered as a placeholder.

use polyglot_querygen::builder::*;
use polyglot_querygen::{
    generate, DialectType, Error, Expression, FromSql, JoinKind, ParameterValues, Select,
    TableSource, Value,
};

fn things() -> Select {
    Select {
        tables: vec![TableSource::table("Things", "t")],
        project_star: true,
        ..Select::default()
    }
}

fn try_generate(select: &Select, values: &ParameterValues) -> Result<String, Error> {
    generate(select, values, DialectType::Generic).map(|c| c.sql)
}

// ============================================================================
// Parameters
// ============================================================================

mod parameters {
    use super::*;

    #[test]
    fn test_missing_parameter_in_predicate() {
        let select = Select {
            predicate: Some(col("t", "Id").eq(param("id")).into_inner()),
            ..things()
        };
        assert_eq!(
            try_generate(&select, &ParameterValues::new()),
            Err(Error::MissingParameter("id".to_string()))
        );
    }

    #[test]
    fn test_empty_parameter_name() {
        let select = Select {
            predicate: Some(col("t", "Id").eq(param("")).into_inner()),
            ..things()
        };
        let values = ParameterValues::new().with("", 1);
        assert!(matches!(
            try_generate(&select, &values),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_missing_parameter_in_projection() {
        let select = Select {
            projection: vec![param("x").into_inner()],
            ..things()
        };
        assert!(matches!(
            try_generate(&select, &ParameterValues::new()),
            Err(Error::MissingParameter(name)) if name == "x"
        ));
    }

    #[test]
    fn test_missing_parameter_in_raw_sql() {
        let select = Select {
            tables: vec![TableSource::FromSql(Box::new(FromSql {
                sql: "SELECT * FROM T WHERE A = {0}".to_string(),
                arguments: vec![Expression::parameter("a")],
                alias: "r".to_string(),
            }))],
            ..Select::default()
        };
        assert_eq!(
            try_generate(&select, &ParameterValues::new()),
            Err(Error::MissingParameter("a".to_string()))
        );
    }

    #[test]
    fn test_list_parameter_outside_in_list() {
        let select = Select {
            predicate: Some(col("t", "Id").eq(param("ids")).into_inner()),
            ..things()
        };
        let values = ParameterValues::new().with("ids", vec![1i64, 2].into_iter().collect::<Value>());
        assert!(matches!(
            try_generate(&select, &values),
            Err(Error::Unsupported { .. })
        ));
    }

    #[test]
    fn test_nested_list_in_in_list() {
        let nested = Value::List(vec![Value::List(vec![Value::Integer(1)])]);
        let select = Select {
            predicate: Some(col("t", "Id").in_list([lit(nested)]).into_inner()),
            ..things()
        };
        assert!(matches!(
            try_generate(&select, &ParameterValues::new()),
            Err(Error::Unsupported { .. })
        ));
    }
}

// ============================================================================
// Identifiers and structure
// ============================================================================

mod structure {
    use super::*;

    #[test]
    fn test_empty_table_name() {
        let select = Select {
            tables: vec![TableSource::table("", "t")],
            ..Select::default()
        };
        assert!(matches!(
            try_generate(&select, &ParameterValues::new()),
            Err(Error::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_empty_column_name() {
        let select = Select {
            projection: vec![Expression::column("t", "")],
            ..things()
        };
        assert!(matches!(
            try_generate(&select, &ParameterValues::new()),
            Err(Error::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_join_as_first_source() {
        let select = Select {
            tables: vec![TableSource::join(
                JoinKind::Cross,
                TableSource::table("Things", "t"),
                None,
            )],
            ..Select::default()
        };
        assert!(matches!(
            try_generate(&select, &ParameterValues::new()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_inner_join_without_condition() {
        let mut select = things();
        select.tables.push(TableSource::join(
            JoinKind::Inner,
            TableSource::table("Others", "o"),
            None,
        ));
        assert!(matches!(
            try_generate(&select, &ParameterValues::new()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_derived_table_without_alias() {
        let select = Select {
            tables: vec![TableSource::Subquery(Box::new(things()))],
            ..Select::default()
        };
        assert!(matches!(
            try_generate(&select, &ParameterValues::new()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_tuple_arity_mismatch() {
        let select = Select {
            predicate: Some(
                tuple([col("t", "a"), col("t", "b")])
                    .eq(tuple([lit(1)]))
                    .into_inner(),
            ),
            ..things()
        };
        assert!(matches!(
            try_generate(&select, &ParameterValues::new()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_tuple_compared_with_scalar() {
        let select = Select {
            predicate: Some(tuple([col("t", "a")]).eq(lit(1)).into_inner()),
            ..things()
        };
        let err = try_generate(&select, &ParameterValues::new()).unwrap_err();
        assert!(err.to_string().contains("tuple"), "{}", err);
    }

    #[test]
    fn test_non_finite_float() {
        let select = Select {
            projection: vec![Expression::literal(f64::NAN)],
            ..things()
        };
        assert!(matches!(
            try_generate(&select, &ParameterValues::new()),
            Err(Error::Unsupported { .. })
        ));
    }
}

// ============================================================================
// Paging
// ============================================================================

#[test]
fn test_offset_without_ordering() {
    let select = Select {
        offset: Some(Expression::literal(10)),
        ..things()
    };
    let err = try_generate(&select, &ParameterValues::new()).unwrap_err();
    assert_eq!(err, Error::OffsetWithoutOrdering);
    assert_eq!(
        err.to_string(),
        "OFFSET is not supported without an ORDER BY clause"
    );
}

#[test]
fn test_unknown_dialect_name() {
    let err = "oracle".parse::<DialectType>().unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}
