use sqlbridge::prelude::*;
use sqlbridge::{BoundValue, ColumnMeta, DatabaseKind, ResultShape, compile_count, dialect_for};
use std::sync::Arc;

fn opts() -> CompileOptions {
    CompileOptions::default()
}

#[test]
fn in_list_binds_values_in_order() {
    let query = Query::table("users")
        .column("id")
        .and(Expression::in_list("email", ["a@x.com", "b@x.com"]));
    let compiled = sqlbridge::dialect("mysql")
        .unwrap()
        .compile_select(&query, None, &opts())
        .unwrap();

    assert_eq!(compiled.sql, "SELECT id FROM users WHERE email IN (?,?)");
    assert_eq!(
        compiled.values(),
        vec![Value::from("a@x.com"), Value::from("b@x.com")]
    );
}

#[test]
fn compilation_is_deterministic() {
    let condition = Condition::new()
        .and(Expression::ge("age", 18))
        .or_nested(
            Condition::new()
                .and(Expression::like("name", "A%"))
                .and(Expression::is_not_null("email")),
        );
    let query = Query::table("users").filter(condition).desc("age");

    for kind in DatabaseKind::ALL {
        let d = dialect_for(kind);
        let first = d.compile_select(&query, Some(Page::new(20, 10)), &opts()).unwrap();
        let second = d.compile_select(&query, Some(Page::new(20, 10)), &opts()).unwrap();
        assert_eq!(first.sql, second.sql, "{}", d.name());
        assert_eq!(first.values(), second.values(), "{}", d.name());
    }
}

#[test]
fn null_comparison_contributes_nothing() {
    let query = Query::table("users")
        .and(Expression::eq("nickname", Value::Null))
        .and(Expression::gt("age", 30));
    for kind in DatabaseKind::ALL {
        let compiled = dialect_for(kind).compile_select(&query, None, &opts()).unwrap();
        assert!(!compiled.sql.contains("nickname"), "{}", compiled.sql);
        assert_eq!(compiled.values(), vec![Value::Int(30)]);
    }
}

#[test]
fn mysql_paging_parameters_come_last() {
    let query = Query::table("users").and(Expression::eq("status", "active"));
    let compiled = sqlbridge::dialect("mariadb")
        .unwrap()
        .compile_select(&query, Some(Page::new(10, 20)), &opts())
        .unwrap();

    assert!(compiled.sql.ends_with("LIMIT ? OFFSET ?"));
    assert_eq!(
        compiled.values(),
        vec![Value::from("active"), Value::BigInt(20), Value::BigInt(10)]
    );
}

#[test]
fn oracle_paging_injects_rownum() {
    let query = Query::table("users").column("id").column("name");
    let compiled = sqlbridge::dialect("oracle")
        .unwrap()
        .compile_select(&query, Some(Page::new(0, 5)), &opts())
        .unwrap();

    assert!(compiled.sql.contains("ROWNUM rn_"), "{}", compiled.sql);
    assert_eq!(compiled.values(), vec![Value::BigInt(5), Value::BigInt(0)]);
}

#[test]
fn count_drops_order_and_paging_column() {
    let query = Query::table("orders")
        .column("id")
        .and(Expression::gt("total", 100))
        .asc("created_at");

    for kind in DatabaseKind::ALL {
        let d = dialect_for(kind);
        let count = compile_count(d, &query, &opts()).unwrap();
        assert!(!count.sql.contains("ORDER BY"), "{}: {}", d.name(), count.sql);
        assert!(!count.sql.contains("rn_"), "{}: {}", d.name(), count.sql);
        assert_eq!(count.shape, ResultShape::Count);
        assert_eq!(count.values(), vec![Value::Int(100)]);
    }
}

#[test]
fn declared_decimal_scale_reaches_the_driver_value() {
    let accounts = Arc::new(
        TableMeta::builder("accounts")
            .column(ColumnMeta::integer("id").primary_key())
            .column(ColumnMeta::decimal("balance", 12, 2))
            .build()
            .unwrap(),
    );
    let query =
        Query::table(accounts).and(Expression::ge("balance", Value::Decimal("99.999".into())));
    let d = dialect_for(DatabaseKind::Postgres);
    let compiled = d.compile_select(&query, None, &opts()).unwrap();
    let bound = bind_all(&compiled, d, &opts()).unwrap();

    assert_eq!(
        bound,
        vec![BoundValue::Decimal(rust_decimal::Decimal::new(10000, 2))]
    );
}

#[test]
fn unknown_dialect_key_is_a_config_error() {
    let err = sqlbridge::dialect("access").unwrap_err();
    assert!(matches!(err, Error::Config(_)), "{err}");
}
