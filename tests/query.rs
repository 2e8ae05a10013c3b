use girder::{
    CompareOp, EntityDef, Error, FieldDef, Limit, Operand, QueryDef, RelationModel, Value,
};

fn relation(queries: Vec<QueryDef>) -> Result<RelationModel, Error> {
    let mut def = EntityDef::new("person", "id")
        .field(FieldDef::primitive("id", Value::Int64(None)))
        .field(FieldDef::primitive("firstName", Value::Varchar(None, 120)))
        .field(FieldDef::primitive("age", Value::Int32(None)))
        .field(FieldDef::primitive("active", Value::Boolean(None)))
        .field(
            FieldDef::nested(
                "address",
                vec![
                    FieldDef::primitive("city", Value::Varchar(None, 0)),
                    FieldDef::primitive("zip", Value::Varchar(None, 0)),
                ],
            )
            .column("addr"),
        );
    for query in queries {
        def = def.query(query);
    }
    RelationModel::build(&def)
}

#[test]
fn placeholders_bind_declared_parameters_in_order() {
    let relation = relation(vec![
        QueryDef::new("grown_ups", "WHERE age >= ? AND first_name != ?")
            .param("age", Value::Int32(None))
            .param("name", Value::Varchar(None, 0)),
    ])
    .unwrap();
    let query = relation.query("grown_ups").unwrap();
    // Parameter leaves in placeholder order: age then first_name.
    assert_eq!(query.params(), [2, 1]);
    assert_eq!(query.conditions().len(), 2);
    assert_eq!(query.conditions()[0].op(), CompareOp::Ge);
    assert_eq!(query.conditions()[1].op(), CompareOp::Ne);
    assert!(!query.has_limit());
}

#[test]
fn conditions_accept_dotted_paths_and_column_names() {
    let relation = relation(vec![
        QueryDef::new("by_city", "WHERE address.city = ? AND addr_zip = ?")
            .param("city", Value::Varchar(None, 0))
            .param("zip", Value::Varchar(None, 0)),
    ])
    .unwrap();
    let query = relation.query("by_city").unwrap();
    assert_eq!(query.params(), [4, 5]);
}

#[test]
fn literals_are_coerced_to_the_column_type() {
    let relation = relation(vec![QueryDef::new(
        "fixed",
        "WHERE age > 17 AND active = true AND first_name = 'O''Brien'",
    )])
    .unwrap();
    let query = relation.query("fixed").unwrap();
    assert!(query.params().is_empty());
    let values: Vec<&Operand> = query.conditions().iter().map(|c| c.rhs()).collect();
    assert!(matches!(values[0], Operand::Literal(Value::Int32(Some(17)))));
    assert!(matches!(
        values[1],
        Operand::Literal(Value::Boolean(Some(true)))
    ));
    match values[2] {
        Operand::Literal(Value::Varchar(Some(name), ..)) => assert_eq!(name, "O'Brien"),
        other => panic!("unexpected operand {:?}", other),
    }
}

#[test]
fn numeric_literals_cover_every_numeric_column_type() {
    let def = EntityDef::new("reading", "id")
        .field(FieldDef::primitive("id", Value::Int64(None)))
        .field(FieldDef::primitive("score", Value::Float64(None)))
        .field(FieldDef::primitive("ratio", Value::Float32(None)))
        .field(FieldDef::primitive("price", Value::Decimal(None, 10, 2)))
        .query(QueryDef::new(
            "cheap",
            "WHERE score > 0.5 AND ratio < 1.5 AND price <= 9.99 AND id != 0",
        ));
    let relation = RelationModel::build(&def).unwrap();
    let query = relation.query("cheap").unwrap();
    let literals: Vec<&Operand> = query.conditions().iter().map(|c| c.rhs()).collect();
    assert!(matches!(
        literals[0],
        Operand::Literal(Value::Float64(Some(v))) if *v == 0.5
    ));
    assert!(matches!(
        literals[1],
        Operand::Literal(Value::Float32(Some(v))) if *v == 1.5
    ));
    assert!(matches!(
        literals[2],
        Operand::Literal(Value::Decimal(Some(_), 10, 2))
    ));
    assert!(matches!(
        literals[3],
        Operand::Literal(Value::Int64(Some(0)))
    ));
}

#[test]
fn order_by_and_literal_limit() {
    let relation = relation(vec![QueryDef::new(
        "oldest",
        "ORDER BY age DESC, first_name LIMIT 5",
    )])
    .unwrap();
    let query = relation.query("oldest").unwrap();
    assert!(query.conditions().is_empty());
    assert_eq!(query.order_by().len(), 2);
    assert_eq!(query.limit(), Some(Limit::Literal(5)));
    assert_eq!(query.limit_value(&[]), Some(5));
}

#[test]
fn placeholder_limit_takes_the_trailing_argument() {
    let relation =
        relation(vec![QueryDef::new("page", "ORDER BY age LIMIT ?")]).unwrap();
    let query = relation.query("page").unwrap();
    assert!(query.params().is_empty());
    assert_eq!(query.limit(), Some(Limit::Placeholder));
    assert_eq!(query.limit_value(&[Value::Int64(Some(3))]), Some(3));
}

#[test]
fn placeholder_limit_may_consume_a_declared_integer_parameter() {
    let relation = relation(vec![
        QueryDef::new("page", "WHERE age >= ? LIMIT ?")
            .param("age", Value::Int32(None))
            .param("page_size", Value::Int32(None)),
    ])
    .unwrap();
    let query = relation.query("page").unwrap();
    assert_eq!(query.params(), [2]);
    assert_eq!(query.limit(), Some(Limit::Placeholder));
}

#[test]
fn empty_query_is_a_full_table_scan() {
    let relation = relation(vec![QueryDef::new("all", "")]).unwrap();
    let query = relation.query("all").unwrap();
    assert!(query.conditions().is_empty());
    assert!(query.order_by().is_empty());
    assert!(!query.has_limit());
    assert!(query.params().is_empty());
}

#[test]
fn unknown_field_fails_compilation() {
    let error = relation(vec![QueryDef::new("bad", "WHERE nope = 1")]).unwrap_err();
    assert!(matches!(error, Error::Schema { .. }), "{error}");
}

#[test]
fn parameter_type_mismatch_fails_compilation() {
    let error = relation(vec![
        QueryDef::new("bad", "WHERE age = ?").param("age", Value::Varchar(None, 0)),
    ])
    .unwrap_err();
    assert!(matches!(error, Error::Schema { .. }), "{error}");
}

#[test]
fn missing_declared_parameter_fails_compilation() {
    assert!(relation(vec![QueryDef::new("bad", "WHERE age = ?")]).is_err());
}

#[test]
fn surplus_declared_parameter_fails_compilation() {
    assert!(
        relation(vec![
            QueryDef::new("bad", "WHERE age = 1").param("age", Value::Int32(None))
        ])
        .is_err()
    );
}

#[test]
fn trailing_garbage_fails_compilation() {
    assert!(relation(vec![QueryDef::new("bad", "WHERE age = 1 GROUP BY age")]).is_err());
}

#[test]
fn non_integer_limit_parameter_fails_compilation() {
    assert!(
        relation(vec![
            QueryDef::new("bad", "LIMIT ?").param("n", Value::Varchar(None, 0))
        ])
        .is_err()
    );
}
