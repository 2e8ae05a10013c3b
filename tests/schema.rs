use girder::{EntityDef, Error, FieldDef, RelationModel, Value};

fn build(def: &EntityDef) -> RelationModel {
    RelationModel::build(def).unwrap()
}

fn column_names(relation: &RelationModel) -> Vec<&str> {
    relation.leaves().iter().map(|c| c.column_name()).collect()
}

#[test]
fn leaf_names_derive_from_field_names() {
    let def = EntityDef::new("person", "id")
        .field(FieldDef::primitive("id", Value::Int64(None)))
        .field(FieldDef::primitive("firstName", Value::Varchar(None, 0)))
        .field(FieldDef::primitive("zipCode2", Value::Varchar(None, 0)));
    let relation = build(&def);
    assert_eq!(column_names(&relation), ["id", "first_name", "zip_code2"]);
}

#[test]
fn explicit_column_name_wins_over_derivation() {
    let def = EntityDef::new("person", "id")
        .field(FieldDef::primitive("id", Value::Int64(None)))
        .field(FieldDef::primitive("firstName", Value::Varchar(None, 0)).column("given_name"));
    let relation = build(&def);
    assert_eq!(column_names(&relation), ["id", "given_name"]);
}

#[test]
fn single_nested_child_inherits_the_parent_name() {
    let def = EntityDef::new("account", "id")
        .field(FieldDef::primitive("id", Value::Int64(None)))
        .field(
            FieldDef::nested(
                "balance",
                vec![FieldDef::primitive("amount", Value::Decimal(None, 18, 2))],
            )
            .column("balance"),
        );
    let relation = build(&def);
    assert_eq!(column_names(&relation), ["id", "balance"]);
}

#[test]
fn single_nested_child_keeps_its_name_when_the_parent_has_none() {
    let def = EntityDef::new("account", "id")
        .field(FieldDef::primitive("id", Value::Int64(None)))
        .field(FieldDef::nested(
            "balance",
            vec![FieldDef::primitive("amount", Value::Decimal(None, 18, 2))],
        ));
    let relation = build(&def);
    assert_eq!(column_names(&relation), ["id", "amount"]);
}

#[test]
fn multiple_nested_children_get_the_parent_prefix() {
    let def = EntityDef::new("person", "id")
        .field(FieldDef::primitive("id", Value::Int64(None)))
        .field(
            FieldDef::nested(
                "address",
                vec![
                    FieldDef::primitive("city", Value::Varchar(None, 0)),
                    FieldDef::primitive("zipCode", Value::Varchar(None, 0)).column("zip"),
                ],
            )
            .column("addr"),
        );
    let relation = build(&def);
    assert_eq!(column_names(&relation), ["id", "addr_city", "addr_zip"]);
}

#[test]
fn unnamed_parent_leaves_multiple_children_unprefixed() {
    let def = EntityDef::new("person", "id")
        .field(FieldDef::primitive("id", Value::Int64(None)))
        .field(FieldDef::nested(
            "address",
            vec![
                FieldDef::primitive("city", Value::Varchar(None, 0)),
                FieldDef::primitive("zipCode", Value::Varchar(None, 0)),
            ],
        ));
    let relation = build(&def);
    assert_eq!(column_names(&relation), ["id", "city", "zip_code"]);
}

#[test]
fn prefixes_stack_across_nesting_levels() {
    let def = EntityDef::new("person", "id")
        .field(FieldDef::primitive("id", Value::Int64(None)))
        .field(
            FieldDef::nested(
                "home",
                vec![
                    FieldDef::primitive("street", Value::Varchar(None, 0)),
                    FieldDef::nested(
                        "geo",
                        vec![
                            FieldDef::primitive("lat", Value::Float64(None)),
                            FieldDef::primitive("lon", Value::Float64(None)),
                        ],
                    )
                    .column("geo"),
                ],
            )
            .column("home"),
        );
    let relation = build(&def);
    assert_eq!(
        column_names(&relation),
        ["id", "home_street", "home_geo_lat", "home_geo_lon"]
    );
}

#[test]
fn leaf_paths_are_dotted_field_paths() {
    let def = EntityDef::new("person", "id")
        .field(FieldDef::primitive("id", Value::Int64(None)))
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
    let relation = build(&def);
    assert_eq!(relation.resolve_path("address.city"), Some(1));
    assert_eq!(relation.resolve_path("addr_zip"), Some(2));
    assert_eq!(relation.resolve_path("nope"), None);
}

#[test]
fn duplicate_column_names_fail_regardless_of_source() {
    // Two different fields computing the same storage name.
    let def = EntityDef::new("person", "id")
        .field(FieldDef::primitive("id", Value::Int64(None)))
        .field(FieldDef::primitive("firstName", Value::Varchar(None, 0)))
        .field(FieldDef::primitive("nick", Value::Varchar(None, 0)).column("first_name"));
    let error = RelationModel::build(&def).unwrap_err();
    assert!(matches!(error, Error::Schema { .. }), "{error}");

    // Same explicit name twice, in the other declaration order.
    let def = EntityDef::new("person", "id")
        .field(FieldDef::primitive("id", Value::Int64(None)))
        .field(FieldDef::primitive("nick", Value::Varchar(None, 0)).column("first_name"))
        .field(FieldDef::primitive("firstName", Value::Varchar(None, 0)));
    assert!(RelationModel::build(&def).is_err());
}

#[test]
fn duplicate_field_names_fail() {
    let def = EntityDef::new("person", "id")
        .field(FieldDef::primitive("id", Value::Int64(None)))
        .field(FieldDef::primitive("age", Value::Int32(None)).column("age_a"))
        .field(FieldDef::primitive("age", Value::Int32(None)).column("age_b"));
    assert!(RelationModel::build(&def).is_err());
}

#[test]
fn unknown_primary_key_field_fails() {
    let def = EntityDef::new("person", "missing")
        .field(FieldDef::primitive("id", Value::Int64(None)));
    let error = RelationModel::build(&def).unwrap_err();
    assert!(matches!(error, Error::Schema { .. }), "{error}");
}

#[test]
fn nested_field_without_columns_fails() {
    let def = EntityDef::new("person", "id")
        .field(FieldDef::primitive("id", Value::Int64(None)))
        .field(FieldDef::nested("empty", vec![]));
    assert!(RelationModel::build(&def).is_err());
}

#[test]
fn untyped_leaf_fails() {
    let def = EntityDef::new("person", "id")
        .field(FieldDef::primitive("id", Value::Int64(None)))
        .field(FieldDef::primitive("mystery", Value::Null));
    assert!(RelationModel::build(&def).is_err());
}

#[test]
fn nested_primary_key_marks_every_leaf() {
    let def = EntityDef::new("order_line", "key")
        .field(
            FieldDef::nested(
                "key",
                vec![
                    FieldDef::primitive("orderId", Value::Int64(None)),
                    FieldDef::primitive("line", Value::Int32(None)),
                ],
            )
            .column("k"),
        )
        .field(FieldDef::primitive("qty", Value::Int32(None)));
    let relation = build(&def);
    let pk: Vec<usize> = relation.primary_key_indices().collect();
    assert_eq!(pk, [0, 1]);
    assert_eq!(relation.primary_key().leaf_indices(), [0, 1]);
    // Binding order is dependent columns first, then the key.
    assert_eq!(relation.write_order(), [2, 0, 1]);
}

#[test]
fn hierarchical_key_path_ends_with_the_relation() {
    let def = EntityDef::new("invoice", "id")
        .ancestor("tenant")
        .ancestor("customer")
        .field(FieldDef::primitive("id", Value::Int64(None)));
    let relation = build(&def);
    assert_eq!(relation.primary_key().path(), ["tenant", "customer", "invoice"]);
}
