use girder::{EntityDef, FieldDef, RelationModel, Value, decode_key, encode_key};

#[test]
fn plain_segments_pass_through() {
    assert_eq!(encode_key(["acme", "42"]), "acme,42");
    assert_eq!(decode_key("acme,42"), ["acme", "42"]);
}

#[test]
fn reserved_characters_are_escaped() {
    assert_eq!(encode_key(["foo,bar/ at %here"]), "foo%2Cbar/+at+%25here");
    assert_eq!(decode_key("foo%2Cbar/+at+%25here"), ["foo,bar/ at %here"]);
}

#[test]
fn escaping_round_trips() {
    let segments = ["a,b", "c d", "e%f", "plain", "%2C", "a+b", "+ +", ""];
    let encoded = encode_key(segments);
    assert_eq!(decode_key(&encoded), segments);
}

#[test]
fn literal_plus_stays_distinct_from_an_encoded_space() {
    assert_eq!(encode_key(["a+b"]), "a%2Bb");
    assert_eq!(encode_key(["a b"]), "a+b");
    assert_eq!(decode_key("a%2Bb"), ["a+b"]);
    assert_eq!(decode_key("a+b"), ["a b"]);
}

#[test]
fn unknown_escapes_are_left_alone() {
    assert_eq!(decode_key("a%ZZb"), ["a%ZZb"]);
    assert_eq!(decode_key("trailing%"), ["trailing%"]);
}

#[test]
fn key_model_encodes_one_segment_per_hierarchy_level() {
    let def = EntityDef::new("invoice", "id")
        .ancestor("tenant")
        .field(FieldDef::primitive("id", Value::Int64(None)));
    let relation = RelationModel::build(&def).unwrap();
    let key = relation.primary_key();
    assert_eq!(key.encode(&["acme corp", "7"]).unwrap(), "acme+corp,7");
    assert!(key.encode(&["7"]).is_err());
}
