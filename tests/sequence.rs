mod common;

use common::{ScriptedBackend, Statement, labels, row};
use girder::{PostgresDialect, RowLabeled, SequencePool, SqliteDialect, Value};

fn value_row(value: i64) -> Vec<RowLabeled> {
    vec![RowLabeled::new(
        labels(&["value"]),
        row(&[Value::Int64(Some(value))]),
    )]
}

#[test]
fn native_sequences_fetch_every_value() {
    let mut db = ScriptedBackend::new();
    let mut pool = SequencePool::new("invoice_seq");
    db.script_fetch(value_row(41));
    db.script_fetch(value_row(42));
    assert_eq!(pool.next_value(&mut db, &PostgresDialect).unwrap(), 41);
    assert_eq!(pool.next_value(&mut db, &PostgresDialect).unwrap(), 42);
    assert_eq!(db.statements[0].sql(), "SELECT nextval('invoice_seq')");
}

#[test]
fn counter_table_seeds_the_row_and_serves_the_first_block() {
    let mut db = ScriptedBackend::new();
    let mut pool = SequencePool::with_pool_size("invoice_seq", 20);
    db.script_fetch(vec![]); // no counter row yet
    db.script_execute(1); // INSERT claims 1..=20
    for expected in 1..=20 {
        assert_eq!(pool.next_value(&mut db, &SqliteDialect).unwrap(), expected);
    }
    // One SELECT and one INSERT for the whole block.
    assert_eq!(db.statements.len(), 2);
    assert_eq!(
        db.statements[0].sql(),
        "SELECT value FROM girder_sequences WHERE name=?"
    );
    assert_eq!(
        db.statements[1].sql(),
        "INSERT INTO girder_sequences(name,value)VALUES(?,?)"
    );
}

#[test]
fn counter_table_reserves_blocks_with_a_compare_and_swap() {
    let mut db = ScriptedBackend::new();
    let mut pool = SequencePool::with_pool_size("invoice_seq", 20);
    db.script_fetch(value_row(20));
    db.script_execute(1);
    assert_eq!(pool.next_value(&mut db, &SqliteDialect).unwrap(), 21);
    match &db.statements[1] {
        Statement::Execute { sql, params } => {
            assert_eq!(
                sql,
                "UPDATE girder_sequences SET value=? WHERE name=? AND value=?"
            );
            assert_eq!(
                params.as_slice(),
                [
                    Value::Int64(Some(40)),
                    Value::Varchar(Some("invoice_seq".to_owned()), 0),
                    Value::Int64(Some(20)),
                ]
            );
        }
        other => panic!("unexpected statement {other:?}"),
    }
    // The rest of the block is served locally.
    for expected in 22..=40 {
        assert_eq!(pool.next_value(&mut db, &SqliteDialect).unwrap(), expected);
    }
    assert_eq!(db.statements.len(), 2);
}

#[test]
fn racing_sessions_get_disjoint_blocks() {
    // Both sessions read the counter at 20. The first swap wins; the loser's
    // update matches zero rows and it retries against the advanced counter.
    let mut db_a = ScriptedBackend::new();
    let mut pool_a = SequencePool::with_pool_size("invoice_seq", 20);
    db_a.script_fetch(value_row(20));
    db_a.script_execute(1);
    let a = pool_a.next_value(&mut db_a, &SqliteDialect).unwrap();

    let mut db_b = ScriptedBackend::new();
    let mut pool_b = SequencePool::with_pool_size("invoice_seq", 20);
    db_b.script_fetch(value_row(20));
    db_b.script_execute(0); // lost the swap to session A
    db_b.script_fetch(value_row(40));
    db_b.script_execute(1);
    let b = pool_b.next_value(&mut db_b, &SqliteDialect).unwrap();

    assert_eq!(a, 21);
    assert_eq!(b, 41);
    assert_ne!(a, b);
}

#[test]
fn reservation_gives_up_after_the_retry_bound() {
    let mut db = ScriptedBackend::new();
    let mut pool = SequencePool::with_pool_size("invoice_seq", 20);
    for i in 0..10i64 {
        db.script_fetch(value_row(20 * (i + 1)));
        db.script_execute(0);
    }
    let error = pool.next_value(&mut db, &SqliteDialect).unwrap_err();
    assert!(error.is_conflict(), "{error}");
    // One SELECT and one failed UPDATE per attempt.
    assert_eq!(db.statements.len(), 20);
}

#[test]
fn missing_sequence_value_is_an_error() {
    let mut db = ScriptedBackend::new();
    let mut pool = SequencePool::new("invoice_seq");
    db.script_fetch(vec![]);
    assert!(pool.next_value(&mut db, &PostgresDialect).is_err());
}
