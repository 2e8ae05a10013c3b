#![allow(dead_code)]

use girder::{
    EntityDef, FieldDef, NativeError, RelationModel, Row, RowCount, RowLabeled, RowNames, Value,
};
use std::collections::VecDeque;
use std::sync::Arc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Backend double that records every statement and replays scripted results.
#[derive(Default)]
pub struct ScriptedBackend {
    pub statements: Vec<Statement>,
    pub fetch_results: VecDeque<Vec<RowLabeled>>,
    pub execute_results: VecDeque<u64>,
    pub batch_results: VecDeque<Vec<RowCount>>,
}

#[derive(Debug, Clone)]
pub enum Statement {
    Fetch { sql: String, params: Vec<Value> },
    Execute { sql: String, params: Vec<Value> },
    Batch { sql: String, rows: Vec<Row> },
}

impl Statement {
    pub fn sql(&self) -> &str {
        match self {
            Statement::Fetch { sql, .. }
            | Statement::Execute { sql, .. }
            | Statement::Batch { sql, .. } => sql,
        }
    }
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_fetch(&mut self, rows: Vec<RowLabeled>) {
        self.fetch_results.push_back(rows);
    }

    pub fn script_execute(&mut self, affected: u64) {
        self.execute_results.push_back(affected);
    }

    pub fn script_batch(&mut self, counts: Vec<RowCount>) {
        self.batch_results.push_back(counts);
    }

    pub fn batch(&self, index: usize) -> (&str, &[Row]) {
        match &self.statements[index] {
            Statement::Batch { sql, rows } => (sql, rows),
            other => panic!("statement {} is not a batch: {:?}", index, other),
        }
    }
}

impl girder::Backend for ScriptedBackend {
    fn fetch(&mut self, sql: &str, params: &[Value]) -> Result<Vec<RowLabeled>, NativeError> {
        self.statements.push(Statement::Fetch {
            sql: sql.to_owned(),
            params: params.to_vec(),
        });
        Ok(self.fetch_results.pop_front().unwrap_or_default())
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64, NativeError> {
        self.statements.push(Statement::Execute {
            sql: sql.to_owned(),
            params: params.to_vec(),
        });
        Ok(self.execute_results.pop_front().unwrap_or(0))
    }

    fn execute_batch(&mut self, sql: &str, rows: &[Row]) -> Result<Vec<RowCount>, NativeError> {
        let len = rows.len();
        self.statements.push(Statement::Batch {
            sql: sql.to_owned(),
            rows: rows.to_vec(),
        });
        Ok(self
            .batch_results
            .pop_front()
            .unwrap_or_else(|| vec![RowCount::Unknown; len]))
    }
}

/// `person(first_name, age, id)` with the id as primary key and a couple of
/// declarative queries.
pub fn person() -> RelationModel {
    let def = EntityDef::new("person", "id")
        .field(FieldDef::primitive("id", Value::Int64(None)).id(1))
        .field(FieldDef::primitive("firstName", Value::Varchar(None, 120)).id(2))
        .field(FieldDef::primitive("age", Value::Int32(None)).id(3))
        .query(
            girder::QueryDef::new("by_age", "WHERE age >= ? ORDER BY age")
                .param("age", Value::Int32(None)),
        )
        .query(girder::QueryDef::new("oldest", "ORDER BY age DESC LIMIT ?"));
    RelationModel::build(&def).unwrap()
}

pub fn labels(names: &[&str]) -> RowNames {
    let names: Vec<String> = names.iter().map(|n| (*n).to_owned()).collect();
    Arc::from(names)
}

pub fn row(values: &[Value]) -> Row {
    values.to_vec().into_boxed_slice()
}

pub fn person_row(id: i64, name: &str, age: i32) -> Row {
    row(&[
        Value::Int64(Some(id)),
        Value::Varchar(Some(name.to_owned()), 120),
        Value::Int32(Some(age)),
    ])
}
