use crate::{Backend, RelationModel, Result, RowLabeled, SqlDialect};
use std::collections::HashSet;

fn first_strings(rows: Vec<RowLabeled>) -> Vec<String> {
    rows.into_iter()
        .filter_map(|row| {
            row.values
                .first()
                .and_then(|v| v.as_str().map(str::to_owned))
        })
        .collect()
}

pub fn list_tables<B: Backend + ?Sized>(
    db: &mut B,
    dialect: &dyn SqlDialect,
) -> Result<Vec<String>> {
    let mut sql = String::with_capacity(128);
    dialect.write_list_tables(&mut sql);
    let rows = db
        .fetch(&sql, &[])
        .map_err(|e| dialect.convert_error("introspect", "tables", e))?;
    Ok(first_strings(rows))
}

pub fn list_columns<B: Backend + ?Sized>(
    db: &mut B,
    dialect: &dyn SqlDialect,
    table: &str,
) -> Result<Vec<String>> {
    let mut sql = String::with_capacity(128);
    dialect.write_list_columns(&mut sql, table);
    let rows = db
        .fetch(&sql, &[])
        .map_err(|e| dialect.convert_error("introspect", table, e))?;
    Ok(first_strings(rows))
}

/// Empty when the backend has no sequence catalog.
pub fn list_sequences<B: Backend + ?Sized>(
    db: &mut B,
    dialect: &dyn SqlDialect,
) -> Result<Vec<String>> {
    let mut sql = String::with_capacity(128);
    if !dialect.write_list_sequences(&mut sql) {
        return Ok(Vec::new());
    }
    let rows = db
        .fetch(&sql, &[])
        .map_err(|e| dialect.convert_error("introspect", "sequences", e))?;
    Ok(first_strings(rows))
}

/// Empty when the backend has no index catalog.
pub fn list_indexes<B: Backend + ?Sized>(
    db: &mut B,
    dialect: &dyn SqlDialect,
    table: &str,
) -> Result<Vec<String>> {
    let mut sql = String::with_capacity(128);
    if !dialect.write_list_indexes(&mut sql, table) {
        return Ok(Vec::new());
    }
    let rows = db
        .fetch(&sql, &[])
        .map_err(|e| dialect.convert_error("introspect", table, e))?;
    Ok(first_strings(rows))
}

/// Best-effort incremental schema reconciliation.
///
/// Compares the desired relations and sequences against what introspection
/// reports and emits the missing CREATE/ALTER statements. Existing extra
/// objects are left untouched; with `prune` set, columns no longer present in
/// a relation are dropped. Tables are never dropped.
pub fn reconcile<B: Backend + ?Sized>(
    db: &mut B,
    dialect: &dyn SqlDialect,
    relations: &[&RelationModel],
    sequences: &[&str],
    prune: bool,
) -> Result<()> {
    let existing: HashSet<String> = list_tables(db, dialect)?
        .into_iter()
        .map(|v| v.to_ascii_lowercase())
        .collect();
    for relation in relations {
        if !existing.contains(&relation.name().to_ascii_lowercase()) {
            let mut sql = String::with_capacity(256);
            dialect.write_create_table(&mut sql, relation)?;
            db.execute(&sql, &[])
                .map_err(|e| dialect.convert_error("create", relation.name(), e))?;
            log::info!("created table `{}`", relation.name());
            continue;
        }
        let columns: HashSet<String> = list_columns(db, dialect, relation.name())?
            .into_iter()
            .map(|v| v.to_ascii_lowercase())
            .collect();
        for leaf in relation.leaves() {
            if !columns.contains(&leaf.column_name().to_ascii_lowercase()) {
                let mut sql = String::with_capacity(128);
                dialect.write_add_column(&mut sql, relation, leaf)?;
                db.execute(&sql, &[])
                    .map_err(|e| dialect.convert_error("alter", relation.name(), e))?;
                log::info!("added column `{}.{}`", relation.name(), leaf.column_name());
            }
        }
        if prune {
            let wanted: HashSet<String> = relation
                .leaves()
                .iter()
                .map(|l| l.column_name().to_ascii_lowercase())
                .collect();
            for column in &columns {
                if !wanted.contains(column) {
                    let mut sql = String::with_capacity(128);
                    dialect.write_drop_column(&mut sql, relation.name(), column);
                    db.execute(&sql, &[])
                        .map_err(|e| dialect.convert_error("alter", relation.name(), e))?;
                    log::info!("dropped column `{}.{}`", relation.name(), column);
                }
            }
        }
    }

    let existing: HashSet<String> = list_sequences(db, dialect)?
        .into_iter()
        .map(|v| v.to_ascii_lowercase())
        .collect();
    for name in sequences {
        if !existing.contains(&name.to_ascii_lowercase()) {
            let mut sql = String::with_capacity(64);
            // Backends without a sequence construct allocate through the
            // counter table pool instead.
            if dialect.write_create_sequence(&mut sql, name) {
                db.execute(&sql, &[])
                    .map_err(|e| dialect.convert_error("create", name, e))?;
                log::info!("created sequence `{}`", name);
            }
        }
    }
    Ok(())
}
