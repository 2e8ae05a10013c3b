use crate::{
    Backend, Error, Limit, QueryModel, RelationModel, Result, Row, RowCount, RowLabeled,
    SqlDialect, Value,
};
use log::Level;

/// Bound on the fetch-mutate-update cycle of [`atomic_update`]. Retries are
/// immediate, with no delay between attempts.
pub const ATOMIC_UPDATE_ATTEMPTS: usize = 10;

/// Table alias used for generated selects.
pub const DEFAULT_ALIAS: &str = "t";

/// Reorders a declaration-order leaf row into statement binding order.
fn bind_row(relation: &RelationModel, row: &[Value], order: &[usize]) -> Result<Row> {
    if row.len() != relation.leaves().len() {
        return Err(Error::schema(
            relation.name(),
            format!(
                "row has {} values, relation has {} leaf columns",
                row.len(),
                relation.leaves().len()
            ),
        ));
    }
    Ok(order.iter().map(|i| row[*i].clone()).collect())
}

fn check_key(relation: &RelationModel, key: &[Value]) -> Result<()> {
    let expected = relation.primary_key().leaf_indices().len();
    if key.len() != expected {
        return Err(Error::schema(
            relation.name(),
            format!(
                "key has {} values, primary key has {} columns",
                key.len(),
                expected
            ),
        ));
    }
    Ok(())
}

fn conflict_rows(counts: &[RowCount]) -> Vec<usize> {
    counts
        .iter()
        .enumerate()
        .filter(|(_, count)| count.is_zero())
        .map(|(i, _)| i)
        .collect()
}

fn check_conflicts(op: &'static str, relation: &RelationModel, counts: &[RowCount]) -> Result<()> {
    let rows = conflict_rows(counts);
    if rows.is_empty() {
        return Ok(());
    }
    let error = Error::Conflict {
        op,
        table: relation.name().to_owned(),
        rows,
    };
    log::log!(Level::Info, "{}", error);
    Err(error)
}

/// Inserts every row in one batched statement. Rows carry the relation's leaf
/// values in declaration order.
pub fn insert_many<B: Backend + ?Sized>(
    db: &mut B,
    dialect: &dyn SqlDialect,
    relation: &RelationModel,
    rows: &[Row],
) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }
    let mut sql = String::with_capacity(128);
    dialect.write_insert_one(&mut sql, relation);
    let order = relation.write_order();
    let batch = rows
        .iter()
        .map(|r| bind_row(relation, r, &order))
        .collect::<Result<Vec<_>>>()?;
    db.execute_batch(&sql, &batch)
        .map_err(|e| dialect.convert_error("insert", relation.name(), e))?;
    Ok(())
}

/// Updates every row in one batched statement. A reported affected count of
/// zero means the row is gone or its version no longer matches, and surfaces
/// as a concurrency conflict carrying the batch indices concerned. Unknown
/// counts are success.
pub fn update_many<B: Backend + ?Sized>(
    db: &mut B,
    dialect: &dyn SqlDialect,
    relation: &RelationModel,
    rows: &[Row],
) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }
    let mut sql = String::with_capacity(128);
    dialect.write_update_one(&mut sql, relation);
    let order = relation.write_order();
    let batch = rows
        .iter()
        .map(|r| bind_row(relation, r, &order))
        .collect::<Result<Vec<_>>>()?;
    let counts = db
        .execute_batch(&sql, &batch)
        .map_err(|e| dialect.convert_error("update", relation.name(), e))?;
    check_conflicts("update", relation, &counts)
}

/// Batched update, then one batched insert for exactly the rows whose update
/// affected zero rows, preserving the original order. Unknown counts are
/// success and are never re-routed.
pub fn upsert_many<B: Backend + ?Sized>(
    db: &mut B,
    dialect: &dyn SqlDialect,
    relation: &RelationModel,
    rows: &[Row],
) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }
    let mut sql = String::with_capacity(128);
    dialect.write_update_one(&mut sql, relation);
    let order = relation.write_order();
    let batch = rows
        .iter()
        .map(|r| bind_row(relation, r, &order))
        .collect::<Result<Vec<_>>>()?;
    let counts = db
        .execute_batch(&sql, &batch)
        .map_err(|e| dialect.convert_error("update", relation.name(), e))?;
    let missing: Vec<Row> = counts
        .iter()
        .zip(rows)
        .filter(|(count, _)| count.is_zero())
        .map(|(_, row)| row.clone())
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    insert_many(db, dialect, relation, &missing)
}

/// Batched delete keyed by primary key. Key rows carry the primary key leaf
/// values in declaration order. A reported count of zero is a concurrency
/// conflict (the row is already gone or modified); one or more is success.
pub fn delete_many<B: Backend + ?Sized>(
    db: &mut B,
    dialect: &dyn SqlDialect,
    relation: &RelationModel,
    keys: &[Row],
) -> Result<()> {
    if keys.is_empty() {
        return Ok(());
    }
    for key in keys {
        check_key(relation, key)?;
    }
    let mut sql = String::with_capacity(128);
    dialect.write_delete_one(&mut sql, relation);
    let counts = db
        .execute_batch(&sql, keys)
        .map_err(|e| dialect.convert_error("delete", relation.name(), e))?;
    check_conflicts("delete", relation, &counts)
}

/// Fetches the single row with the given primary key, if present. The
/// returned labels follow the select projection: dependent columns first,
/// then primary key columns.
pub fn fetch_by_key<B: Backend + ?Sized>(
    db: &mut B,
    dialect: &dyn SqlDialect,
    relation: &RelationModel,
    key: &[Value],
) -> Result<Option<RowLabeled>> {
    check_key(relation, key)?;
    let mut sql = String::with_capacity(128);
    dialect.write_select_by_key(&mut sql, relation, DEFAULT_ALIAS);
    let rows = db
        .fetch(&sql, key)
        .map_err(|e| dialect.convert_error("select", relation.name(), e))?;
    Ok(rows.into_iter().next())
}

/// Executes a compiled query with the accessor's argument list. When the
/// dialect has no native LIMIT the fetched rows are truncated client-side.
pub fn fetch_query<B: Backend + ?Sized>(
    db: &mut B,
    dialect: &dyn SqlDialect,
    relation: &RelationModel,
    query: &QueryModel,
    args: &[Value],
) -> Result<Vec<RowLabeled>> {
    let limit_arg = matches!(query.limit(), Some(Limit::Placeholder));
    let expected = query.params().len() + limit_arg as usize;
    if args.len() != expected {
        return Err(Error::schema(
            relation.name(),
            format!(
                "query `{}` takes {} argument(s), got {}",
                query.name(),
                expected,
                args.len()
            ),
        ));
    }
    let mut sql = String::with_capacity(256);
    dialect.write_query(&mut sql, relation, query, DEFAULT_ALIAS);
    // A placeholder limit is not bound when the rendered SQL has no LIMIT.
    let bound = if limit_arg && !dialect.supports_limit() {
        &args[..args.len() - 1]
    } else {
        args
    };
    let mut rows = db
        .fetch(&sql, bound)
        .map_err(|e| dialect.convert_error("select", relation.name(), e))?;
    if query.has_limit() && !dialect.supports_limit() {
        if let Some(limit) = query.limit_value(args) {
            rows.truncate(limit as usize);
        }
    }
    Ok(rows)
}

/// Single-entity read-modify-write. Fetches the current row by key, applies
/// `mutate` (which returns the full leaf row in declaration order) and issues
/// a single-row update. A concurrency conflict restarts the whole cycle, up
/// to [`ATOMIC_UPDATE_ATTEMPTS`] times; the last conflict is then surfaced.
/// Returns false without touching anything when the row does not exist.
pub fn atomic_update<B, F>(
    db: &mut B,
    dialect: &dyn SqlDialect,
    relation: &RelationModel,
    key: &[Value],
    mut mutate: F,
) -> Result<bool>
where
    B: Backend + ?Sized,
    F: FnMut(&RowLabeled) -> Row,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        let Some(current) = fetch_by_key(db, dialect, relation, key)? else {
            return Ok(false);
        };
        let updated = mutate(&current);
        match update_many(db, dialect, relation, std::slice::from_ref(&updated)) {
            Ok(()) => return Ok(true),
            Err(error) if error.is_conflict() => {
                if attempt >= ATOMIC_UPDATE_ATTEMPTS {
                    return Err(error);
                }
                log::debug!(
                    "retrying atomic update on `{}` after conflict (attempt {})",
                    relation.name(),
                    attempt
                );
            }
            Err(error) => return Err(error),
        }
    }
}
