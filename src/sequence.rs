use crate::{ATOMIC_UPDATE_ATTEMPTS, Backend, Error, NativeError, Result, SqlDialect, Value};

/// Counter table used when the dialect has no native sequence construct.
pub const SEQUENCE_TABLE: &str = "girder_sequences";

/// Values reserved per round trip on the counter table path.
pub const DEFAULT_POOL_SIZE: u64 = 20;

/// Allocator of unique, monotonically increasing id values.
///
/// On backends with native sequences every call fetches the next value from
/// the store. Elsewhere a block of `pool_size` values is reserved at once
/// from a row of [`SEQUENCE_TABLE`] with a compare-and-swap update and handed
/// out locally, so most calls cost nothing. Values skipped when the process
/// stops mid-block are never reissued.
pub struct SequencePool {
    name: String,
    pool_size: u64,
    next: u64,
    limit: u64,
}

impl SequencePool {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_pool_size(name, DEFAULT_POOL_SIZE)
    }

    pub fn with_pool_size(name: impl Into<String>, pool_size: u64) -> Self {
        Self {
            name: name.into(),
            pool_size: pool_size.max(1),
            next: 0,
            limit: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn next_value<B: Backend + ?Sized>(
        &mut self,
        db: &mut B,
        dialect: &dyn SqlDialect,
    ) -> Result<u64> {
        if self.next >= self.limit {
            self.refill(db, dialect)?;
        }
        let value = self.next;
        self.next += 1;
        Ok(value)
    }

    fn refill<B: Backend + ?Sized>(
        &mut self,
        db: &mut B,
        dialect: &dyn SqlDialect,
    ) -> Result<()> {
        let mut sql = String::with_capacity(96);
        if dialect.write_next_sequence_value(&mut sql, &self.name) {
            let value = self.fetch_value(db, dialect, &sql, &[])?;
            self.next = value;
            self.limit = value + 1;
            return Ok(());
        }

        // Counter table path. The reservation is a read followed by a
        // compare-and-swap update, so two sessions racing for the same block
        // cannot both win: the loser's update affects zero rows and it
        // retries against the advanced counter.
        let mut attempt = 0;
        loop {
            attempt += 1;
            if let Some(high) = self.reserve_block(db, dialect)? {
                self.limit = high + 1;
                self.next = (high + 1).saturating_sub(self.pool_size);
                return Ok(());
            }
            if attempt >= ATOMIC_UPDATE_ATTEMPTS {
                return Err(Error::Conflict {
                    op: "sequence",
                    table: self.name.clone(),
                    rows: Vec::new(),
                });
            }
            log::debug!(
                "retrying sequence block reservation for `{}` (attempt {})",
                self.name,
                attempt
            );
        }
    }

    /// One reservation attempt. Returns the upper bound of the reserved block,
    /// or `None` when another session advanced the counter first.
    fn reserve_block<B: Backend + ?Sized>(
        &self,
        db: &mut B,
        dialect: &dyn SqlDialect,
    ) -> Result<Option<u64>> {
        let name_param = [Value::Varchar(Some(self.name.clone()), 0)];
        let mut sql = String::with_capacity(96);
        sql.push_str("SELECT value FROM ");
        dialect.write_identifier(&mut sql, SEQUENCE_TABLE);
        sql.push_str(" WHERE name=");
        dialect.write_placeholder(&mut sql, 1);
        let rows = db
            .fetch(&sql, &name_param)
            .map_err(|e| dialect.convert_error("sequence", &self.name, e))?;
        let current = rows
            .first()
            .and_then(|row| row.values.first())
            .and_then(Value::as_i64);

        let Some(current) = current else {
            // Seed the counter row, claiming the first block. A concurrent
            // seeder shows up as a duplicate key and this session retries.
            sql.clear();
            sql.push_str("INSERT INTO ");
            dialect.write_identifier(&mut sql, SEQUENCE_TABLE);
            sql.push_str("(name,value)VALUES(");
            dialect.write_placeholder(&mut sql, 1);
            sql.push(',');
            dialect.write_placeholder(&mut sql, 2);
            sql.push(')');
            let params = [
                name_param[0].clone(),
                Value::Int64(Some(self.pool_size as i64)),
            ];
            return match db.execute(&sql, &params) {
                Ok(_) => Ok(Some(self.pool_size)),
                Err(e) => {
                    let error = dialect.convert_error("sequence", &self.name, e);
                    if error.is_duplicate_key() {
                        Ok(None)
                    } else {
                        Err(error)
                    }
                }
            };
        };

        let high = current as u64 + self.pool_size;
        sql.clear();
        sql.push_str("UPDATE ");
        dialect.write_identifier(&mut sql, SEQUENCE_TABLE);
        sql.push_str(" SET value=");
        dialect.write_placeholder(&mut sql, 1);
        sql.push_str(" WHERE name=");
        dialect.write_placeholder(&mut sql, 2);
        sql.push_str(" AND value=");
        dialect.write_placeholder(&mut sql, 3);
        let params = [
            Value::Int64(Some(high as i64)),
            name_param[0].clone(),
            Value::Int64(Some(current)),
        ];
        let affected = db
            .execute(&sql, &params)
            .map_err(|e| dialect.convert_error("sequence", &self.name, e))?;
        Ok((affected > 0).then_some(high))
    }

    fn fetch_value<B: Backend + ?Sized>(
        &self,
        db: &mut B,
        dialect: &dyn SqlDialect,
        sql: &str,
        params: &[Value],
    ) -> Result<u64> {
        let rows = db
            .fetch(sql, params)
            .map_err(|e| dialect.convert_error("sequence", &self.name, e))?;
        rows.first()
            .and_then(|row| row.values.first())
            .and_then(Value::as_i64)
            .map(|v| v as u64)
            .ok_or_else(|| Error::Operation {
                op: "sequence",
                table: self.name.clone(),
                source: NativeError::new("no value returned"),
            })
    }
}
