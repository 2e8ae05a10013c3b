mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MySqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use crate::{
    ColumnModel, Error, Limit, NativeError, Operand, QueryModel, RelationModel, Result, SortOrder,
    Value, util::separated_by,
};
use std::fmt::Write;
use time::{Date, Time};

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}
macro_rules! write_float {
    ($out:ident, $value:expr) => {{
        if $value.is_finite() {
            let mut buffer = ryu::Buffer::new();
            $out.push_str(buffer.format($value));
        } else {
            $out.push_str("NULL");
        }
    }};
}

/// One backend's SQL syntax, type mapping and error classification.
///
/// Stateless strategy object selected at configuration time. The default
/// method bodies implement portable ANSI-leaning SQL; concrete dialects
/// override the pieces their backend renders differently.
pub trait SqlDialect {
    fn as_dyn(&self) -> &dyn SqlDialect;

    fn name(&self) -> &'static str;

    fn write_identifier(&self, out: &mut String, value: &str) {
        out.push_str(value);
    }

    /// Parameter placeholder for the 1-based position `index`. `?` is the
    /// default for every position; dialects may change the syntax but never
    /// the parameter order.
    fn write_placeholder(&self, out: &mut String, _index: usize) {
        out.push('?');
    }

    /// Whether the backend supports a native LIMIT clause. When false the
    /// access layer enforces limits client-side by truncating after fetch.
    fn supports_limit(&self) -> bool {
        false
    }

    /// Physical type for a column prototype. Returns false when the dialect
    /// has no mapping for the type, which is a fatal schema error upstream.
    fn write_value_type(&self, out: &mut String, value: &Value) -> bool {
        match value {
            Value::Boolean(..) => out.push_str("SMALLINT"),
            Value::Int16(..) => out.push_str("SMALLINT"),
            Value::Int32(..) => out.push_str("INTEGER"),
            Value::Int64(..) => out.push_str("BIGINT"),
            Value::Float32(..) => out.push_str("REAL"),
            Value::Float64(..) => out.push_str("DOUBLE PRECISION"),
            Value::Decimal(.., precision, scale) => {
                out.push_str("DECIMAL");
                if (precision, scale) != (&0, &0) {
                    let _ = write!(out, "({},{})", precision, scale);
                }
            }
            Value::Varchar(.., len) => {
                if *len > 0 {
                    let _ = write!(out, "VARCHAR({})", len);
                } else {
                    out.push_str("VARCHAR");
                }
            }
            Value::Blob(..) => out.push_str("BLOB"),
            Value::Date(..) => out.push_str("DATE"),
            Value::Timestamp(..) => out.push_str("TIMESTAMP"),
            Value::Uuid(..) => out.push_str("CHAR(36)"),
            Value::Null => return false,
        }
        true
    }

    /// Whether boolean columns need an explicit CHECK constraint because the
    /// backend has no native boolean type.
    fn boolean_needs_check(&self) -> bool {
        true
    }

    fn write_create_column_fragment(
        &self,
        out: &mut String,
        relation: &RelationModel,
        column: &ColumnModel,
    ) -> Result<()> {
        let Some(value) = column.value() else {
            return Err(Error::schema(
                relation.name(),
                format!("`{}` is not a leaf column", column.field_name()),
            ));
        };
        self.write_identifier(out, column.column_name());
        out.push(' ');
        if !self.write_value_type(out, value) {
            return Err(Error::schema(
                relation.name(),
                format!(
                    "no type mapping for column `{}` ({}) in dialect {}",
                    column.column_name(),
                    value.type_name(),
                    self.name()
                ),
            ));
        }
        if column.not_null() && !column.in_primary_key() {
            out.push_str(" NOT NULL");
        }
        if matches!(value, Value::Boolean(..)) && self.boolean_needs_check() {
            out.push_str(" CHECK(");
            self.write_identifier(out, column.column_name());
            out.push_str(" IN(0,1))");
        }
        Ok(())
    }

    /// `CREATE TABLE <rel>(<c1> <t1>,...,<cn> <tn>,PRIMARY KEY(<pk1>,...))`
    ///
    /// Column order is dependent columns then primary key columns, in
    /// declaration order within each group.
    fn write_create_table(&self, out: &mut String, relation: &RelationModel) -> Result<()> {
        out.push_str("CREATE TABLE ");
        self.write_identifier(out, relation.name());
        out.push('(');
        let mut first = true;
        for column in relation
            .dependent_columns()
            .chain(relation.primary_key_columns())
        {
            if !first {
                out.push(',');
            }
            first = false;
            self.write_create_column_fragment(out, relation, column)?;
        }
        out.push_str(",PRIMARY KEY(");
        separated_by(
            out,
            relation.primary_key_columns(),
            |out, c| self.write_identifier(out, c.column_name()),
            ",",
        );
        out.push_str("))");
        Ok(())
    }

    /// `SELECT <alias>.<c1>,...,<alias>.<cn> FROM <rel> <alias>` with the same
    /// dependent-then-primary-key column order as the create template.
    fn write_select(&self, out: &mut String, relation: &RelationModel, alias: &str) {
        out.push_str("SELECT ");
        separated_by(
            out,
            relation
                .dependent_columns()
                .chain(relation.primary_key_columns()),
            |out, c| {
                out.push_str(alias);
                out.push('.');
                self.write_identifier(out, c.column_name());
            },
            ",",
        );
        out.push_str(" FROM ");
        self.write_identifier(out, relation.name());
        out.push(' ');
        out.push_str(alias);
    }

    /// `INSERT INTO <rel>(<c1>,...,<cn>)VALUES(<p1>,...,<pn>)`
    fn write_insert_one(&self, out: &mut String, relation: &RelationModel) {
        out.push_str("INSERT INTO ");
        self.write_identifier(out, relation.name());
        out.push('(');
        let columns = || {
            relation
                .dependent_columns()
                .chain(relation.primary_key_columns())
        };
        separated_by(
            out,
            columns(),
            |out, c| self.write_identifier(out, c.column_name()),
            ",",
        );
        out.push_str(")VALUES(");
        let mut index = 0;
        separated_by(
            out,
            columns(),
            |out, _| {
                index += 1;
                self.write_placeholder(out, index);
            },
            ",",
        );
        out.push(')');
    }

    /// `UPDATE <rel> SET <d1>=<p1>,... WHERE <pk1>=<pk_p1> AND ...`
    fn write_update_one(&self, out: &mut String, relation: &RelationModel) {
        out.push_str("UPDATE ");
        self.write_identifier(out, relation.name());
        out.push_str(" SET ");
        let mut index = 0;
        separated_by(
            out,
            relation.dependent_columns(),
            |out, c| {
                self.write_identifier(out, c.column_name());
                out.push('=');
                index += 1;
                self.write_placeholder(out, index);
            },
            ",",
        );
        out.push_str(" WHERE ");
        separated_by(
            out,
            relation.primary_key_columns(),
            |out, c| {
                self.write_identifier(out, c.column_name());
                out.push('=');
                index += 1;
                self.write_placeholder(out, index);
            },
            " AND ",
        );
    }

    /// `DELETE FROM <rel> WHERE <pk1>=<pk_p1> AND ...`
    fn write_delete_one(&self, out: &mut String, relation: &RelationModel) {
        out.push_str("DELETE FROM ");
        self.write_identifier(out, relation.name());
        out.push_str(" WHERE ");
        let mut index = 0;
        separated_by(
            out,
            relation.primary_key_columns(),
            |out, c| {
                self.write_identifier(out, c.column_name());
                out.push('=');
                index += 1;
                self.write_placeholder(out, index);
            },
            " AND ",
        );
    }

    /// Default select plus a primary key equality WHERE clause.
    fn write_select_by_key(&self, out: &mut String, relation: &RelationModel, alias: &str) {
        self.write_select(out, relation, alias);
        out.push_str(" WHERE ");
        let mut index = 0;
        separated_by(
            out,
            relation.primary_key_columns(),
            |out, c| {
                out.push_str(alias);
                out.push('.');
                self.write_identifier(out, c.column_name());
                out.push('=');
                index += 1;
                self.write_placeholder(out, index);
            },
            " AND ",
        );
    }

    /// Renders a compiled query: the relation's default select plus the
    /// WHERE/ORDER BY/LIMIT clauses with this dialect's placeholder syntax.
    fn write_query(
        &self,
        out: &mut String,
        relation: &RelationModel,
        query: &QueryModel,
        alias: &str,
    ) {
        self.write_select(out, relation, alias);
        let mut index = 0;
        if !query.conditions().is_empty() {
            out.push_str(" WHERE ");
            separated_by(
                out,
                query.conditions(),
                |out, condition| {
                    let column = &relation.leaves()[condition.leaf()];
                    out.push_str(alias);
                    out.push('.');
                    self.write_identifier(out, column.column_name());
                    out.push(' ');
                    out.push_str(condition.op().as_sql());
                    out.push(' ');
                    match condition.rhs() {
                        Operand::Placeholder => {
                            index += 1;
                            self.write_placeholder(out, index);
                        }
                        Operand::Literal(value) => self.write_value(out, value),
                    }
                },
                " AND ",
            );
        }
        if !query.order_by().is_empty() {
            out.push_str(" ORDER BY ");
            separated_by(
                out,
                query.order_by(),
                |out, order| {
                    let column = &relation.leaves()[order.leaf()];
                    out.push_str(alias);
                    out.push('.');
                    self.write_identifier(out, column.column_name());
                    if order.order() == SortOrder::Desc {
                        out.push_str(" DESC");
                    }
                },
                ",",
            );
        }
        if let Some(limit) = query.limit() {
            // Dialects without native LIMIT leave enforcement to the access
            // layer, which truncates the fetched rows.
            if self.supports_limit() {
                out.push_str(" LIMIT ");
                match limit {
                    Limit::Literal(value) => write_integer!(out, value),
                    Limit::Placeholder => {
                        index += 1;
                        self.write_placeholder(out, index);
                    }
                }
            }
        }
    }

    fn write_value(&self, out: &mut String, value: &Value) {
        if value.is_null() {
            self.write_value_none(out);
            return;
        }
        match value {
            Value::Boolean(Some(v)) => self.write_value_bool(out, *v),
            Value::Int16(Some(v)) => write_integer!(out, *v),
            Value::Int32(Some(v)) => write_integer!(out, *v),
            Value::Int64(Some(v)) => write_integer!(out, *v),
            Value::Float32(Some(v)) => write_float!(out, *v),
            Value::Float64(Some(v)) => write_float!(out, *v),
            Value::Decimal(Some(v), ..) => drop(write!(out, "{}", v)),
            Value::Varchar(Some(v), ..) => self.write_value_string(out, v),
            Value::Blob(Some(v)) => self.write_value_blob(out, v),
            Value::Date(Some(v)) => {
                out.push('\'');
                self.write_value_date(out, v);
                out.push('\'');
            }
            Value::Timestamp(Some(v)) => {
                out.push('\'');
                self.write_value_date(out, &v.date());
                out.push('T');
                self.write_value_time(out, &v.time());
                out.push('\'');
            }
            Value::Uuid(Some(v)) => drop(write!(out, "'{}'", v)),
            _ => self.write_value_none(out),
        }
    }

    fn write_value_none(&self, out: &mut String) {
        out.push_str("NULL")
    }

    /// Booleans render as 0/1 by default, matching the SMALLINT+CHECK column.
    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push_str(["0", "1"][value as usize])
    }

    fn write_value_string(&self, out: &mut String, value: &str) {
        out.push('\'');
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == '\'' {
                out.push_str(&value[position..i]);
                out.push_str("''");
                position = i + 1;
            }
        }
        out.push_str(&value[position..]);
        out.push('\'');
    }

    fn write_value_blob(&self, out: &mut String, value: &[u8]) {
        out.push_str("X'");
        out.push_str(&hex::encode_upper(value));
        out.push('\'');
    }

    fn write_value_date(&self, out: &mut String, value: &Date) {
        let _ = write!(
            out,
            "{:04}-{:02}-{:02}",
            value.year(),
            value.month() as u8,
            value.day()
        );
    }

    fn write_value_time(&self, out: &mut String, value: &Time) {
        let _ = write!(
            out,
            "{:02}:{:02}:{:02}",
            value.hour(),
            value.minute(),
            value.second()
        );
    }

    /// Recognizes a native unique-constraint violation. The portable fallback
    /// goes by SQLSTATE and message text; dialects match their vendor codes.
    fn is_duplicate_key(&self, error: &NativeError) -> bool {
        error.state.as_deref() == Some("23505")
            || error.message.to_ascii_lowercase().contains("unique")
    }

    /// Classifies a native store error into a semantic error kind.
    fn convert_error(&self, op: &'static str, table: &str, error: NativeError) -> Error {
        if self.is_duplicate_key(&error) {
            Error::DuplicateKey {
                op,
                table: table.to_owned(),
                source: error,
            }
        } else {
            Error::Operation {
                op,
                table: table.to_owned(),
                source: error,
            }
        }
    }

    // Introspection SQL. Each statement yields the object names in the first
    // column of the result. The boolean variants return false when the
    // backend has no such catalog.

    fn write_list_tables(&self, out: &mut String) {
        out.push_str("SELECT table_name FROM information_schema.tables WHERE table_type='BASE TABLE'");
    }

    fn write_list_columns(&self, out: &mut String, table: &str) {
        out.push_str("SELECT column_name FROM information_schema.columns WHERE table_name=");
        self.write_value_string(out, table);
    }

    fn write_list_sequences(&self, out: &mut String) -> bool {
        out.push_str("SELECT sequence_name FROM information_schema.sequences");
        true
    }

    fn write_list_indexes(&self, _out: &mut String, _table: &str) -> bool {
        false
    }

    // Incremental DDL, used by schema reconciliation.

    fn write_add_column(
        &self,
        out: &mut String,
        relation: &RelationModel,
        column: &ColumnModel,
    ) -> Result<()> {
        out.push_str("ALTER TABLE ");
        self.write_identifier(out, relation.name());
        out.push_str(" ADD COLUMN ");
        self.write_create_column_fragment(out, relation, column)
    }

    fn write_drop_column(&self, out: &mut String, table: &str, column: &str) {
        out.push_str("ALTER TABLE ");
        self.write_identifier(out, table);
        out.push_str(" DROP COLUMN ");
        self.write_identifier(out, column);
    }

    fn write_rename_column(&self, out: &mut String, table: &str, from: &str, to: &str) {
        out.push_str("ALTER TABLE ");
        self.write_identifier(out, table);
        out.push_str(" RENAME COLUMN ");
        self.write_identifier(out, from);
        out.push_str(" TO ");
        self.write_identifier(out, to);
    }

    fn write_rename_table(&self, out: &mut String, from: &str, to: &str) {
        out.push_str("ALTER TABLE ");
        self.write_identifier(out, from);
        out.push_str(" RENAME TO ");
        self.write_identifier(out, to);
    }

    fn write_create_sequence(&self, out: &mut String, name: &str) -> bool {
        out.push_str("CREATE SEQUENCE ");
        self.write_identifier(out, name);
        true
    }

    /// Retrieval of the next native sequence value. Returns false when the
    /// backend has no sequence construct; callers fall back to the counter
    /// table pool.
    fn write_next_sequence_value(&self, out: &mut String, name: &str) -> bool {
        out.push_str("SELECT NEXT VALUE FOR ");
        self.write_identifier(out, name);
        true
    }
}

/// Portable ANSI-leaning dialect, the default method bodies unchanged.
pub struct GenericSqlDialect;

impl GenericSqlDialect {
    pub const fn new() -> Self {
        Self {}
    }
}

impl Default for GenericSqlDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for GenericSqlDialect {
    fn as_dyn(&self) -> &dyn SqlDialect {
        self
    }

    fn name(&self) -> &'static str {
        "generic"
    }
}
