use crate::{NativeError, SqlDialect, Value};
use std::fmt::Write;

pub struct PostgresDialect;

impl PostgresDialect {
    pub const fn new() -> Self {
        Self {}
    }
}

impl SqlDialect for PostgresDialect {
    fn as_dyn(&self) -> &dyn SqlDialect {
        self
    }

    fn name(&self) -> &'static str {
        "postgres"
    }

    fn write_placeholder(&self, out: &mut String, index: usize) {
        let _ = write!(out, "${}", index);
    }

    fn supports_limit(&self) -> bool {
        true
    }

    fn write_value_type(&self, out: &mut String, value: &Value) -> bool {
        match value {
            Value::Boolean(..) => out.push_str("BOOLEAN"),
            Value::Int16(..) => out.push_str("SMALLINT"),
            Value::Int32(..) => out.push_str("INTEGER"),
            Value::Int64(..) => out.push_str("BIGINT"),
            Value::Float32(..) => out.push_str("REAL"),
            Value::Float64(..) => out.push_str("DOUBLE PRECISION"),
            Value::Decimal(.., precision, scale) => {
                out.push_str("NUMERIC");
                if (precision, scale) != (&0, &0) {
                    let _ = write!(out, "({},{})", precision, scale);
                }
            }
            Value::Varchar(.., len) => {
                if *len > 0 {
                    let _ = write!(out, "VARCHAR({})", len);
                } else {
                    out.push_str("TEXT");
                }
            }
            Value::Blob(..) => out.push_str("BYTEA"),
            Value::Date(..) => out.push_str("DATE"),
            Value::Timestamp(..) => out.push_str("TIMESTAMP"),
            Value::Uuid(..) => out.push_str("UUID"),
            Value::Null => return false,
        }
        true
    }

    fn boolean_needs_check(&self) -> bool {
        false
    }

    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push_str(["false", "true"][value as usize])
    }

    fn write_value_blob(&self, out: &mut String, value: &[u8]) {
        out.push_str("'\\x");
        out.push_str(&hex::encode_upper(value));
        out.push('\'');
    }

    fn is_duplicate_key(&self, error: &NativeError) -> bool {
        error.state.as_deref() == Some("23505")
    }

    fn write_list_indexes(&self, out: &mut String, table: &str) -> bool {
        out.push_str("SELECT indexname FROM pg_indexes WHERE tablename=");
        self.write_value_string(out, table);
        true
    }

    fn write_next_sequence_value(&self, out: &mut String, name: &str) -> bool {
        out.push_str("SELECT nextval(");
        self.write_value_string(out, name);
        out.push(')');
        true
    }
}
