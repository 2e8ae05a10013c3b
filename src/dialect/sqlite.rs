use crate::{NativeError, SqlDialect, Value};

pub struct SqliteDialect;

impl SqliteDialect {
    pub const fn new() -> Self {
        Self {}
    }
}

impl SqlDialect for SqliteDialect {
    fn as_dyn(&self) -> &dyn SqlDialect {
        self
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn supports_limit(&self) -> bool {
        true
    }

    fn write_value_type(&self, out: &mut String, value: &Value) -> bool {
        match value {
            Value::Boolean(..) | Value::Int16(..) | Value::Int32(..) | Value::Int64(..) => {
                out.push_str("INTEGER")
            }
            Value::Float32(..) | Value::Float64(..) => out.push_str("REAL"),
            Value::Decimal(..) => out.push_str("NUMERIC"),
            Value::Varchar(..) | Value::Uuid(..) => out.push_str("TEXT"),
            Value::Blob(..) => out.push_str("BLOB"),
            Value::Date(..) | Value::Timestamp(..) => out.push_str("TEXT"),
            Value::Null => return false,
        }
        true
    }

    fn boolean_needs_check(&self) -> bool {
        false
    }

    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push_str(["0", "1"][value as usize])
    }

    // 1555 is SQLITE_CONSTRAINT_PRIMARYKEY, 2067 SQLITE_CONSTRAINT_UNIQUE.
    fn is_duplicate_key(&self, error: &NativeError) -> bool {
        matches!(error.code, Some(1555) | Some(2067))
            || error.message.contains("UNIQUE constraint failed")
    }

    fn write_list_tables(&self, out: &mut String) {
        out.push_str("SELECT name FROM sqlite_master WHERE type='table'");
    }

    fn write_list_columns(&self, out: &mut String, table: &str) {
        out.push_str("SELECT name FROM pragma_table_info(");
        self.write_value_string(out, table);
        out.push(')');
    }

    fn write_list_sequences(&self, _out: &mut String) -> bool {
        false
    }

    fn write_list_indexes(&self, out: &mut String, table: &str) -> bool {
        out.push_str("SELECT name FROM sqlite_master WHERE type='index' AND tbl_name=");
        self.write_value_string(out, table);
        true
    }

    fn write_create_sequence(&self, _out: &mut String, _name: &str) -> bool {
        false
    }

    fn write_next_sequence_value(&self, _out: &mut String, _name: &str) -> bool {
        false
    }
}
