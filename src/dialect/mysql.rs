use crate::{NativeError, SqlDialect, Value};
use std::fmt::Write;

pub struct MySqlDialect;

impl MySqlDialect {
    pub const fn new() -> Self {
        Self {}
    }
}

impl SqlDialect for MySqlDialect {
    fn as_dyn(&self) -> &dyn SqlDialect {
        self
    }

    fn name(&self) -> &'static str {
        "mysql"
    }

    fn supports_limit(&self) -> bool {
        true
    }

    fn write_value_type(&self, out: &mut String, value: &Value) -> bool {
        match value {
            Value::Boolean(..) => out.push_str("TINYINT(1)"),
            Value::Int16(..) => out.push_str("SMALLINT"),
            Value::Int32(..) => out.push_str("INTEGER"),
            Value::Int64(..) => out.push_str("BIGINT"),
            Value::Float32(..) => out.push_str("FLOAT"),
            Value::Float64(..) => out.push_str("DOUBLE"),
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
                    out.push_str("TEXT");
                }
            }
            Value::Blob(..) => out.push_str("BLOB"),
            Value::Date(..) => out.push_str("DATE"),
            Value::Timestamp(..) => out.push_str("DATETIME"),
            Value::Uuid(..) => out.push_str("CHAR(36)"),
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

    // 1062 is ER_DUP_ENTRY, 1586 its partitioned variant.
    fn is_duplicate_key(&self, error: &NativeError) -> bool {
        matches!(error.code, Some(1062) | Some(1586))
    }

    fn write_list_indexes(&self, out: &mut String, table: &str) -> bool {
        out.push_str("SELECT DISTINCT index_name FROM information_schema.statistics WHERE table_name=");
        self.write_value_string(out, table);
        true
    }

    fn write_list_sequences(&self, _out: &mut String) -> bool {
        false
    }

    fn write_rename_table(&self, out: &mut String, from: &str, to: &str) {
        out.push_str("RENAME TABLE ");
        self.write_identifier(out, from);
        out.push_str(" TO ");
        self.write_identifier(out, to);
    }

    fn write_create_sequence(&self, _out: &mut String, _name: &str) -> bool {
        false
    }

    fn write_next_sequence_value(&self, _out: &mut String, _name: &str) -> bool {
        false
    }
}
