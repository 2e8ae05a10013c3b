use rust_decimal::Decimal;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

/// A typed storage value.
///
/// Every data variant holds an `Option` so the same enum doubles as a type
/// prototype: a `Value::Int64(None)` in a field descriptor declares the
/// column type, a `Value::Int64(Some(7))` is a bound parameter or a fetched
/// cell.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>, /* prec: */ u8, /* scale: */ u8),
    /// Variable-length string, `len` 0 means unbounded.
    Varchar(Option<String>, /* len: */ u32),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Timestamp(Option<PrimitiveDateTime>),
    Uuid(Option<Uuid>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int16(l), Self::Int16(r)) => l == r,
            (Self::Int32(l), Self::Int32(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::Float32(l), Self::Float32(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Decimal(l, l_prec, l_scale), Self::Decimal(r, r_prec, r_scale)) => {
                l == r && l_prec == r_prec && l_scale == r_scale
            }
            (Self::Varchar(l, ..), Self::Varchar(r, ..)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl Value {
    /// Compares the type shape only, ignoring the payload and string length.
    pub fn same_type(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Decimal(.., l_prec, l_scale), Self::Decimal(.., r_prec, r_scale)) => {
                l_prec == r_prec && l_scale == r_scale
            }
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Self::Null
            | Self::Boolean(None)
            | Self::Int16(None)
            | Self::Int32(None)
            | Self::Int64(None)
            | Self::Float32(None)
            | Self::Float64(None)
            | Self::Decimal(None, ..)
            | Self::Varchar(None, ..)
            | Self::Blob(None)
            | Self::Date(None)
            | Self::Timestamp(None)
            | Self::Uuid(None) => true,
            _ => false,
        }
    }

    /// Empty prototype of the same type, for use in descriptors.
    pub fn prototype(&self) -> Value {
        match self {
            Self::Null => Self::Null,
            Self::Boolean(..) => Self::Boolean(None),
            Self::Int16(..) => Self::Int16(None),
            Self::Int32(..) => Self::Int32(None),
            Self::Int64(..) => Self::Int64(None),
            Self::Float32(..) => Self::Float32(None),
            Self::Float64(..) => Self::Float64(None),
            Self::Decimal(.., prec, scale) => Self::Decimal(None, *prec, *scale),
            Self::Varchar(.., len) => Self::Varchar(None, *len),
            Self::Blob(..) => Self::Blob(None),
            Self::Date(..) => Self::Date(None),
            Self::Timestamp(..) => Self::Timestamp(None),
            Self::Uuid(..) => Self::Uuid(None),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(..) => "boolean",
            Self::Int16(..) => "int16",
            Self::Int32(..) => "int32",
            Self::Int64(..) => "int64",
            Self::Float32(..) => "float32",
            Self::Float64(..) => "float64",
            Self::Decimal(..) => "decimal",
            Self::Varchar(..) => "varchar",
            Self::Blob(..) => "blob",
            Self::Date(..) => "date",
            Self::Timestamp(..) => "timestamp",
            Self::Uuid(..) => "uuid",
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int16(Some(v)) => Some(*v as i64),
            Self::Int32(Some(v)) => Some(*v as i64),
            Self::Int64(Some(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Varchar(Some(v), ..) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(Some(value))
    }
}
impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Value::Int16(Some(value))
    }
}
impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int32(Some(value))
    }
}
impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int64(Some(value))
    }
}
impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float32(Some(value))
    }
}
impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float64(Some(value))
    }
}
impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.to_owned()), 0)
    }
}
impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Varchar(Some(value), 0)
    }
}
impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(Some(value), 0, 0)
    }
}
impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Blob(Some(value.into()))
    }
}
impl From<Date> for Value {
    fn from(value: Date) -> Self {
        Value::Date(Some(value))
    }
}
impl From<PrimitiveDateTime> for Value {
    fn from(value: PrimitiveDateTime) -> Self {
        Value::Timestamp(Some(value))
    }
}
impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Uuid(Some(value))
    }
}
impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
    Value: NullOf<T>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => <Value as NullOf<T>>::null(),
        }
    }
}

/// Maps a Rust type to the null `Value` of its column type.
pub trait NullOf<T> {
    fn null() -> Value;
}
macro_rules! null_of {
    ($type:ty, $variant:expr) => {
        impl NullOf<$type> for Value {
            fn null() -> Value {
                $variant
            }
        }
    };
}
null_of!(bool, Value::Boolean(None));
null_of!(i16, Value::Int16(None));
null_of!(i32, Value::Int32(None));
null_of!(i64, Value::Int64(None));
null_of!(f32, Value::Float32(None));
null_of!(f64, Value::Float64(None));
null_of!(&str, Value::Varchar(None, 0));
null_of!(String, Value::Varchar(None, 0));
null_of!(Decimal, Value::Decimal(None, 0, 0));
null_of!(&[u8], Value::Blob(None));
null_of!(Date, Value::Date(None));
null_of!(PrimitiveDateTime, Value::Timestamp(None));
null_of!(Uuid, Value::Uuid(None));
