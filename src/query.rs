use crate::{Error, QueryDef, RelationModel, Result, Value, util::consume_while};
use rust_decimal::Decimal;
use time::macros::format_description;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl CompareOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
        }
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone)]
pub enum Operand {
    /// Positional `?`, bound to the next declared accessor parameter.
    Placeholder,
    Literal(Value),
}

#[derive(Debug, Clone)]
pub struct Condition {
    pub(crate) leaf: usize,
    pub(crate) op: CompareOp,
    pub(crate) rhs: Operand,
}

impl Condition {
    /// Index into the relation's flat leaf list.
    pub fn leaf(&self) -> usize {
        self.leaf
    }
    pub fn op(&self) -> CompareOp {
        self.op
    }
    pub fn rhs(&self) -> &Operand {
        &self.rhs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone)]
pub struct OrderBy {
    pub(crate) leaf: usize,
    pub(crate) order: SortOrder,
}

impl OrderBy {
    pub fn leaf(&self) -> usize {
        self.leaf
    }
    pub fn order(&self) -> SortOrder {
        self.order
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Literal(u64),
    /// Bound at execution time; supplied as the trailing argument.
    Placeholder,
}

/// A compiled declarative query: a conjunction of comparisons plus optional
/// ordering and limit, resolved against one relation.
///
/// The compiled form is dialect-independent; placeholder syntax and the table
/// alias are substituted when a dialect renders it.
#[derive(Debug)]
pub struct QueryModel {
    name: String,
    conditions: Vec<Condition>,
    order_by: Vec<OrderBy>,
    limit: Option<Limit>,
    /// Leaf indices consumed by WHERE placeholders, in source order.
    params: Vec<usize>,
}

impl QueryModel {
    pub(crate) fn compile(relation: &RelationModel, def: &QueryDef) -> Result<Self> {
        let err = |message: String| {
            Error::schema(
                relation.name(),
                format!("query `{}`: {}", def.name, message),
            )
        };
        let mut scanner = Scanner::new(def.text);
        let mut conditions = Vec::new();
        let mut order_by = Vec::new();
        let mut params = Vec::new();
        let mut declared = def.params.iter();

        if scanner.accept_keyword("WHERE") {
            loop {
                let path = scanner
                    .identifier()
                    .ok_or_else(|| err("expected a field path".into()))?;
                let leaf = relation
                    .resolve_path(path)
                    .ok_or_else(|| err(format!("unknown field `{}`", path)))?;
                let op = scanner
                    .compare_op()
                    .ok_or_else(|| err(format!("expected a comparison after `{}`", path)))?;
                let prototype = relation.leaves()[leaf]
                    .value()
                    .cloned()
                    .unwrap_or(Value::Null);
                let rhs = if scanner.accept('?') {
                    let Some((name, declared_type)) = declared.next() else {
                        return Err(err(format!(
                            "placeholder for `{}` has no matching declared parameter",
                            path
                        )));
                    };
                    if !declared_type.same_type(&prototype) {
                        return Err(err(format!(
                            "parameter `{}` is {} but column `{}` is {}",
                            name,
                            declared_type.type_name(),
                            path,
                            prototype.type_name()
                        )));
                    }
                    params.push(leaf);
                    Operand::Placeholder
                } else {
                    Operand::Literal(scanner.literal(&prototype).map_err(&err)?)
                };
                conditions.push(Condition { leaf, op, rhs });
                if !scanner.accept_keyword("AND") {
                    break;
                }
            }
        }

        if scanner.accept_keyword("ORDER") {
            if !scanner.accept_keyword("BY") {
                return Err(err("expected BY after ORDER".into()));
            }
            loop {
                let path = scanner
                    .identifier()
                    .ok_or_else(|| err("expected a field path after ORDER BY".into()))?;
                let leaf = relation
                    .resolve_path(path)
                    .ok_or_else(|| err(format!("unknown field `{}`", path)))?;
                let order = if scanner.accept_keyword("DESC") {
                    SortOrder::Desc
                } else {
                    scanner.accept_keyword("ASC");
                    SortOrder::Asc
                };
                order_by.push(OrderBy { leaf, order });
                if !scanner.accept(',') {
                    break;
                }
            }
        }

        let mut limit = None;
        if scanner.accept_keyword("LIMIT") {
            if scanner.accept('?') {
                // Not a field-bound parameter, but it consumes a trailing
                // declared integer parameter when one is present.
                if let Some((name, declared_type)) = declared.next() {
                    if !matches!(
                        declared_type,
                        Value::Int16(..) | Value::Int32(..) | Value::Int64(..)
                    ) {
                        return Err(err(format!("limit parameter `{}` must be an integer", name)));
                    }
                }
                limit = Some(Limit::Placeholder);
            } else {
                let value = scanner
                    .integer()
                    .ok_or_else(|| err("expected a LIMIT value".into()))?;
                if value < 0 {
                    return Err(err("LIMIT must not be negative".into()));
                }
                limit = Some(Limit::Literal(value as u64));
            }
        }

        if !scanner.done() {
            return Err(err(format!("unexpected input `{}`", scanner.rest())));
        }
        if declared.next().is_some() {
            return Err(err(
                "declared parameters exceed the placeholders in the query".into(),
            ));
        }
        Ok(Self {
            name: def.name.to_owned(),
            conditions,
            order_by,
            limit,
            params,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn order_by(&self) -> &[OrderBy] {
        &self.order_by
    }

    pub fn has_limit(&self) -> bool {
        self.limit.is_some()
    }

    pub fn limit(&self) -> Option<Limit> {
        self.limit
    }

    /// Field-bound parameter leaves, in placeholder order. The LIMIT
    /// placeholder is not part of this list.
    pub fn params(&self) -> &[usize] {
        &self.params
    }

    /// Effective limit for a given argument list. A placeholder limit takes
    /// the trailing argument; used for client-side truncation on dialects
    /// without native LIMIT.
    pub fn limit_value(&self, args: &[Value]) -> Option<u64> {
        match self.limit? {
            Limit::Literal(v) => Some(v),
            Limit::Placeholder => args.last().and_then(Value::as_i64).map(|v| v.max(0) as u64),
        }
    }
}

struct Scanner<'s> {
    input: &'s str,
}

impl<'s> Scanner<'s> {
    fn new(input: &'s str) -> Self {
        Self { input }
    }

    fn skip_ws(&mut self) {
        consume_while(&mut self.input, char::is_whitespace);
    }

    fn done(&mut self) -> bool {
        self.skip_ws();
        self.input.is_empty()
    }

    fn rest(&self) -> &'s str {
        self.input
    }

    fn accept(&mut self, expected: char) -> bool {
        self.skip_ws();
        if let Some(rest) = self.input.strip_prefix(expected) {
            self.input = rest;
            true
        } else {
            false
        }
    }

    fn accept_keyword(&mut self, keyword: &str) -> bool {
        self.skip_ws();
        let mut rest = self.input;
        let word = consume_while(&mut rest, |c| c.is_ascii_alphanumeric() || c == '_');
        if word.eq_ignore_ascii_case(keyword) {
            self.input = rest;
            true
        } else {
            false
        }
    }

    fn identifier(&mut self) -> Option<&'s str> {
        self.skip_ws();
        if !self
            .input
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        {
            return None;
        }
        let word = consume_while(&mut self.input, |c| {
            c.is_ascii_alphanumeric() || c == '_' || c == '.'
        });
        Some(word)
    }

    fn compare_op(&mut self) -> Option<CompareOp> {
        self.skip_ws();
        for (text, op) in [
            (">=", CompareOp::Ge),
            ("<=", CompareOp::Le),
            ("!=", CompareOp::Ne),
            ("=", CompareOp::Eq),
            (">", CompareOp::Gt),
            ("<", CompareOp::Lt),
        ] {
            if let Some(rest) = self.input.strip_prefix(text) {
                self.input = rest;
                return Some(op);
            }
        }
        None
    }

    fn integer(&mut self) -> Option<i64> {
        self.skip_ws();
        let negative = self.input.strip_prefix('-').map(|rest| {
            self.input = rest;
        });
        let digits = consume_while(&mut self.input, |c| c.is_ascii_digit());
        let value = digits.parse::<i64>().ok()?;
        Some(if negative.is_some() { -value } else { value })
    }

    /// Parses a literal and coerces it to the column's type.
    fn literal(&mut self, prototype: &Value) -> std::result::Result<Value, String> {
        self.skip_ws();
        if self.input.starts_with('\'') {
            let text = self
                .quoted_string()
                .ok_or_else(|| "unterminated string literal".to_owned())?;
            return match prototype {
                Value::Varchar(.., len) => Ok(Value::Varchar(Some(text), *len)),
                Value::Uuid(..) => Uuid::parse_str(&text)
                    .map(|v| Value::Uuid(Some(v)))
                    .map_err(|_| format!("`{}` is not a valid uuid", text)),
                Value::Date(..) => time::Date::parse(
                    &text,
                    format_description!("[year]-[month]-[day]"),
                )
                .map(|v| Value::Date(Some(v)))
                .map_err(|_| format!("`{}` is not a valid date", text)),
                Value::Timestamp(..) => time::PrimitiveDateTime::parse(
                    &text,
                    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
                )
                .map(|v| Value::Timestamp(Some(v)))
                .map_err(|_| format!("`{}` is not a valid timestamp", text)),
                _ => Err(format!(
                    "string literal does not match column type {}",
                    prototype.type_name()
                )),
            };
        }
        if self.accept_keyword("true") {
            return boolean_literal(prototype, true);
        }
        if self.accept_keyword("false") {
            return boolean_literal(prototype, false);
        }
        let number = consume_while(&mut self.input, |c| {
            c.is_ascii_digit() || c == '-' || c == '.'
        });
        if number.is_empty() {
            return Err("expected a literal or `?`".into());
        }
        let bad = || format!("`{}` is not a valid {}", number, prototype.type_name());
        match prototype {
            Value::Int16(..) => number.parse().map(|v| Value::Int16(Some(v))).map_err(|_| bad()),
            Value::Int32(..) => number.parse().map(|v| Value::Int32(Some(v))).map_err(|_| bad()),
            Value::Int64(..) => number.parse().map(|v| Value::Int64(Some(v))).map_err(|_| bad()),
            Value::Float32(..) => {
                number.parse().map(|v| Value::Float32(Some(v))).map_err(|_| bad())
            }
            Value::Float64(..) => {
                number.parse().map(|v| Value::Float64(Some(v))).map_err(|_| bad())
            }
            Value::Decimal(.., prec, scale) => number
                .parse::<Decimal>()
                .map(|v| Value::Decimal(Some(v), *prec, *scale))
                .map_err(|_| format!("`{}` is not a valid decimal", number)),
            _ => Err(format!(
                "numeric literal does not match column type {}",
                prototype.type_name()
            )),
        }
    }

    fn quoted_string(&mut self) -> Option<String> {
        let mut chars = self.input.strip_prefix('\'')?.chars();
        let mut out = String::new();
        loop {
            match chars.next()? {
                '\'' => {
                    // '' is an escaped quote
                    if chars.as_str().starts_with('\'') {
                        chars.next();
                        out.push('\'');
                    } else {
                        self.input = chars.as_str();
                        return Some(out);
                    }
                }
                c => out.push(c),
            }
        }
    }
}

fn boolean_literal(prototype: &Value, value: bool) -> std::result::Result<Value, String> {
    match prototype {
        Value::Boolean(..) => Ok(Value::Boolean(Some(value))),
        _ => Err(format!(
            "boolean literal does not match column type {}",
            prototype.type_name()
        )),
    }
}
