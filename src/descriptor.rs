use crate::Value;

/// Statically declared metadata for one entity type.
///
/// This is the explicit stand-in for the reflective discovery mechanism the
/// crate deliberately does not include: whatever produces field and relation
/// metadata upstream registers it here, eagerly, before any schema or SQL is
/// generated.
#[derive(Debug, Clone)]
pub struct EntityDef {
    /// Table name backing the entity.
    pub relation: &'static str,
    /// Fields in declaration order.
    pub fields: Vec<FieldDef>,
    /// Field name designated as primary key.
    pub primary_key: &'static str,
    /// Ancestor relation names for hierarchical keys, outermost first.
    pub ancestors: Vec<&'static str>,
    pub queries: Vec<QueryDef>,
}

impl EntityDef {
    pub fn new(relation: &'static str, primary_key: &'static str) -> Self {
        Self {
            relation,
            fields: Vec::new(),
            primary_key,
            ancestors: Vec::new(),
            queries: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn ancestor(mut self, relation: &'static str) -> Self {
        self.ancestors.push(relation);
        self
    }

    pub fn query(mut self, query: QueryDef) -> Self {
        self.queries.push(query);
        self
    }
}

#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: &'static str,
    /// Explicit column name; derived from the field name when absent.
    pub column: Option<&'static str>,
    pub kind: FieldKind,
    /// Numeric field id for binary codec numbering.
    pub id: u32,
    pub row_version: bool,
    pub not_null: bool,
}

#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Leaf column; the prototype carries type, length, precision.
    Primitive(Value),
    /// Structured field, flattened into the columns of its sub-fields.
    Nested(Vec<FieldDef>),
}

impl FieldDef {
    pub fn primitive(name: &'static str, value: Value) -> Self {
        Self {
            name,
            column: None,
            kind: FieldKind::Primitive(value),
            id: 0,
            row_version: false,
            not_null: false,
        }
    }

    pub fn nested(name: &'static str, fields: Vec<FieldDef>) -> Self {
        Self {
            name,
            column: None,
            kind: FieldKind::Nested(fields),
            id: 0,
            row_version: false,
            not_null: false,
        }
    }

    pub fn column(mut self, column: &'static str) -> Self {
        self.column = Some(column);
        self
    }

    pub fn id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }

    pub fn row_version(mut self) -> Self {
        self.row_version = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }
}

/// A declarative query attached to an entity accessor.
#[derive(Debug, Clone)]
pub struct QueryDef {
    pub name: &'static str,
    /// `[WHERE <cond>] [ORDER BY ...] [LIMIT <n|?>]`
    pub text: &'static str,
    /// Declared accessor parameters, in signature order.
    pub params: Vec<(&'static str, Value)>,
}

impl QueryDef {
    pub fn new(name: &'static str, text: &'static str) -> Self {
        Self {
            name,
            text,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, name: &'static str, prototype: Value) -> Self {
        self.params.push((name, prototype));
        self
    }
}
