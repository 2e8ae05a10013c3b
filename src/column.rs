use crate::Value;

/// One entity field mapped onto one or more physical columns.
///
/// A leaf carries a type prototype and no nested columns; a structured field
/// carries nested columns and no type. Instances are built once by
/// [`RelationModel::build`](crate::RelationModel::build) and never mutated
/// afterwards; naming is resolved top-down at build time, so no parent
/// back-reference is kept.
#[derive(Debug, Clone)]
pub struct ColumnModel {
    pub(crate) field_name: String,
    /// Explicit column name, or the storage form of the field name for
    /// leaves. Structured fields carry a name only when given explicitly.
    pub(crate) origin_name: Option<String>,
    /// Effective column name after the nesting prefix rules.
    pub(crate) column_name: Option<String>,
    /// Type prototype, present iff this is a leaf.
    pub(crate) value: Option<Value>,
    /// Nested columns, non-empty iff this is a structured field.
    pub(crate) nested: Vec<ColumnModel>,
    pub(crate) in_primary_key: bool,
    /// Numeric id used for binary codec field numbering.
    pub(crate) column_id: u32,
    pub(crate) not_null: bool,
    pub(crate) row_version: bool,
    /// Dotted field path from the relation root, e.g. `address.city`.
    pub(crate) path: String,
}

impl ColumnModel {
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn origin_name(&self) -> Option<&str> {
        self.origin_name.as_deref()
    }

    /// Effective column name. Structured fields without an explicit name fall
    /// back to the field name for display purposes; leaves always carry one.
    pub fn column_name(&self) -> &str {
        self.column_name.as_deref().unwrap_or(&self.field_name)
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn is_leaf(&self) -> bool {
        self.value.is_some()
    }

    pub fn nested(&self) -> &[ColumnModel] {
        &self.nested
    }

    pub fn in_primary_key(&self) -> bool {
        self.in_primary_key
    }

    pub fn column_id(&self) -> u32 {
        self.column_id
    }

    pub fn not_null(&self) -> bool {
        self.not_null
    }

    pub fn row_version(&self) -> bool {
        self.row_version
    }

    /// Dotted field path from the relation root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// All descendant leaves of this column, in declaration order.
    pub fn leaf_columns(&self) -> Vec<&ColumnModel> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, into: &mut Vec<&'a ColumnModel>) {
        if self.is_leaf() {
            into.push(self);
        } else {
            for child in &self.nested {
                child.collect_leaves(into);
            }
        }
    }
}
