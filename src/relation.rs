use crate::{
    ColumnModel, EntityDef, Error, FieldDef, FieldKind, KeyModel, QueryModel, Result, Value,
    util::storage_name,
};
use std::collections::HashMap;

/// The mapping of one entity type onto one table.
///
/// Built once from an [`EntityDef`], read-only afterwards, and safe to share
/// across sessions. Owns the column graph, the flattened leaf list, the
/// primary key and the compiled queries.
#[derive(Debug)]
pub struct RelationModel {
    name: String,
    columns: Vec<ColumnModel>,
    /// Flattened leaf columns in declaration order.
    leaves: Vec<ColumnModel>,
    leaf_by_column: HashMap<String, usize>,
    leaf_by_path: HashMap<String, usize>,
    primary_key: KeyModel,
    queries: Vec<QueryModel>,
}

impl RelationModel {
    pub fn build(def: &EntityDef) -> Result<Self> {
        if def.relation.is_empty() {
            return Err(Error::schema("", "relation name is empty"));
        }
        if def.fields.is_empty() {
            return Err(Error::schema(def.relation, "relation has no fields"));
        }
        check_sibling_names(def.relation, &def.fields)?;
        let mut columns = def
            .fields
            .iter()
            .map(|f| build_column(def.relation, f))
            .collect::<Result<Vec<_>>>()?;

        // Primary key binding happens on the tree so the flattened leaves
        // carry the flag.
        if def.primary_key.is_empty() {
            return Err(Error::schema(def.relation, "no primary key field designated"));
        }
        let pk_index = columns
            .iter()
            .position(|c| c.field_name == def.primary_key)
            .ok_or_else(|| {
                Error::schema(
                    def.relation,
                    format!("primary key references unknown field `{}`", def.primary_key),
                )
            })?;
        mark_primary_key(&mut columns[pk_index]);

        for column in &mut columns {
            resolve_names(column);
            assign_paths(column, "");
        }

        let mut leaves = Vec::new();
        for column in &columns {
            collect_leaves(column, &mut leaves);
        }
        let mut leaf_by_column = HashMap::with_capacity(leaves.len());
        let mut leaf_by_path = HashMap::with_capacity(leaves.len());
        for (i, leaf) in leaves.iter().enumerate() {
            if leaf_by_column
                .insert(leaf.column_name().to_owned(), i)
                .is_some()
            {
                return Err(Error::schema(
                    def.relation,
                    format!("duplicate column name `{}`", leaf.column_name()),
                ));
            }
            if leaf_by_path.insert(leaf.path.clone(), i).is_some() {
                return Err(Error::schema(
                    def.relation,
                    format!("duplicate field `{}`", leaf.path),
                ));
            }
        }

        let leaf_indices = leaves
            .iter()
            .enumerate()
            .filter(|(_, l)| l.in_primary_key)
            .map(|(i, _)| i)
            .collect();
        let mut path: Vec<String> = def.ancestors.iter().map(|a| (*a).to_owned()).collect();
        path.push(def.relation.to_owned());
        let primary_key = KeyModel {
            field_name: def.primary_key.to_owned(),
            leaf_indices,
            path,
        };

        let mut relation = Self {
            name: def.relation.to_owned(),
            columns,
            leaves,
            leaf_by_column,
            leaf_by_path,
            primary_key,
            queries: Vec::new(),
        };
        relation.queries = def
            .queries
            .iter()
            .map(|q| QueryModel::compile(&relation, q))
            .collect::<Result<Vec<_>>>()?;
        Ok(relation)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Top-level columns, declaration order.
    pub fn columns(&self) -> &[ColumnModel] {
        &self.columns
    }

    /// Flattened leaf columns, declaration order.
    pub fn leaves(&self) -> &[ColumnModel] {
        &self.leaves
    }

    /// Leaves outside the primary key, in declaration order. These form the
    /// UPDATE SET list.
    pub fn dependent_columns(&self) -> impl Iterator<Item = &ColumnModel> {
        self.leaves.iter().filter(|c| !c.in_primary_key)
    }

    pub fn primary_key_columns(&self) -> impl Iterator<Item = &ColumnModel> {
        self.leaves.iter().filter(|c| c.in_primary_key)
    }

    pub fn dependent_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.leaves
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.in_primary_key)
            .map(|(i, _)| i)
    }

    pub fn primary_key_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.leaves
            .iter()
            .enumerate()
            .filter(|(_, c)| c.in_primary_key)
            .map(|(i, _)| i)
    }

    /// Leaf index permutation from declaration order into statement binding
    /// order: dependent columns first, then primary key columns.
    pub fn write_order(&self) -> Vec<usize> {
        self.dependent_indices()
            .chain(self.primary_key_indices())
            .collect()
    }

    pub fn leaf(&self, column_name: &str) -> Option<&ColumnModel> {
        self.leaf_by_column.get(column_name).map(|i| &self.leaves[*i])
    }

    pub fn leaf_index(&self, column_name: &str) -> Option<usize> {
        self.leaf_by_column.get(column_name).copied()
    }

    /// Resolves a query field path (dotted field path or flat column name).
    pub fn resolve_path(&self, path: &str) -> Option<usize> {
        self.leaf_by_path
            .get(path)
            .or_else(|| self.leaf_by_column.get(path))
            .copied()
    }

    pub fn primary_key(&self) -> &KeyModel {
        &self.primary_key
    }

    pub fn queries(&self) -> &[QueryModel] {
        &self.queries
    }

    pub fn query(&self, name: &str) -> Option<&QueryModel> {
        self.queries.iter().find(|q| q.name() == name)
    }
}

fn check_sibling_names(relation: &str, fields: &[FieldDef]) -> Result<()> {
    for (i, field) in fields.iter().enumerate() {
        if fields[..i].iter().any(|f| f.name == field.name) {
            return Err(Error::schema(
                relation,
                format!("duplicate field name `{}`", field.name),
            ));
        }
    }
    Ok(())
}

fn build_column(relation: &str, field: &FieldDef) -> Result<ColumnModel> {
    if field.name.is_empty() {
        return Err(Error::schema(relation, "field with empty name"));
    }
    match &field.kind {
        FieldKind::Primitive(prototype) => {
            if matches!(prototype, Value::Null) {
                return Err(Error::schema(
                    relation,
                    format!("field `{}` has no column type", field.name),
                ));
            }
            let origin = field
                .column
                .map(str::to_owned)
                .unwrap_or_else(|| storage_name(field.name));
            Ok(ColumnModel {
                field_name: field.name.to_owned(),
                origin_name: Some(origin.clone()),
                column_name: Some(origin),
                value: Some(prototype.prototype()),
                nested: Vec::new(),
                in_primary_key: false,
                column_id: field.id,
                not_null: field.not_null,
                row_version: field.row_version,
                path: String::new(),
            })
        }
        FieldKind::Nested(fields) => {
            if fields.is_empty() {
                return Err(Error::schema(
                    relation,
                    format!("nested field `{}` has no columns", field.name),
                ));
            }
            check_sibling_names(relation, fields)?;
            let nested = fields
                .iter()
                .map(|f| build_column(relation, f))
                .collect::<Result<Vec<_>>>()?;
            let origin = field.column.map(str::to_owned);
            Ok(ColumnModel {
                field_name: field.name.to_owned(),
                origin_name: origin.clone(),
                column_name: origin,
                value: None,
                nested,
                in_primary_key: false,
                column_id: field.id,
                not_null: field.not_null,
                row_version: field.row_version,
                path: String::new(),
            })
        }
    }
}

fn mark_primary_key(column: &mut ColumnModel) {
    if column.value.is_some() {
        column.in_primary_key = true;
    }
    for child in &mut column.nested {
        mark_primary_key(child);
    }
}

/// Applies the nesting prefix rules top-down, before leaves are registered:
/// a single child inherits the parent's effective name (or keeps its own when
/// the parent has none); with multiple children a named parent prefixes each
/// child's origin name with `<parent>_`.
fn resolve_names(column: &mut ColumnModel) {
    let parent_name = column.column_name.clone();
    if column.nested.len() == 1 {
        let child = &mut column.nested[0];
        if parent_name.is_some() {
            child.column_name = parent_name;
        }
        resolve_names(child);
    } else {
        for child in &mut column.nested {
            if let Some(parent) = &parent_name {
                let own = child
                    .origin_name
                    .clone()
                    .unwrap_or_else(|| storage_name(&child.field_name));
                child.column_name = Some(format!("{}_{}", parent, own));
            }
            resolve_names(child);
        }
    }
}

fn assign_paths(column: &mut ColumnModel, prefix: &str) {
    column.path = if prefix.is_empty() {
        column.field_name.clone()
    } else {
        format!("{}.{}", prefix, column.field_name)
    };
    let prefix = column.path.clone();
    for child in &mut column.nested {
        assign_paths(child, &prefix);
    }
}

fn collect_leaves(column: &ColumnModel, into: &mut Vec<ColumnModel>) {
    if column.is_leaf() {
        into.push(column.clone());
    } else {
        for child in &column.nested {
            collect_leaves(child, into);
        }
    }
}
