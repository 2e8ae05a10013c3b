use crate::{
    Backend, Error, RelationModel, Result, Row, RowLabeled, SqlDialect, Value, access,
};

/// Typed entity surface over the batched access layer.
///
/// Implementations pair a struct with the [`RelationModel`] built from its
/// descriptor, registered eagerly at startup and shared for the process
/// lifetime.
pub trait Entity {
    fn relation() -> &'static RelationModel;

    /// Leaf values in declaration order.
    fn to_row(&self) -> Row;

    fn from_row(row: &RowLabeled) -> Result<Self>
    where
        Self: Sized;

    /// Primary key leaf values in declaration order.
    fn key(&self) -> Row {
        let row = self.to_row();
        Self::relation()
            .primary_key_indices()
            .map(|i| row[i].clone())
            .collect()
    }

    fn create_table<B: Backend + ?Sized>(db: &mut B, dialect: &dyn SqlDialect) -> Result<()> {
        let relation = Self::relation();
        let mut sql = String::with_capacity(256);
        dialect.write_create_table(&mut sql, relation)?;
        db.execute(&sql, &[])
            .map_err(|e| dialect.convert_error("create", relation.name(), e))?;
        Ok(())
    }

    fn insert_many<B: Backend + ?Sized>(
        db: &mut B,
        dialect: &dyn SqlDialect,
        items: &[Self],
    ) -> Result<()>
    where
        Self: Sized,
    {
        let rows: Vec<Row> = items.iter().map(Entity::to_row).collect();
        access::insert_many(db, dialect, Self::relation(), &rows)
    }

    fn update_many<B: Backend + ?Sized>(
        db: &mut B,
        dialect: &dyn SqlDialect,
        items: &[Self],
    ) -> Result<()>
    where
        Self: Sized,
    {
        let rows: Vec<Row> = items.iter().map(Entity::to_row).collect();
        access::update_many(db, dialect, Self::relation(), &rows)
    }

    fn upsert_many<B: Backend + ?Sized>(
        db: &mut B,
        dialect: &dyn SqlDialect,
        items: &[Self],
    ) -> Result<()>
    where
        Self: Sized,
    {
        let rows: Vec<Row> = items.iter().map(Entity::to_row).collect();
        access::upsert_many(db, dialect, Self::relation(), &rows)
    }

    fn delete_many<B: Backend + ?Sized>(
        db: &mut B,
        dialect: &dyn SqlDialect,
        items: &[Self],
    ) -> Result<()>
    where
        Self: Sized,
    {
        let keys: Vec<Row> = items.iter().map(|v| v.key()).collect();
        access::delete_many(db, dialect, Self::relation(), &keys)
    }

    fn insert<B: Backend + ?Sized>(&self, db: &mut B, dialect: &dyn SqlDialect) -> Result<()>
    where
        Self: Sized,
    {
        Self::insert_many(db, dialect, std::slice::from_ref(self))
    }

    fn update<B: Backend + ?Sized>(&self, db: &mut B, dialect: &dyn SqlDialect) -> Result<()>
    where
        Self: Sized,
    {
        Self::update_many(db, dialect, std::slice::from_ref(self))
    }

    fn upsert<B: Backend + ?Sized>(&self, db: &mut B, dialect: &dyn SqlDialect) -> Result<()>
    where
        Self: Sized,
    {
        Self::upsert_many(db, dialect, std::slice::from_ref(self))
    }

    fn delete<B: Backend + ?Sized>(&self, db: &mut B, dialect: &dyn SqlDialect) -> Result<()>
    where
        Self: Sized,
    {
        Self::delete_many(db, dialect, std::slice::from_ref(self))
    }

    fn find_by_key<B: Backend + ?Sized>(
        db: &mut B,
        dialect: &dyn SqlDialect,
        key: &[Value],
    ) -> Result<Option<Self>>
    where
        Self: Sized,
    {
        access::fetch_by_key(db, dialect, Self::relation(), key)?
            .map(|row| Self::from_row(&row))
            .transpose()
    }

    /// Runs one of the relation's named queries with the accessor arguments.
    fn find_where<B: Backend + ?Sized>(
        db: &mut B,
        dialect: &dyn SqlDialect,
        query: &str,
        args: &[Value],
    ) -> Result<Vec<Self>>
    where
        Self: Sized,
    {
        let relation = Self::relation();
        let query = relation.query(query).ok_or_else(|| {
            Error::schema(relation.name(), format!("unknown query `{}`", query))
        })?;
        access::fetch_query(db, dialect, relation, query, args)?
            .iter()
            .map(Self::from_row)
            .collect()
    }
}
