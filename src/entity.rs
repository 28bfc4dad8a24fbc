use rusqlite::types::{Value, ValueRef};

use crate::{save, Connection, Error, Field, Id, Result, SaveOptions};

/// A record type the save coordinator knows how to persist.
///
/// `get` and `set` address fields by the names listed in [`Entity::fields`]
/// and report unknown names instead of panicking. The primary key is
/// accessed through [`Entity::id`] and [`Entity::set_id`], never through
/// `get`/`set`.
pub trait Entity: Sized {
    fn table_name() -> &'static str;
    fn fields() -> &'static [Field];

    fn id(&self) -> Option<Id>;
    fn set_id(&mut self, id: Id);

    fn get(&self, field: &str) -> Option<Value>;
    fn set(&mut self, field: &str, value: ValueRef<'_>) -> Result<()>;

    fn save(&mut self, db: &Connection) -> Result<()> {
        save::save(db, self, &SaveOptions::default())
    }

    /// Loads a record by primary key.
    ///
    /// Every field column is selected, delegated or not; delegation only
    /// governs writes.
    fn find(db: &Connection, id: Id) -> Result<Self>
    where
        Self: Default,
    {
        let columns = Self::fields()
            .iter()
            .map(Field::name)
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "SELECT {} FROM {} WHERE {} = ? LIMIT 1;",
            columns,
            Self::table_name(),
            save::primary_key_column::<Self>()?,
        );

        let mut statement = db.prepare(&query)?;
        let mut rows = statement.query([id])?;

        match rows.next()? {
            Some(row) => {
                let mut record = Self::default();
                for (index, field) in Self::fields().iter().enumerate() {
                    if field.primary_key() {
                        record.set_id(row.get(index)?);
                    } else {
                        record.set(field.name(), row.get_ref(index)?)?;
                    }
                }
                Ok(record)
            }
            None => Err(Error::NotFound),
        }
    }
}
