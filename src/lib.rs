use std::path::Path;

pub use rusqlite::Connection;

mod error;
pub use error::{Error, Result};

mod id;
pub use id::Id;

mod field;
pub use field::{Delegation, Field, FieldBuilder};

mod entity;
pub use entity::Entity;

pub mod save;
pub use save::{save, save_with, update_all, Operation, SaveOptions};


/// Owning wrapper around a sqlite connection.
///
/// The save coordinator only ever borrows the inner [`Connection`]; no
/// ambient connection registry is involved.
#[derive(
    derive_more::From,
    derive_more::Into,
    derive_more::Deref,
    derive_more::DerefMut,
)]
pub struct Database(Connection);

impl Database {
    pub fn open<T: AsRef<Path>>(path: T) -> Result<Self> {
        match Connection::open(path) {
            Ok(connection) => Ok(connection.into()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn memory() -> Result<Self> {
        match Connection::open_in_memory() {
            Ok(connection) => Ok(connection.into()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test::prelude::{assert_eq, Result, *};
    use crate::test::{Draft, Snapshot};
    use crate::{Database, Entity, Error, Id};

    #[test]
    fn open_memory() -> Result<()> {
        let db = Database::memory()?;
        db.execute_batch("CREATE TABLE probe (id INTEGER PRIMARY KEY);")?;

        Ok(())
    }

    #[test]
    fn find_round_trips_every_column() -> Result<()> {
        let db = test::db()?;

        let mut draft = Draft::new("text");
        draft.save(&db)?;
        draft.save(&db)?;

        let found = Draft::find(&db, draft.id().unwrap())?;
        assert_eq!(draft.id(), found.id());
        assert_eq!("text", found.body);

        Ok(())
    }

    #[test]
    fn find_reports_missing_records() -> Result<()> {
        let db = test::db()?;

        assert!(matches!(
            Snapshot::find(&db, Id::from(42)),
            Err(Error::NotFound)
        ));

        Ok(())
    }
}
