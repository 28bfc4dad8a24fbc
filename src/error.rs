use rusqlite::types::FromSqlError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Sqlite error")]
    Sqlite(rusqlite::Error),
    #[error("Not found")]
    NotFound,
    #[error("Not persisted")]
    NotPersisted,
    #[error("Conflict with existing data. {0}")]
    NonUnique(String),
    #[error("Invalid. {0}")]
    Invalid(String),
    #[error("Unknown field {0}")]
    UnknownField(String),
    #[error("Reading field value")]
    FieldRead(#[from] FromSqlError),
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.extended_code == 2067 =>
            {
                Error::NonUnique(msg.unwrap_or_default())
            }
            _ => Error::Sqlite(e),
        }
    }
}
