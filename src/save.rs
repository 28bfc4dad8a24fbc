use rusqlite::types::Value;

use crate::{Connection, Entity, Error, Field, Result};

/// The kind of write a save call performs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Insert,
    Update,
}

/// Options for a single save call.
#[derive(Copy, Clone, Debug, Default)]
pub struct SaveOptions {
    /// Re-read database-supplied values after the write.
    pub force_fetch: bool,
    /// Bypass delegation entirely and write every field as-is. Meant for
    /// loading externally prepared data such as fixtures.
    pub raw: bool,
}

/// Persists `record`, inserting when it has no primary key yet and
/// updating otherwise.
pub fn save<E: Entity>(
    db: &Connection,
    record: &mut E,
    options: &SaveOptions,
) -> Result<()> {
    let operation = if record.id().is_some() {
        Operation::Update
    } else {
        Operation::Insert
    };

    save_with(db, record, operation, options)
}

/// Persists `record` with an explicit operation kind.
///
/// At most two round trips: the write, then one refresh read when
/// `force_fetch` is set and at least one field was excluded from the
/// write's column list. A raw save never refreshes. An update whose
/// column list ends up empty performs no database work at all.
pub fn save_with<E: Entity>(
    db: &Connection,
    record: &mut E,
    operation: Operation,
    options: &SaveOptions,
) -> Result<()> {
    let written = match operation {
        Operation::Insert => insert(db, record, options)?,
        Operation::Update => update(db, record, options)?,
    };

    if written && options.force_fetch && !options.raw {
        refresh(db, record, operation)?;
    }

    Ok(())
}

/// Updates the named columns on every row of E's table, regardless of
/// delegation policy.
///
/// This deliberately mirrors the per-instance asymmetry of the original
/// behavior: delegation applies to instance saves only.
pub fn update_all<E: Entity>(
    db: &Connection,
    values: &[(&str, Value)],
) -> Result<usize> {
    if values.is_empty() {
        return Err(Error::Invalid(
            "update_all requires at least one assignment".to_string(),
        ));
    }

    for (name, _) in values {
        if !E::fields().iter().any(|field| field.name() == *name) {
            return Err(Error::UnknownField((*name).to_string()));
        }
    }

    let assignments = values
        .iter()
        .enumerate()
        .map(|(index, (name, _))| format!("{} = ?{}", name, index + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let query =
        format!("UPDATE {} SET {};", E::table_name(), assignments);
    log::debug!("update_all: {query}");

    let params = values.iter().map(|(_, value)| value.clone());

    Ok(db
        .prepare(&query)?
        .execute(rusqlite::params_from_iter(params))?)
}

pub(crate) fn primary_key_column<E: Entity>() -> Result<&'static str> {
    E::fields()
        .iter()
        .find(|field| field.primary_key())
        .map(Field::name)
        .ok_or_else(|| {
            Error::Invalid(format!(
                "{} has no primary key field",
                E::table_name()
            ))
        })
}

fn value<E: Entity>(record: &E, field: &Field) -> Result<Value> {
    record
        .get(field.name())
        .ok_or_else(|| Error::UnknownField(field.name().to_string()))
}

fn insert<E: Entity>(
    db: &Connection,
    record: &mut E,
    options: &SaveOptions,
) -> Result<bool> {
    let mut columns = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    for field in E::fields() {
        if field.primary_key() {
            continue;
        }
        if !options.raw && !field.use_on(Operation::Insert) {
            continue;
        }
        columns.push(field.name());
        values.push(value(record, field)?);
    }

    // A record loaded from external data may already carry its primary
    // key; otherwise the database assigns one.
    if let Some(id) = record.id() {
        columns.push(primary_key_column::<E>()?);
        values.push(Value::Integer(id.into()));
    }

    let query = if columns.is_empty() {
        format!(
            "INSERT INTO {} DEFAULT VALUES RETURNING {};",
            E::table_name(),
            primary_key_column::<E>()?,
        )
    } else {
        let placeholders = (1..=values.len())
            .map(|n| format!("?{n}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {};",
            E::table_name(),
            columns.join(", "),
            placeholders,
            primary_key_column::<E>()?,
        )
    };
    log::debug!("insert: {query}");

    let id = db
        .prepare(&query)?
        .query_row(rusqlite::params_from_iter(values), |row| row.get(0))?;
    record.set_id(id);

    Ok(true)
}

fn update<E: Entity>(
    db: &Connection,
    record: &mut E,
    options: &SaveOptions,
) -> Result<bool> {
    let id = record.id().ok_or(Error::NotPersisted)?;

    let mut assignments = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    for field in E::fields() {
        if field.primary_key() {
            continue;
        }
        if !options.raw && !field.use_on(Operation::Update) {
            continue;
        }
        values.push(value(record, field)?);
        assignments.push(format!("{} = ?{}", field.name(), values.len()));
    }

    if assignments.is_empty() {
        log::debug!(
            "update {}: no participating columns, skipping",
            E::table_name()
        );
        return Ok(false);
    }

    values.push(Value::Integer(id.into()));
    let query = format!(
        "UPDATE {} SET {} WHERE {} = ?{};",
        E::table_name(),
        assignments.join(", "),
        primary_key_column::<E>()?,
        values.len(),
    );
    log::debug!("update: {query}");

    db.prepare(&query)?
        .execute(rusqlite::params_from_iter(values))?;

    Ok(true)
}

/// Reads back the fields the write left to the database and assigns them
/// onto the record.
fn refresh<E: Entity>(
    db: &Connection,
    record: &mut E,
    operation: Operation,
) -> Result<()> {
    let excluded = E::fields()
        .iter()
        .filter(|field| !field.primary_key() && !field.use_on(operation))
        .collect::<Vec<_>>();

    if excluded.is_empty() {
        return Ok(());
    }

    let id = record.id().ok_or(Error::NotPersisted)?;
    let columns = excluded
        .iter()
        .map(|field| field.name())
        .collect::<Vec<_>>()
        .join(", ");
    let query = format!(
        "SELECT {} FROM {} WHERE {} = ? LIMIT 1;",
        columns,
        E::table_name(),
        primary_key_column::<E>()?,
    );
    log::debug!("refresh: {query}");

    let mut statement = db.prepare(&query)?;
    let mut rows = statement.query([id])?;

    match rows.next()? {
        Some(row) => {
            for (index, field) in excluded.iter().enumerate() {
                record.set(field.name(), row.get_ref(index)?)?;
            }
            Ok(())
        }
        None => Err(Error::NotFound),
    }
}
