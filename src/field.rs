use crate::save::Operation;
use crate::{Error, Result};

/// Which write operations the database supplies this field's value for.
///
/// A delegated operation omits the field's column from the generated
/// statement, so the database-side value (stored default, trigger, ...)
/// wins over whatever the record holds in memory.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Delegation {
    /// The database provides the value on insert.
    Insert,
    /// The database provides the value on update.
    Update,
    /// The database provides the value on every write; the field is only
    /// ever read back on select.
    Always,
}

/// Schema-time description of one column of a record type.
///
/// Built once through [`Field::new`] and immutable afterwards.
#[derive(Clone, Debug)]
pub struct Field {
    name: &'static str,
    primary_key: bool,
    auto: bool,
    use_on_insert: bool,
    use_on_update: bool,
}

impl Field {
    pub fn new(name: &'static str) -> FieldBuilder {
        FieldBuilder {
            name,
            primary_key: false,
            auto: false,
            delegation: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn auto(&self) -> bool {
        self.auto
    }

    pub fn use_on_insert(&self) -> bool {
        self.use_on_insert
    }

    pub fn use_on_update(&self) -> bool {
        self.use_on_update
    }

    pub fn use_on(&self, operation: Operation) -> bool {
        match operation {
            Operation::Insert => self.use_on_insert,
            Operation::Update => self.use_on_update,
        }
    }
}

pub struct FieldBuilder {
    name: &'static str,
    primary_key: bool,
    auto: bool,
    delegation: Option<Delegation>,
}

impl FieldBuilder {
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks the field as auto-generated by the database.
    pub fn auto(mut self) -> Self {
        self.auto = true;
        self
    }

    pub fn delegated(mut self, delegation: Delegation) -> Self {
        self.delegation = Some(delegation);
        self
    }

    /// Validates the configuration and computes the participation flags.
    ///
    /// A primary key can never be excluded from a write, so combining
    /// `primary_key` with any delegation fails here, at definition time.
    /// The one exception is an auto-generated primary key, which always
    /// participates in both operations regardless of the requested
    /// delegation.
    pub fn build(self) -> Result<Field> {
        let (use_on_insert, use_on_update) = match self.delegation {
            None => (true, true),
            Some(_) if self.primary_key && self.auto => (true, true),
            Some(_) if self.primary_key => {
                return Err(Error::Invalid(format!(
                    "primary key field {} cannot be delegated to the database",
                    self.name
                )))
            }
            Some(Delegation::Insert) => (false, true),
            Some(Delegation::Update) => (true, false),
            Some(Delegation::Always) => (false, false),
        };

        Ok(Field {
            name: self.name,
            primary_key: self.primary_key,
            auto: self.auto,
            use_on_insert,
            use_on_update,
        })
    }
}
