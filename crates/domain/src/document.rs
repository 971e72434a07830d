//! Document model for the `/document/v1/` API
//!
//! A [`Document`] is a single logical operation (put, update or remove)
//! against one document, identified by a structured [`DocumentId`]. Reads
//! use a bare [`DocumentId`].

use std::fmt;
use std::str::FromStr;

use crate::errors::IdParseError;
use crate::impl_enum_string_conversions;

/// Structured document identifier.
///
/// Parsed from and re-emitted as the canonical string form
/// `id:<namespace>:<type>:[n=<number>|g=<group>]:<user-specific>`, where the
/// location part is either a 64-bit unsigned number, a group name, or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DocumentId {
    pub namespace: String,
    pub doc_type: String,
    /// Numeric location, e.g. `id:ns:music:n=123:doc`.
    pub number: Option<u64>,
    /// Group location, e.g. `id:ns:music:g=popular:doc`. Must be non-empty
    /// when present; [`DocumentId::parse`] enforces this.
    pub group: Option<String>,
    pub user_specific: String,
}

impl DocumentId {
    /// Parse a document id from its canonical serialized form.
    ///
    /// # Errors
    ///
    /// Returns [`IdParseError`] when the scheme is not `id`, a mandatory
    /// part is empty, the location part is malformed, or the numeric
    /// location does not fit in a `u64`.
    pub fn parse(serialized: &str) -> Result<Self, IdParseError> {
        let invalid = || IdParseError::InvalidFormat(serialized.to_string());
        let parts: Vec<&str> = serialized.splitn(4, ':').collect();
        if parts.len() < 4 || parts[0] != "id" {
            return Err(invalid());
        }
        let namespace = parts[1];
        if namespace.is_empty() {
            return Err(invalid());
        }
        let doc_type = parts[2];
        if doc_type.is_empty() {
            return Err(invalid());
        }
        // The location part never contains ':', but the user-specific part
        // may, so only the first ':' of the remainder separates them.
        let rest: Vec<&str> = parts[3].splitn(2, ':').collect();
        if rest.len() < 2 {
            return Err(invalid());
        }
        let location = rest[0];
        let user_specific = rest[1];
        if user_specific.is_empty() {
            return Err(invalid());
        }
        let mut number = None;
        let mut group = None;
        if let Some(value) = location.strip_prefix("n=") {
            let n = value.parse::<u64>().map_err(|_| IdParseError::InvalidNumber {
                id: serialized.to_string(),
                value: value.to_string(),
            })?;
            number = Some(n);
        } else if let Some(value) = location.strip_prefix("g=") {
            if value.is_empty() {
                return Err(IdParseError::EmptyGroup(serialized.to_string()));
            }
            group = Some(value.to_string());
        } else if !location.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            namespace: namespace.to_string(),
            doc_type: doc_type.to_string(),
            number,
            group,
            user_specific: user_specific.to_string(),
        })
    }
}

impl FromStr for DocumentId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id:{}:{}:", self.namespace, self.doc_type)?;
        if let Some(number) = self.number {
            write!(f, "n={number}")?;
        } else if let Some(group) = &self.group {
            write!(f, "g={group}")?;
        }
        write!(f, ":{}", self.user_specific)
    }
}

/// The kind of write operation a [`Document`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Put,
    Update,
    Remove,
}

impl_enum_string_conversions!(Operation {
    Put => "put",
    Update => "update",
    Remove => "remove",
});

/// Request body compression policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Compress bodies above a size threshold.
    #[default]
    Auto,
    /// Never compress.
    None,
    /// Always compress non-empty bodies.
    Gzip,
}

impl_enum_string_conversions!(Compression {
    Auto => "auto",
    None => "none",
    Gzip => "gzip",
});

/// A single logical document operation, as submitted by callers.
///
/// The payload is opaque JSON bytes and may be empty for removes. The
/// optional condition is a server-evaluated test-and-set predicate; an
/// unsatisfied condition turns the operation into a no-op answered with
/// HTTP 412.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: DocumentId,
    pub operation: Operation,
    pub body: Vec<u8>,
    pub condition: Option<String>,
    /// Ask the server to create the document if it does not exist.
    pub create: bool,
}

impl Document {
    pub fn new(id: DocumentId, operation: Operation, body: Vec<u8>) -> Self {
        Self { id, operation, body, condition: None, create: false }
    }

    /// A put of `body` to `id`.
    pub fn put(id: DocumentId, body: Vec<u8>) -> Self {
        Self::new(id, Operation::Put, body)
    }

    /// A partial update of `id` with `body`.
    pub fn update(id: DocumentId, body: Vec<u8>) -> Self {
        Self::new(id, Operation::Update, body)
    }

    /// A remove of `id`. Removes carry no payload.
    pub fn remove(id: DocumentId) -> Self {
        Self::new(id, Operation::Remove, Vec::new())
    }

    /// Attach a test-and-set condition.
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Set the create-if-missing flag.
    pub fn with_create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }
}
