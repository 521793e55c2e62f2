use std::fmt;

/// Result type for roundtrace-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// A record or content block that failed validation.
///
/// `field` is a path into the offending record, e.g. `content[2].tool_use_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedInput {
    pub field: String,
    pub reason: String,
}

impl MalformedInput {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Prefix the field path with a parent segment (`message` + `role` -> `message.role`)
    pub(crate) fn nested(self, parent: &str) -> Self {
        let field = if self.field.starts_with('[') {
            format!("{}{}", parent, self.field)
        } else {
            format!("{}.{}", parent, self.field)
        };
        Self {
            field,
            reason: self.reason,
        }
    }
}

impl fmt::Display for MalformedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed field `{}`: {}", self.field, self.reason)
    }
}

/// Error types that can occur in the types layer
#[derive(Debug)]
pub enum Error {
    /// A record failed schema validation
    Malformed(MalformedInput),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Malformed(err) => write!(f, "Malformed input: {}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<MalformedInput> for Error {
    fn from(err: MalformedInput) -> Self {
        Error::Malformed(err)
    }
}
