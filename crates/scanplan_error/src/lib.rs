//! Error type used throughout the workspace.
//!
//! A single error type keeps signatures simple. The `ErrorKind` carried on
//! the error lets callers tell apart failures they may want to recover from
//! (e.g. a persisted plan that can no longer be loaded) from programmer
//! errors.

use std::error::Error;
use std::fmt;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

/// Broad classification of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An invariant about plan shape was violated. Indicates a bug in
    /// whatever built the plan.
    Internal,
    /// Persisted bytes or documents could not be turned back into a plan.
    Serialization,
    /// A source cannot be reconstructed since it has neither a state codec
    /// nor a bind function.
    Unreconstructible,
    /// A caller tried to set a value that would break a node invariant.
    InvalidInput,
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal => write!(f, "Internal"),
            Self::Serialization => write!(f, "Serialization"),
            Self::Unreconstructible => write!(f, "Unreconstructible"),
            Self::InvalidInput => write!(f, "Invalid input"),
            Self::Other => write!(f, "Other"),
        }
    }
}

#[derive(Debug)]
struct DbErrorInner {
    msg: String,
    kind: ErrorKind,
    source: Option<Box<dyn Error + Send + Sync>>,
    fields: Vec<(String, String)>,
}

#[derive(Debug)]
pub struct DbError {
    inner: Box<DbErrorInner>,
}

impl DbError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self::new_with_kind(ErrorKind::Other, msg)
    }

    pub fn new_with_kind(kind: ErrorKind, msg: impl Into<String>) -> Self {
        DbError {
            inner: Box::new(DbErrorInner {
                msg: msg.into(),
                kind,
                source: None,
                fields: Vec::new(),
            }),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new_with_kind(ErrorKind::Internal, msg)
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::new_with_kind(ErrorKind::Serialization, msg)
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new_with_kind(ErrorKind::InvalidInput, msg)
    }

    pub fn with_source(msg: impl Into<String>, source: Box<dyn Error + Send + Sync>) -> Self {
        let mut err = Self::new(msg);
        err.inner.source = Some(source);
        err
    }

    /// Attach a key/value pair providing additional context.
    pub fn with_field(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.inner.fields.push((key.into(), value.to_string()));
        self
    }

    /// Override the kind of this error.
    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.inner.kind = kind;
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.inner.kind
    }

    pub fn get_msg(&self) -> &str {
        &self.inner.msg
    }

    /// Get the value for a context field if it was set.
    pub fn get_field(&self, key: &str) -> Option<&str> {
        self.inner
            .fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.msg)?;
        for (key, value) in &self.inner.fields {
            write!(f, "\n  {key}: {value}")?;
        }
        if let Some(source) = &self.inner.source {
            write!(f, "\nError source: {source}")?;
        }
        Ok(())
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl From<fmt::Error> for DbError {
    fn from(value: fmt::Error) -> Self {
        DbError::with_source("Format error", Box::new(value))
    }
}

impl From<prost::DecodeError> for DbError {
    fn from(value: prost::DecodeError) -> Self {
        DbError::with_source("Failed to decode message", Box::new(value))
            .with_kind(ErrorKind::Serialization)
    }
}

impl From<prost::EncodeError> for DbError {
    fn from(value: prost::EncodeError) -> Self {
        DbError::with_source("Failed to encode message", Box::new(value))
            .with_kind(ErrorKind::Serialization)
    }
}

impl From<serde_json::Error> for DbError {
    fn from(value: serde_json::Error) -> Self {
        DbError::with_source("Failed to (de)serialize document", Box::new(value))
            .with_kind(ErrorKind::Serialization)
    }
}

pub trait OptionExt<T> {
    /// Return an error if the option is None.
    fn required(self, msg: &'static str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn required(self, msg: &'static str) -> Result<T> {
        self.ok_or_else(|| DbError::new(format!("Missing required value: {msg}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_fields_and_source() {
        let err = DbError::with_source(
            "outer",
            Box::new(std::io::Error::other("inner problem")),
        )
        .with_field("index", 4)
        .with_field("len", 2);

        let s = err.to_string();
        assert_eq!("outer\n  index: 4\n  len: 2\nError source: inner problem", s);
        assert_eq!(Some("4"), err.get_field("index"));
        assert_eq!(None, err.get_field("missing"));
    }

    #[test]
    fn kinds() {
        assert_eq!(ErrorKind::Other, DbError::new("a").kind());
        assert_eq!(ErrorKind::Internal, DbError::internal("a").kind());
        assert_eq!(
            ErrorKind::Unreconstructible,
            DbError::new("a")
                .with_kind(ErrorKind::Unreconstructible)
                .kind()
        );
    }

    #[test]
    fn required_on_none() {
        let v: Option<i32> = None;
        let err = v.required("thing").unwrap_err();
        assert_eq!("Missing required value: thing", err.get_msg());
    }
}
