use crate::Location;

/// Errors raised while building or flattening a CallFlow.
///
/// Every error is permanent: it indicates a malformed document or wire
/// payload rather than a transient condition, and is never retried.
/// Errors name the offending field as a JSON pointer into the
/// configuration document.
#[must_use]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{ptr}: expected {expected}, but found {found}")]
    Shape {
        ptr: String,
        expected: &'static str,
        found: String,
    },
    #[error("{ptr}: call-routing tree exceeds the maximum depth of {max_depth} levels")]
    DepthExceeded { ptr: String, max_depth: usize },
    #[error(
        "{ptr}: desired list has {desired} entries but the remote has {remote}, and length mismatches are rejected"
    )]
    LengthMismatch {
        ptr: String,
        desired: usize,
        remote: usize,
    },
    #[error("{id:?} is not a valid remote id (expected a non-negative integer)")]
    InvalidRemoteId { id: String },
}

impl Error {
    pub(crate) fn shape(loc: Location, expected: &'static str, found: &serde_json::Value) -> Self {
        let mut found = found.to_string();
        if found.len() > 64 {
            let mut end = 61;
            while !found.is_char_boundary(end) {
                end -= 1;
            }
            found.truncate(end);
            found.push_str("...");
        }
        Error::Shape {
            ptr: loc.pointer_str().to_string(),
            expected,
            found,
        }
    }

    /// Returns the JSON pointer of the offending field, if the error has one.
    pub fn ptr(&self) -> Option<&str> {
        match self {
            Error::Shape { ptr, .. }
            | Error::DepthExceeded { ptr, .. }
            | Error::LengthMismatch { ptr, .. } => Some(ptr),
            Error::InvalidRemoteId { .. } => None,
        }
    }
}
