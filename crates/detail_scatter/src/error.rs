//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! invalid configuration, malformed ground meshes, undecodable prop kind tags, and
//! generic errors. Degenerate but well-formed input (zero-area triangles, empty groups)
//! is never an error; it simply produces fewer placements.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid ground mesh: {0}")]
    InvalidMesh(String),

    #[error("unknown detail prop kind tag {tag}")]
    UnknownPropKind { tag: u32 },

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_string_uses_other_variant() {
        let err: Error = String::from("boom").into();
        assert!(matches!(err, Error::Other(_)));
    }

    #[test]
    fn unknown_kind_message_names_tag() {
        let err = Error::UnknownPropKind { tag: 7 };
        assert_eq!(err.to_string(), "unknown detail prop kind tag 7");
    }

    #[test]
    fn invalid_mesh_message_is_prefixed() {
        let err = Error::InvalidMesh("4 vertices".into());
        assert_eq!(err.to_string(), "invalid ground mesh: 4 vertices");
    }
}
