//! Error taxonomy of the container layer.
//!
//! The typed variants below are the identities callers match on; decode
//! and encode paths wrap them (and any underlying I/O errors) with an
//! `error decoding <tag> chunk` style context, so the original error
//! stays reachable through [`anyhow::Error::downcast_ref`].

use std::fmt::Display;
use std::io::{self, ErrorKind};

use thiserror::Error;

use crate::tag::Tag;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RiffError {
    /// The file does not start with the RIFF magic tag.
    #[error("not RIFF file")]
    NotRiff,

    /// A chunk or field is shorter than its defined length.
    #[error("length too short")]
    TooShort,

    /// A chunk size disagrees with its content.
    #[error("chunk size mismatch")]
    SizeMismatch,

    /// A decoder in skip-data mode was used in a write context.
    #[error("decoder in meta only mode used in write context")]
    SkipDataMode,

    /// A singleton tag was seen twice at one level.
    #[error("chunk {0} already seen")]
    DuplicateChunk(Tag),

    /// More bytes consumed than the list declared before a complete
    /// child was read.
    #[error("invalid LIST chunk")]
    InvalidList,
}

/// True when the error chain bottoms out in an unexpected end of input,
/// letting callers tell truncation apart from other failure classes.
pub fn is_unexpected_eof(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|e| e.kind() == ErrorKind::UnexpectedEof)
    })
}

// Context strings for chunk decoding and encoding errors.
pub(crate) fn ctx_decode(id: impl Display) -> String {
    format!("error decoding {id} chunk")
}

pub(crate) fn ctx_encode(id: impl Display) -> String {
    format!("error encoding {id} chunk")
}

// ASCII representation of two chunk tags joined with ':', used for
// chunks that live only inside a list.
pub(crate) fn link(id1: Tag, id2: Tag) -> String {
    format!("{id1}:{id2}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use pretty_assertions::assert_eq;

    #[test]
    fn context_preserves_identity() {
        let err: anyhow::Error = Err::<(), _>(RiffError::TooShort)
            .context(ctx_decode(Tag::new(*b"fmt ")))
            .unwrap_err();
        assert_eq!(format!("{err}"), "error decoding fmt  chunk");
        assert_eq!(err.downcast_ref::<RiffError>(), Some(&RiffError::TooShort));
    }

    #[test]
    fn eof_detected_through_wrapping() {
        let io_err = io::Error::from(ErrorKind::UnexpectedEof);
        let err: anyhow::Error = Err::<(), _>(io_err)
            .context(ctx_decode(Tag::new(*b"data")))
            .unwrap_err();
        assert!(is_unexpected_eof(&err));

        let other: anyhow::Error = anyhow::anyhow!(RiffError::NotRiff);
        assert!(!is_unexpected_eof(&other));
    }

    #[test]
    fn linked_ids_render_both_tags() {
        assert_eq!(link(Tag::new(*b"LIST"), Tag::new(*b"labl")), "LIST:labl");
    }
}
