use std::io;
use thiserror::Error;

use crate::part::Part;

/// Malformed media-type / parameter syntax in a Content-Type or
/// Content-Disposition value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no media type")]
    Empty,
    #[error("invalid media type: {0}")]
    Syntax(String),
    #[error("duplicate parameter name: {0}")]
    DuplicateParameter(String),
}

#[derive(Error, Debug)]
pub enum MultimimeError {
    #[error("not an email: {0}")]
    NotAnEmail(String),
    #[error("missing Content-Type header")]
    MissingContentType,
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("not multipart: {0}")]
    NotMultipart(String),
    #[error("multipart stream ended before the closing delimiter")]
    TruncatedMultipart,
    #[error("malformed part header: {0}")]
    PartHeader(String),
    #[error("header block exceeds {0} bytes")]
    HeaderTooLarge(usize),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl MultimimeError {
    /// Recovers the error carried by an `io::Error` produced by a part body.
    pub(crate) fn from_body_error(err: io::Error) -> Self {
        match err.downcast::<MultimimeError>() {
            Ok(own) => own,
            Err(err) => MultimimeError::Io(err),
        }
    }
}

impl From<MultimimeError> for io::Error {
    fn from(err: MultimimeError) -> Self {
        match err {
            MultimimeError::Io(e) => e,
            other => {
                let kind = match other {
                    MultimimeError::TruncatedMultipart => io::ErrorKind::UnexpectedEof,
                    _ => io::ErrorKind::InvalidData,
                };
                io::Error::new(kind, other)
            }
        }
    }
}

/// A part body read that failed after `content` was accumulated.
#[derive(Error, Debug)]
#[error("part body read failed after {} byte(s)", .content.len())]
pub struct PartialContent {
    pub content: Vec<u8>,
    #[source]
    pub error: MultimimeError,
}

/// A collection that stopped on a fatal error.
///
/// `parts` holds what was matched before the failure, in stream order.
#[derive(Error, Debug)]
#[error("collection stopped after {} part(s): {error}", .parts.len())]
pub struct CollectError {
    pub parts: Vec<Part>,
    #[source]
    pub error: MultimimeError,
}

impl CollectError {
    pub fn into_parts(self) -> (Vec<Part>, MultimimeError) {
        (self.parts, self.error)
    }
}

impl From<MultimimeError> for CollectError {
    fn from(error: MultimimeError) -> Self {
        CollectError {
            parts: vec![],
            error,
        }
    }
}

impl From<PartialContent> for MultimimeError {
    fn from(err: PartialContent) -> Self {
        err.error
    }
}
