/// Streaming walk over the parts of a multipart body
pub mod multipart;

/// Media type and disposition predicates
pub mod classify;

use std::borrow::Cow;
use std::fmt;

use crate::header::HeaderMap;

/// A part whose body was read into memory.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Part {
    pub headers: HeaderMap,
    pub content: Vec<u8>,
}

impl fmt::Debug for Part {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("part::Part")
            .field("headers", &self.headers)
            .field("content", &String::from_utf8_lossy(&self.content))
            .finish()
    }
}

impl Part {
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// The content read as UTF-8, invalid sequences replaced.
    pub fn text(&self) -> Cow<'_, str> {
        let (content, _) = encoding_rs::UTF_8.decode_without_bom_handling(&self.content);
        content
    }

    pub fn media_type(&self) -> String {
        classify::part_type(&self.headers)
    }

    pub fn disposition(&self) -> String {
        classify::part_disposition(&self.headers)
    }

    pub fn file_name(&self) -> Option<String> {
        classify::file_name(&self.headers)
    }

    pub fn form_name(&self) -> Option<String> {
        classify::form_name(&self.headers)
    }
}
