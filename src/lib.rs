#![doc = include_str!("../README.md")]

#[macro_use]
mod report;

pub mod collect;
pub mod envelope;
pub mod error;
pub mod header;
pub mod mime;
pub mod part;
pub mod text;

pub use collect::{
    combine_parts, find_parts, get_all_parts, get_attachments, get_html_parts, get_inline_text,
    get_parts, get_parts_with, get_plain_text_parts, get_text_parts,
};
pub use envelope::{message_type, open_multipart, open_multipart_with, read_message};
pub use error::{CollectError, MultimimeError, ParseError, PartialContent};
pub use header::{HeaderMap, Limits};
pub use mime::MediaType;
pub use part::classify::{
    is_any_part, is_attachment, is_html_part, is_inline_text_part, is_plain_text_part,
    is_text_part, part_disposition, part_type,
};
pub use part::multipart::{MultipartReader, RawPart};
pub use part::Part;
