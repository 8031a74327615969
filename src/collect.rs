use std::io::{BufReader, Read};

use crate::envelope::open_multipart_with;
use crate::error::CollectError;
use crate::header::{HeaderMap, Limits};
use crate::part::classify;
use crate::part::multipart::MultipartReader;
use crate::part::Part;

/// Collects, in stream order, the parts for which `find` is true.
///
/// Only matching parts have their body read. On a fatal error the parts
/// matched so far are returned along with it.
pub fn find_parts<R, F>(reader: &mut MultipartReader<R>, find: F) -> Result<Vec<Part>, CollectError>
where
    R: std::io::BufRead,
    F: Fn(&HeaderMap) -> bool,
{
    let mut parts = Vec::new();
    loop {
        let raw = match reader.next_part() {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(parts),
            Err(error) => return Err(CollectError { parts, error }),
        };
        if !find(raw.headers()) {
            continue;
        }
        match raw.materialize() {
            Ok(part) => parts.push(part),
            Err(partial) => {
                return Err(CollectError {
                    parts,
                    error: partial.error,
                })
            }
        }
    }
}

/// Opens `input` as a multipart email and collects the parts matching
/// `find`.
pub fn get_parts<R, F>(input: R, find: F) -> Result<Vec<Part>, CollectError>
where
    R: Read,
    F: Fn(&HeaderMap) -> bool,
{
    get_parts_with(input, Limits::default(), find)
}

pub fn get_parts_with<R, F>(input: R, limits: Limits, find: F) -> Result<Vec<Part>, CollectError>
where
    R: Read,
    F: Fn(&HeaderMap) -> bool,
{
    let mut reader = open_multipart_with(BufReader::new(input), limits)?;
    find_parts(&mut reader, find)
}

pub fn get_all_parts<R: Read>(input: R) -> Result<Vec<Part>, CollectError> {
    get_parts(input, classify::is_any_part)
}

/// `text/*` parts.
pub fn get_text_parts<R: Read>(input: R) -> Result<Vec<Part>, CollectError> {
    get_parts(input, classify::is_text_part)
}

/// `text/plain` parts.
pub fn get_plain_text_parts<R: Read>(input: R) -> Result<Vec<Part>, CollectError> {
    get_parts(input, classify::is_plain_text_part)
}

/// `text/html` parts.
pub fn get_html_parts<R: Read>(input: R) -> Result<Vec<Part>, CollectError> {
    get_parts(input, classify::is_html_part)
}

pub fn get_attachments<R: Read>(input: R) -> Result<Vec<Part>, CollectError> {
    get_parts(input, classify::is_attachment)
}

/// Text parts that are not attachments, combined with [`combine_parts`].
pub fn get_inline_text<R: Read>(input: R) -> Result<String, CollectError> {
    let parts = get_parts(input, classify::is_inline_text_part)?;
    Ok(combine_parts(&parts))
}

/// Concatenates the part contents, each one preceded by a newline.
///
/// The result therefore starts with a newline whenever `parts` is not
/// empty.
pub fn combine_parts(parts: &[Part]) -> String {
    parts.iter().fold(String::new(), |mut text, part| {
        text.push('\n');
        text.push_str(&part.text());
        text
    })
}
