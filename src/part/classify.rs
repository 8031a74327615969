//! Predicates selecting parts by their headers.
//!
//! They only look at `Content-Type` and `Content-Disposition`, never at the
//! body, and never fail: a missing or unparsable header classifies as the
//! empty string.

use crate::header::HeaderMap;
use crate::mime::r#type::{resolve, MediaType};

fn resolve_header(headers: &HeaderMap, name: &str) -> Option<MediaType> {
    let value = headers.get(name)?;
    match resolve(value) {
        Ok(mt) => Some(mt),
        Err(_e) => {
            trace_recover!(header = name, value, error = %_e, "unparsable header, classified as empty");
            None
        }
    }
}

/// Resolved media type of a part, `""` if absent or malformed.
pub fn part_type(headers: &HeaderMap) -> String {
    resolve_header(headers, "Content-Type")
        .map(|mt| mt.essence)
        .unwrap_or_default()
}

/// Primary Content-Disposition token of a part, `""` if absent or
/// malformed.
pub fn part_disposition(headers: &HeaderMap) -> String {
    resolve_header(headers, "Content-Disposition")
        .map(|mt| mt.essence)
        .unwrap_or_default()
}

/// `filename` from the disposition, else `name` from the content type,
/// stripped of any directory.
pub fn file_name(headers: &HeaderMap) -> Option<String> {
    let from_disposition = resolve_header(headers, "Content-Disposition")
        .and_then(|mt| mt.param("filename").map(str::to_string));
    let raw = from_disposition.or_else(|| {
        resolve_header(headers, "Content-Type").and_then(|mt| mt.param("name").map(str::to_string))
    })?;
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    (!base.is_empty()).then(|| base.to_string())
}

/// `name` of a `form-data` disposition.
pub fn form_name(headers: &HeaderMap) -> Option<String> {
    let disposition = resolve_header(headers, "Content-Disposition")?;
    if disposition.essence != "form-data" {
        return None;
    }
    disposition.param("name").map(str::to_string)
}

pub fn is_text_part(headers: &HeaderMap) -> bool {
    part_type(headers).starts_with("text/")
}

pub fn is_plain_text_part(headers: &HeaderMap) -> bool {
    part_type(headers).starts_with("text/plain")
}

pub fn is_html_part(headers: &HeaderMap) -> bool {
    part_type(headers).starts_with("text/html")
}

pub fn is_attachment(headers: &HeaderMap) -> bool {
    part_disposition(headers).starts_with("attachment")
}

/// Text parts that are not attachments.
pub fn is_inline_text_part(headers: &HeaderMap) -> bool {
    is_text_part(headers) && !is_attachment(headers)
}

pub fn is_any_part(_headers: &HeaderMap) -> bool {
    true
}
