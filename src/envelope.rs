use std::io::BufRead;

use crate::error::MultimimeError;
use crate::header::{self, HeaderMap, Limits};
use crate::mime::r#type::{resolve, MediaType};
use crate::part::multipart::MultipartReader;

/// Reads the top-level header block, leaving `input` at the start of the
/// body.
///
/// The block must end with an empty line: input that stops after the
/// fields is `NotAnEmail`, even if every field parsed.
pub fn read_message<R: BufRead>(
    input: &mut R,
    limits: &Limits,
) -> Result<HeaderMap, MultimimeError> {
    let block = header::read_header_block(input, limits)?.ok_or_else(|| {
        MultimimeError::NotAnEmail("input ended before the end of the header block".into())
    })?;
    header::header_map(&block).map_err(MultimimeError::NotAnEmail)
}

/// The resolved Content-Type of a message.
pub fn message_type(headers: &HeaderMap) -> Result<MediaType, MultimimeError> {
    let value = headers
        .get("Content-Type")
        .ok_or(MultimimeError::MissingContentType)?;
    Ok(resolve(value)?)
}

/// Reads the envelope of a `multipart/*` message and returns a walker over
/// its body.
///
/// An absent `boundary` parameter is kept as an empty boundary, see
/// [`MultipartReader::boundary`].
pub fn open_multipart<R: BufRead>(input: R) -> Result<MultipartReader<R>, MultimimeError> {
    open_multipart_with(input, Limits::default())
}

pub fn open_multipart_with<R: BufRead>(
    mut input: R,
    limits: Limits,
) -> Result<MultipartReader<R>, MultimimeError> {
    let headers = read_message(&mut input, &limits)?;
    let media_type = message_type(&headers)?;
    if !media_type.is_multipart() {
        return Err(MultimimeError::NotMultipart(media_type.essence));
    }
    let boundary = media_type.boundary().to_string();
    trace_walk!(media_type = %media_type, boundary = %boundary, "opened multipart message");
    Ok(MultipartReader::with_limits(input, boundary, limits))
}
