use std::io::{BufRead, Read};

use nom::{
    bytes::complete::{is_not, tag, take_while1},
    character::complete::{space0, space1},
    combinator::{eof, map, opt, recognize},
    multi::many0,
    sequence::{pair, terminated, tuple},
    IResult,
};

use crate::error::MultimimeError;
use crate::text::ascii;
use crate::text::whitespace::{is_blank_line, obs_crlf};

/// Runtime bounds applied while reading a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Largest header block (envelope or part) accepted, blank line included.
    pub max_header_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_header_bytes: 10 << 20,
        }
    }
}

/// Header fields in the order they appeared.
///
/// Lookups ignore ASCII case. A name may appear several times, `get`
/// returns the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    fields: Vec<(String, String)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a str> + 'n
    where
        'a: 'n,
    {
        self.fields
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> FromIterator<FieldRaw<'a>> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = FieldRaw<'a>>>(source: I) -> Self {
        source.into_iter().fold(HeaderMap::default(), |mut map, field| {
            map.append(decode(field.name), unfold(field.value));
            map
        })
    }
}

/// Reads lines up to and including the first empty line.
///
/// Returns `None` when the input ends before that empty line.
pub fn read_header_block<R: BufRead>(
    input: &mut R,
    limits: &Limits,
) -> Result<Option<Vec<u8>>, MultimimeError> {
    let mut block = Vec::new();
    loop {
        let start = block.len();
        let budget = limits.max_header_bytes.saturating_add(1).saturating_sub(start) as u64;
        let n = input.by_ref().take(budget).read_until(ascii::LF, &mut block)?;
        if block.len() > limits.max_header_bytes {
            return Err(MultimimeError::HeaderTooLarge(limits.max_header_bytes));
        }
        if n == 0 {
            return Ok(None);
        }
        if is_blank_line(&block[start..]) {
            return Ok(Some(block));
        }
    }
}

/// Parses a complete header block, the closing empty line included.
///
/// The error names the first line that does not fit the field grammar.
pub fn header_map(block: &[u8]) -> Result<HeaderMap, String> {
    match header_kv(block) {
        Ok((_, fields)) => Ok(fields.into_iter().collect()),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let line = e.input.split(|c| *c == ascii::LF).next().unwrap_or_default();
            Err(format!("malformed header line: {:?}", decode(line.trim_ascii_end())))
        }
        Err(nom::Err::Incomplete(_)) => Err("incomplete header block".into()),
    }
}

#[derive(Debug, PartialEq)]
pub struct FieldRaw<'a> {
    pub name: &'a [u8],
    pub value: &'a [u8],
}

/// ```abnf
/// fields = *field CRLF
/// ```
pub fn header_kv(input: &[u8]) -> IResult<&[u8], Vec<FieldRaw<'_>>> {
    terminated(many0(field), pair(obs_crlf, eof))(input)
}

/// ```abnf
/// field = field-name *WSP ":" unstructured CRLF
/// ```
pub fn field(input: &[u8]) -> IResult<&[u8], FieldRaw<'_>> {
    map(
        tuple((field_name, space0, tag(":"), field_body)),
        |(name, _, _, value)| FieldRaw { name, value },
    )(input)
}

/// ```abnf
/// field-name = 1*ftext
/// ftext      = %d33-57 / %d59-126
/// ```
pub fn field_name(input: &[u8]) -> IResult<&[u8], &[u8]> {
    take_while1(is_ftext)(input)
}

fn is_ftext(c: u8) -> bool {
    (ascii::EXCLAMATION..=ascii::TILDE).contains(&c) && c != ascii::COL
}

/// Field value up to the line ending that is not followed by a folding
/// white space, that line ending is consumed but not returned.
pub fn field_body(input: &[u8]) -> IResult<&[u8], &[u8]> {
    terminated(
        recognize(pair(
            opt(is_not(ascii::CRLF)),
            many0(tuple((obs_crlf, space1, opt(is_not(ascii::CRLF))))),
        )),
        obs_crlf,
    )(input)
}

/// Joins the physical lines of a folded value with a single space.
pub fn unfold(value: &[u8]) -> String {
    let pieces: Vec<&[u8]> = value
        .split(|c| *c == ascii::CR || *c == ascii::LF)
        .map(|line| line.trim_ascii())
        .filter(|line| !line.is_empty())
        .collect();
    decode(&pieces.join(&ascii::SP))
}

fn decode(bytes: &[u8]) -> String {
    let (content, _) = encoding_rs::UTF_8.decode_without_bom_handling(bytes);
    content.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_header_kv() {
        let block = b"Content-Type: multipart/alternative;\r\n boundary=\"b1\"\r\nX-Empty:\r\n\r\n";
        assert_eq!(
            header_kv(block),
            Ok((
                &b""[..],
                vec![
                    FieldRaw {
                        name: b"Content-Type",
                        value: b" multipart/alternative;\r\n boundary=\"b1\"",
                    },
                    FieldRaw {
                        name: b"X-Empty",
                        value: b"",
                    },
                ]
            ))
        );
    }

    #[test]
    fn test_header_map() {
        let map = header_map(
            b"Subject: Saying\n\tHello\ncontent-type : text/plain\nReceived: a\nReceived: b\n\n",
        )
        .unwrap();
        assert_eq!(map.get("subject"), Some("Saying Hello"));
        assert_eq!(map.get("Content-Type"), Some("text/plain"));
        assert_eq!(map.get_all("RECEIVED").collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.get("Missing"), None);
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_lookup_outlives_name() {
        let map = header_map(b"Content-Type: text/plain\r\nReceived: a\r\n\r\n").unwrap();
        let value = {
            let name = String::from("content-type");
            map.get(&name)
        };
        assert_eq!(value, Some("text/plain"));
        let received: Vec<&str> = {
            let name = "Received".to_string();
            map.get_all(&name).collect()
        };
        assert_eq!(received, vec!["a"]);
    }

    #[test]
    fn test_empty_block() {
        assert_eq!(header_map(b"\r\n"), Ok(HeaderMap::new()));
    }

    #[test]
    fn test_malformed_block() {
        assert_eq!(
            header_map(b"Subject: ok\r\nthis is not a header\r\n\r\n"),
            Err("malformed header line: \"this is not a header\"".to_string())
        );
        assert!(header_map(b" folded: first\r\n\r\n").is_err());
    }

    #[test]
    fn test_read_header_block() {
        let mut input = &b"A: 1\r\nB: 2\r\n\r\nbody\r\n"[..];
        let block = read_header_block(&mut input, &Limits::default()).unwrap();
        assert_eq!(block, Some(b"A: 1\r\nB: 2\r\n\r\n".to_vec()));
        assert_eq!(input, &b"body\r\n"[..]);
    }

    #[test]
    fn test_read_header_block_unterminated() {
        let mut input = &b"A: 1\r\nB: 2"[..];
        assert!(matches!(
            read_header_block(&mut input, &Limits::default()),
            Ok(None)
        ));
    }

    #[test]
    fn test_read_header_block_too_large() {
        let mut input = &b"Subject: a rather long subject line\r\n\r\n"[..];
        let limits = Limits {
            max_header_bytes: 16,
        };
        assert!(matches!(
            read_header_block(&mut input, &limits),
            Err(MultimimeError::HeaderTooLarge(16))
        ));
    }

    #[test]
    fn test_read_header_block_unbounded() {
        let mut input = &b"A: 1\r\n\r\nbody"[..];
        let limits = Limits {
            max_header_bytes: usize::MAX,
        };
        let block = read_header_block(&mut input, &limits).unwrap();
        assert_eq!(block, Some(b"A: 1\r\n\r\n".to_vec()));
    }
}
