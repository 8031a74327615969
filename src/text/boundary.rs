use nom::{
    bytes::complete::tag,
    character::complete::space0,
    combinator::{eof, opt},
    sequence::tuple,
    IResult,
};

use crate::text::whitespace::obs_crlf;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Delimiter {
    Next,
    Last,
}

/// Multipart delimiter line
///
/// ```abnf
/// dash-boundary  := "--" boundary
/// delimiter      := dash-boundary transport-padding CRLF
/// close-delimiter := dash-boundary "--" transport-padding [CRLF]
/// transport-padding := *LWSP-char
/// ```
///
/// Applies to a whole line, the line ending that precedes it is handled by
/// the caller. Nothing may follow the line ending.
pub fn delimiter<'a, 'b>(
    boundary: &'b [u8],
) -> impl Fn(&'a [u8]) -> IResult<&'a [u8], Delimiter> + 'b {
    move |input: &'a [u8]| {
        let (rest, (_, _, last, _, _, _)) = tuple((
            tag(&b"--"[..]),
            tag(boundary),
            opt(tag(&b"--"[..])),
            space0,
            opt(obs_crlf),
            eof,
        ))(input)?;
        match last {
            Some(_) => Ok((rest, Delimiter::Last)),
            None => Ok((rest, Delimiter::Next)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiter_next() {
        assert_eq!(
            delimiter(b"hello")(b"--hello\r\n"),
            Ok((&b""[..], Delimiter::Next))
        );
        assert_eq!(
            delimiter(b"hello")(b"--hello  \t\n"),
            Ok((&b""[..], Delimiter::Next))
        );
    }

    #[test]
    fn test_delimiter_last() {
        assert_eq!(
            delimiter(b"hello")(b"--hello--\r\n"),
            Ok((&b""[..], Delimiter::Last))
        );
        assert_eq!(
            delimiter(b"hello")(b"--hello--"),
            Ok((&b""[..], Delimiter::Last))
        );
    }

    #[test]
    fn test_not_a_delimiter() {
        assert!(delimiter(b"hello")(b"--hellooo\r\n").is_err());
        assert!(delimiter(b"hello")(b" --hello\r\n").is_err());
        assert!(delimiter(b"hello")(b"--hello-- trailing\r\n").is_err());
        assert!(delimiter(b"hello")(b"hello\r\n").is_err());
        assert!(delimiter(b"hello")(b"--hello\rjunk").is_err());
        assert!(delimiter(b"hello")(b"--hello--\r\nmore").is_err());
    }
}
