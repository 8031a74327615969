use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use encoding_rs::Encoding;
use nom::{
    branch::alt,
    bytes::complete::tag,
    combinator::{eof, map, opt},
    multi::many0,
    sequence::{preceded, terminated, tuple},
    IResult,
};
use percent_encoding::percent_decode;

use crate::error::ParseError;
use crate::text::quoted::quoted_string;
use crate::text::whitespace::cfws;
use crate::text::words::mime_atom;

/// A resolved Content-Type (or Content-Disposition) value.
///
/// `essence` is lower-cased, `type/subtype` for a media type or a bare
/// token for a disposition. Parameter names are lower-cased, values keep
/// their case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaType {
    pub essence: String,
    pub params: HashMap<String, String>,
}

impl MediaType {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The `boundary` parameter, empty when absent.
    pub fn boundary(&self) -> &str {
        self.param("boundary").unwrap_or_default()
    }

    pub fn is_multipart(&self) -> bool {
        self.essence.starts_with("multipart/")
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.essence)
    }
}

impl FromStr for MediaType {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        resolve(s)
    }
}

/// Parses a header value into its media type and parameters.
pub fn resolve(value: &str) -> Result<MediaType, ParseError> {
    if value.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let (_, nt) = terminated(naive_type, eof)(value.as_bytes())
        .map_err(|_| ParseError::Syntax(value.to_string()))?;
    nt.decode()
}

// --------- NAIVE TYPE
#[derive(Debug, PartialEq)]
pub struct NaiveType<'a> {
    pub main: &'a [u8],
    pub sub: Option<&'a [u8]>,
    pub params: Vec<Parameter>,
}

impl<'a> NaiveType<'a> {
    pub fn decode(&self) -> Result<MediaType, ParseError> {
        let main = String::from_utf8_lossy(self.main).to_ascii_lowercase();
        let essence = match self.sub {
            Some(sub) => format!("{}/{}", main, String::from_utf8_lossy(sub).to_ascii_lowercase()),
            None => main,
        };
        Ok(MediaType {
            essence,
            params: decode_params(&self.params)?,
        })
    }
}

/// ```abnf
/// content := type [ "/" subtype ] *(";" parameter) [";"]
/// ```
///
/// The subtype is optional so that Content-Disposition values go through
/// the same grammar.
pub fn naive_type(input: &[u8]) -> IResult<&[u8], NaiveType<'_>> {
    map(
        tuple((
            mime_atom,
            opt(preceded(tag("/"), mime_atom)),
            parameter_list,
            opt(tag(";")),
            opt(cfws),
        )),
        |(main, sub, params, _, _)| NaiveType { main, sub, params },
    )(input)
}

#[derive(Debug, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

/// ```abnf
/// parameter := attribute "=" value
/// value := token / quoted-string
/// ```
pub fn parameter(input: &[u8]) -> IResult<&[u8], Parameter> {
    map(
        tuple((
            mime_atom,
            tag("="),
            alt((
                map(quoted_string, |q| q.to_string()),
                map(mime_atom, |t| String::from_utf8_lossy(t).into_owned()),
            )),
        )),
        |(name, _, value)| Parameter {
            name: String::from_utf8_lossy(name).to_ascii_lowercase(),
            value,
        },
    )(input)
}

pub fn parameter_list(input: &[u8]) -> IResult<&[u8], Vec<Parameter>> {
    many0(preceded(tag(";"), parameter))(input)
}

// -------- RFC 2231

/// One piece of an RFC 2231 parameter: `name*N` or `name*N*`.
struct Section<'a> {
    index: usize,
    encoded: bool,
    value: &'a str,
}

fn decode_params(raw: &[Parameter]) -> Result<HashMap<String, String>, ParseError> {
    let mut plain: HashMap<String, String> = HashMap::new();
    let mut extended: HashMap<&str, Vec<Section<'_>>> = HashMap::new();

    for p in raw {
        let (base, section) = match split_section(&p.name) {
            Some((base, index, encoded)) => (base, Section { index, encoded, value: &p.value }),
            None => {
                if plain.insert(p.name.clone(), p.value.clone()).is_some() {
                    return Err(ParseError::DuplicateParameter(p.name.clone()));
                }
                continue;
            }
        };
        let sections = extended.entry(base).or_default();
        if sections.iter().any(|s| s.index == section.index) {
            return Err(ParseError::DuplicateParameter(p.name.clone()));
        }
        sections.push(section);
    }

    for (base, mut sections) in extended {
        sections.sort_by_key(|s| s.index);
        match join_sections(&sections) {
            Some(value) => {
                plain.insert(base.to_string(), value);
            }
            None => {
                trace_recover!("dropping undecodable RFC 2231 parameter {base}");
            }
        }
    }
    Ok(plain)
}

/// `name*` is section 0 encoded, `name*N` / `name*N*` are continuations.
fn split_section(name: &str) -> Option<(&str, usize, bool)> {
    let (base, rest) = name.split_once('*')?;
    if rest.is_empty() {
        return Some((base, 0, true));
    }
    let (digits, encoded) = match rest.strip_suffix('*') {
        Some(digits) => (digits, true),
        None => (rest, false),
    };
    let index = digits.parse().ok()?;
    Some((base, index, encoded))
}

/// Concatenates sections from 0 up to the first gap and decodes them with
/// the charset declared by the first one.
fn join_sections(sections: &[Section<'_>]) -> Option<String> {
    if sections.first()?.index != 0 {
        return None;
    }
    let mut charset = "";
    let mut bytes = Vec::new();
    for (expected, section) in sections.iter().enumerate() {
        if section.index != expected {
            break;
        }
        let mut value = section.value;
        if expected == 0 && section.encoded {
            let mut fields = value.splitn(3, '\'');
            match (fields.next(), fields.next(), fields.next()) {
                (Some(cs), Some(_lang), Some(v)) => {
                    charset = cs;
                    value = v;
                }
                _ => return None,
            }
        }
        if section.encoded {
            bytes.extend(percent_decode(value.as_bytes()));
        } else {
            bytes.extend_from_slice(value.as_bytes());
        }
    }
    let encoding = match charset {
        "" => encoding_rs::UTF_8,
        label => Encoding::for_label(label.as_bytes())?,
    };
    let (content, _) = encoding.decode_without_bom_handling(&bytes);
    Some(content.into_owned())
}
