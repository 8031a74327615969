use std::fmt;
use std::io::{self, BufRead, Read};

use crate::error::{MultimimeError, PartialContent};
use crate::header::{self, HeaderMap, Limits};
use crate::part::{classify, Part};
use crate::text::ascii;
use crate::text::boundary::{delimiter, Delimiter};
use crate::text::whitespace::eol_len;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before the first delimiter line.
    Preamble,
    /// Inside the body of the part last returned by `next_part`.
    Body,
    /// A dash-boundary line was just consumed, part headers come next.
    Boundary,
    /// The close-delimiter was consumed.
    Done,
}

/// Bytes of a line looked at in one go, on top of the boundary length. A
/// delimiter line whose transport padding runs past it is body content.
const LINE_WINDOW: usize = 8 << 10;

/// Pull-based walker over the parts of a multipart body.
///
/// Each call to [`next_part`](Self::next_part) first skips whatever is
/// left of the previous part body, then reads the next part headers. Body
/// lines are read in pieces of at most one window, so a long line is never
/// held whole, whether it is read or skipped.
pub struct MultipartReader<R> {
    input: R,
    boundary: String,
    limits: Limits,
    state: State,
    line: Vec<u8>,
    at_line_start: bool,
    // Line ending of the last body line handed out, emitted only once we
    // know the next line is not a delimiter.
    pending_eol: Vec<u8>,
    out: Vec<u8>,
    out_pos: usize,
}

impl<R> fmt::Debug for MultipartReader<R> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("MultipartReader")
            .field("boundary", &self.boundary)
            .field("state", &self.state)
            .finish()
    }
}

impl<R: BufRead> MultipartReader<R> {
    /// Walks `input`, positioned at the start of a multipart body.
    pub fn new(input: R, boundary: impl Into<String>) -> Self {
        Self::with_limits(input, boundary, Limits::default())
    }

    pub fn with_limits(input: R, boundary: impl Into<String>, limits: Limits) -> Self {
        MultipartReader {
            input,
            boundary: boundary.into(),
            limits,
            state: State::Preamble,
            line: Vec::new(),
            at_line_start: true,
            pending_eol: Vec::new(),
            out: Vec::new(),
            out_pos: 0,
        }
    }

    /// The boundary in use, an empty string means the message declared none.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn into_inner(self) -> R {
        self.input
    }

    /// Advances to the next part.
    ///
    /// Returns `Ok(None)` once the close-delimiter has been read, and keeps
    /// doing so on later calls.
    pub fn next_part(&mut self) -> Result<Option<RawPart<'_, R>>, MultimimeError> {
        if self.state == State::Body {
            let _skipped = self.skip_body()?;
            trace_discard!(bytes = _skipped, "skipped unread part body");
        }
        if self.state == State::Preamble {
            self.skip_preamble()?;
        }
        if self.state == State::Done {
            return Ok(None);
        }

        let block = header::read_header_block(&mut self.input, &self.limits)?
            .ok_or(MultimimeError::TruncatedMultipart)?;
        let headers = header::header_map(&block).map_err(MultimimeError::PartHeader)?;
        trace_walk!(fields = headers.len(), "part opened");

        self.state = State::Body;
        self.at_line_start = true;
        self.pending_eol.clear();
        self.out.clear();
        self.out_pos = 0;
        Ok(Some(RawPart {
            headers,
            reader: self,
        }))
    }

    /// Reads the next piece of a line into `self.line`, up to and including
    /// a LF and no longer than the window.
    ///
    /// Returns whether the piece ends the line. End of input before the
    /// close-delimiter is a truncated multipart.
    fn read_piece(&mut self) -> Result<bool, MultimimeError> {
        self.line.clear();
        let window = (self.boundary.len() + LINE_WINDOW) as u64;
        let n = self
            .input
            .by_ref()
            .take(window)
            .read_until(ascii::LF, &mut self.line)?;
        if n == 0 {
            return Err(MultimimeError::TruncatedMultipart);
        }
        Ok(self.line.ends_with(&[ascii::LF]) || (n as u64) < window)
    }

    fn is_delimiter(&self) -> Option<Delimiter> {
        delimiter(self.boundary.as_bytes())(&self.line)
            .ok()
            .map(|(_, d)| d)
    }

    fn enter(&mut self, d: Delimiter) {
        match d {
            Delimiter::Next => {
                trace_walk!("delimiter reached");
                self.state = State::Boundary;
            }
            Delimiter::Last => {
                trace_walk!("close-delimiter reached");
                trace_discard!("epilogue left unread");
                self.state = State::Done;
            }
        }
    }

    fn skip_preamble(&mut self) -> Result<(), MultimimeError> {
        let mut _skipped = 0;
        let mut at_line_start = true;
        loop {
            let ends_line = self.read_piece()?;
            if at_line_start && ends_line {
                if let Some(d) = self.is_delimiter() {
                    trace_discard!(bytes = _skipped, "discarded preamble");
                    self.enter(d);
                    return Ok(());
                }
            }
            at_line_start = ends_line;
            _skipped += self.line.len();
        }
    }

    /// Loads the next piece of the current part body into `out`.
    ///
    /// Returns `false` once the delimiter closing the part has been read.
    fn fill_body(&mut self) -> Result<bool, MultimimeError> {
        if self.state != State::Body {
            return Ok(false);
        }
        let at_line_start = self.at_line_start;
        let ends_line = self.read_piece()?;
        if at_line_start && ends_line {
            if let Some(d) = self.is_delimiter() {
                // the line ending before a delimiter belongs to the delimiter
                self.pending_eol.clear();
                self.enter(d);
                return Ok(false);
            }
        }
        self.at_line_start = ends_line;
        if self.pending_eol == [ascii::CR] && self.line == [ascii::LF] {
            // CRLF split between two pieces
            self.pending_eol.push(ascii::LF);
            return Ok(true);
        }
        let held = if ends_line {
            eol_len(&self.line)
        } else {
            usize::from(self.line.ends_with(&[ascii::CR]))
        };
        let content_len = self.line.len() - held;
        self.out.append(&mut self.pending_eol);
        self.out.extend_from_slice(&self.line[..content_len]);
        self.pending_eol.extend_from_slice(&self.line[content_len..]);
        Ok(true)
    }

    fn read_body(&mut self, buf: &mut [u8]) -> Result<usize, MultimimeError> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.out_pos >= self.out.len() {
            self.out.clear();
            self.out_pos = 0;
            if !self.fill_body()? {
                return Ok(0);
            }
        }
        let available = &self.out[self.out_pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.out_pos += n;
        Ok(n)
    }

    fn skip_body(&mut self) -> Result<usize, MultimimeError> {
        let mut skipped = self.out.len() - self.out_pos;
        self.out.clear();
        self.out_pos = 0;
        while self.fill_body()? {
            skipped += self.out.len();
            self.out.clear();
        }
        Ok(skipped)
    }
}

/// One part as yielded by the walker: its headers and a single-pass body.
///
/// The body is read through [`Read`]. Dropping the part without reading it
/// is fine, the walker skips the rest of the body on the next call.
pub struct RawPart<'a, R> {
    headers: HeaderMap,
    reader: &'a mut MultipartReader<R>,
}

impl<'a, R> fmt::Debug for RawPart<'a, R> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("RawPart")
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl<'a, R: BufRead> RawPart<'a, R> {
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
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

    /// Drains the body into an owned [`Part`].
    ///
    /// On failure the bytes read so far are returned with the cause.
    pub fn materialize(mut self) -> Result<Part, PartialContent> {
        let mut content = Vec::new();
        match self.read_to_end(&mut content) {
            Ok(_) => Ok(Part {
                headers: self.headers,
                content,
            }),
            Err(e) => Err(PartialContent {
                content,
                error: MultimimeError::from_body_error(e),
            }),
        }
    }

    /// Reads and drops the rest of the body.
    pub fn skip(self) -> Result<(), MultimimeError> {
        self.reader.skip_body().map(|_| ())
    }
}

impl<'a, R: BufRead> Read for RawPart<'a, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read_body(buf).map_err(io::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SIMPLE: &[u8] = b"This is the preamble.  It is to be ignored, though it
is a handy place for composition agents to include an
explanatory note to non-MIME conformant readers.

--simple boundary

This is implicitly typed plain US-ASCII text.
It does NOT end with a linebreak.
--simple boundary
Content-type: text/plain; charset=us-ascii

This is explicitly typed plain US-ASCII text.
It DOES end with a linebreak.

--simple boundary--

This is the epilogue. It is also to be ignored.
";

    fn drain<R: BufRead>(part: RawPart<'_, R>) -> (HeaderMap, String) {
        let p = part.materialize().unwrap();
        (p.headers, String::from_utf8(p.content).unwrap())
    }

    #[test]
    fn test_rfc2046_example() {
        let mut mr = MultipartReader::new(SIMPLE, "simple boundary");

        let (headers, body) = drain(mr.next_part().unwrap().unwrap());
        assert!(headers.is_empty());
        assert_eq!(
            body,
            "This is implicitly typed plain US-ASCII text.\nIt does NOT end with a linebreak."
        );

        let (headers, body) = drain(mr.next_part().unwrap().unwrap());
        assert_eq!(headers.get("content-type"), Some("text/plain; charset=us-ascii"));
        assert_eq!(
            body,
            "This is explicitly typed plain US-ASCII text.\nIt DOES end with a linebreak.\n"
        );

        assert!(mr.next_part().unwrap().is_none());
        assert!(mr.next_part().unwrap().is_none());
    }

    #[test]
    fn test_crlf_framing() {
        let input = b"--b\r\nContent-Type: text/plain\r\n\r\nline one\r\nline two\r\n--b--\r\n";
        let mut mr = MultipartReader::new(&input[..], "b");
        let (_, body) = drain(mr.next_part().unwrap().unwrap());
        assert_eq!(body, "line one\r\nline two");
        assert!(mr.next_part().unwrap().is_none());
    }

    #[test]
    fn test_empty_multipart() {
        let mut mr = MultipartReader::new(&b"preamble\r\n--b--\r\n"[..], "b");
        assert!(mr.next_part().unwrap().is_none());
    }

    #[test]
    fn test_skip_unread_body() {
        let input = b"--b\nX-Id: 1\n\nfirst body\nmore\n--b\nX-Id: 2\n\nsecond\n--b--\n";
        let mut mr = MultipartReader::new(&input[..], "b");

        let first = mr.next_part().unwrap().unwrap();
        assert_eq!(first.headers().get("x-id"), Some("1"));
        drop(first);

        let mut second = mr.next_part().unwrap().unwrap();
        assert_eq!(second.headers().get("x-id"), Some("2"));
        let mut body = String::new();
        second.read_to_string(&mut body).unwrap();
        assert_eq!(body, "second");

        assert!(mr.next_part().unwrap().is_none());
    }

    #[test]
    fn test_partial_read_then_skip() {
        let input = b"--b\n\n0123456789\n--b\n\nnext\n--b--\n";
        let mut mr = MultipartReader::new(&input[..], "b");

        let mut part = mr.next_part().unwrap().unwrap();
        let mut head = [0u8; 4];
        part.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"0123");
        part.skip().unwrap();

        let (_, body) = drain(mr.next_part().unwrap().unwrap());
        assert_eq!(body, "next");
    }

    #[test]
    fn test_nested_multipart_is_opaque() {
        let input = b"--outer
Content-Type: multipart/alternative; boundary=inner

--inner
Content-Type: text/plain

nested
--inner--
--outer--
";
        let mut mr = MultipartReader::new(&input[..], "outer");
        let (headers, body) = drain(mr.next_part().unwrap().unwrap());
        assert_eq!(
            headers.get("Content-Type"),
            Some("multipart/alternative; boundary=inner")
        );
        assert_eq!(body, "--inner\nContent-Type: text/plain\n\nnested\n--inner--");
        assert!(mr.next_part().unwrap().is_none());
    }

    #[test]
    fn test_truncated_in_body() {
        let input = b"--b\n\nfirst\n--b\n\nsecond is cut";
        let mut mr = MultipartReader::new(&input[..], "b");
        let (_, body) = drain(mr.next_part().unwrap().unwrap());
        assert_eq!(body, "first");

        let part = mr.next_part().unwrap().unwrap();
        let err = part.materialize().unwrap_err();
        assert_eq!(err.content, b"second is cut");
        assert!(matches!(err.error, MultimimeError::TruncatedMultipart));
    }

    #[test]
    fn test_truncated_partial_content() {
        let input = b"--b\n\nline one\nline two";
        let mut mr = MultipartReader::new(&input[..], "b");
        let err = mr.next_part().unwrap().unwrap().materialize().unwrap_err();
        assert_eq!(err.content, b"line one\nline two");
        assert!(matches!(err.error, MultimimeError::TruncatedMultipart));
    }

    #[test]
    fn test_truncated_before_headers_end() {
        let mut mr = MultipartReader::new(&b"--b\nContent-Type: text/plain\n"[..], "b");
        assert!(matches!(
            mr.next_part(),
            Err(MultimimeError::TruncatedMultipart)
        ));
    }

    #[test]
    fn test_no_delimiter_at_all() {
        let mut mr = MultipartReader::new(&b"just some text\n"[..], "b");
        assert!(matches!(
            mr.next_part(),
            Err(MultimimeError::TruncatedMultipart)
        ));
    }

    #[test]
    fn test_malformed_part_header() {
        let mut mr = MultipartReader::new(&b"--b\nnot a header\n\nbody\n--b--\n"[..], "b");
        assert!(matches!(mr.next_part(), Err(MultimimeError::PartHeader(_))));
    }

    // Counts the bytes pulled from the underlying source.
    struct Metered<'a> {
        data: &'a [u8],
        consumed: usize,
    }

    impl Read for Metered<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.data.read(buf)?;
            self.consumed += n;
            Ok(n)
        }
    }

    // Hands out its data, then fails like a closed connection.
    struct BrokenAfter<'a>(&'a [u8]);

    impl Read for BrokenAfter<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "connection closed"));
            }
            self.0.read(buf)
        }
    }

    #[test]
    fn test_long_line_read_in_windows() {
        let mut input = b"--b\n\n".to_vec();
        input.resize(input.len() + (4 << 20), b'x');
        input.extend_from_slice(b"\n--b\n\nnext\n--b--\n");
        let source = Metered {
            data: &input,
            consumed: 0,
        };
        let mut mr = MultipartReader::new(io::BufReader::new(source), "b");

        let mut part = mr.next_part().unwrap().unwrap();
        let mut head = [0u8; 4];
        part.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"xxxx");
        assert!(mr.out.len() <= LINE_WINDOW + 1);
        assert!(mr.input.get_ref().consumed < 4 * LINE_WINDOW);

        let (_, body) = drain(mr.next_part().unwrap().unwrap());
        assert_eq!(body, "next");
        assert!(mr.next_part().unwrap().is_none());
    }

    #[test]
    fn test_crlf_split_between_windows() {
        let mut input = b"--b\r\n\r\n".to_vec();
        // with a one byte boundary the first window ends on the CR
        input.resize(input.len() + LINE_WINDOW, b'y');
        input.extend_from_slice(b"\r\n--b--\r\n");
        let mut mr = MultipartReader::new(&input[..], "b");
        let p = mr.next_part().unwrap().unwrap().materialize().unwrap();
        assert_eq!(p.content.len(), LINE_WINDOW);
        assert!(p.content.iter().all(|c| *c == b'y'));
        assert!(mr.next_part().unwrap().is_none());
    }

    #[test]
    fn test_bare_cr_after_boundary_is_content() {
        let input = b"--b\n\nbefore\n--b\rjunk\n--b--\n";
        let mut mr = MultipartReader::new(&input[..], "b");
        let (_, body) = drain(mr.next_part().unwrap().unwrap());
        assert_eq!(body, "before\n--b\rjunk");
        assert!(mr.next_part().unwrap().is_none());
    }

    #[test]
    fn test_io_error_in_body() {
        let input = b"--b\n\nfirst\n--b\n\nline one\nline t";
        let mut mr = MultipartReader::new(io::BufReader::new(BrokenAfter(input)), "b");
        let first = mr.next_part().unwrap().unwrap().materialize().unwrap();
        assert_eq!(first.content, b"first");

        let err = mr.next_part().unwrap().unwrap().materialize().unwrap_err();
        assert_eq!(err.content, b"line one");
        assert!(matches!(
            err.error,
            MultimimeError::Io(e) if e.kind() == io::ErrorKind::BrokenPipe
        ));
    }

    #[test]
    fn test_io_error_keeps_collected_parts() {
        let input = b"--b\n\nfirst\n--b\n\nsecond\n--b\n\nthird is t";
        let mut mr = MultipartReader::new(io::BufReader::new(BrokenAfter(input)), "b");
        let err = crate::collect::find_parts(&mut mr, classify::is_any_part).unwrap_err();
        assert_eq!(
            err.parts.iter().map(|p| p.content.clone()).collect::<Vec<_>>(),
            vec![b"first".to_vec(), b"second".to_vec()]
        );
        assert!(matches!(
            err.error,
            MultimimeError::Io(e) if e.kind() == io::ErrorKind::BrokenPipe
        ));
    }

    #[test]
    fn test_boundary_lookalike_in_body() {
        let input = b"--b\n\n--bb is not it\n--b-- neither\n--b--\n";
        let mut mr = MultipartReader::new(&input[..], "b");
        let (_, body) = drain(mr.next_part().unwrap().unwrap());
        assert_eq!(body, "--bb is not it\n--b-- neither");
    }
}
