//! Line driven request parser.
//!
//! The parser is fed one line at a time, terminator already stripped, and moves through
//! `ExpectStartLine -> ExpectHeaderOrBlank -> Done`. Any malformed line moves it to `Error`, from
//! which it never leaves. Body bytes are not lines, reading them is up to the caller once the
//! parser hands out the finished `Request`.

use std::mem;

use crate::http::{
    headers::Headers,
    request::{HttpError, Request},
    request_line::{RequestLine, parse_request_line},
};

/// Represents the different stages of the parser.
///
/// The request line only exists once it was parsed, so headers cannot be accepted before it.
#[derive(Debug, Default, PartialEq, Eq)]
enum ParseState {
    /// Waiting for the start line.
    #[default]
    ExpectStartLine,
    /// The start line was parsed, collecting headers until a blank line.
    ExpectHeaderOrBlank {
        request_line: RequestLine,
        headers: Headers,
    },
    /// The blank line was seen and the request was handed out.
    Done,
    /// A malformed line was fed. The connection has to be closed.
    Error,
}

/// Incrementally builds a `Request` from lines.
#[derive(Debug, Default)]
pub struct RequestParser {
    state: ParseState,
}

impl RequestParser {
    /// Creates a parser waiting for a start line.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the next line to the parser.
    ///
    /// Returns `Some(request)` once the blank line terminating the headers arrives, `None` while
    /// more lines are needed.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::MalformedStartLine` or `HttpError::MalformedHeader` for a malformed line,
    /// after which the parser stays failed. Feeding a parser that is done or failed returns
    /// `HttpError::InvalidParserState`.
    pub fn feed_line(&mut self, line: &str) -> Result<Option<Request>, HttpError> {
        // parked in Error until a transition succeeds
        match mem::replace(&mut self.state, ParseState::Error) {
            ParseState::ExpectStartLine => {
                let request_line = parse_request_line(line)?;
                self.state = ParseState::ExpectHeaderOrBlank {
                    request_line,
                    headers: Headers::new(),
                };
                Ok(None)
            }
            ParseState::ExpectHeaderOrBlank {
                request_line,
                headers,
            } if line.is_empty() => {
                self.state = ParseState::Done;
                Ok(Some(Request {
                    request_line,
                    headers,
                    body: None,
                }))
            }
            ParseState::ExpectHeaderOrBlank {
                request_line,
                mut headers,
            } => {
                headers.parse_header_line(line)?;
                self.state = ParseState::ExpectHeaderOrBlank {
                    request_line,
                    headers,
                };
                Ok(None)
            }
            state @ ParseState::Done => {
                self.state = state;
                Err(HttpError::InvalidParserState)
            }
            ParseState::Error => Err(HttpError::InvalidParserState),
        }
    }

    /// Whether the start line has been parsed.
    #[must_use]
    pub fn start_line_parsed(&self) -> bool {
        matches!(
            self.state,
            ParseState::ExpectHeaderOrBlank { .. } | ParseState::Done
        )
    }

    /// Whether the blank line ending the headers has been seen.
    #[must_use]
    pub fn headers_terminated(&self) -> bool {
        self.state == ParseState::Done
    }

    /// Whether the parser produced its request.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.headers_terminated()
    }

    /// Whether a malformed line put the parser into its error state.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.state == ParseState::Error
    }
}
