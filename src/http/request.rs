use thiserror::Error;
use tokio::io::AsyncRead;

use crate::http::{
    headers::Headers, lines::LineSource, parser::RequestParser, request_line::RequestLine,
};

/// Representation of a HTTP request with request line, headers and an optional body
///
/// A value only exists once the blank line ending the headers has been seen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    /// A custom struct representing the request line.
    pub request_line: RequestLine,
    /// Lower-cased header names mapped to lower-cased values.
    pub headers: Headers,
    /// The request body, present only if a non-zero `content-length` was sent.
    pub body: Option<Vec<u8>>,
}

/// Represents the kind of error that can occur while reading or writing a message
#[derive(Error, Debug)]
pub enum HttpError {
    /// The start line does not consist of exactly three space separated fields.
    #[error("start line is malformed")]
    MalformedStartLine,

    /// A header line lacks the `": "` separator.
    #[error("header is malformed")]
    MalformedHeader,

    /// The stream ended before the message was complete.
    #[error("stream ended before the message was complete")]
    IncompleteRequest,

    /// A line did not end within the line length limit.
    #[error("line exceeds {0} bytes")]
    LineTooLong(usize),

    /// The `content-length` header is not a valid byte count.
    #[error("invalid content-length: {0}")]
    InvalidContentLength(#[source] std::num::ParseIntError),

    /// The status line of a response could not be parsed.
    #[error("status line is malformed")]
    MalformedStatusLine,

    /// The parser was fed after it had already finished or failed.
    #[error("parser is in an invalid state")]
    InvalidParserState,

    /// Reading the request took longer than allowed.
    #[error("request timed out")]
    Timeout,

    /// There was a generic IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Request {
    /// The request method as transmitted.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.request_line.method
    }

    /// The request path, not decoded.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.request_line.path
    }

    /// The protocol version token of the start line.
    #[must_use]
    pub fn protocol_version(&self) -> &str {
        &self.request_line.protocol_version
    }
}

/// Parses the contents of a reader to a Request
///
/// Lines are fed to a `RequestParser` until the blank line ends the headers. If a non-zero
/// `content-length` was sent, exactly that many bytes are read afterwards as the body.
///
/// # Errors
///
/// Throws a `HttpError` if the request was malformed, the stream ended early or reading failed.
pub async fn request_from_reader<R: AsyncRead + Unpin>(reader: R) -> Result<Request, HttpError> {
    let mut lines = LineSource::new(reader);
    let mut parser = RequestParser::new();

    let mut request = loop {
        let Some(line) = lines.next_line().await? else {
            return Err(HttpError::IncompleteRequest);
        };
        if let Some(request) = parser.feed_line(&line)? {
            break request;
        }
    };

    if let Some(content_length) = request.headers.content_length()?
        && content_length > 0
    {
        request.body = Some(lines.read_body(content_length).await?);
    }

    Ok(request)
}
