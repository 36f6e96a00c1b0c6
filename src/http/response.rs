use std::{borrow::Cow, fmt};

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::http::{headers::Headers, lines::LineSource, request::HttpError};

const CRLF: &[u8] = b"\r\n";

/// The protocol version written when none is set explicitly.
pub const DEFAULT_VERSION: &str = "HTTP/1.1";

/// Representation of a HTTP response with status code, headers and body
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    /// The protocol version of the status line.
    pub version: String,
    /// The status code and its reason phrase.
    pub status: StatusCode,
    /// Caller supplied headers, written as given.
    pub headers: Headers,
    /// The response body (can be empty).
    pub body: Vec<u8>,
}

/// Enum containing the status codes with a name in this application, anything else is `Custom`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    Created,
    BadRequest,
    NotFound,
    RequestTimeout,
    InternalServerError,
    ServiceUnavailable,
    /// Any other three digit code with its reason phrase.
    Custom(u16, Cow<'static, str>),
}

/// Implements Display for the Status Code to enable formatting the Codes as integer values.
impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

impl StatusCode {
    /// Creates a status code outside the named set, e.g. `StatusCode::custom(418, "I'm a teapot")`.
    pub fn custom(code: u16, reason: impl Into<Cow<'static, str>>) -> Self {
        Self::Custom(code, reason.into())
    }

    /// The numeric code.
    #[must_use]
    pub const fn as_u16(&self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Created => 201,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::RequestTimeout => 408,
            Self::InternalServerError => 500,
            Self::ServiceUnavailable => 503,
            Self::Custom(code, _) => *code,
        }
    }

    /// Creates the string representation of the passed status code.
    #[must_use]
    pub fn reason_phrase(&self) -> &str {
        match self {
            Self::Ok => "OK",
            Self::Created => "Created",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::RequestTimeout => "Request Timeout",
            Self::InternalServerError => "Internal Server Error",
            Self::ServiceUnavailable => "Service Unavailable",
            Self::Custom(_, reason) => &**reason,
        }
    }

    /// Looks up a named status code by its number.
    #[must_use]
    pub const fn from_u16(code: u16) -> Option<Self> {
        match code {
            200 => Some(Self::Ok),
            201 => Some(Self::Created),
            400 => Some(Self::BadRequest),
            404 => Some(Self::NotFound),
            408 => Some(Self::RequestTimeout),
            500 => Some(Self::InternalServerError),
            503 => Some(Self::ServiceUnavailable),
            _ => None,
        }
    }
}

impl Response {
    /// Creates an `HTTP/1.1` response without extra headers.
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            status,
            headers: Headers::new(),
            body: body.into(),
        }
    }

    /// Adds a header to be written after `Content-Length`.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Encodes the response into wire bytes.
    ///
    /// # Output
    /// [Version] [Code] [Reason]\r\n
    ///
    /// Content-Length: [Body length]\r\n
    ///
    /// [Caller headers sorted by name]\r\n
    ///
    /// \r\n
    ///
    /// [Body]
    ///
    /// A caller supplied `content-length` is skipped, the computed one always wins.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .filter(|(key, _)| !key.eq_ignore_ascii_case("content-length"))
            .collect();
        headers.sort_unstable();

        let mut buffer = BytesMut::with_capacity(64 + self.body.len());
        buffer.put_slice(
            format!(
                "{} {} {}",
                self.version,
                self.status,
                self.status.reason_phrase()
            )
            .as_bytes(),
        );
        buffer.put_slice(CRLF);
        buffer.put_slice(format!("Content-Length: {}", self.body.len()).as_bytes());
        buffer.put_slice(CRLF);
        for (key, value) in headers {
            buffer.put_slice(format!("{key}: {value}").as_bytes());
            buffer.put_slice(CRLF);
        }
        buffer.put_slice(CRLF);
        buffer.put_slice(&self.body);
        buffer.freeze()
    }
}

/// Writes the encoded response to the passed writer and flushes it.
///
/// # Errors
///
/// Throws an `HttpError` if the write process fails.
pub async fn write_response<W: AsyncWrite + Unpin>(
    mut writer: W,
    response: &Response,
) -> Result<(), HttpError> {
    writer.write_all(&response.encode()).await?;
    writer.flush().await?;
    Ok(())
}

/// Parses a response from a reader using the same line and header rules as requests.
///
/// Header names and values come back lower-cased. The body is read according to `content-length`
/// and is empty without it.
///
/// # Errors
///
/// Throws `HttpError::MalformedStatusLine` for an unreadable status line, `HttpError::MalformedHeader`
/// for a bad header line and `HttpError::IncompleteRequest` if the stream ends early.
pub async fn response_from_reader<R: AsyncRead + Unpin>(reader: R) -> Result<Response, HttpError> {
    let mut lines = LineSource::new(reader);

    let status_line = lines
        .next_line()
        .await?
        .ok_or(HttpError::IncompleteRequest)?;
    let (version, status) = parse_status_line(&status_line)?;

    let mut headers = Headers::new();
    loop {
        let line = lines.next_line().await?.ok_or(HttpError::IncompleteRequest)?;
        if line.is_empty() {
            break;
        }
        headers.parse_header_line(&line)?;
    }

    let body = match headers.content_length()? {
        Some(len) if len > 0 => lines.read_body(len).await?,
        _ => Vec::new(),
    };

    Ok(Response {
        version,
        status,
        headers,
        body,
    })
}

/// Splits `VERSION SP CODE SP REASON`, the reason may contain spaces.
fn parse_status_line(line: &str) -> Result<(String, StatusCode), HttpError> {
    let mut parts = line.splitn(3, ' ');
    let (Some(version), Some(code), Some(reason)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(HttpError::MalformedStatusLine);
    };

    if version.is_empty() || code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HttpError::MalformedStatusLine);
    }
    let code: u16 = code.parse().map_err(|_| HttpError::MalformedStatusLine)?;
    if code < 100 {
        return Err(HttpError::MalformedStatusLine);
    }

    let status = match StatusCode::from_u16(code) {
        Some(named) if named.reason_phrase() == reason => named,
        _ => StatusCode::custom(code, reason.to_string()),
    };

    Ok((version.to_string(), status))
}
