use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

use crate::http::request::HttpError;

const LF: u8 = b'\n';
const CR: u8 = b'\r';

/// Default upper bound of a single line in bytes, terminator included.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Presents a byte stream as a sequence of text lines.
///
/// Lines end with `\n`, an optional `\r` right before it is stripped as well.
/// Once the stream reports EOF the source is finished and keeps returning `None`.
#[derive(Debug)]
pub struct LineSource<R> {
    reader: BufReader<R>,
    max_line_len: usize,
    finished: bool,
}

impl<R: AsyncRead + Unpin> LineSource<R> {
    /// Wraps the passed reader in a buffered line source.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            max_line_len: MAX_LINE_LEN,
            finished: false,
        }
    }

    /// Replaces the line length limit, terminator included.
    #[must_use]
    pub fn with_max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = max_line_len.max(1);
        self
    }

    /// Reads the next line without its terminator.
    ///
    /// Returns `Ok(None)` once the stream is closed. A final line cut short by the stream closing is
    /// still returned without a dangling `\r`, the call after it yields `None`. A cut short line
    /// holding nothing but `\r` is no line at all.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::LineTooLong` if no `\n` shows up within the line length limit and
    /// `HttpError::Io` if reading from the underlying stream fails.
    pub async fn next_line(&mut self) -> Result<Option<String>, HttpError> {
        if self.finished {
            return Ok(None);
        }

        let limit = u64::try_from(self.max_line_len).unwrap_or(u64::MAX);
        let mut buffer = Vec::new();
        let read = (&mut self.reader)
            .take(limit)
            .read_until(LF, &mut buffer)
            .await?;
        if read == 0 {
            self.finished = true;
            return Ok(None);
        }

        if buffer.last() == Some(&LF) {
            buffer.pop();
        } else if read >= self.max_line_len {
            self.finished = true;
            return Err(HttpError::LineTooLong(self.max_line_len));
        } else {
            // stream closed mid-line
            self.finished = true;
            if buffer == [CR] {
                return Ok(None);
            }
        }
        if buffer.last() == Some(&CR) {
            buffer.pop();
        }

        Ok(Some(String::from_utf8_lossy(&buffer).into_owned()))
    }

    /// Reads exactly `len` raw bytes following the lines consumed so far.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::IncompleteRequest` if the stream closes before `len` bytes arrived and
    /// `HttpError::Io` for any other read failure.
    pub async fn read_body(&mut self, len: usize) -> Result<Vec<u8>, HttpError> {
        // grows with the bytes that actually arrive, never with the announced length
        let mut body = Vec::new();
        (&mut self.reader)
            .take(u64::try_from(len).unwrap_or(u64::MAX))
            .read_to_end(&mut body)
            .await?;

        if body.len() < len {
            self.finished = true;
            return Err(HttpError::IncompleteRequest);
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Error, ErrorKind};

    use tokio_test::io::Builder;

    use crate::http::{lines::LineSource, request::HttpError};

    #[tokio::test]
    async fn crlf_and_lf_lines_are_stripped() {
        let mut lines = LineSource::new("first\r\nsecond\n\r\n".as_bytes());

        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("first"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("second"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some(""));
        assert!(lines.next_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn line_split_over_reads_is_joined() {
        let mock = Builder::new()
            .read(b"GET / HT")
            .read(b"TP/1.1\r")
            .read(b"\nHost: a\r\n")
            .build();
        let mut lines = LineSource::new(mock);

        assert_eq!(
            lines.next_line().await.unwrap().as_deref(),
            Some("GET / HTTP/1.1")
        );
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("Host: a"));
        assert!(lines.next_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn short_final_read_is_returned_then_eof() {
        let mut lines = LineSource::new("complete\r\npartial".as_bytes());

        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("complete"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("partial"));
        assert!(lines.next_line().await.unwrap().is_none());
        assert!(lines.next_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn dangling_carriage_return_at_eof_is_stripped() {
        let mut lines = LineSource::new("abc\r".as_bytes());

        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("abc"));
        assert!(lines.next_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lone_carriage_return_at_eof_is_not_a_blank_line() {
        let mut lines = LineSource::new("Host: a\r\n\r".as_bytes());

        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("Host: a"));
        assert!(lines.next_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn line_over_the_limit_should_throw_linetoolong() {
        let mut lines = LineSource::new("short\r\nthis line keeps going\r\n".as_bytes())
            .with_max_line_len(8);

        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("short"));
        let result = lines.next_line().await;
        assert!(
            matches!(result, Err(HttpError::LineTooLong(8))),
            "Expected Err(HttpError::LineTooLong), got {result:?}"
        );
        assert!(lines.next_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn line_at_the_limit_valid() {
        let mut lines = LineSource::new("abcdef\r\n".as_bytes()).with_max_line_len(8);

        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("abcdef"));
    }

    #[tokio::test]
    async fn endless_line_without_newline_is_cut_off() {
        let mock = Builder::new()
            .read(&[b'a'; 40])
            .read(&[b'a'; 40])
            .build();
        let mut lines = LineSource::new(mock).with_max_line_len(64);

        let result = lines.next_line().await;
        assert!(matches!(result, Err(HttpError::LineTooLong(64))));
    }

    #[tokio::test]
    async fn empty_stream_is_eof() {
        let mut lines = LineSource::new(&b""[..]);

        assert!(lines.next_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn read_failure_is_propagated() {
        let mock = Builder::new()
            .read(b"GET / HTTP/1.1\r\n")
            .read_error(Error::new(ErrorKind::ConnectionReset, "reset by peer"))
            .build();
        let mut lines = LineSource::new(mock);

        assert!(lines.next_line().await.unwrap().is_some());
        let result = lines.next_line().await;
        assert!(
            matches!(&result, Err(HttpError::Io(e)) if e.kind() == ErrorKind::ConnectionReset),
            "Expected Err(HttpError::Io), got {result:?}"
        );
    }

    #[tokio::test]
    async fn body_is_read_from_the_same_buffer() {
        let mut lines = LineSource::new("\r\nGopher!!trailing".as_bytes());

        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some(""));
        assert_eq!(lines.read_body(8).await.unwrap(), b"Gopher!!");
    }

    #[tokio::test]
    async fn short_body_should_throw_incompleterequest() {
        let mut lines = LineSource::new("\r\nGoph".as_bytes());

        lines.next_line().await.unwrap();
        let result = lines.read_body(8).await;
        assert!(matches!(result, Err(HttpError::IncompleteRequest)));
    }

    #[tokio::test]
    async fn huge_announced_body_is_not_preallocated() {
        let mut lines = LineSource::new("\r\nhi".as_bytes());

        lines.next_line().await.unwrap();
        let result = lines.read_body(usize::MAX).await;
        assert!(matches!(result, Err(HttpError::IncompleteRequest)));
    }
}
