use std::collections::HashMap;

use crate::http::request::HttpError;

/// Separator between a header name and its value on the wire.
const HEADER_SEPARATOR: &str = ": ";

/// A `HashMap` of two strings representing key, value pairs used in HTTP Headers.
///
/// Hash Maps do not guarantee ordering in Rust. That is fine as the order of header lines carries no meaning here.
/// A repeated key overwrites the previous value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers(HashMap<String, String>);

impl Headers {
    /// Returns a new `HashMap` constructed as a 'Headers' struct
    #[must_use]
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Inserts a new entry into the Headers struct by passing both key and value.
    ///
    /// Keys are stored as given. An existing value for the same key is replaced.
    ///
    /// # Examples
    /// ```
    /// let mut headers = linehttp::http::headers::Headers::new();
    /// headers.insert("drink", "milk");
    /// headers.insert("drink", "water");
    /// assert_eq!(headers.get("drink"), Some("water"));
    /// ```
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Retrieves the value of a specified key.
    ///
    /// Returns None if the specified key was not found in the header.
    ///
    /// # Examples
    /// ```
    /// let mut headers = linehttp::http::headers::Headers::new();
    /// headers.insert("drink", "milk");
    /// assert_eq!(headers.get("drink"), Some("milk"));
    /// ```
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Implements an iterator for the Header
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Returns the length of the Headers, that being the raw amount of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no header has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the `content-length` entry as a byte count.
    ///
    /// Returns `Ok(None)` when the header is absent.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::InvalidContentLength` if the value is not a decimal number.
    pub fn content_length(&self) -> Result<Option<usize>, HttpError> {
        self.get("content-length")
            .map(|value| value.parse::<usize>())
            .transpose()
            .map_err(HttpError::InvalidContentLength)
    }

    /// Parses a single header line and upserts it.
    ///
    /// The line is split on the first `": "`. Name and value are both lower-cased before they are stored.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::MalformedHeader` if the line has no `": "` separator.
    pub fn parse_header_line(&mut self, line: &str) -> Result<(), HttpError> {
        let (key, value) = line
            .split_once(HEADER_SEPARATOR)
            .ok_or(HttpError::MalformedHeader)?;

        self.insert(key.to_lowercase(), value.to_lowercase());
        Ok(())
    }
}
