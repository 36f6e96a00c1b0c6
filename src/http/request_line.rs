use crate::http::request::HttpError;

/// A Http Request Line representation with method, path and protocol version
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestLine {
    /// The method of the parsed request, case kept as transmitted
    pub method: String,
    /// The target path of the request, not decoded
    pub path: String,
    /// The protocol version used in the request, e.g. `HTTP/1.1`
    pub protocol_version: String,
}

/// Parses a single start line, without its terminator, into a Request Line Struct
///
/// The line is split on single spaces and must yield exactly three non-empty fields.
///
/// # Errors
///
/// Throws `HttpError::MalformedStartLine` if the line has fewer or more fields, or an empty one.
pub fn parse_request_line(line: &str) -> Result<RequestLine, HttpError> {
    let parts: Vec<&str> = line.split(' ').collect();

    let [method, path, protocol_version] = parts.as_slice() else {
        return Err(HttpError::MalformedStartLine);
    };

    if method.is_empty() || path.is_empty() || protocol_version.is_empty() {
        return Err(HttpError::MalformedStartLine);
    }

    Ok(RequestLine {
        method: (*method).to_string(),
        path: (*path).to_string(),
        protocol_version: (*protocol_version).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use crate::{http::request::HttpError, http::request_line::parse_request_line};

    #[test]
    fn get_request_line_valid() {
        let request_line = parse_request_line("GET / HTTP/1.1").unwrap();

        assert_eq!(request_line.method, "GET");
        assert_eq!(request_line.path, "/");
        assert_eq!(request_line.protocol_version, "HTTP/1.1");
    }

    #[test]
    fn get_request_line_with_path_valid() {
        let request_line = parse_request_line("GET /coffee?roast=dark HTTP/1.1").unwrap();

        assert_eq!(request_line.path, "/coffee?roast=dark");
    }

    #[test]
    fn method_case_is_kept() {
        let request_line = parse_request_line("get /%7Euser HTTP/1.0").unwrap();

        assert_eq!(request_line.method, "get");
        assert_eq!(request_line.path, "/%7Euser");
        assert_eq!(request_line.protocol_version, "HTTP/1.0");
    }

    #[test]
    fn unknown_method_and_version_are_accepted() {
        let request_line = parse_request_line("BREW /pot HTCPCP/1.0").unwrap();

        assert_eq!(request_line.method, "BREW");
        assert_eq!(request_line.protocol_version, "HTCPCP/1.0");
    }

    #[test]
    fn two_fields_should_throw_malformedstartline() {
        let result = parse_request_line("/coffee HTTP/1.1");
        assert!(
            matches!(result, Err(HttpError::MalformedStartLine)),
            "Expected Err(HttpError::MalformedStartLine), got {result:?}"
        );
    }

    #[test]
    fn four_fields_should_throw_malformedstartline() {
        let result = parse_request_line("GET /coffee HTTP/1.1 extra");
        assert!(
            matches!(result, Err(HttpError::MalformedStartLine)),
            "Expected Err(HttpError::MalformedStartLine), got {result:?}"
        );
    }

    #[test]
    fn extra_spaces_should_throw_malformedstartline() {
        let result = parse_request_line("GET  /  HTTP/1.1");
        assert!(matches!(result, Err(HttpError::MalformedStartLine)));
    }

    #[test]
    fn empty_field_should_throw_malformedstartline() {
        let result = parse_request_line("GET / ");
        assert!(matches!(result, Err(HttpError::MalformedStartLine)));
    }

    #[test]
    fn no_spaces_should_throw_malformedstartline() {
        let result = parse_request_line("GET/coffeeHTTP/1.1");
        assert!(matches!(result, Err(HttpError::MalformedStartLine)));
    }
}
