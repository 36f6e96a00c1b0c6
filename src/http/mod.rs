/// Module containing logic to parse HTTP headers
pub mod headers;
/// Module turning a byte stream into lines
pub mod lines;
/// Module containing the line driven request parser
pub mod parser;
/// Module containing logic to parse requests
pub mod request;
/// Module containing logic to parse HTTP request lines
pub mod request_line;
/// Module formatting the response.
pub mod response;
