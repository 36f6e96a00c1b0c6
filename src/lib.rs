//! # linehttp
//!
//! A minimal HTTP/1.1 toolkit built around a line driven request parser.
//!
//! This crate provides a line source over async byte streams, a request parser state machine, the
//! request / response types and a response encoder sharing the parser's framing rules.
//! The `runtime` module runs it all as a small tokio server, one task per connection.
//!
//! Refer to the included binary for a complete server implementation.
pub mod config;
pub mod http;
pub mod runtime;
