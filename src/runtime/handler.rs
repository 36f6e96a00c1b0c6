use crate::http::{
    request::{HttpError, Request},
    response::Response,
};

/// A trait that determines the handling for each server.
pub trait Handler: Send + Sync {
    /// Determines the response to a fully parsed request.
    ///
    /// # Errors
    /// Throws an `HttpError` if processing the request fails, the connection is then closed without a response.
    fn call(&self, req: &Request) -> impl Future<Output = Result<Response, HttpError>> + Send;
}
