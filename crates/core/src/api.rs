//! # API
//!
//! Requests are routed to the appropriate handler for processing, returning a
//! response the HTTP-facing collaborator can serialize. Errors carry their own
//! HTTP status so that mapping lives next to the error taxonomy rather than in
//! route code.

use std::fmt::Debug;
use std::ops::Deref;

pub use http::StatusCode;

/// A request to process.
#[derive(Clone, Debug)]
pub struct Request<B, H = NoHeaders>
where
    B: Body,
    H: Headers,
{
    /// The request to process.
    pub body: B,

    /// Headers associated with this request.
    pub headers: H,
}

impl<B: Body> From<B> for Request<B> {
    fn from(body: B) -> Self {
        Self {
            body,
            headers: NoHeaders,
        }
    }
}

/// Top-level response data structure common to all handlers.
#[derive(Clone, Debug)]
pub struct Response<T> {
    /// Response HTTP status code.
    pub status: StatusCode,

    /// The handler-specific response.
    pub body: T,
}

impl<T> From<T> for Response<T> {
    fn from(body: T) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }
}

impl<T> Response<T> {
    /// Replace the response status, keeping the body.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl<T> Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.body
    }
}

/// Request handler.
///
/// Provides a common interface for requests so they can be dispatched by a
/// single generic `handle` entry point.
pub trait Handler<U, P> {
    /// The error type returned by the handler.
    type Error: HttpError;

    /// Routes the message to the concrete handler used to process it.
    fn handle(
        self, owner: &str, provider: &P,
    ) -> impl Future<Output = Result<impl Into<Response<U>>, Self::Error>> + Send;
}

/// Errors surfaced to the HTTP-facing collaborator.
pub trait HttpError: std::error::Error {
    /// The HTTP status code the error should be reported with.
    fn status(&self) -> StatusCode;
}

/// The `Body` trait restricts the types able to act as a request body.
pub trait Body: Clone + Debug + Send + Sync {}

/// The `Headers` trait restricts the types able to act as request headers.
pub trait Headers: Clone + Debug + Send + Sync {}

/// Empty headers for use by handlers that do not require headers.
#[derive(Clone, Debug)]
pub struct NoHeaders;
impl Headers for NoHeaders {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    struct Ping;
    impl Body for Ping {}

    #[test]
    fn defaults() {
        let request: Request<Ping> = Ping.into();
        assert!(matches!(request.headers, NoHeaders));

        let response: Response<&str> = "pong".into();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(*response, "pong");

        let response = response.with_status(StatusCode::ACCEPTED);
        assert_eq!(response.status, StatusCode::ACCEPTED);
    }
}
