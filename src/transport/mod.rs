//! Request/response transport to the analysis service.
//!
//! [`Transport`] is the single seam between the client and the network.
//! [`HttpTransport`] speaks HTTP/1.1 over TCP; tests substitute a scripted
//! implementation.

mod http;
mod multipart;

use std::future::Future;

pub use http::HttpTransport;
pub use multipart::{Multipart, Part};

use crate::error::TransportError;

/// HTTP method used by the service's endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// One outgoing request. `path` is relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// `GET path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            content_type: None,
            body: Vec::new(),
        }
    }

    /// `POST path` with a JSON body.
    pub fn post_json(path: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            content_type: Some("application/json".to_string()),
            body,
        }
    }

    /// `POST path` with a multipart form body.
    pub fn post_multipart(path: impl Into<String>, form: Multipart) -> Self {
        let content_type = form.content_type();
        Self {
            method: Method::Post,
            path: path.into(),
            content_type: Some(content_type),
            body: form.into_body(),
        }
    }
}

/// A fully read response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Sends one request and returns the complete response.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}
