//! HTTP transport to the map backends.

mod http;
mod types;

pub use http::{AsyncHttpClient, HttpResponse, ReqwestClient};
pub use types::BackendError;

#[cfg(test)]
pub use http::tests::MockHttpClient;
