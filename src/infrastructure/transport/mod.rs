//! Upload adapters

mod http;

pub use http::HttpTransport;
