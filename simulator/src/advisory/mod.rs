pub mod http;

pub use http::HttpAdvisory;
