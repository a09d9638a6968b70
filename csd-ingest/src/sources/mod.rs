pub mod aeso_http;

pub use aeso_http::AesoReportSource;
