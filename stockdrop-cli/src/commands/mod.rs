pub mod config;
pub mod headers;
pub mod sweep;
pub mod upload;
