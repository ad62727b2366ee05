//! docroot - minimal HTTP/1.0 static file server
//!
//! Core library for request-line parsing and zero-copy file serving.

pub mod config;
pub mod http;
pub mod server;
pub mod static_files;
