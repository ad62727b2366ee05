//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.0 subset the server speaks: one request
//! per connection, only the request line is interpreted.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`span`**: Borrowed byte spans and the delimiter splitter
//! - **`parser`**: Splits a request into lines and parses the request line
//! - **`request`**: The parsed request line
//! - **`response`**: Status codes, header rendering and in-memory responses
//! - **`router`**: Exact-match route table
//! - **`writer`**: Writes in-memory responses to the client
//! - **`connection`**: The per-connection state machine
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌──────────────────┐
//!        │ AwaitingRequest  │ ← Single read of the request
//!        └──────┬───────────┘
//!               │ Request line parsed        (peer closed / error → Closed)
//!               ▼
//!        ┌──────────────────┐
//!        │   LineParsed     │ ← Look up the URI     (parse error → 400 → Closed)
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │     Routed       │ ← Send fixed body, file or 404
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │  ResponseSent    │
//!        └──────┬───────────┘
//!               ▼
//!             Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use docroot::http::router::Router;
//! use docroot::server::{listener, Site};
//! use docroot::static_files::DocumentRoot;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let site = Site::new(DocumentRoot::create("./www")?, Router::with_defaults("index.html"));
//!     let listener = listener::bind("127.0.0.1:6969").await?;
//!     listener::serve(listener, Arc::new(site)).await
//! }
//! ```

pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod router;
pub mod span;
pub mod writer;
