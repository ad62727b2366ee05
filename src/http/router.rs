//! Static route table
//!
//! Request URIs are matched byte for byte against the registered paths.
//! Anything unmatched is answered with 404.

use bytes::Bytes;

use crate::http::response::Response;
use crate::http::span::ByteSpan;

pub const HELLO_BODY: &[u8] = b"<h1>Hello, World!</h1>";
pub const BYE_BODY: &[u8] = b"<h1>Bye, World!</h1>";

/// What a matched path is answered with.
#[derive(Debug, Clone)]
pub enum Route {
    /// Serve this file from the document root.
    File(String),
    /// Send a fixed in-memory response.
    Fixed(Response),
}

pub struct Router {
    routes: Vec<(String, Route)>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// The server's route table: `/` serves `index` from the document root,
    /// `/hello` and `/bye` answer with fixed greetings.
    pub fn with_defaults(index: impl Into<String>) -> Self {
        let mut router = Self::new();
        router.register("/", Route::File(index.into()));
        router.register("/hello", Route::Fixed(Response::ok(Bytes::from_static(HELLO_BODY))));
        router.register("/bye", Route::Fixed(Response::ok(Bytes::from_static(BYE_BODY))));
        router
    }

    /// Registers `route` for `path`. Earlier registrations win on duplicates.
    pub fn register(&mut self, path: impl Into<String>, route: Route) {
        self.routes.push((path.into(), route));
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Finds the route registered for exactly `uri`.
    pub fn route(&self, uri: ByteSpan<'_>) -> Option<&Route> {
        self.routes
            .iter()
            .find(|(path, _)| uri == path.as_str())
            .map(|(_, route)| route)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
