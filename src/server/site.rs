use std::io;
use std::time::Duration;

use crate::config::Config;
use crate::http::router::Router;
use crate::static_files::DocumentRoot;

/// Read-only state shared by every connection.
pub struct Site {
    /// Directory files are served from
    pub root: DocumentRoot,
    /// Path-to-route table
    pub router: Router,
    /// Deadline for the request read; `None` waits forever
    pub read_timeout: Option<Duration>,
}

impl Site {
    pub fn new(root: DocumentRoot, router: Router) -> Self {
        Self {
            root,
            router,
            read_timeout: None,
        }
    }

    /// Builds the site described by `cfg`, creating the document root if it
    /// does not exist yet.
    pub fn from_config(cfg: &Config) -> io::Result<Self> {
        let root = DocumentRoot::create(&cfg.static_files.root)?;
        let router = Router::with_defaults(cfg.static_files.index.clone());

        Ok(Self::new(root, router).with_read_timeout(cfg.server.read_timeout()))
    }

    pub fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }
}
