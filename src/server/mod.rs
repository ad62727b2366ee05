//! Listener and per-connection dispatch.

pub mod listener;
pub mod site;

pub use site::Site;
