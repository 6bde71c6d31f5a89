//! URL handling module for Linkspider
//!
//! This module resolves the raw `href` values found on pages into absolute,
//! normalized `http://` addresses, and splits such addresses into the pieces
//! the wire client needs (host, port, request path).
//!
//! Normalization is purely textual: dot segments are collapsed, runs of `/`
//! are squeezed, and links whose `..` segments climb past the host are
//! rejected. Only the `http` scheme is supported.

mod host;
mod normalize;
mod resolve;

// Re-export main functions
pub use host::{host_of, path_of, split_host_port};
pub use normalize::normalize;
pub use resolve::{page_directory, resolve, strip_anchor, try_resolve};
