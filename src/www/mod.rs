//! # Web Server Implementation
//!
//! The statistics site served by the `www` binary.
//!
//! ## Submodules
//! - `handlers`: the actix-web handlers and page renderers.
//! - `request`: resolution of a submitted form into the requested page.

/// Request handlers and page rendering.
pub mod handlers;
/// Form-to-page dispatch.
pub mod request;
