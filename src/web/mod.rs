//! Web API module for cabinet.
//!
//! REST interface over the record service: auth, folder tree, content
//! listing, uploads/downloads and zip packaging.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
