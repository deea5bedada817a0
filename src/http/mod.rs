//! HTTP server module
//!
//! - Axum router and CORS/trace middleware
//! - `/convert`: run a conversion and report `{success, filename|error}`
//! - `/download/{filename}`: serve a finished file as an attachment
//! - Health and version endpoints

pub mod convert;
pub mod download;
pub mod handlers;
pub mod routes;

pub use routes::create_router;
