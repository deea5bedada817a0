//! Output file naming
//!
//! - Title sanitization for use as a filename
//! - Collision-safe path selection inside the shared output directory

pub mod namer;
pub mod sanitize;

pub use namer::{short_id, unique_path};
pub use sanitize::sanitize_filename;
