//! End-to-end tests
//!
//! These boot the real router on a loopback port with the real tool adapters
//! pointed at small shell scripts, then talk to it over HTTP.

#[cfg(all(test, unix))]
mod e2e;
