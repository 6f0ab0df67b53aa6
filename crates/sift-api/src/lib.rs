//! Sift API: HTTP host for the query-resolution engine.
//!
//! Re-exports all modules so the binary (`main.rs`) and external crates
//! (e.g. `sift-e2e-tests`) can build the router and state directly.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod store;
