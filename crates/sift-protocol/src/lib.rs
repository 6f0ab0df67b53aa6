//! Shared types for Sift: the filter a query resolves to, which tier
//! resolved it, cache reports, and the record-store contract.

pub mod cache;
pub mod filter;
pub mod records;
pub mod resolution;

pub use cache::*;
pub use filter::*;
pub use records::*;
pub use resolution::*;
