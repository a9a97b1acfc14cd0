//! Source text access.
//!
//! Reading is a capability ([`SourceReader`]) so the preprocessor can run
//! against the real file system or an in-memory fixture alike.

pub mod real;
pub mod traits;

pub use real::RealSourceReader;
pub use traits::SourceReader;
