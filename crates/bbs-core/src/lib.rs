//! bbs/crates/bbs-core/src/lib.rs
//!
//! The central domain logic and interface definitions for the board.

pub mod error;
pub mod models;
pub mod pagination;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use pagination::*;
pub use traits::*;
