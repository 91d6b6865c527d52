//! CLI commands implementation

pub mod analyze;
pub mod corpus;

pub use analyze::*;
pub use corpus::*;
