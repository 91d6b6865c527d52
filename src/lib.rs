//! sdgcount - count repository abstracts matching SDG keyword phrases
//!
//! This crate provides:
//! - A keyword loader for directories of `sdg<N>` phrase files
//! - A PostgreSQL corpus builder over DSpace `item`/`metadatavalue` tables
//! - Phrase normalization and matching through PostgreSQL full-text search
//! - Typed per-category, per-document and per-phrase tallies with a reporter

pub mod commands;
pub mod config;
pub mod error;
pub mod keywords;
pub mod normalize;
pub mod progress;
pub mod store;
pub mod tally;

pub use config::Config;
pub use error::{Error, Result};
