//! manga-volumes library
//!
//! Komikku library access, volume partitioning, folder layout, cover lookup
//! and KCC invocation used by the `manga-volumes` binary.

pub mod cli;
pub mod config;
pub mod convert;
pub mod cover;
pub mod domain;
pub mod library;
pub mod organize;
pub mod utils;
pub mod volume;
