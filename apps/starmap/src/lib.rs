//! # Starmap
//!
//! HTTP registry of Systems, Planets and Stations.
//!
//! The binary in `main.rs` is a thin shell over this library: tracing setup,
//! banner, then [`cli::execute`].

pub mod api;
pub mod cli;
pub mod config;
pub mod enrichment;
pub mod error;
